use crate::collection::{Document, PotashId};
use crate::common::Value;
use crate::errors::{ErrorKind, PotashError, PotashResult};
use std::collections::{BTreeMap, HashMap};

/// Conversion between a Rust type and a [Value].
///
/// Repositories use it to turn objects into values before the registered
/// mapper turns those values into documents. Use `#[derive(Convertible)]`
/// from `potash_derive` for structs and enums.
pub trait Convertible {
    type Output;

    fn to_value(&self) -> PotashResult<Value>;
    fn from_value(value: &Value) -> PotashResult<Self::Output>;
}

/// Converts `value` into `T`; used by derived implementations.
pub fn from_value<T: Convertible<Output = T>>(value: &Value) -> PotashResult<T> {
    T::from_value(value)
}

fn mapping_error(expected: &str, value: &Value) -> PotashError {
    log::error!("Expected {} but found {} ({})", expected, value.type_name(), value);
    PotashError::new(
        &format!("Expected {} but found {}", expected, value.type_name()),
        ErrorKind::MappingError,
    )
}

impl Convertible for bool {
    type Output = bool;

    fn to_value(&self) -> PotashResult<Value> {
        Ok(Value::Bool(*self))
    }

    fn from_value(value: &Value) -> PotashResult<Self> {
        value.as_bool().ok_or_else(|| mapping_error("bool", value))
    }
}

macro_rules! convertible_integer {
    ($($t:ty),*) => {
        $(impl Convertible for $t {
            type Output = $t;

            fn to_value(&self) -> PotashResult<Value> {
                Ok(Value::from(*self))
            }

            fn from_value(value: &Value) -> PotashResult<Self> {
                let converted = match value {
                    Value::I64(v) => <$t>::try_from(*v).ok(),
                    Value::U64(v) => <$t>::try_from(*v).ok(),
                    _ => None,
                };
                converted.ok_or_else(|| mapping_error(stringify!($t), value))
            }
        })*
    };
}

convertible_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Convertible for f64 {
    type Output = f64;

    fn to_value(&self) -> PotashResult<Value> {
        Ok(Value::F64(*self))
    }

    fn from_value(value: &Value) -> PotashResult<Self> {
        value.as_f64().ok_or_else(|| mapping_error("f64", value))
    }
}

impl Convertible for f32 {
    type Output = f32;

    fn to_value(&self) -> PotashResult<Value> {
        Ok(Value::F64(*self as f64))
    }

    fn from_value(value: &Value) -> PotashResult<Self> {
        value
            .as_f64()
            .map(|v| v as f32)
            .ok_or_else(|| mapping_error("f32", value))
    }
}

impl Convertible for char {
    type Output = char;

    fn to_value(&self) -> PotashResult<Value> {
        Ok(Value::String(self.to_string()))
    }

    fn from_value(value: &Value) -> PotashResult<Self> {
        let mut chars = value.as_str().map(|s| s.chars()).ok_or_else(|| mapping_error("char", value))?;
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(mapping_error("char", value)),
        }
    }
}

impl Convertible for String {
    type Output = String;

    fn to_value(&self) -> PotashResult<Value> {
        Ok(Value::String(self.clone()))
    }

    fn from_value(value: &Value) -> PotashResult<Self> {
        value.as_string().cloned().ok_or_else(|| mapping_error("string", value))
    }
}

impl Convertible for Value {
    type Output = Value;

    fn to_value(&self) -> PotashResult<Value> {
        Ok(self.clone())
    }

    fn from_value(value: &Value) -> PotashResult<Self> {
        Ok(value.clone())
    }
}

impl Convertible for Document {
    type Output = Document;

    fn to_value(&self) -> PotashResult<Value> {
        Ok(Value::Document(self.clone()))
    }

    fn from_value(value: &Value) -> PotashResult<Self> {
        value.as_document().cloned().ok_or_else(|| mapping_error("document", value))
    }
}

impl Convertible for PotashId {
    type Output = PotashId;

    fn to_value(&self) -> PotashResult<Value> {
        Ok(Value::PotashId(*self))
    }

    fn from_value(value: &Value) -> PotashResult<Self> {
        value.as_id().copied().ok_or_else(|| mapping_error("id", value))
    }
}

impl<T: Convertible<Output = T>> Convertible for Option<T> {
    type Output = Option<T>;

    fn to_value(&self) -> PotashResult<Value> {
        match self {
            Some(v) => v.to_value(),
            None => Ok(Value::Null),
        }
    }

    fn from_value(value: &Value) -> PotashResult<Self> {
        match value {
            Value::Null => Ok(None),
            _ => T::from_value(value).map(Some),
        }
    }
}

impl<T: Convertible<Output = T>> Convertible for Vec<T> {
    type Output = Vec<T>;

    fn to_value(&self) -> PotashResult<Value> {
        let items = self.iter().map(|v| v.to_value()).collect::<PotashResult<Vec<_>>>()?;
        Ok(Value::Array(items))
    }

    fn from_value(value: &Value) -> PotashResult<Self> {
        match value {
            Value::Array(items) => items.iter().map(T::from_value).collect(),
            _ => Err(mapping_error("array", value)),
        }
    }
}

impl<T: Convertible<Output = T>> Convertible for BTreeMap<String, T> {
    type Output = BTreeMap<String, T>;

    fn to_value(&self) -> PotashResult<Value> {
        let mut doc = Document::new();
        for (key, value) in self {
            doc.put(key.clone(), value.to_value()?)?;
        }
        Ok(Value::Document(doc))
    }

    fn from_value(value: &Value) -> PotashResult<Self> {
        match value {
            Value::Document(doc) => doc
                .iter()
                .map(|(k, v)| Ok((k.clone(), T::from_value(v)?)))
                .collect(),
            _ => Err(mapping_error("document", value)),
        }
    }
}

impl<T: Convertible<Output = T>> Convertible for HashMap<String, T> {
    type Output = HashMap<String, T>;

    fn to_value(&self) -> PotashResult<Value> {
        let mut doc = Document::new();
        for (key, value) in self {
            doc.put(key.clone(), value.to_value()?)?;
        }
        Ok(Value::Document(doc))
    }

    fn from_value(value: &Value) -> PotashResult<Self> {
        match value {
            Value::Document(doc) => doc
                .iter()
                .map(|(k, v)| Ok((k.clone(), T::from_value(v)?)))
                .collect(),
            _ => Err(mapping_error("document", value)),
        }
    }
}

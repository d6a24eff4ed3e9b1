use crate::collection::{Document, PotashId};
use crate::common::Value;
use crate::errors::{ErrorKind, PotashError, PotashResult};
use std::fmt::{Display, Formatter};

/// An ordered list of field paths an index is declared over.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fields {
    field_names: Vec<String>,
}

impl Fields {
    pub fn with_names(names: Vec<&str>) -> PotashResult<Fields> {
        Self::from_strings(names.into_iter().map(|s| s.to_string()).collect())
    }

    pub fn from_strings(field_names: Vec<String>) -> PotashResult<Fields> {
        if field_names.is_empty() {
            log::error!("Fields cannot be empty");
            return Err(PotashError::new("Fields cannot be empty", ErrorKind::ValidationError));
        }

        for (i, name) in field_names.iter().enumerate() {
            if name.trim().is_empty() {
                log::error!("Field name cannot be empty");
                return Err(PotashError::new("Field name cannot be empty", ErrorKind::ValidationError));
            }
            if field_names[..i].contains(name) {
                log::error!("Duplicate field {} in index fields", name);
                return Err(PotashError::new(
                    &format!("Duplicate field {}", name),
                    ErrorKind::ValidationError,
                ));
            }
        }

        Ok(Fields { field_names })
    }

    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    pub fn is_compound(&self) -> bool {
        self.field_names.len() > 1
    }

    pub fn first_field(&self) -> &str {
        self.field_names.first().map(|s| s.as_str()).unwrap_or_default()
    }

    /// Stable name used inside store map names.
    pub fn encoded_name(&self) -> String {
        self.field_names.join(",")
    }

    pub fn to_value(&self) -> Value {
        Value::Array(self.field_names.iter().map(Value::from).collect())
    }

    pub fn from_value(value: &Value) -> PotashResult<Fields> {
        match value.as_array() {
            Some(items) => {
                let names = items
                    .iter()
                    .map(|v| {
                        v.as_string().cloned().ok_or_else(|| {
                            log::error!("Field name {} is not a string", v);
                            PotashError::new("Field name is not a string", ErrorKind::Corruption)
                        })
                    })
                    .collect::<PotashResult<Vec<_>>>()?;
                Fields::from_strings(names)
            }
            None => {
                log::error!("Stored fields {} are not an array", value);
                Err(PotashError::new("Stored fields are not an array", ErrorKind::Corruption))
            }
        }
    }
}

impl Display for Fields {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.field_names.join(", "))
    }
}

/// The values a document holds for the fields of one index.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldValues {
    id: PotashId,
    fields: Fields,
    values: Vec<Value>,
}

impl FieldValues {
    pub fn new(id: PotashId, fields: Fields, values: Vec<Value>) -> Self {
        FieldValues { id, fields, values }
    }

    /// Extracts the values of `fields` from `document`, resolving nested
    /// paths with `separator`.
    pub fn from_document(id: PotashId, fields: &Fields, document: &Document, separator: &str) -> Self {
        let values = fields
            .field_names()
            .iter()
            .map(|name| document.get_embedded(name, separator))
            .collect();
        FieldValues {
            id,
            fields: fields.clone(),
            values,
        }
    }

    pub fn id(&self) -> PotashId {
        self.id
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// The index key: the single value, or an array of all values for a
    /// compound index.
    pub fn index_key(&self) -> Value {
        if self.values.len() == 1 {
            self.values[0].clone()
        } else {
            Value::Array(self.values.clone())
        }
    }

    pub fn all_null(&self) -> bool {
        self.values.iter().all(|v| v.is_null())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

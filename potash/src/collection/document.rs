use crate::collection::PotashId;
use crate::common::{Value, DOC_ID, DOC_MODIFIED, DOC_REVISION, RESERVED_FIELDS};
use crate::errors::{ErrorKind, PotashError, PotashResult};
use im::OrdMap;
use std::fmt::{Display, Formatter};

/// An ordered set of named [Value]s stored as one record of a collection.
///
/// Top level keys are kept in key order. Nested documents are addressed
/// with a field path whose segments are joined by the database field
/// separator, e.g. `address.city`; numeric segments index into arrays.
///
/// Documents are persistent maps, so cloning is cheap and clones never
/// observe each other's changes.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct Document {
    data: OrdMap<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Document { data: OrdMap::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Puts a top level field.
    ///
    /// Fails with [ErrorKind::ValidationError] for an empty key, or when `_id`
    /// is given something other than a [PotashId].
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<Value>) -> PotashResult<()> {
        let key = key.into();
        let value = value.into();
        if key.is_empty() {
            log::error!("Document does not support empty keys");
            return Err(PotashError::new(
                "Document does not support empty keys",
                ErrorKind::ValidationError,
            ));
        }

        if key == DOC_ID && !matches!(value, Value::PotashId(_)) {
            log::error!("Field {} only accepts a PotashId, found {}", DOC_ID, value.type_name());
            return Err(PotashError::new(
                &format!("Field {} only accepts a PotashId", DOC_ID),
                ErrorKind::InvalidId,
            ));
        }

        self.data.insert(key, value);
        Ok(())
    }

    #[doc(hidden)]
    pub fn put_raw(&mut self, key: &str, value: Value) {
        self.data.insert(key.to_string(), value);
    }

    /// Returns a top level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Returns the value at `path`, or [Value::Null] if any segment is missing.
    pub fn get_embedded(&self, path: &str, separator: &str) -> Value {
        if let Some(value) = self.data.get(path) {
            return value.clone();
        }

        let segments: Vec<&str> = path.split(separator).collect();
        if segments.len() < 2 {
            return Value::Null;
        }

        let mut current = match self.data.get(segments[0]) {
            Some(value) => value,
            None => return Value::Null,
        };

        for segment in &segments[1..] {
            current = match current {
                Value::Document(doc) => match doc.data.get(*segment) {
                    Some(value) => value,
                    None => return Value::Null,
                },
                Value::Array(items) => match segment.parse::<usize>().ok().and_then(|i| items.get(i)) {
                    Some(value) => value,
                    None => return Value::Null,
                },
                _ => return Value::Null,
            };
        }
        current.clone()
    }

    /// Puts `value` at `path`, creating intermediate documents as needed.
    pub fn put_embedded(&mut self, path: &str, value: impl Into<Value>, separator: &str) -> PotashResult<()> {
        let segments: Vec<&str> = path.split(separator).collect();
        if segments.iter().any(|s| s.is_empty()) {
            log::error!("Invalid field path {}", path);
            return Err(PotashError::new(
                &format!("Invalid field path {}", path),
                ErrorKind::ValidationError,
            ));
        }
        self.put_segments(&segments, value.into())
    }

    fn put_segments(&mut self, segments: &[&str], value: Value) -> PotashResult<()> {
        if segments.len() == 1 {
            return self.put(segments[0], value);
        }

        let mut nested = match self.data.get(segments[0]) {
            Some(Value::Document(doc)) => doc.clone(),
            _ => Document::new(),
        };
        nested.put_segments(&segments[1..], value)?;
        self.data.insert(segments[0].to_string(), Value::Document(nested));
        Ok(())
    }

    /// Removes a top level field.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    /// Removes the value at `path`. Empty parent documents are kept.
    pub fn remove_embedded(&mut self, path: &str, separator: &str) -> Option<Value> {
        if self.data.contains_key(path) {
            return self.data.remove(path);
        }

        let segments: Vec<&str> = path.split(separator).collect();
        self.remove_segments(&segments)
    }

    fn remove_segments(&mut self, segments: &[&str]) -> Option<Value> {
        if segments.len() == 1 {
            return self.data.remove(segments[0]);
        }

        let mut nested = match self.data.get(segments[0]) {
            Some(Value::Document(doc)) => doc.clone(),
            _ => return None,
        };
        let removed = nested.remove_segments(&segments[1..]);
        if removed.is_some() {
            self.data.insert(segments[0].to_string(), Value::Document(nested));
        }
        removed
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn contains_field(&self, path: &str, separator: &str) -> bool {
        !self.get_embedded(path, separator).is_null() || self.contains_key(path)
    }

    /// Leaf field paths of this document; nested documents are flattened
    /// with `separator`, arrays are leaves.
    pub fn fields(&self, separator: &str) -> Vec<String> {
        let mut fields = Vec::new();
        self.collect_fields("", separator, &mut fields);
        fields
    }

    fn collect_fields(&self, prefix: &str, separator: &str, fields: &mut Vec<String>) {
        for (key, value) in self.data.iter() {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}{}{}", prefix, separator, key)
            };
            match value {
                Value::Document(doc) if !doc.is_empty() => doc.collect_fields(&path, separator, fields),
                _ => fields.push(path),
            }
        }
    }

    /// Merges `other` into this document. Nested documents merge
    /// recursively, every other value replaces the existing one.
    pub fn merge(&mut self, other: &Document) {
        for (key, value) in other.data.iter() {
            match (self.data.get(key), value) {
                (Some(Value::Document(existing)), Value::Document(incoming)) => {
                    let mut merged = existing.clone();
                    merged.merge(incoming);
                    self.data.insert(key.clone(), Value::Document(merged));
                }
                _ => {
                    self.data.insert(key.clone(), value.clone());
                }
            }
        }
    }

    pub fn id(&self) -> Option<PotashId> {
        self.data.get(DOC_ID).and_then(|v| v.as_id()).copied()
    }

    pub fn has_id(&self) -> bool {
        self.id().is_some()
    }

    pub fn revision(&self) -> u64 {
        self.data.get(DOC_REVISION).and_then(|v| v.as_u64()).unwrap_or(0)
    }

    pub fn last_modified_since_epoch(&self) -> i64 {
        self.data.get(DOC_MODIFIED).and_then(|v| v.as_i64()).unwrap_or(0)
    }

    /// A copy without `_id`, `_revision` and `_modified`.
    pub fn without_metadata(&self) -> Document {
        let mut data = self.data.clone();
        for field in RESERVED_FIELDS {
            data.remove(field);
        }
        Document { data }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "\"{}\": {}", key, value)?;
        }
        write!(f, "}}")
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Document {
            data: iter.into_iter().collect(),
        }
    }
}

/// Strips the quotes `stringify!` leaves around literal keys of [doc!].
#[doc(hidden)]
pub fn normalize(key: &str) -> String {
    key.trim().trim_matches('"').to_string()
}

/// Builds a [Document] from `key: value` pairs.
///
/// Values may be nested `{ ... }` documents, `[ ... ]` arrays or any
/// expression convertible into a [Value].
///
/// ```rust
/// use potash::doc;
///
/// let doc = doc! {
///     "name": "Alice",
///     "address": { "city": "Oslo" },
///     "tags": ["a", "b"],
/// };
/// assert_eq!(doc.size(), 3);
/// ```
#[macro_export]
macro_rules! doc {
    () => {
        $crate::collection::Document::new()
    };

    ($($key:tt : $value:tt),* $(,)?) => {
        {
            let mut doc = $crate::collection::Document::new();
            $(
                doc.put_raw(&$crate::collection::normalize(stringify!($key)), $crate::doc_value!($value));
            )*
            doc
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! doc_value {
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::common::Value::Document($crate::doc!{ $($key : $value),* })
    };

    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}

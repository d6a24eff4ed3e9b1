use crate::collection::Document;
use crate::common::{
    Convertible, Fields, Value, INDEX_CATALOG_PREFIX, INDEX_PREFIX, INTERNAL_NAME_SEPARATOR,
};
use crate::errors::{ErrorKind, PotashError, PotashResult};
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Identifies one index: its type, the fields it covers and its collection.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexDescriptor {
    inner: Arc<IndexDescriptorInner>,
}

#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct IndexDescriptorInner {
    index_type: String,
    index_fields: Fields,
    collection_name: String,
}

impl IndexDescriptor {
    pub fn new(index_type: &str, index_fields: Fields, collection_name: &str) -> Self {
        IndexDescriptor {
            inner: Arc::new(IndexDescriptorInner {
                index_type: index_type.to_string(),
                index_fields,
                collection_name: collection_name.to_string(),
            }),
        }
    }

    pub fn index_type(&self) -> &str {
        &self.inner.index_type
    }

    pub fn index_fields(&self) -> &Fields {
        &self.inner.index_fields
    }

    pub fn collection_name(&self) -> &str {
        &self.inner.collection_name
    }

    pub fn is_compound_index(&self) -> bool {
        self.inner.index_fields.is_compound()
    }

    /// Name of the store map holding the entries of this index.
    pub fn index_map_name(&self) -> String {
        [
            INDEX_PREFIX,
            self.collection_name(),
            &self.inner.index_fields.encoded_name(),
            self.index_type(),
        ]
        .join(INTERNAL_NAME_SEPARATOR)
    }

    /// Name of the store map listing the indexes of `collection_name`.
    pub fn catalog_map_name(collection_name: &str) -> String {
        [INDEX_CATALOG_PREFIX, collection_name].join(INTERNAL_NAME_SEPARATOR)
    }
}

impl Display for IndexDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} index on {}{}",
            self.index_type(),
            self.collection_name(),
            self.index_fields()
        )
    }
}

impl Convertible for IndexDescriptor {
    type Output = IndexDescriptor;

    fn to_value(&self) -> PotashResult<Value> {
        let mut document = Document::new();
        document.put("index_type", self.index_type())?;
        document.put("index_fields", self.index_fields().to_value())?;
        document.put("collection_name", self.collection_name())?;
        Ok(Value::Document(document))
    }

    fn from_value(value: &Value) -> PotashResult<Self::Output> {
        let document = value.as_document().ok_or_else(|| {
            log::error!("Index descriptor {} is not a document", value);
            PotashError::new("Index descriptor is not a document", ErrorKind::Corruption)
        })?;

        let text = |name: &str| -> PotashResult<String> {
            document
                .get(name)
                .and_then(|v| v.as_string())
                .cloned()
                .ok_or_else(|| {
                    log::error!("Index descriptor is missing {}", name);
                    PotashError::new(
                        &format!("Index descriptor is missing {}", name),
                        ErrorKind::Corruption,
                    )
                })
        };

        let index_type = text("index_type")?;
        let collection_name = text("collection_name")?;
        let fields = Fields::from_value(document.get("index_fields").unwrap_or(&Value::Null))?;
        Ok(IndexDescriptor::new(&index_type, fields, &collection_name))
    }
}

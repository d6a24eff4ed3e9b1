use crate::collection::PotashId;
use crate::common::{Convertible, Value, UNIQUE_INDEX};
use crate::errors::{ErrorKind, PotashError, PotashResult};
use crate::filter::{by_id, field, Filter};

/// Schema of a type stored in an [ObjectRepository](crate::repository::ObjectRepository).
///
/// The entity name is the name of the repository collection, so it must be
/// stable across releases of the application. Usually derived:
///
/// ```rust,ignore
/// #[derive(PotashEntity, Convertible)]
/// #[entity(name = "books", id(field = "isbn"), index(fields = "author", index_type = "non-unique"))]
/// struct Book {
///     isbn: String,
///     author: String,
/// }
/// ```
pub trait PotashEntity {
    /// Type of the id field; [PotashId] for entities without one.
    type Id: Convertible + Send + Sync + 'static;

    fn entity_name() -> String;

    /// Token recorded with the repository collection and compared on every
    /// later open, so one collection is never read as two different types.
    ///
    /// It is persisted, so it must not depend on compiler output such as
    /// [std::any::type_name]. Defaults to the entity name; the derive uses
    /// the type's identifier.
    fn entity_type() -> String {
        Self::entity_name()
    }

    /// Indexes created when the repository is first opened.
    fn entity_indexes() -> Vec<EntityIndex> {
        Vec::new()
    }

    fn entity_id() -> Option<EntityId> {
        None
    }
}

/// An index declared on an entity.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct EntityIndex {
    fields: Vec<String>,
    index_type: String,
}

impl EntityIndex {
    /// Declares an index on `fields`; unique unless `index_type` says otherwise.
    pub fn new(fields: Vec<&str>, index_type: Option<&str>) -> Self {
        EntityIndex {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            index_type: index_type.unwrap_or(UNIQUE_INDEX).to_string(),
        }
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(String::as_str).collect()
    }

    pub fn index_type(&self) -> &str {
        &self.index_type
    }
}

/// The field identifying an entity.
///
/// A regular id field gets a unique index. A field holding a [PotashId]
/// mirrors the document `_id` instead and is filled in on insert when it
/// is null.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct EntityId {
    field_name: String,
    is_potash_id: bool,
}

impl EntityId {
    pub fn new(field_name: &str, is_potash_id: bool) -> Self {
        EntityId {
            field_name: field_name.to_string(),
            is_potash_id,
        }
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn is_potash_id(&self) -> bool {
        self.is_potash_id
    }

    /// Filter selecting the entity whose id is `id`.
    pub fn create_id_filter(&self, id: Value) -> PotashResult<Filter> {
        if !self.is_potash_id {
            return Ok(field(&self.field_name).eq(id));
        }

        match id {
            Value::PotashId(id) => Ok(by_id(id)),
            other => {
                log::error!("Id field {} holds a {}, expected an id", self.field_name, other.type_name());
                Err(PotashError::new(
                    &format!("Id field {} does not hold an id", self.field_name),
                    ErrorKind::InvalidId,
                ))
            }
        }
    }
}

/// Filter on `_id` for entities looked up by their document id.
pub(crate) fn document_id_filter(id: &Value) -> PotashResult<Filter> {
    PotashId::from_value(id).map(by_id)
}

use super::entity::{document_id_filter, EntityId, PotashEntity};
use crate::collection::{Document, PotashCollection, PotashId};
use crate::common::{Convertible, PersistentCollection, PotashMapper, Value, DOC_ID, UNIQUE_INDEX};
use crate::errors::{ErrorKind, PotashError, PotashResult};
use crate::filter::Filter;
use crate::index::IndexOptions;
use std::marker::PhantomData;

/// Converts between entities and documents and builds the filters that
/// address a single entity.
pub(crate) struct RepositoryOperations<T> {
    mapper: PotashMapper,
    entity_id: Option<EntityId>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for RepositoryOperations<T> {
    fn clone(&self) -> Self {
        RepositoryOperations {
            mapper: self.mapper.clone(),
            entity_id: self.entity_id.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T> RepositoryOperations<T>
where
    T: PotashEntity + Convertible<Output = T>,
{
    pub(crate) fn new(mapper: PotashMapper) -> Self {
        RepositoryOperations {
            mapper,
            entity_id: T::entity_id(),
            _entity: PhantomData,
        }
    }

    /// Creates the id index and the declared indexes that are missing.
    pub(crate) fn create_indexes(&self, collection: &PotashCollection) -> PotashResult<()> {
        if let Some(entity_id) = &self.entity_id {
            if !entity_id.is_potash_id() && !collection.has_index(vec![entity_id.field_name()])? {
                collection.create_index(vec![entity_id.field_name()], &IndexOptions::new(UNIQUE_INDEX))?;
            }
        }

        for index in T::entity_indexes() {
            if !collection.has_index(index.field_names())? {
                collection.create_index(index.field_names(), &IndexOptions::new(index.index_type()))?;
            }
        }
        Ok(())
    }

    /// Maps `entity` to its document. On insert a null [PotashId] id field
    /// is filled with a new id.
    pub(crate) fn to_document(&self, entity: &T, update: bool) -> PotashResult<Document> {
        let mut document = self.mapper.to_document(entity.to_value()?)?;

        if let Some(entity_id) = self.entity_id.as_ref().filter(|id| id.is_potash_id()) {
            match document.get(entity_id.field_name()).cloned().unwrap_or(Value::Null) {
                Value::PotashId(id) => document.put(DOC_ID, id)?,
                Value::Null if !update => {
                    let id = PotashId::new();
                    document.put(entity_id.field_name(), id)?;
                    document.put(DOC_ID, id)?;
                }
                Value::Null => {}
                other => {
                    log::error!(
                        "Id field {} holds a {}, expected an id",
                        entity_id.field_name(),
                        other.type_name()
                    );
                    return Err(PotashError::new(
                        &format!("Id field {} does not hold an id", entity_id.field_name()),
                        ErrorKind::InvalidId,
                    ));
                }
            }
        }
        Ok(document)
    }

    pub(crate) fn to_entity(&self, document: Document) -> PotashResult<T> {
        let value = self.mapper.to_value(document)?;
        T::from_value(&value)
    }

    /// Strips the generated ids from an update so matched documents keep
    /// their own.
    pub(crate) fn remove_potash_id(&self, document: &mut Document) {
        document.remove(DOC_ID);
        if let Some(entity_id) = self.entity_id.as_ref().filter(|id| id.is_potash_id()) {
            document.remove(entity_id.field_name());
        }
    }

    /// Filter selecting the stored copy of `entity`.
    pub(crate) fn create_unique_filter(&self, entity: &T) -> PotashResult<Filter> {
        let entity_id = self.require_id()?;
        let document = self.mapper.to_document(entity.to_value()?)?;
        let id = document.get(entity_id.field_name()).cloned().unwrap_or(Value::Null);
        entity_id.create_id_filter(id)
    }

    pub(crate) fn create_id_filter(&self, id: &T::Id) -> PotashResult<Filter> {
        match &self.entity_id {
            Some(entity_id) => entity_id.create_id_filter(id.to_value()?),
            None => document_id_filter(&id.to_value()?),
        }
    }

    fn require_id(&self) -> PotashResult<&EntityId> {
        self.entity_id.as_ref().ok_or_else(|| {
            log::error!("Entity {} does not have an id field", T::entity_name());
            PotashError::new(
                &format!("Entity {} does not have an id field", T::entity_name()),
                ErrorKind::InvalidOperation,
            )
        })
    }
}

use super::default_object_repository::DefaultObjectRepository;
use super::repository_operations::RepositoryOperations;
use super::{ObjectRepository, PotashEntity};
use crate::collection::{validate_collection_name, CollectionFactory, Document};
use crate::common::{
    Convertible, PotashMapper, Value, ENTITY_TYPE, KEY_OBJ_SEPARATOR, MAPPER_ID,
    META_MAP_NAME, TAG_KEYED_REPOSITORY, TAG_REPOSITORY,
};
use crate::errors::{ErrorKind, PotashError, PotashResult};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::any::{type_name, Any};
use std::sync::Arc;

/// Caches one repository handle per repository name.
#[derive(Clone)]
pub(crate) struct RepositoryFactory {
    collection_factory: CollectionFactory,
    repositories: Arc<DashMap<String, Box<dyn Any + Send + Sync>>>,
}

/// Collection name and catalog tag of the repository of `T` under `key`.
pub(crate) fn repository_name<T: PotashEntity>(key: Option<&str>) -> PotashResult<(String, &'static str)> {
    let entity_name = T::entity_name();
    validate_collection_name(&entity_name)?;
    match key {
        None => Ok((entity_name, TAG_REPOSITORY)),
        Some(key) => {
            validate_collection_name(key)?;
            Ok((
                format!("{}{}{}", entity_name, KEY_OBJ_SEPARATOR, key),
                TAG_KEYED_REPOSITORY,
            ))
        }
    }
}

fn mapping_error(message: &str) -> PotashError {
    log::error!("{}", message);
    PotashError::new(message, ErrorKind::MappingError)
}

impl RepositoryFactory {
    pub(crate) fn new(collection_factory: CollectionFactory) -> Self {
        RepositoryFactory {
            collection_factory,
            repositories: Arc::new(DashMap::new()),
        }
    }

    pub(crate) fn get_or_create<T>(&self, key: Option<&str>) -> PotashResult<ObjectRepository<T>>
    where
        T: PotashEntity + Convertible<Output = T> + Send + Sync + 'static,
    {
        let (name, tag) = repository_name::<T>(key)?;
        match self.repositories.entry(name.clone()) {
            Entry::Occupied(mut entry) => {
                let cached = entry
                    .get()
                    .downcast_ref::<ObjectRepository<T>>()
                    .cloned()
                    .ok_or_else(|| {
                        mapping_error(&format!("Repository {} is bound to another type than {}", name, type_name::<T>()))
                    })?;
                if !cached.is_dropped()? {
                    return Ok(cached);
                }

                let repository = self.open::<T>(&name, tag)?;
                entry.insert(Box::new(repository.clone()));
                Ok(repository)
            }
            Entry::Vacant(entry) => {
                let repository = self.open::<T>(&name, tag)?;
                entry.insert(Box::new(repository.clone()));
                Ok(repository)
            }
        }
    }

    pub(crate) fn destroy<T: PotashEntity>(&self, key: Option<&str>) -> PotashResult<()> {
        let (name, tag) = repository_name::<T>(key)?;
        self.collection_factory.destroy(&name, tag)?;
        self.repositories.remove(&name);
        Ok(())
    }

    pub(crate) fn clear(&self) {
        self.repositories.clear();
    }

    fn open<T>(&self, name: &str, tag: &str) -> PotashResult<ObjectRepository<T>>
    where
        T: PotashEntity + Convertible<Output = T> + Send + Sync + 'static,
    {
        let mapper = self
            .collection_factory
            .config()
            .mapper()
            .ok_or_else(|| mapping_error("No mapper is configured"))?;
        self.check_mapping::<T>(name, &mapper)?;

        let collection = self.collection_factory.get_or_create(name, tag)?;
        let mut attributes = collection.attributes()?;
        if attributes.get(MAPPER_ID).is_none() || attributes.get(ENTITY_TYPE).is_none() {
            attributes.put(MAPPER_ID, mapper.mapper_id())?;
            attributes.put(ENTITY_TYPE, T::entity_type())?;
            collection.set_attributes(attributes)?;
        }

        let repository = DefaultObjectRepository::new(collection, RepositoryOperations::new(mapper))?;
        log::debug!("Opened repository {} for {}", name, type_name::<T>());
        Ok(ObjectRepository::new(repository))
    }

    /// Fails when the stored collection was written with another mapper or
    /// another entity type. Runs before anything is written.
    fn check_mapping<T: PotashEntity>(&self, name: &str, mapper: &PotashMapper) -> PotashResult<()> {
        let snapshot = self.collection_factory.store().snapshot()?;
        let attributes = match snapshot.get(META_MAP_NAME, &Value::from(name)) {
            Some(Value::Document(attributes)) => attributes.clone(),
            _ => Document::new(),
        };

        if let Some(stored) = attributes.get(MAPPER_ID).and_then(|v| v.as_str()) {
            if stored != mapper.mapper_id() {
                return Err(mapping_error(&format!(
                    "Repository {} was written with mapper {}, not {}",
                    name,
                    stored,
                    mapper.mapper_id()
                )));
            }
        }

        if let Some(stored) = attributes.get(ENTITY_TYPE).and_then(|v| v.as_str()) {
            let entity_type = T::entity_type();
            if stored != entity_type {
                return Err(mapping_error(&format!(
                    "Repository {} holds {}, not {}",
                    name, stored, entity_type
                )));
            }
        }
        Ok(())
    }
}

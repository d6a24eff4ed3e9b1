use super::default_potash_collection::DefaultPotashCollection;
use super::{EventDispatch, PendingEvents, PotashCollection};
use crate::common::{
    LockRegistry, COLLECTION_CATALOG, RESERVED_NAME_CHARS, TAG_COLLECTION, TAG_KEYED_REPOSITORY,
    TAG_REPOSITORY,
};
use crate::errors::{ErrorKind, PotashError, PotashResult};
use crate::potash_config::PotashConfig;
use crate::store::{catalog_key, PotashStore};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::ops::Deref;
use std::sync::Arc;

/// Rejects names that clash with internal map names.
pub(crate) fn validate_collection_name(name: &str) -> PotashResult<()> {
    if name.is_empty() {
        log::error!("Collection name cannot be empty");
        return Err(PotashError::new("Collection name cannot be empty", ErrorKind::ValidationError));
    }

    if name.starts_with('$') || RESERVED_NAME_CHARS.iter().any(|c| name.contains(c)) {
        log::error!("Collection name {} contains a reserved character", name);
        return Err(PotashError::new(
            &format!("Collection name {} contains a reserved character", name),
            ErrorKind::ValidationError,
        ));
    }
    Ok(())
}

/// Caches one live handle per collection name.
///
/// Handles are created under the map entry, so concurrent first access to
/// a name opens the collection exactly once.
#[derive(Clone)]
pub(crate) struct CollectionFactory {
    inner: Arc<CollectionFactoryInner>,
}

impl CollectionFactory {
    pub(crate) fn new(store: PotashStore, config: PotashConfig, lock_registry: LockRegistry) -> Self {
        let events = EventDispatch::Immediate(config.event_registry().clone());
        Self::with_events(store, config, lock_registry, events)
    }

    /// A factory whose collections hold their change events in `pending`
    /// instead of publishing them.
    pub(crate) fn deferring_events(
        store: PotashStore,
        config: PotashConfig,
        lock_registry: LockRegistry,
        pending: PendingEvents,
    ) -> Self {
        Self::with_events(store, config, lock_registry, EventDispatch::Deferred(pending))
    }

    fn with_events(store: PotashStore, config: PotashConfig, lock_registry: LockRegistry, events: EventDispatch) -> Self {
        CollectionFactory {
            inner: Arc::new(CollectionFactoryInner {
                collections: DashMap::new(),
                store,
                config,
                lock_registry,
                events,
            }),
        }
    }
}

impl Deref for CollectionFactory {
    type Target = Arc<CollectionFactoryInner>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

pub(crate) struct CollectionFactoryInner {
    collections: DashMap<String, (String, PotashCollection)>,
    store: PotashStore,
    config: PotashConfig,
    lock_registry: LockRegistry,
    events: EventDispatch,
}

impl CollectionFactoryInner {
    pub(crate) fn store(&self) -> &PotashStore {
        &self.store
    }

    pub(crate) fn config(&self) -> &PotashConfig {
        &self.config
    }

    /// Returns the handle for `name`, opening the collection under
    /// `catalog_tag` on first access or after it was dropped.
    ///
    /// # Errors
    /// `ValidationError` when `name` is already registered under another
    /// tag, e.g. a collection named like an existing repository.
    pub(crate) fn get_or_create(&self, name: &str, catalog_tag: &str) -> PotashResult<PotashCollection> {
        match self.collections.entry(name.to_string()) {
            Entry::Occupied(mut entry) => {
                let (tag, collection) = entry.get();
                if tag != catalog_tag {
                    return Err(self.tag_conflict(name, tag));
                }
                if !collection.is_dropped()? {
                    return Ok(collection.clone());
                }

                let collection = self.open(name, catalog_tag)?;
                entry.insert((catalog_tag.to_string(), collection.clone()));
                Ok(collection)
            }
            Entry::Vacant(entry) => {
                let collection = self.open(name, catalog_tag)?;
                entry.insert((catalog_tag.to_string(), collection.clone()));
                Ok(collection)
            }
        }
    }

    /// Drops the collection `name` if it exists and forgets its handle.
    pub(crate) fn destroy(&self, name: &str, catalog_tag: &str) -> PotashResult<()> {
        let snapshot = self.store.snapshot()?;
        if !snapshot.has_map(name) {
            self.collections.remove(name);
            log::debug!("Nothing to destroy for {}", name);
            return Ok(());
        }

        let collection = self.get_or_create(name, catalog_tag)?;
        collection.dispose()?;
        self.collections.remove(name);
        Ok(())
    }

    pub(crate) fn clear(&self) {
        self.collections.clear();
    }

    fn open(&self, name: &str, catalog_tag: &str) -> PotashResult<PotashCollection> {
        let snapshot = self.store.snapshot()?;
        for tag in [TAG_COLLECTION, TAG_REPOSITORY, TAG_KEYED_REPOSITORY] {
            if tag != catalog_tag && snapshot.get(COLLECTION_CATALOG, &catalog_key(tag, name)).is_some() {
                return Err(self.tag_conflict(name, tag));
            }
        }

        let collection = DefaultPotashCollection::new(
            name,
            self.store.clone(),
            self.config.clone(),
            self.lock_registry.get_lock(name),
            catalog_tag,
            self.events.clone(),
        )?;
        Ok(PotashCollection::new(collection))
    }

    fn tag_conflict(&self, name: &str, existing_tag: &str) -> PotashError {
        log::error!("A {} with name {} already exists", existing_tag, name);
        PotashError::new(
            &format!("A {} with name {} already exists", existing_tag, name),
            ErrorKind::ValidationError,
        )
    }
}

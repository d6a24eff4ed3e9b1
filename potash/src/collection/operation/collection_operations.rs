use super::index_manager::IndexManager;
use super::index_operations::IndexOperations;
use super::index_writer::DocumentIndexWriter;
use super::read_operations::ReadOperations;
use super::write_operations::WriteOperations;
use crate::collection::{CollectionEventBus, CollectionEventListener, Document, EventDispatch};
use crate::common::{
    current_time_millis, LockHandle, SubscriberRef, Value, COLLECTION_CATALOG, CREATED_TIME, META_MAP_NAME,
};
use crate::errors::{ErrorKind, PotashError, PotashResult};
use crate::potash_config::PotashConfig;
use crate::store::{catalog_key, PotashStore, StagedWrite, StoreCatalog};

/// Everything a collection handle does to the store, split into reads,
/// writes and index management that share one lock and one store.
#[derive(Clone)]
pub(crate) struct CollectionOperations {
    collection_name: String,
    store: PotashStore,
    lock: LockHandle,
    read_operations: ReadOperations,
    write_operations: WriteOperations,
    index_operations: IndexOperations,
    event_bus: CollectionEventBus,
}

impl CollectionOperations {
    /// Opens the collection, registering it in the store catalog under
    /// `catalog_tag` and creating its map on first use.
    pub(crate) fn open(
        collection_name: &str,
        store: PotashStore,
        config: PotashConfig,
        lock: LockHandle,
        catalog_tag: &str,
        events: EventDispatch,
    ) -> PotashResult<Self> {
        {
            let _guard = lock.write();
            let snapshot = store.snapshot()?;
            let registered = snapshot
                .get(COLLECTION_CATALOG, &catalog_key(catalog_tag, collection_name))
                .is_some();

            if !registered || !snapshot.has_map(collection_name) {
                let mut staged = StagedWrite::new(snapshot);
                staged.create_map(collection_name);
                StoreCatalog::stage_entry(&mut staged, catalog_tag, collection_name)?;

                let name_key = Value::from(collection_name);
                if staged.get(META_MAP_NAME, &name_key).is_none() {
                    let mut attributes = Document::new();
                    attributes.put(CREATED_TIME, current_time_millis())?;
                    staged.put(META_MAP_NAME, name_key, Value::Document(attributes));
                }
                store.commit(staged.into_batch())?;
                log::debug!("Created {} {}", catalog_tag, collection_name);
            }
        }

        let index_manager = IndexManager::new(collection_name);
        let index_writer = DocumentIndexWriter::new(config.clone(), index_manager.clone());
        let read_operations = ReadOperations::new(
            collection_name,
            store.clone(),
            config.clone(),
            lock.clone(),
            index_manager.clone(),
        );
        let write_operations = WriteOperations::new(
            collection_name,
            store.clone(),
            lock.clone(),
            index_writer.clone(),
            read_operations.clone(),
            events,
        );
        let event_bus = config.event_registry().bus(collection_name);
        let index_operations = IndexOperations::new(
            collection_name,
            store.clone(),
            config,
            lock.clone(),
            index_manager,
            index_writer,
            read_operations.clone(),
        );

        Ok(CollectionOperations {
            collection_name: collection_name.to_string(),
            store,
            lock,
            read_operations,
            write_operations,
            index_operations,
            event_bus,
        })
    }

    pub(crate) fn subscribe(&self, listener: CollectionEventListener) -> PotashResult<SubscriberRef> {
        self.event_bus.register(listener)
    }

    pub(crate) fn unsubscribe(&self, subscriber: SubscriberRef) -> PotashResult<()> {
        self.event_bus.deregister(subscriber)
    }

    pub(crate) fn reads(&self) -> &ReadOperations {
        &self.read_operations
    }

    pub(crate) fn writes(&self) -> &WriteOperations {
        &self.write_operations
    }

    pub(crate) fn indexes(&self) -> &IndexOperations {
        &self.index_operations
    }

    pub(crate) fn attributes(&self) -> PotashResult<Document> {
        let snapshot = self.read_operations.snapshot()?;
        match snapshot.get(META_MAP_NAME, &Value::from(self.collection_name.as_str())) {
            None => Ok(Document::new()),
            Some(Value::Document(attributes)) => Ok(attributes.clone()),
            Some(other) => {
                log::error!(
                    "Attributes of {} are a {}, expected a document",
                    self.collection_name,
                    other.type_name()
                );
                Err(PotashError::new("Collection attributes are not a document", ErrorKind::Corruption))
            }
        }
    }

    pub(crate) fn set_attributes(&self, attributes: Document) -> PotashResult<()> {
        self.write(|staged| {
            staged.put(
                META_MAP_NAME,
                Value::from(self.collection_name.as_str()),
                Value::Document(attributes),
            );
            Ok(())
        })
    }

    /// Removes every document and index entry; index declarations stay.
    pub(crate) fn clear(&self) -> PotashResult<()> {
        self.write(|staged| {
            staged.drop_map(&self.collection_name);
            staged.create_map(&self.collection_name);
            self.index_operations.clear_staged(staged)
        })
    }

    /// Removes the collection, its indexes, attributes and catalog entry.
    pub(crate) fn drop_collection(&self) -> PotashResult<()> {
        self.write(|staged| {
            self.index_operations.dispose_staged(staged)?;
            staged.drop_map(&self.collection_name);
            staged.remove(META_MAP_NAME, Value::from(self.collection_name.as_str()));
            StoreCatalog::stage_removal(staged, &self.collection_name);
            Ok(())
        })?;
        log::debug!("Dropped collection {}", self.collection_name);
        Ok(())
    }

    pub(crate) fn is_live(&self) -> PotashResult<bool> {
        Ok(self.store.snapshot()?.has_map(&self.collection_name))
    }

    fn write<F>(&self, f: F) -> PotashResult<()>
    where
        F: FnOnce(&mut StagedWrite) -> PotashResult<()>,
    {
        let _guard = self.lock.write();
        let snapshot = self.store.snapshot()?;
        self.read_operations.check_live(&snapshot)?;

        let mut staged = StagedWrite::new(snapshot);
        f(&mut staged)?;
        self.store.commit(staged.into_batch())
    }
}

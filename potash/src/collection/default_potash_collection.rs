use super::operation::{CollectionOperations, WriteResult};
use super::{
    CollectionEventListener, Document, DocumentCursor, EventDispatch, FindOptions, PotashCollectionProvider, PotashId,
    UpdateOptions,
};
use crate::common::{EventAware, Fields, LockHandle, PersistentCollection, SubscriberRef};
use crate::errors::{ErrorKind, PotashError, PotashResult};
use crate::filter::{by_id, Filter};
use crate::index::{IndexDescriptor, IndexOptions};
use crate::potash_config::PotashConfig;
use crate::store::PotashStore;
use std::sync::atomic::{AtomicBool, Ordering};

pub(crate) struct DefaultPotashCollection {
    name: String,
    operations: CollectionOperations,
    dropped: AtomicBool,
}

impl DefaultPotashCollection {
    pub(crate) fn new(
        name: &str,
        store: PotashStore,
        config: PotashConfig,
        lock: LockHandle,
        catalog_tag: &str,
        events: EventDispatch,
    ) -> PotashResult<Self> {
        let operations = CollectionOperations::open(name, store, config, lock, catalog_tag, events)?;
        Ok(DefaultPotashCollection {
            name: name.to_string(),
            operations,
            dropped: AtomicBool::new(false),
        })
    }

    fn ensure_not_dropped(&self) -> PotashResult<()> {
        if self.dropped.load(Ordering::Acquire) {
            log::error!("Collection {} has been dropped", self.name);
            return Err(PotashError::new(
                &format!("Collection {} has been dropped", self.name),
                ErrorKind::InvalidOperation,
            ));
        }
        Ok(())
    }

    fn missing_id(&self, document: &Document) -> PotashError {
        log::error!("Document {} has no id", document);
        PotashError::new("Document has no id", ErrorKind::InvalidId)
    }
}

impl EventAware for DefaultPotashCollection {
    fn subscribe(&self, listener: CollectionEventListener) -> PotashResult<SubscriberRef> {
        self.ensure_not_dropped()?;
        self.operations.subscribe(listener)
    }

    fn unsubscribe(&self, subscriber: SubscriberRef) -> PotashResult<()> {
        self.operations.unsubscribe(subscriber)
    }
}

impl PersistentCollection for DefaultPotashCollection {
    fn create_index(&self, field_names: Vec<&str>, index_options: &IndexOptions) -> PotashResult<()> {
        self.ensure_not_dropped()?;
        let fields = Fields::with_names(field_names)?;
        self.operations.indexes().create_index(&fields, index_options)
    }

    fn rebuild_index(&self, field_names: Vec<&str>) -> PotashResult<()> {
        self.ensure_not_dropped()?;
        let fields = Fields::with_names(field_names)?;
        self.operations.indexes().rebuild_index(&fields)
    }

    fn list_indexes(&self) -> PotashResult<Vec<IndexDescriptor>> {
        self.ensure_not_dropped()?;
        self.operations.indexes().list_indexes()
    }

    fn has_index(&self, field_names: Vec<&str>) -> PotashResult<bool> {
        self.ensure_not_dropped()?;
        let fields = Fields::with_names(field_names)?;
        self.operations.indexes().has_index(&fields)
    }

    fn drop_index(&self, field_names: Vec<&str>) -> PotashResult<()> {
        self.ensure_not_dropped()?;
        let fields = Fields::with_names(field_names)?;
        self.operations.indexes().drop_index(&fields)
    }

    fn drop_all_indexes(&self) -> PotashResult<()> {
        self.ensure_not_dropped()?;
        self.operations.indexes().drop_all_indexes()
    }

    fn clear(&self) -> PotashResult<()> {
        self.ensure_not_dropped()?;
        self.operations.clear()
    }

    fn dispose(&self) -> PotashResult<()> {
        self.ensure_not_dropped()?;
        self.operations.drop_collection()?;
        self.dropped.store(true, Ordering::Release);
        Ok(())
    }

    fn is_dropped(&self) -> PotashResult<bool> {
        if self.dropped.load(Ordering::Acquire) {
            return Ok(true);
        }
        Ok(!self.operations.is_live()?)
    }

    fn size(&self) -> PotashResult<u64> {
        self.ensure_not_dropped()?;
        self.operations.reads().size()
    }

    fn attributes(&self) -> PotashResult<Document> {
        self.ensure_not_dropped()?;
        self.operations.attributes()
    }

    fn set_attributes(&self, attributes: Document) -> PotashResult<()> {
        self.ensure_not_dropped()?;
        self.operations.set_attributes(attributes)
    }
}

impl PotashCollectionProvider for DefaultPotashCollection {
    fn insert_many(&self, documents: Vec<Document>) -> PotashResult<WriteResult> {
        self.ensure_not_dropped()?;
        self.operations.writes().insert(documents)
    }

    fn update_with_options(
        &self,
        filter: Filter,
        update: &Document,
        update_options: &UpdateOptions,
    ) -> PotashResult<WriteResult> {
        self.ensure_not_dropped()?;
        self.operations.writes().update(&filter, update, *update_options)
    }

    fn update_one(&self, document: &Document, insert_if_absent: bool) -> PotashResult<WriteResult> {
        self.ensure_not_dropped()?;
        match document.id() {
            Some(id) => self.operations.writes().update(
                &by_id(id),
                document,
                UpdateOptions::new(insert_if_absent, true),
            ),
            None if insert_if_absent => self.operations.writes().insert(vec![document.clone()]),
            None => Err(self.missing_id(document)),
        }
    }

    fn remove_with_options(&self, filter: Filter, just_once: bool) -> PotashResult<WriteResult> {
        self.ensure_not_dropped()?;
        self.operations.writes().remove(&filter, just_once)
    }

    fn remove_one(&self, document: &Document) -> PotashResult<WriteResult> {
        self.ensure_not_dropped()?;
        let id = document.id().ok_or_else(|| self.missing_id(document))?;
        self.operations.writes().remove(&by_id(id), true)
    }

    fn find(&self, filter: Filter) -> PotashResult<DocumentCursor> {
        self.ensure_not_dropped()?;
        self.operations.reads().find(filter, None)
    }

    fn find_with_options(&self, filter: Filter, find_options: &FindOptions) -> PotashResult<DocumentCursor> {
        self.ensure_not_dropped()?;
        self.operations.reads().find(filter, Some(find_options))
    }

    fn get_by_id(&self, id: &PotashId) -> PotashResult<Option<Document>> {
        self.ensure_not_dropped()?;
        self.operations.reads().get_by_id(id)
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

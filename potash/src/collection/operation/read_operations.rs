use super::find_optimizer::FindOptimizer;
use super::index_manager::IndexManager;
use crate::collection::{Document, DocumentCursor, FindOptions, PotashId};
use crate::common::{LockHandle, Value};
use crate::errors::{ErrorKind, PotashError, PotashResult};
use crate::filter::{Filter, FilterContext};
use crate::potash_config::PotashConfig;
use crate::store::{PotashStore, StoreSnapshot};

/// Queries against one collection. Every read works on a snapshot taken
/// under the collection's read lock, so it never observes half a write.
#[derive(Clone)]
pub(crate) struct ReadOperations {
    collection_name: String,
    store: PotashStore,
    config: PotashConfig,
    lock: LockHandle,
    index_manager: IndexManager,
}

impl ReadOperations {
    pub(crate) fn new(
        collection_name: &str,
        store: PotashStore,
        config: PotashConfig,
        lock: LockHandle,
        index_manager: IndexManager,
    ) -> Self {
        ReadOperations {
            collection_name: collection_name.to_string(),
            store,
            config,
            lock,
            index_manager,
        }
    }

    pub(crate) fn snapshot(&self) -> PotashResult<StoreSnapshot> {
        let snapshot = {
            let _guard = self.lock.read();
            self.store.snapshot()?
        };
        self.check_live(&snapshot)?;
        Ok(snapshot)
    }

    /// Fails when the collection no longer exists in `snapshot`.
    pub(crate) fn check_live(&self, snapshot: &StoreSnapshot) -> PotashResult<()> {
        if snapshot.has_map(&self.collection_name) {
            Ok(())
        } else {
            log::error!("Collection {} has been dropped", self.collection_name);
            Err(PotashError::new(
                &format!("Collection {} has been dropped", self.collection_name),
                ErrorKind::InvalidOperation,
            ))
        }
    }

    pub(crate) fn find(&self, filter: Filter, find_options: Option<&FindOptions>) -> PotashResult<DocumentCursor> {
        let snapshot = self.snapshot()?;
        self.cursor(&snapshot, &filter, find_options)
    }

    pub(crate) fn get_by_id(&self, id: &PotashId) -> PotashResult<Option<Document>> {
        let snapshot = self.snapshot()?;
        self.document_in(&snapshot, id)
    }

    pub(crate) fn size(&self) -> PotashResult<u64> {
        let snapshot = self.snapshot()?;
        Ok(snapshot.table(&self.collection_name).map_or(0, |t| t.len() as u64))
    }

    /// All documents of `snapshot` matching `filter`, in plan order.
    pub(crate) fn find_documents(&self, snapshot: &StoreSnapshot, filter: &Filter) -> PotashResult<Vec<Document>> {
        self.cursor(snapshot, filter, None)?.collect()
    }

    pub(crate) fn document_in(&self, snapshot: &StoreSnapshot, id: &PotashId) -> PotashResult<Option<Document>> {
        match snapshot.get(&self.collection_name, &Value::PotashId(*id)) {
            None => Ok(None),
            Some(Value::Document(document)) => Ok(Some(document.clone())),
            Some(other) => {
                log::error!(
                    "Record {} of {} is a {}, expected a document",
                    id,
                    self.collection_name,
                    other.type_name()
                );
                Err(PotashError::new(
                    "Collection record is not a document",
                    ErrorKind::Corruption,
                ))
            }
        }
    }

    fn cursor(
        &self,
        snapshot: &StoreSnapshot,
        filter: &Filter,
        find_options: Option<&FindOptions>,
    ) -> PotashResult<DocumentCursor> {
        let descriptors = self.index_manager.index_descriptors(snapshot)?;
        let plan = FindOptimizer::create_find_plan(snapshot, filter, find_options, &descriptors, &self.config)?;
        Ok(DocumentCursor::new(
            snapshot.table_or_empty(&self.collection_name),
            plan,
            FilterContext::new(&self.config.field_separator()),
        ))
    }
}

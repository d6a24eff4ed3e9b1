use super::index_writer::DocumentIndexWriter;
use super::read_operations::ReadOperations;
use super::write_result::WriteResult;
use crate::collection::{CollectionEventInfo, CollectionEvents, Document, EventDispatch, PotashId, UpdateOptions};
use crate::common::{current_time_millis, LockHandle, Value, DOC_ID, DOC_MODIFIED, DOC_REVISION};
use crate::errors::{ErrorKind, PotashError, PotashResult};
use crate::filter::Filter;
use crate::store::{PotashStore, StagedWrite};

/// Document writes of one collection.
///
/// Each call holds the collection write lock, stages the document changes
/// and all index changes on top of a fresh snapshot and commits them as a
/// single batch. Any failure before the commit leaves the store untouched.
/// Change events are dispatched only after the commit succeeds.
#[derive(Clone)]
pub(crate) struct WriteOperations {
    collection_name: String,
    store: PotashStore,
    lock: LockHandle,
    index_writer: DocumentIndexWriter,
    read_operations: ReadOperations,
    events: EventDispatch,
}

impl WriteOperations {
    pub(crate) fn new(
        collection_name: &str,
        store: PotashStore,
        lock: LockHandle,
        index_writer: DocumentIndexWriter,
        read_operations: ReadOperations,
        events: EventDispatch,
    ) -> Self {
        WriteOperations {
            collection_name: collection_name.to_string(),
            store,
            lock,
            index_writer,
            read_operations,
            events,
        }
    }

    pub(crate) fn insert(&self, documents: Vec<Document>) -> PotashResult<WriteResult> {
        self.write(|staged, events| self.insert_staged(staged, events, documents))
    }

    pub(crate) fn update(
        &self,
        filter: &Filter,
        update: &Document,
        update_options: UpdateOptions,
    ) -> PotashResult<WriteResult> {
        self.write(|staged, events| {
            let matches = self.read_operations.find_documents(staged.view(), filter)?;
            if matches.is_empty() {
                if update_options.is_insert_if_absent() {
                    let mut document = update.clone();
                    document.remove(DOC_REVISION);
                    document.remove(DOC_MODIFIED);
                    return self.insert_staged(staged, events, vec![document]);
                }
                log::debug!("No document of {} matches {}", self.collection_name, filter);
                return Ok(Vec::new());
            }

            let changes = update.without_metadata();
            let limit = if update_options.is_just_once() { 1 } else { matches.len() };
            let now = current_time_millis();
            let mut ids = Vec::new();

            for old in matches.into_iter().take(limit) {
                let mut new = old.clone();
                new.merge(&changes);
                if new == old {
                    continue;
                }

                let id = Self::id_of(&old)?;
                new.put(DOC_REVISION, old.revision() + 1)?;
                new.put(DOC_MODIFIED, now)?;
                staged.put(&self.collection_name, Value::PotashId(id), Value::Document(new.clone()));
                self.index_writer.update_index_entries(staged, &old, &new)?;
                events.record(CollectionEvents::Update, &new);
                ids.push(id);
            }
            Ok(ids)
        })
    }

    pub(crate) fn remove(&self, filter: &Filter, just_once: bool) -> PotashResult<WriteResult> {
        self.write(|staged, events| {
            let matches = self.read_operations.find_documents(staged.view(), filter)?;
            let limit = if just_once { 1 } else { matches.len() };
            let mut ids = Vec::new();

            for document in matches.into_iter().take(limit) {
                let id = Self::id_of(&document)?;
                staged.remove(&self.collection_name, Value::PotashId(id));
                self.index_writer.remove_index_entries(staged, &document)?;
                events.record(CollectionEvents::Remove, &document);
                ids.push(id);
            }
            Ok(ids)
        })
    }

    fn write<F>(&self, f: F) -> PotashResult<WriteResult>
    where
        F: FnOnce(&mut StagedWrite, &mut ChangeEvents) -> PotashResult<Vec<PotashId>>,
    {
        let _guard = self.lock.write();
        let snapshot = self.store.snapshot()?;
        self.read_operations.check_live(&snapshot)?;

        let mut staged = StagedWrite::new(snapshot);
        let mut events = ChangeEvents::new(&self.collection_name, self.events.is_wanted(&self.collection_name));
        let ids = f(&mut staged, &mut events)?;
        if !staged.is_empty() {
            self.store.commit(staged.into_batch())?;
            self.events.dispatch(events.events);
        }
        Ok(WriteResult::new(ids))
    }

    fn insert_staged(
        &self,
        staged: &mut StagedWrite,
        events: &mut ChangeEvents,
        documents: Vec<Document>,
    ) -> PotashResult<Vec<PotashId>> {
        let now = current_time_millis();
        let mut ids = Vec::with_capacity(documents.len());

        for mut document in documents {
            let id = match document.id() {
                Some(id) => id,
                None if document.contains_key(DOC_ID) => {
                    log::error!("Document {} has an invalid {}", document, DOC_ID);
                    return Err(PotashError::new(
                        &format!("Document has an invalid {}", DOC_ID),
                        ErrorKind::InvalidId,
                    ));
                }
                None => {
                    let id = PotashId::new();
                    document.put(DOC_ID, id)?;
                    id
                }
            };

            let key = Value::PotashId(id);
            if staged.get(&self.collection_name, &key).is_some() {
                log::error!("A document with id {} already exists in {}", id, self.collection_name);
                return Err(PotashError::new(
                    &format!("A document with id {} already exists", id),
                    ErrorKind::UniqueConstraintViolation,
                ));
            }

            document.put(DOC_REVISION, 1u64)?;
            document.put(DOC_MODIFIED, now)?;
            staged.put(&self.collection_name, key, Value::Document(document.clone()));
            self.index_writer.write_index_entries(staged, &document)?;
            events.record(CollectionEvents::Insert, &document);
            ids.push(id);
        }
        Ok(ids)
    }

    fn id_of(document: &Document) -> PotashResult<PotashId> {
        document.id().ok_or_else(|| {
            log::error!("Stored document {} has no id", document);
            PotashError::new("Stored document has no id", ErrorKind::Corruption)
        })
    }
}

/// Events of one write, collected while staging. Nothing is recorded when
/// nobody would receive them.
struct ChangeEvents {
    collection_name: String,
    enabled: bool,
    events: Vec<CollectionEventInfo>,
}

impl ChangeEvents {
    fn new(collection_name: &str, enabled: bool) -> Self {
        ChangeEvents {
            collection_name: collection_name.to_string(),
            enabled,
            events: Vec::new(),
        }
    }

    fn record(&mut self, event_type: CollectionEvents, document: &Document) {
        if self.enabled {
            self.events.push(CollectionEventInfo::new(
                Some(Value::Document(document.clone())),
                event_type,
                &self.collection_name,
            ));
        }
    }
}

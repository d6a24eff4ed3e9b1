use super::index_manager::IndexManager;
use super::index_writer::DocumentIndexWriter;
use super::read_operations::ReadOperations;
use crate::collection::Document;
use crate::common::{Fields, LockHandle, Value};
use crate::errors::{ErrorKind, PotashError, PotashResult};
use crate::index::{IndexDescriptor, IndexOptions};
use crate::potash_config::PotashConfig;
use crate::store::{PotashStore, StagedWrite};

/// Index management of one collection.
#[derive(Clone)]
pub(crate) struct IndexOperations {
    collection_name: String,
    store: PotashStore,
    config: PotashConfig,
    lock: LockHandle,
    index_manager: IndexManager,
    index_writer: DocumentIndexWriter,
    read_operations: ReadOperations,
}

impl IndexOperations {
    pub(crate) fn new(
        collection_name: &str,
        store: PotashStore,
        config: PotashConfig,
        lock: LockHandle,
        index_manager: IndexManager,
        index_writer: DocumentIndexWriter,
        read_operations: ReadOperations,
    ) -> Self {
        IndexOperations {
            collection_name: collection_name.to_string(),
            store,
            config,
            lock,
            index_manager,
            index_writer,
            read_operations,
        }
    }

    /// Declares an index and fills it from the existing documents in the
    /// same commit. If an existing document cannot be indexed nothing is
    /// written.
    pub(crate) fn create_index(&self, fields: &Fields, index_options: &IndexOptions) -> PotashResult<()> {
        let indexer = self.config.find_indexer(index_options.index_type())?;
        indexer.validate_index(fields)?;

        self.write(|staged| {
            if let Some(existing) = self.index_manager.find_exact_index(staged.view(), fields)? {
                log::error!("{} already exists", existing);
                return Err(PotashError::new(
                    &format!("An index on {} already exists", fields),
                    ErrorKind::IndexAlreadyExists,
                ));
            }

            let descriptor =
                IndexDescriptor::new(index_options.index_type(), fields.clone(), &self.collection_name);
            self.index_manager.stage_descriptor(staged, &descriptor)?;
            self.build_entries(staged, &descriptor)
        })
    }

    /// Drops and refills the entries of an existing index.
    pub(crate) fn rebuild_index(&self, fields: &Fields) -> PotashResult<()> {
        self.write(|staged| {
            let descriptor = self.existing_index(staged, fields)?;
            let indexer = self.config.find_indexer(descriptor.index_type())?;
            indexer.drop_index(staged, &descriptor, &self.config)?;
            self.build_entries(staged, &descriptor)
        })
    }

    pub(crate) fn drop_index(&self, fields: &Fields) -> PotashResult<()> {
        self.write(|staged| {
            let descriptor = self.existing_index(staged, fields)?;
            self.drop_staged(staged, &descriptor)
        })
    }

    pub(crate) fn drop_all_indexes(&self) -> PotashResult<()> {
        self.write(|staged| {
            for descriptor in self.index_manager.index_descriptors(staged.view())? {
                self.drop_staged(staged, &descriptor)?;
            }
            Ok(())
        })
    }

    pub(crate) fn has_index(&self, fields: &Fields) -> PotashResult<bool> {
        let snapshot = self.read_operations.snapshot()?;
        Ok(self.index_manager.find_exact_index(&snapshot, fields)?.is_some())
    }

    pub(crate) fn list_indexes(&self) -> PotashResult<Vec<IndexDescriptor>> {
        let snapshot = self.read_operations.snapshot()?;
        self.index_manager.index_descriptors(&snapshot)
    }

    /// Stages the removal of every index entry while keeping the
    /// declarations, as needed when a collection is cleared.
    pub(crate) fn clear_staged(&self, staged: &mut StagedWrite) -> PotashResult<()> {
        for descriptor in self.index_manager.index_descriptors(staged.view())? {
            let indexer = self.config.find_indexer(descriptor.index_type())?;
            indexer.drop_index(staged, &descriptor, &self.config)?;
        }
        Ok(())
    }

    /// Stages the removal of every index and of the index catalog.
    pub(crate) fn dispose_staged(&self, staged: &mut StagedWrite) -> PotashResult<()> {
        self.clear_staged(staged)?;
        self.index_manager.stage_dispose(staged);
        Ok(())
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

    fn existing_index(&self, staged: &StagedWrite, fields: &Fields) -> PotashResult<IndexDescriptor> {
        self.index_manager
            .find_exact_index(staged.view(), fields)?
            .ok_or_else(|| {
                log::error!("No index on {} in {}", fields, self.collection_name);
                PotashError::new(
                    &format!("No index on {} in {}", fields, self.collection_name),
                    ErrorKind::IndexNotFound,
                )
            })
    }

    fn drop_staged(&self, staged: &mut StagedWrite, descriptor: &IndexDescriptor) -> PotashResult<()> {
        let indexer = self.config.find_indexer(descriptor.index_type())?;
        indexer.drop_index(staged, descriptor, &self.config)?;
        self.index_manager
            .stage_descriptor_removal(staged, descriptor.index_fields());
        Ok(())
    }

    fn build_entries(&self, staged: &mut StagedWrite, descriptor: &IndexDescriptor) -> PotashResult<()> {
        let documents = staged.table(&self.collection_name);
        for (_, value) in documents.iter() {
            let document = match value {
                Value::Document(document) => document,
                other => {
                    log::error!("Collection record is a {}, expected a document", other.type_name());
                    return Err(PotashError::new(
                        "Collection record is not a document",
                        ErrorKind::Corruption,
                    ));
                }
            };
            self.build_entry(staged, descriptor, document)?;
        }
        log::debug!("Built {} over {} documents", descriptor, documents.len());
        Ok(())
    }

    fn build_entry(
        &self,
        staged: &mut StagedWrite,
        descriptor: &IndexDescriptor,
        document: &Document,
    ) -> PotashResult<()> {
        self.index_writer
            .write_entry(staged, descriptor, document)
            .map_err(|e| {
                log::error!("Failed to build {}: {}", descriptor, e);
                PotashError::new_with_cause(
                    &format!("Failed to build {}", descriptor),
                    ErrorKind::IndexValidationError,
                    e,
                )
            })
    }
}

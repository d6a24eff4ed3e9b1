use super::index_manager::IndexManager;
use crate::collection::{Document, PotashId};
use crate::common::FieldValues;
use crate::errors::{ErrorKind, PotashError, PotashResult};
use crate::index::IndexDescriptor;
use crate::potash_config::PotashConfig;
use crate::store::StagedWrite;

/// Keeps every declared index of a collection in step with its documents.
///
/// Entries are staged next to the document write, so a failing index
/// (typically a unique violation) discards the whole write.
#[derive(Clone)]
pub(crate) struct DocumentIndexWriter {
    config: PotashConfig,
    index_manager: IndexManager,
}

impl DocumentIndexWriter {
    pub(crate) fn new(config: PotashConfig, index_manager: IndexManager) -> Self {
        DocumentIndexWriter { config, index_manager }
    }

    pub(crate) fn write_index_entries(&self, staged: &mut StagedWrite, document: &Document) -> PotashResult<()> {
        for descriptor in self.index_manager.index_descriptors(staged.view())? {
            self.write_entry(staged, &descriptor, document)?;
        }
        Ok(())
    }

    pub(crate) fn remove_index_entries(&self, staged: &mut StagedWrite, document: &Document) -> PotashResult<()> {
        for descriptor in self.index_manager.index_descriptors(staged.view())? {
            self.remove_entry(staged, &descriptor, document)?;
        }
        Ok(())
    }

    /// Moves the entries of `old` to `new` for every index whose values
    /// changed.
    pub(crate) fn update_index_entries(
        &self,
        staged: &mut StagedWrite,
        old: &Document,
        new: &Document,
    ) -> PotashResult<()> {
        let separator = self.config.field_separator();
        for descriptor in self.index_manager.index_descriptors(staged.view())? {
            let id = Self::document_id(new)?;
            let before = FieldValues::from_document(id, descriptor.index_fields(), old, &separator);
            let after = FieldValues::from_document(id, descriptor.index_fields(), new, &separator);
            if before.values() == after.values() {
                continue;
            }

            let indexer = self.config.find_indexer(descriptor.index_type())?;
            indexer.remove_index_entry(staged, &before, &descriptor, &self.config)?;
            indexer.write_index_entry(staged, &after, &descriptor, &self.config)?;
        }
        Ok(())
    }

    pub(crate) fn write_entry(
        &self,
        staged: &mut StagedWrite,
        descriptor: &IndexDescriptor,
        document: &Document,
    ) -> PotashResult<()> {
        let field_values = self.field_values(descriptor, document)?;
        let indexer = self.config.find_indexer(descriptor.index_type())?;
        indexer.write_index_entry(staged, &field_values, descriptor, &self.config)
    }

    fn remove_entry(
        &self,
        staged: &mut StagedWrite,
        descriptor: &IndexDescriptor,
        document: &Document,
    ) -> PotashResult<()> {
        let field_values = self.field_values(descriptor, document)?;
        let indexer = self.config.find_indexer(descriptor.index_type())?;
        indexer.remove_index_entry(staged, &field_values, descriptor, &self.config)
    }

    fn field_values(&self, descriptor: &IndexDescriptor, document: &Document) -> PotashResult<FieldValues> {
        let id = Self::document_id(document)?;
        Ok(FieldValues::from_document(
            id,
            descriptor.index_fields(),
            document,
            &self.config.field_separator(),
        ))
    }

    fn document_id(document: &Document) -> PotashResult<PotashId> {
        document.id().ok_or_else(|| {
            log::error!("Cannot index a document without an id");
            PotashError::new("Cannot index a document without an id", ErrorKind::InvalidId)
        })
    }
}

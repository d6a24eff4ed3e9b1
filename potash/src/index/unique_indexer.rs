use super::simple_index::SimpleIndex;
use super::{IndexDescriptor, PotashIndexerProvider};
use crate::collection::PotashId;
use crate::common::{FieldValues, Fields, PotashPlugin, PotashPluginProvider, UNIQUE_INDEX};
use crate::errors::PotashResult;
use crate::filter::Filter;
use crate::potash_config::PotashConfig;
use crate::store::{StagedWrite, StoreSnapshot};

/// Indexer for `unique` indexes: at most one document per non-null value.
#[derive(Clone, Default)]
pub(crate) struct UniqueIndexer;

impl UniqueIndexer {
    pub fn new() -> Self {
        UniqueIndexer
    }
}

impl PotashPluginProvider for UniqueIndexer {
    fn initialize(&self, _config: PotashConfig) -> PotashResult<()> {
        Ok(())
    }

    fn close(&self) -> PotashResult<()> {
        Ok(())
    }

    fn as_plugin(&self) -> PotashPlugin {
        PotashPlugin::new(self.clone())
    }
}

impl PotashIndexerProvider for UniqueIndexer {
    fn index_type(&self) -> String {
        UNIQUE_INDEX.to_string()
    }

    fn is_unique(&self) -> bool {
        true
    }

    fn validate_index(&self, _fields: &Fields) -> PotashResult<()> {
        Ok(())
    }

    fn drop_index(
        &self,
        staged: &mut StagedWrite,
        index_descriptor: &IndexDescriptor,
        _config: &PotashConfig,
    ) -> PotashResult<()> {
        SimpleIndex::new(index_descriptor, true).drop_index(staged);
        Ok(())
    }

    fn write_index_entry(
        &self,
        staged: &mut StagedWrite,
        field_values: &FieldValues,
        index_descriptor: &IndexDescriptor,
        _config: &PotashConfig,
    ) -> PotashResult<()> {
        SimpleIndex::new(index_descriptor, true).write(staged, field_values)
    }

    fn remove_index_entry(
        &self,
        staged: &mut StagedWrite,
        field_values: &FieldValues,
        index_descriptor: &IndexDescriptor,
        _config: &PotashConfig,
    ) -> PotashResult<()> {
        SimpleIndex::new(index_descriptor, true).remove(staged, field_values)
    }

    fn find_by_filter(
        &self,
        snapshot: &StoreSnapshot,
        index_descriptor: &IndexDescriptor,
        filter: &Filter,
        _config: &PotashConfig,
    ) -> PotashResult<Option<Vec<PotashId>>> {
        SimpleIndex::new(index_descriptor, true).find(snapshot, filter)
    }
}

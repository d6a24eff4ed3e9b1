use super::simple_index::SimpleIndex;
use super::{IndexDescriptor, PotashIndexerProvider};
use crate::collection::PotashId;
use crate::common::{FieldValues, Fields, PotashPlugin, PotashPluginProvider, NON_UNIQUE_INDEX};
use crate::errors::PotashResult;
use crate::filter::Filter;
use crate::potash_config::PotashConfig;
use crate::store::{StagedWrite, StoreSnapshot};

#[derive(Clone, Default)]
pub(crate) struct NonUniqueIndexer;

impl NonUniqueIndexer {
    pub fn new() -> Self {
        NonUniqueIndexer
    }
}

impl PotashPluginProvider for NonUniqueIndexer {
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

impl PotashIndexerProvider for NonUniqueIndexer {
    fn index_type(&self) -> String {
        NON_UNIQUE_INDEX.to_string()
    }

    fn is_unique(&self) -> bool {
        false
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
        SimpleIndex::new(index_descriptor, false).drop_index(staged);
        Ok(())
    }

    fn write_index_entry(
        &self,
        staged: &mut StagedWrite,
        field_values: &FieldValues,
        index_descriptor: &IndexDescriptor,
        _config: &PotashConfig,
    ) -> PotashResult<()> {
        SimpleIndex::new(index_descriptor, false).write(staged, field_values)
    }

    fn remove_index_entry(
        &self,
        staged: &mut StagedWrite,
        field_values: &FieldValues,
        index_descriptor: &IndexDescriptor,
        _config: &PotashConfig,
    ) -> PotashResult<()> {
        SimpleIndex::new(index_descriptor, false).remove(staged, field_values)
    }

    fn find_by_filter(
        &self,
        snapshot: &StoreSnapshot,
        index_descriptor: &IndexDescriptor,
        filter: &Filter,
        _config: &PotashConfig,
    ) -> PotashResult<Option<Vec<PotashId>>> {
        SimpleIndex::new(index_descriptor, false).find(snapshot, filter)
    }
}

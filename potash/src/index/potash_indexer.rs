use crate::collection::PotashId;
use crate::common::{FieldValues, Fields, PotashPluginProvider};
use crate::errors::PotashResult;
use crate::filter::Filter;
use crate::index::IndexDescriptor;
use crate::potash_config::PotashConfig;
use crate::store::{StagedWrite, StoreSnapshot};
use std::ops::Deref;
use std::sync::Arc;

/// Shared handle to an index implementation.
///
/// Indexers are looked up from the [PotashConfig] by index type and are
/// stateless: all index contents live in store maps, so index maintenance is
/// staged in the same [StagedWrite] as the document write it belongs to and
/// lands in the same atomic commit.
#[derive(Clone)]
pub struct PotashIndexer {
    inner: Arc<dyn PotashIndexerProvider>,
}

/// The contract every index type implements.
pub trait PotashIndexerProvider: PotashPluginProvider {
    /// The type name indexes of this kind are created with.
    fn index_type(&self) -> String;

    fn is_unique(&self) -> bool;

    /// Checks that `fields` can be indexed by this indexer.
    ///
    /// # Errors
    /// Returns `IndexValidationError` when the field combination is not
    /// supported.
    fn validate_index(&self, fields: &Fields) -> PotashResult<()>;

    /// Stages the removal of every entry of the index.
    fn drop_index(
        &self,
        staged: &mut StagedWrite,
        index_descriptor: &IndexDescriptor,
        config: &PotashConfig,
    ) -> PotashResult<()>;

    /// Stages the entry mapping `field_values` to its document id.
    ///
    /// Writing an entry that already exists is a no-op.
    ///
    /// # Errors
    /// A unique indexer fails with `UniqueConstraintViolation` when another
    /// document already holds the same value.
    fn write_index_entry(
        &self,
        staged: &mut StagedWrite,
        field_values: &FieldValues,
        index_descriptor: &IndexDescriptor,
        config: &PotashConfig,
    ) -> PotashResult<()>;

    /// Stages the removal of the entry for `field_values`. Missing entries
    /// are ignored.
    fn remove_index_entry(
        &self,
        staged: &mut StagedWrite,
        field_values: &FieldValues,
        index_descriptor: &IndexDescriptor,
        config: &PotashConfig,
    ) -> PotashResult<()>;

    /// Answers `filter` from the index contents in `snapshot`.
    ///
    /// Returns `None` when this index cannot answer the filter. The returned
    /// ids are candidates in index order; callers re-apply the filter to the
    /// documents they load.
    fn find_by_filter(
        &self,
        snapshot: &StoreSnapshot,
        index_descriptor: &IndexDescriptor,
        filter: &Filter,
        config: &PotashConfig,
    ) -> PotashResult<Option<Vec<PotashId>>>;
}

impl PotashIndexer {
    pub fn new<T: PotashIndexerProvider + 'static>(inner: T) -> Self {
        PotashIndexer { inner: Arc::new(inner) }
    }
}

impl Deref for PotashIndexer {
    type Target = Arc<dyn PotashIndexerProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

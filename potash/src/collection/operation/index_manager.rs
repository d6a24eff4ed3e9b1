use crate::common::{Convertible, Fields, Value};
use crate::errors::PotashResult;
use crate::index::IndexDescriptor;
use crate::store::{StagedWrite, StoreSnapshot};

/// Reads and stages changes to the index catalog of one collection.
///
/// The catalog is the store map `$indexes|<collection>`, keyed by the
/// encoded field names of each index.
#[derive(Clone)]
pub(crate) struct IndexManager {
    catalog_map: String,
}

impl IndexManager {
    pub(crate) fn new(collection_name: &str) -> Self {
        IndexManager {
            catalog_map: IndexDescriptor::catalog_map_name(collection_name),
        }
    }

    pub(crate) fn catalog_map(&self) -> &str {
        &self.catalog_map
    }

    pub(crate) fn index_descriptors(&self, snapshot: &StoreSnapshot) -> PotashResult<Vec<IndexDescriptor>> {
        match snapshot.table(&self.catalog_map) {
            Some(table) => table
                .values()
                .map(IndexDescriptor::from_value)
                .collect(),
            None => Ok(Vec::new()),
        }
    }

    pub(crate) fn find_exact_index(
        &self,
        snapshot: &StoreSnapshot,
        fields: &Fields,
    ) -> PotashResult<Option<IndexDescriptor>> {
        match snapshot.get(&self.catalog_map, &Self::catalog_key(fields)) {
            Some(value) => Ok(Some(IndexDescriptor::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub(crate) fn stage_descriptor(
        &self,
        staged: &mut StagedWrite,
        descriptor: &IndexDescriptor,
    ) -> PotashResult<()> {
        staged.put(
            &self.catalog_map,
            Self::catalog_key(descriptor.index_fields()),
            descriptor.to_value()?,
        );
        Ok(())
    }

    pub(crate) fn stage_descriptor_removal(&self, staged: &mut StagedWrite, fields: &Fields) {
        staged.remove(&self.catalog_map, Self::catalog_key(fields));
    }

    /// Stages the removal of the catalog itself.
    pub(crate) fn stage_dispose(&self, staged: &mut StagedWrite) {
        staged.drop_map(&self.catalog_map);
    }

    fn catalog_key(fields: &Fields) -> Value {
        Value::from(fields.encoded_name())
    }
}

use crate::collection::Document;
use crate::common::EventAware;
use crate::errors::PotashResult;
use crate::index::{IndexDescriptor, IndexOptions};

/// Operations shared by document collections and object repositories.
pub trait PersistentCollection: EventAware + Send + Sync {
    /// Creates an index over `field_names` and fills it from the existing
    /// documents.
    ///
    /// # Errors
    /// `IndexAlreadyExists` when the fields are already indexed,
    /// `IndexValidationError` when an existing document violates the index.
    fn create_index(&self, field_names: Vec<&str>, index_options: &IndexOptions) -> PotashResult<()>;

    fn rebuild_index(&self, field_names: Vec<&str>) -> PotashResult<()>;

    fn list_indexes(&self) -> PotashResult<Vec<IndexDescriptor>>;

    fn has_index(&self, field_names: Vec<&str>) -> PotashResult<bool>;

    fn drop_index(&self, field_names: Vec<&str>) -> PotashResult<()>;

    fn drop_all_indexes(&self) -> PotashResult<()>;

    /// Removes all documents. Declared indexes are kept, empty.
    fn clear(&self) -> PotashResult<()>;

    /// Destroys the collection with its indexes. The handle is unusable
    /// afterwards.
    fn dispose(&self) -> PotashResult<()>;

    fn is_dropped(&self) -> PotashResult<bool>;

    fn size(&self) -> PotashResult<u64>;

    fn attributes(&self) -> PotashResult<Document>;

    fn set_attributes(&self, attributes: Document) -> PotashResult<()>;
}

use super::{ObjectCursor, PotashEntity};
use crate::collection::{Document, FindOptions, PotashCollection, WriteResult};
use crate::common::{Convertible, PersistentCollection};
use crate::errors::PotashResult;
use crate::filter::Filter;
use std::ops::Deref;
use std::sync::Arc;

/// Typed operations of a repository. Objects are mapped to documents
/// through the configured mapper and stored in the repository collection.
pub trait ObjectRepositoryProvider<T>: PersistentCollection
where
    T: PotashEntity + Convertible<Output = T>,
{
    fn insert(&self, object: &T) -> PotashResult<WriteResult> {
        self.insert_many(std::slice::from_ref(object))
    }

    fn insert_many(&self, objects: &[T]) -> PotashResult<WriteResult>;

    /// Merges `object` into every stored object matching `filter`, or
    /// inserts it when nothing matches and `insert_if_absent` is set.
    fn update(&self, filter: Filter, object: &T, insert_if_absent: bool) -> PotashResult<WriteResult>;

    /// Updates the stored object with the same id as `object`.
    ///
    /// # Errors
    /// `InvalidOperation` when the entity has no id field.
    fn update_one(&self, object: &T, insert_if_absent: bool) -> PotashResult<WriteResult>;

    /// Merges a partial document into the matching objects.
    fn update_document(&self, filter: Filter, update: &Document, just_once: bool) -> PotashResult<WriteResult>;

    fn remove(&self, filter: Filter) -> PotashResult<WriteResult>;

    fn remove_one(&self, object: &T) -> PotashResult<WriteResult>;

    fn find(&self, filter: Filter) -> PotashResult<ObjectCursor<T>>;

    fn find_with_options(&self, filter: Filter, find_options: &FindOptions) -> PotashResult<ObjectCursor<T>>;

    fn get_by_id(&self, id: &T::Id) -> PotashResult<Option<T>>;

    /// The untyped collection backing this repository.
    fn document_collection(&self) -> PotashCollection;
}

pub struct ObjectRepository<T> {
    inner: Arc<dyn ObjectRepositoryProvider<T>>,
}

impl<T> ObjectRepository<T>
where
    T: PotashEntity + Convertible<Output = T>,
{
    pub fn new<I: ObjectRepositoryProvider<T> + 'static>(inner: I) -> Self {
        ObjectRepository { inner: Arc::new(inner) }
    }
}

impl<T> Clone for ObjectRepository<T> {
    fn clone(&self) -> Self {
        ObjectRepository {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Deref for ObjectRepository<T> {
    type Target = Arc<dyn ObjectRepositoryProvider<T>>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

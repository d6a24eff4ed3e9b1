use super::repository_operations::RepositoryOperations;
use super::{ObjectCursor, ObjectRepositoryProvider, PotashEntity};
use crate::collection::{CollectionEventListener, Document, FindOptions, PotashCollection, UpdateOptions, WriteResult};
use crate::common::{Convertible, EventAware, PersistentCollection, SubscriberRef};
use crate::errors::PotashResult;
use crate::filter::Filter;
use crate::index::{IndexDescriptor, IndexOptions};

pub(crate) struct DefaultObjectRepository<T> {
    collection: PotashCollection,
    operations: RepositoryOperations<T>,
}

impl<T> DefaultObjectRepository<T>
where
    T: PotashEntity + Convertible<Output = T>,
{
    /// Wraps `collection` and creates the entity's indexes.
    pub(crate) fn new(collection: PotashCollection, operations: RepositoryOperations<T>) -> PotashResult<Self> {
        operations.create_indexes(&collection)?;
        Ok(DefaultObjectRepository { collection, operations })
    }
}

impl<T> EventAware for DefaultObjectRepository<T>
where
    T: PotashEntity + Convertible<Output = T>,
{
    fn subscribe(&self, listener: CollectionEventListener) -> PotashResult<SubscriberRef> {
        self.collection.subscribe(listener)
    }

    fn unsubscribe(&self, subscriber: SubscriberRef) -> PotashResult<()> {
        self.collection.unsubscribe(subscriber)
    }
}

impl<T> PersistentCollection for DefaultObjectRepository<T>
where
    T: PotashEntity + Convertible<Output = T>,
{
    fn create_index(&self, field_names: Vec<&str>, index_options: &IndexOptions) -> PotashResult<()> {
        self.collection.create_index(field_names, index_options)
    }

    fn rebuild_index(&self, field_names: Vec<&str>) -> PotashResult<()> {
        self.collection.rebuild_index(field_names)
    }

    fn list_indexes(&self) -> PotashResult<Vec<IndexDescriptor>> {
        self.collection.list_indexes()
    }

    fn has_index(&self, field_names: Vec<&str>) -> PotashResult<bool> {
        self.collection.has_index(field_names)
    }

    fn drop_index(&self, field_names: Vec<&str>) -> PotashResult<()> {
        self.collection.drop_index(field_names)
    }

    fn drop_all_indexes(&self) -> PotashResult<()> {
        self.collection.drop_all_indexes()
    }

    fn clear(&self) -> PotashResult<()> {
        self.collection.clear()
    }

    fn dispose(&self) -> PotashResult<()> {
        self.collection.dispose()
    }

    fn is_dropped(&self) -> PotashResult<bool> {
        self.collection.is_dropped()
    }

    fn size(&self) -> PotashResult<u64> {
        self.collection.size()
    }

    fn attributes(&self) -> PotashResult<Document> {
        self.collection.attributes()
    }

    fn set_attributes(&self, attributes: Document) -> PotashResult<()> {
        self.collection.set_attributes(attributes)
    }
}

impl<T> ObjectRepositoryProvider<T> for DefaultObjectRepository<T>
where
    T: PotashEntity + Convertible<Output = T>,
{
    fn insert_many(&self, objects: &[T]) -> PotashResult<WriteResult> {
        let documents = objects
            .iter()
            .map(|object| self.operations.to_document(object, false))
            .collect::<PotashResult<Vec<_>>>()?;
        self.collection.insert_many(documents)
    }

    fn update(&self, filter: Filter, object: &T, insert_if_absent: bool) -> PotashResult<WriteResult> {
        let mut document = self.operations.to_document(object, !insert_if_absent)?;
        if !insert_if_absent {
            self.operations.remove_potash_id(&mut document);
        }
        self.collection
            .update_with_options(filter, &document, &UpdateOptions::new(insert_if_absent, false))
    }

    fn update_one(&self, object: &T, insert_if_absent: bool) -> PotashResult<WriteResult> {
        let filter = self.operations.create_unique_filter(object)?;
        let mut document = self.operations.to_document(object, !insert_if_absent)?;
        if !insert_if_absent {
            self.operations.remove_potash_id(&mut document);
        }
        self.collection
            .update_with_options(filter, &document, &UpdateOptions::new(insert_if_absent, true))
    }

    fn update_document(&self, filter: Filter, update: &Document, just_once: bool) -> PotashResult<WriteResult> {
        let mut document = update.clone();
        self.operations.remove_potash_id(&mut document);
        self.collection
            .update_with_options(filter, &document, &UpdateOptions::new(false, just_once))
    }

    fn remove(&self, filter: Filter) -> PotashResult<WriteResult> {
        self.collection.remove(filter)
    }

    fn remove_one(&self, object: &T) -> PotashResult<WriteResult> {
        let filter = self.operations.create_unique_filter(object)?;
        self.collection.remove_with_options(filter, true)
    }

    fn find(&self, filter: Filter) -> PotashResult<ObjectCursor<T>> {
        let cursor = self.collection.find(filter)?;
        Ok(ObjectCursor::new(cursor, self.operations.clone()))
    }

    fn find_with_options(&self, filter: Filter, find_options: &FindOptions) -> PotashResult<ObjectCursor<T>> {
        let cursor = self.collection.find_with_options(filter, find_options)?;
        Ok(ObjectCursor::new(cursor, self.operations.clone()))
    }

    fn get_by_id(&self, id: &T::Id) -> PotashResult<Option<T>> {
        let filter = self.operations.create_id_filter(id)?;
        self.find(filter)?.first().transpose()
    }

    fn document_collection(&self) -> PotashCollection {
        self.collection.clone()
    }
}

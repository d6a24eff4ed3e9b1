use super::repository_operations::RepositoryOperations;
use super::PotashEntity;
use crate::collection::{DocumentCursor, FindPlan};
use crate::common::Convertible;
use crate::errors::PotashResult;

/// Typed view of a [DocumentCursor]; each document is mapped back to `T`
/// as it is produced.
pub struct ObjectCursor<T> {
    cursor: DocumentCursor,
    operations: RepositoryOperations<T>,
}

impl<T> ObjectCursor<T>
where
    T: PotashEntity + Convertible<Output = T>,
{
    pub(crate) fn new(cursor: DocumentCursor, operations: RepositoryOperations<T>) -> Self {
        ObjectCursor { cursor, operations }
    }

    pub fn find_plan(&self) -> &FindPlan {
        self.cursor.find_plan()
    }

    pub fn size(&self) -> usize {
        self.cursor.size()
    }

    pub fn reset(&mut self) {
        self.cursor.reset()
    }

    pub fn first(&mut self) -> Option<PotashResult<T>> {
        self.reset();
        self.next()
    }
}

impl<T> Iterator for ObjectCursor<T>
where
    T: PotashEntity + Convertible<Output = T>,
{
    type Item = PotashResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let document = self.cursor.next()?;
        Some(document.and_then(|document| self.operations.to_entity(document)))
    }
}

use super::operation::WriteResult;
use super::{Document, DocumentCursor, FindOptions, PotashId, UpdateOptions};
use crate::common::PersistentCollection;
use crate::errors::PotashResult;
use crate::filter::Filter;
use std::ops::Deref;
use std::sync::Arc;

/// A named set of documents with its indexes.
///
/// Every write is applied to the documents and to all indexes of the
/// collection in one atomic commit before the call returns. A failed write
/// leaves both untouched.
///
/// Handles are obtained from [Potash::collection](crate::potash::Potash::collection)
/// or from a transaction; the same name always yields the same live handle.
///
/// ```rust,ignore
/// let users = db.collection("users")?;
/// users.create_index(vec!["email"], &unique_index())?;
/// users.insert(doc! { "email": "ada@x.io", "name": "ada" })?;
/// let ada = users.find(field("email").eq("ada@x.io"))?.first();
/// ```
pub trait PotashCollectionProvider: PersistentCollection {
    /// Inserts one document.
    ///
    /// A document without `_id` gets a fresh [PotashId]; `_revision` is set
    /// to 1 and `_modified` to the current time.
    ///
    /// # Errors
    /// * `UniqueConstraintViolation` when the id or a unique indexed value is
    ///   already taken
    /// * `InvalidId` when `_id` holds something other than a [PotashId]
    fn insert(&self, document: Document) -> PotashResult<WriteResult> {
        self.insert_many(vec![document])
    }

    /// Inserts all `documents` in one commit. When one of them fails none
    /// is stored.
    fn insert_many(&self, documents: Vec<Document>) -> PotashResult<WriteResult>;

    /// Merges `update` into every document matching `filter`.
    fn update(&self, filter: Filter, update: &Document) -> PotashResult<WriteResult> {
        self.update_with_options(filter, update, &UpdateOptions::default())
    }

    /// Merges `update` into the documents matching `filter`.
    ///
    /// With `insert_if_absent` the update document is inserted when nothing
    /// matches; with `just_once` only the first match is changed. Each
    /// changed document has its `_revision` incremented.
    fn update_with_options(
        &self,
        filter: Filter,
        update: &Document,
        update_options: &UpdateOptions,
    ) -> PotashResult<WriteResult>;

    /// Updates the stored document with the same `_id` as `document`.
    ///
    /// # Errors
    /// `InvalidId` when `document` has no id and `insert_if_absent` is off.
    fn update_one(&self, document: &Document, insert_if_absent: bool) -> PotashResult<WriteResult>;

    /// Removes every document matching `filter` with its index entries.
    fn remove(&self, filter: Filter) -> PotashResult<WriteResult> {
        self.remove_with_options(filter, false)
    }

    /// Removes the documents matching `filter`, only the first one when
    /// `just_once` is set.
    fn remove_with_options(&self, filter: Filter, just_once: bool) -> PotashResult<WriteResult>;

    /// Removes the stored document with the `_id` of `document`.
    ///
    /// # Errors
    /// `InvalidId` when `document` has no id.
    fn remove_one(&self, document: &Document) -> PotashResult<WriteResult>;

    /// Returns a lazy cursor over the documents matching `filter`.
    ///
    /// The cursor reads a snapshot taken here, so later writes do not
    /// disturb it. Documents come in insertion order unless an index answers the
    /// filter, in which case they follow index key order.
    fn find(&self, filter: Filter) -> PotashResult<DocumentCursor>;

    /// Like [find](PotashCollectionProvider::find), then sorts, skips and
    /// limits as `find_options` says.
    fn find_with_options(&self, filter: Filter, find_options: &FindOptions) -> PotashResult<DocumentCursor>;

    fn get_by_id(&self, id: &PotashId) -> PotashResult<Option<Document>>;

    fn name(&self) -> String;
}

/// Cloneable handle to a [PotashCollectionProvider].
#[derive(Clone)]
pub struct PotashCollection {
    inner: Arc<dyn PotashCollectionProvider>,
}

impl std::fmt::Debug for PotashCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PotashCollection").finish_non_exhaustive()
    }
}

impl PotashCollection {
    pub fn new<T: PotashCollectionProvider + 'static>(inner: T) -> Self {
        PotashCollection { inner: Arc::new(inner) }
    }

    /// Whether both handles refer to the same live collection object.
    pub fn same_handle(&self, other: &PotashCollection) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Deref for PotashCollection {
    type Target = Arc<dyn PotashCollectionProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

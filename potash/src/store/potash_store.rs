use crate::common::{PotashPluginProvider, COLLECTION_CATALOG};
use crate::errors::PotashResult;
use crate::store::{PotashMap, StoreCatalog, StoreConfig, StoreSnapshot, WriteBatch};
use std::ops::Deref;
use std::sync::Arc;

/// A record store: named, key-ordered maps of [Value](crate::common::Value)s.
///
/// Reads go through [PotashStoreProvider::snapshot], an O(1) immutable view
/// of every map. Writes are grouped into a [WriteBatch] and applied
/// atomically by [PotashStoreProvider::commit]. Every operation after
/// `close` fails with [ErrorKind::StoreClosed](crate::errors::ErrorKind::StoreClosed).
pub trait PotashStoreProvider: PotashPluginProvider {
    fn open_or_create(&self) -> PotashResult<()>;

    fn is_closed(&self) -> PotashResult<bool>;

    fn snapshot(&self) -> PotashResult<StoreSnapshot>;

    fn commit(&self, batch: WriteBatch) -> PotashResult<()>;

    /// Forces everything committed so far to durable storage.
    fn flush(&self) -> PotashResult<()>;

    fn compact(&self) -> PotashResult<()>;

    fn store_config(&self) -> PotashResult<StoreConfig>;

    fn store_version(&self) -> PotashResult<String>;
}

#[derive(Clone)]
pub struct PotashStore {
    inner: Arc<dyn PotashStoreProvider>,
}

impl PotashStore {
    pub fn new<T: PotashStoreProvider + 'static>(inner: T) -> Self {
        PotashStore { inner: Arc::new(inner) }
    }

    pub fn has_map(&self, name: &str) -> PotashResult<bool> {
        Ok(self.inner.snapshot()?.has_map(name))
    }

    /// Opens the map `name`, creating it when it does not exist.
    pub fn open_map(&self, name: &str) -> PotashResult<PotashMap> {
        if !self.has_map(name)? {
            let mut batch = WriteBatch::new();
            batch.create_map(name);
            self.inner.commit(batch)?;
        }
        Ok(PotashMap::new(name, self.clone()))
    }

    pub fn remove_map(&self, name: &str) -> PotashResult<()> {
        let mut batch = WriteBatch::new();
        batch.drop_map(name);
        self.inner.commit(batch)
    }

    pub fn map_names(&self) -> PotashResult<Vec<String>> {
        Ok(self.inner.snapshot()?.map_names())
    }

    pub fn store_catalog(&self) -> PotashResult<StoreCatalog> {
        Ok(StoreCatalog::new(PotashMap::new(COLLECTION_CATALOG, self.clone())))
    }
}

impl Deref for PotashStore {
    type Target = Arc<dyn PotashStoreProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

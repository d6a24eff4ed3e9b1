use crate::common::{PotashPlugin, PotashPluginProvider, POTASH_VERSION};
use crate::errors::PotashResult;
use crate::potash_config::PotashConfig;
use crate::store::memory::InMemoryStoreConfig;
use crate::store::{MemTable, PotashStoreProvider, StoreConfig, StoreSnapshot, WriteBatch};
use std::sync::Arc;

/// A store that lives only as long as the process. Nothing is persisted.
#[derive(Clone)]
pub struct InMemoryStore {
    inner: Arc<InMemoryStoreInner>,
}

impl InMemoryStore {
    pub fn new(store_config: InMemoryStoreConfig) -> InMemoryStore {
        InMemoryStore {
            inner: Arc::new(InMemoryStoreInner {
                store_config,
                table: MemTable::new(),
            }),
        }
    }
}

impl PotashPluginProvider for InMemoryStore {
    fn initialize(&self, _config: PotashConfig) -> PotashResult<()> {
        Ok(())
    }

    fn close(&self) -> PotashResult<()> {
        self.inner.table.close();
        log::debug!("In-memory store closed");
        Ok(())
    }

    fn as_plugin(&self) -> PotashPlugin {
        PotashPlugin::new(self.clone())
    }
}

impl PotashStoreProvider for InMemoryStore {
    fn open_or_create(&self) -> PotashResult<()> {
        self.inner.table.ensure_open()
    }

    fn is_closed(&self) -> PotashResult<bool> {
        Ok(self.inner.table.is_closed())
    }

    fn snapshot(&self) -> PotashResult<StoreSnapshot> {
        self.inner.table.snapshot()
    }

    fn commit(&self, batch: WriteBatch) -> PotashResult<()> {
        if batch.is_empty() {
            return self.inner.table.ensure_open();
        }
        self.inner.table.apply(&batch)
    }

    fn flush(&self) -> PotashResult<()> {
        self.inner.table.ensure_open()
    }

    fn compact(&self) -> PotashResult<()> {
        self.inner.table.ensure_open()
    }

    fn store_config(&self) -> PotashResult<StoreConfig> {
        Ok(StoreConfig::new(self.inner.store_config.clone()))
    }

    fn store_version(&self) -> PotashResult<String> {
        Ok(format!("InMemory/{}", POTASH_VERSION))
    }
}

struct InMemoryStoreInner {
    store_config: InMemoryStoreConfig,
    table: MemTable,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::val;

    #[test]
    fn test_commit_and_snapshot() {
        let store = InMemoryStore::new(InMemoryStoreConfig::new());
        store.open_or_create().unwrap();

        let mut batch = WriteBatch::new();
        batch.put("m", val!("k"), val!("v"));
        store.commit(batch).unwrap();

        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.get("m", &val!("k")), Some(&val!("v")));
        assert!(store.store_config().unwrap().is_in_memory());
        assert!(store.store_version().unwrap().starts_with("InMemory/"));
    }

    #[test]
    fn test_operations_after_close() {
        let store = InMemoryStore::new(InMemoryStoreConfig::new());
        store.close().unwrap();
        assert!(store.is_closed().unwrap());
        assert_eq!(store.snapshot().unwrap_err().kind(), &ErrorKind::StoreClosed);
        assert_eq!(store.flush().unwrap_err().kind(), &ErrorKind::StoreClosed);
        assert_eq!(store.commit(WriteBatch::new()).unwrap_err().kind(), &ErrorKind::StoreClosed);
        assert_eq!(store.open_or_create().unwrap_err().kind(), &ErrorKind::StoreClosed);
    }
}

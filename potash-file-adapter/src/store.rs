use crate::codec::{FORMAT_MAJOR, FORMAT_MINOR};
use crate::config::FileStoreConfig;
use crate::lock::DirectoryLock;
use crate::log_file::LogFile;
use parking_lot::Mutex;
use potash::common::{PotashPlugin, PotashPluginProvider};
use potash::errors::{ErrorKind, PotashError, PotashResult};
use potash::potash_config::PotashConfig;
use potash::store::{MemTable, PotashStoreProvider, StoreConfig, StoreSnapshot, WriteBatch};
use std::path::PathBuf;
use std::sync::Arc;

/// A durable store kept in one directory.
///
/// Every map lives in memory; each commit is appended to `potash.log` as
/// one checksummed frame before it becomes visible, and the log is replayed
/// when the store opens. [FileStore::compact](PotashStoreProvider::compact)
/// rewrites the log as a single snapshot frame.
#[derive(Clone)]
pub struct FileStore {
    inner: Arc<FileStoreInner>,
}

struct FileStoreInner {
    store_config: FileStoreConfig,
    table: MemTable,
    // Held while the store is open; commits serialise on it.
    state: Mutex<Option<OpenState>>,
}

struct OpenState {
    log: LogFile,
    lock: DirectoryLock,
}

fn not_open() -> PotashError {
    log::error!("File store is not open");
    PotashError::new("File store is not open", ErrorKind::StoreClosed)
}

impl FileStore {
    #[inline]
    pub fn new(store_config: FileStoreConfig) -> FileStore {
        FileStore {
            inner: Arc::new(FileStoreInner {
                store_config,
                table: MemTable::new(),
                state: Mutex::new(None),
            }),
        }
    }
}

impl PotashPluginProvider for FileStore {
    fn initialize(&self, _config: PotashConfig) -> PotashResult<()> {
        if self.inner.store_config.db_path().is_empty() {
            log::error!("File store needs a database path");
            return Err(PotashError::new(
                "File store needs a database path",
                ErrorKind::InvalidOperation,
            ));
        }
        Ok(())
    }

    fn close(&self) -> PotashResult<()> {
        self.inner.close()
    }

    fn as_plugin(&self) -> PotashPlugin {
        PotashPlugin::new(self.clone())
    }
}

impl PotashStoreProvider for FileStore {
    fn open_or_create(&self) -> PotashResult<()> {
        self.inner.open_or_create()
    }

    fn is_closed(&self) -> PotashResult<bool> {
        Ok(self.inner.table.is_closed())
    }

    fn snapshot(&self) -> PotashResult<StoreSnapshot> {
        self.inner.table.snapshot()
    }

    fn commit(&self, batch: WriteBatch) -> PotashResult<()> {
        self.inner.commit(batch)
    }

    fn flush(&self) -> PotashResult<()> {
        let state = self.inner.state.lock();
        match state.as_ref() {
            Some(open) => open.log.sync(),
            None => Err(not_open()),
        }
    }

    fn compact(&self) -> PotashResult<()> {
        let mut state = self.inner.state.lock();
        let open = state.as_mut().ok_or_else(not_open)?;
        let snapshot = self.inner.table.snapshot()?;
        open.log.compact(&snapshot, &self.inner.store_config.compact_path())
    }

    fn store_config(&self) -> PotashResult<StoreConfig> {
        Ok(StoreConfig::new(self.inner.store_config.clone()))
    }

    fn store_version(&self) -> PotashResult<String> {
        Ok(format!("FileStore/{}.{}", FORMAT_MAJOR, FORMAT_MINOR))
    }
}

impl FileStoreInner {
    fn open_or_create(&self) -> PotashResult<()> {
        self.table.ensure_open()?;
        let mut state = self.state.lock();
        if state.is_some() {
            return Ok(());
        }

        let lock = DirectoryLock::acquire(&PathBuf::from(self.store_config.db_path()))?;
        let (log, snapshot) = LogFile::open(&self.store_config.log_path())?;
        self.table.replace(snapshot)?;
        log::info!("Opened file store at {}", lock.path().display());
        *state = Some(OpenState { log, lock });
        Ok(())
    }

    fn commit(&self, batch: WriteBatch) -> PotashResult<()> {
        let mut state = self.state.lock();
        let open = state.as_mut().ok_or_else(not_open)?;
        self.table.ensure_open()?;
        if batch.is_empty() {
            return Ok(());
        }

        open.log.append(&batch, self.store_config.sync_on_commit())?;
        self.table.apply(&batch)
    }

    fn close(&self) -> PotashResult<()> {
        let mut state = self.state.lock();
        if let Some(mut open) = state.take() {
            if self.store_config.compact_on_close() {
                match self.table.snapshot() {
                    Ok(snapshot) => {
                        if let Err(e) = open.log.compact(&snapshot, &self.store_config.compact_path()) {
                            log::warn!("Compaction on close failed: {}", e);
                        }
                    }
                    Err(e) => log::warn!("Compaction on close skipped: {}", e),
                }
            }
            open.log.sync()?;
            log::info!("Closed file store at {}", open.lock.path().display());
        }
        self.table.close();
        Ok(())
    }
}

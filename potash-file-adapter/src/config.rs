use parking_lot::RwLock;
use potash::store::StoreConfigProvider;
use std::any::Any;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Name of the append-only log inside the database directory.
pub(crate) const LOG_FILE: &str = "potash.log";
/// Temporary file a compaction writes before it replaces the log.
pub(crate) const COMPACT_FILE: &str = "potash.log.compact";
/// Lock file held for as long as the store is open.
pub(crate) const LOCK_FILE: &str = "potash.lock";

/// Settings of a [FileStore](crate::FileStore).
///
/// Shared between the module, the store and the database configuration;
/// clones see the same values.
#[derive(Clone)]
pub struct FileStoreConfig {
    inner: Arc<FileStoreConfigInner>,
}

struct FileStoreConfigInner {
    db_path: RwLock<String>,
    sync_on_commit: AtomicBool,
    compact_on_close: AtomicBool,
}

impl FileStoreConfig {
    #[inline]
    pub fn new() -> FileStoreConfig {
        FileStoreConfig {
            inner: Arc::new(FileStoreConfigInner {
                db_path: RwLock::new(String::new()),
                sync_on_commit: AtomicBool::new(true),
                compact_on_close: AtomicBool::new(false),
            }),
        }
    }

    /// The database directory.
    #[inline]
    pub fn db_path(&self) -> String {
        self.inner.db_path.read().clone()
    }

    #[inline]
    pub(crate) fn set_db_path(&self, db_path: &str) {
        *self.inner.db_path.write() = db_path.to_string();
    }

    /// Whether every commit is synced to disk before it returns.
    #[inline]
    pub fn sync_on_commit(&self) -> bool {
        self.inner.sync_on_commit.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn set_sync_on_commit(&self, value: bool) {
        self.inner.sync_on_commit.store(value, Ordering::Relaxed)
    }

    #[inline]
    pub fn compact_on_close(&self) -> bool {
        self.inner.compact_on_close.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn set_compact_on_close(&self, value: bool) {
        self.inner.compact_on_close.store(value, Ordering::Relaxed)
    }

    pub(crate) fn log_path(&self) -> PathBuf {
        PathBuf::from(self.db_path()).join(LOG_FILE)
    }

    pub(crate) fn compact_path(&self) -> PathBuf {
        PathBuf::from(self.db_path()).join(COMPACT_FILE)
    }
}

impl Default for FileStoreConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreConfigProvider for FileStoreConfig {
    fn file_path(&self) -> String {
        self.db_path()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[ctor::ctor]
    fn init() {
        colog::init();
    }

    #[test]
    fn test_defaults() {
        let config = FileStoreConfig::new();
        assert!(config.sync_on_commit());
        assert!(!config.compact_on_close());
        assert!(config.is_in_memory());
    }

    #[test]
    fn test_clones_share_settings() {
        let config = FileStoreConfig::new();
        let clone = config.clone();
        clone.set_db_path("/tmp/potash");
        clone.set_sync_on_commit(false);
        clone.set_compact_on_close(true);

        assert_eq!(config.file_path(), "/tmp/potash");
        assert!(!config.is_in_memory());
        assert!(!config.sync_on_commit());
        assert!(config.compact_on_close());
        assert_eq!(config.log_path(), PathBuf::from("/tmp/potash").join(LOG_FILE));
    }
}

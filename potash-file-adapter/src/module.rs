use crate::config::FileStoreConfig;
use crate::store::FileStore;
use potash::common::{PluginRegistrar, PotashModule};
use potash::errors::PotashResult;
use potash::store::{PotashStore, StoreModule};

/// Loads a [FileStore] into a database.
///
/// ```rust,no_run
/// use potash::potash::Potash;
/// use potash_file_adapter::FileStoreModule;
///
/// # fn main() -> potash::errors::PotashResult<()> {
/// let module = FileStoreModule::with_config()
///     .db_path("/var/lib/app/db")
///     .sync_on_commit(true)
///     .build();
/// let db = Potash::builder().load_module(module).open_or_create(None, None)?;
/// db.close()?;
/// # Ok(())
/// # }
/// ```
pub struct FileStoreModule {
    store_config: FileStoreConfig,
}

impl FileStoreModule {
    #[inline]
    pub fn with_config() -> FileStoreModuleBuilder {
        FileStoreModuleBuilder::new()
    }
}

impl PotashModule for FileStoreModule {
    fn load(&self, plugin_registrar: &PluginRegistrar) -> PotashResult<()> {
        let store = self.get_store()?;
        plugin_registrar.register_store_plugin(store)
    }
}

impl StoreModule for FileStoreModule {
    fn get_store(&self) -> PotashResult<PotashStore> {
        let store = FileStore::new(self.store_config.clone());
        Ok(PotashStore::new(store))
    }
}

pub struct FileStoreModuleBuilder {
    store_config: FileStoreConfig,
}

impl FileStoreModuleBuilder {
    #[inline]
    pub fn new() -> FileStoreModuleBuilder {
        FileStoreModuleBuilder {
            store_config: FileStoreConfig::new(),
        }
    }

    #[inline]
    pub fn db_path(self, db_path: &str) -> Self {
        self.store_config.set_db_path(db_path);
        self
    }

    /// Sync the log after every commit. On by default; turning it off
    /// trades durability of the latest commits for throughput.
    #[inline]
    pub fn sync_on_commit(self, sync_on_commit: bool) -> Self {
        self.store_config.set_sync_on_commit(sync_on_commit);
        self
    }

    #[inline]
    pub fn compact_on_close(self, compact_on_close: bool) -> Self {
        self.store_config.set_compact_on_close(compact_on_close);
        self
    }

    #[inline]
    pub fn build(self) -> FileStoreModule {
        FileStoreModule {
            store_config: self.store_config,
        }
    }
}

impl Default for FileStoreModuleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//! Configuration of one database.

use crate::collection::CollectionEventRegistry;
use crate::common::{PluginManager, PotashMapper, PotashModule, DEFAULT_FIELD_SEPARATOR};
use crate::errors::{ErrorKind, PotashError, PotashResult};
use crate::index::PotashIndexer;
use crate::store::PotashStore;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Settings and plugins of a database.
///
/// Cheap to clone; clones share state. Every mutator fails with
/// [ErrorKind::InvalidOperation] once the database has been opened.
#[derive(Clone)]
pub struct PotashConfig {
    inner: Arc<PotashConfigInner>,
}

impl Default for PotashConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PotashConfig {
    pub fn new() -> Self {
        PotashConfig {
            inner: Arc::new(PotashConfigInner::new()),
        }
    }

    pub fn field_separator(&self) -> String {
        self.inner.field_separator.read().clone()
    }

    pub fn set_field_separator(&self, separator: &str) -> PotashResult<()> {
        self.inner.set_field_separator(separator)
    }

    pub fn load_module<T: PotashModule + 'static>(&self, module: T) -> PotashResult<()> {
        self.inner.load_module(&module)
    }

    pub(crate) fn load_boxed_module(&self, module: &dyn PotashModule) -> PotashResult<()> {
        self.inner.load_module(module)
    }

    pub fn plugin_manager(&self) -> &PluginManager {
        &self.inner.plugin_manager
    }

    pub fn potash_store(&self) -> PotashResult<PotashStore> {
        self.inner.plugin_manager.get_store().ok_or_else(|| {
            log::error!("No store plugin is configured");
            PotashError::new("No store plugin is configured", ErrorKind::PluginError)
        })
    }

    pub fn find_indexer(&self, index_type: &str) -> PotashResult<PotashIndexer> {
        self.inner.plugin_manager.get_indexer(index_type).ok_or_else(|| {
            log::error!("No indexer plugin found for type: {}", index_type);
            PotashError::new(
                &format!("No indexer plugin found for type: {}", index_type),
                ErrorKind::IndexNotFound,
            )
        })
    }

    pub fn mapper(&self) -> Option<PotashMapper> {
        self.inner.plugin_manager.get_mapper()
    }

    pub(crate) fn event_registry(&self) -> &CollectionEventRegistry {
        &self.inner.event_registry
    }

    pub fn is_configured(&self) -> bool {
        self.inner.configured.load(Ordering::Acquire)
    }

    /// Fills the plugin gaps, freezes the registry and initializes every
    /// plugin. After this call the configuration is immutable.
    pub(crate) fn initialize(&self) -> PotashResult<()> {
        if self.inner.configured.swap(true, Ordering::AcqRel) {
            log::error!("Configuration is already initialized");
            return Err(PotashError::new(
                "Configuration is already initialized",
                ErrorKind::InvalidOperation,
            ));
        }

        let manager = &self.inner.plugin_manager;
        manager.load_plugins()?;
        manager.freeze()?;
        manager.initialize_plugins(self)
    }

    pub(crate) fn close(&self) -> PotashResult<()> {
        self.inner.event_registry.close();
        self.inner.plugin_manager.close()
    }
}

struct PotashConfigInner {
    configured: AtomicBool,
    field_separator: RwLock<String>,
    plugin_manager: PluginManager,
    event_registry: CollectionEventRegistry,
}

impl PotashConfigInner {
    fn new() -> Self {
        PotashConfigInner {
            configured: AtomicBool::new(false),
            field_separator: RwLock::new(DEFAULT_FIELD_SEPARATOR.to_string()),
            plugin_manager: PluginManager::new(),
            event_registry: CollectionEventRegistry::new(),
        }
    }

    fn set_field_separator(&self, separator: &str) -> PotashResult<()> {
        if self.configured.load(Ordering::Acquire) {
            log::error!("Field separator cannot be changed after initialization");
            return Err(PotashError::new(
                "Field separator cannot be changed after initialization",
                ErrorKind::InvalidOperation,
            ));
        }

        if separator.is_empty() {
            log::error!("Field separator cannot be empty");
            return Err(PotashError::new(
                "Field separator cannot be empty",
                ErrorKind::InvalidOperation,
            ));
        }

        *self.field_separator.write() = separator.to_string();
        Ok(())
    }

    fn load_module(&self, module: &dyn PotashModule) -> PotashResult<()> {
        if self.configured.load(Ordering::Acquire) {
            log::error!("Cannot load module after initialization");
            return Err(PotashError::new(
                "Cannot load module after initialization",
                ErrorKind::InvalidOperation,
            ));
        }
        self.plugin_manager.load_module(module)
    }
}

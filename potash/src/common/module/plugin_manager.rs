use super::PotashModule;
use crate::common::{DocumentMapper, PotashMapper, FULL_TEXT_INDEX, NON_UNIQUE_INDEX, UNIQUE_INDEX};
use crate::errors::{ErrorKind, PotashError, PotashResult};
use crate::index::full_text_indexer::FullTextIndexer;
use crate::index::non_unique_indexer::NonUniqueIndexer;
use crate::index::unique_indexer::UniqueIndexer;
use crate::index::PotashIndexer;
use crate::potash_config::PotashConfig;
use crate::store::memory::{InMemoryStore, InMemoryStoreConfig};
use crate::store::PotashStore;
use indexmap::{IndexMap, IndexSet};
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};

/// The explicit capability a plugin is registered under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    Store,
    Mapper,
    Indexer,
    SpatialIndexer,
}

pub trait PluginRegistrarProvider {
    fn register_store_plugin(&self, plugin: PotashStore) -> PotashResult<()>;

    fn register_mapper_plugin(&self, plugin: PotashMapper) -> PotashResult<()>;

    fn register_indexer_plugin(&self, plugin: PotashIndexer) -> PotashResult<()>;

    fn register_spatial_indexer_plugin(&self, plugin: PotashIndexer) -> PotashResult<()>;
}

/// The handle a [PotashModule] registers its plugins through.
pub struct PluginRegistrar {
    inner: Arc<dyn PluginRegistrarProvider>,
}

impl PluginRegistrar {
    pub fn new<T: PluginRegistrarProvider + 'static>(inner: T) -> Self {
        PluginRegistrar { inner: Arc::new(inner) }
    }

    pub fn register_store_plugin(&self, plugin: PotashStore) -> PotashResult<()> {
        self.inner.register_store_plugin(plugin)
    }

    pub fn register_mapper_plugin(&self, plugin: PotashMapper) -> PotashResult<()> {
        self.inner.register_mapper_plugin(plugin)
    }

    pub fn register_indexer_plugin(&self, plugin: PotashIndexer) -> PotashResult<()> {
        self.inner.register_indexer_plugin(plugin)
    }

    pub fn register_spatial_indexer_plugin(&self, plugin: PotashIndexer) -> PotashResult<()> {
        self.inner.register_spatial_indexer_plugin(plugin)
    }
}

/// Capability registry of one database.
///
/// Before the database opens, modules register plugins and a later
/// registration of the same capability (or the same index type) replaces the
/// earlier one. [PluginManager::load_plugins] then fills the gaps:
/// - the unique and non-unique indexers and the in-memory store are always
///   supplied when missing;
/// - the default [DocumentMapper] is supplied only when neither a mapper nor
///   a spatial indexer was registered.
///
/// [PluginManager::freeze] moves everything into an immutable set that is
/// read without locking for the rest of the database's life.
#[derive(Clone)]
pub struct PluginManager {
    inner: Arc<PluginManagerInner>,
}

impl PluginManager {
    pub fn new() -> Self {
        PluginManager {
            inner: Arc::new(PluginManagerInner::new()),
        }
    }

    pub fn load_module(&self, module: &dyn PotashModule) -> PotashResult<()> {
        let registrar = PluginRegistrar::new(self.clone());
        module.load(&registrar)
    }

    pub fn load_plugins(&self) -> PotashResult<()> {
        self.inner.load_plugins()
    }

    pub fn freeze(&self) -> PotashResult<()> {
        self.inner.freeze()
    }

    pub fn is_frozen(&self) -> bool {
        self.inner.frozen.get().is_some()
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.inner.has_capability(capability)
    }

    pub fn get_indexer(&self, index_type: &str) -> Option<PotashIndexer> {
        self.inner.get_indexer(index_type)
    }

    pub fn get_store(&self) -> Option<PotashStore> {
        self.inner.get_store()
    }

    pub fn get_mapper(&self) -> Option<PotashMapper> {
        self.inner.get_mapper()
    }

    pub fn initialize_plugins(&self, config: &PotashConfig) -> PotashResult<()> {
        self.inner.initialize_plugins(config)
    }

    pub fn close(&self) -> PotashResult<()> {
        self.inner.close()
    }
}

impl Default for PluginManager {
    fn default() -> Self {
        PluginManager::new()
    }
}

impl PluginRegistrarProvider for PluginManager {
    fn register_store_plugin(&self, plugin: PotashStore) -> PotashResult<()> {
        self.inner.register(|pending| {
            pending.store = Some(plugin);
            pending.capabilities.insert(Capability::Store);
        })
    }

    fn register_mapper_plugin(&self, plugin: PotashMapper) -> PotashResult<()> {
        self.inner.register(|pending| {
            pending.mapper = Some(plugin);
            pending.capabilities.insert(Capability::Mapper);
        })
    }

    fn register_indexer_plugin(&self, plugin: PotashIndexer) -> PotashResult<()> {
        self.inner.register(|pending| {
            pending.indexers.insert(plugin.index_type(), plugin);
            pending.capabilities.insert(Capability::Indexer);
        })
    }

    fn register_spatial_indexer_plugin(&self, plugin: PotashIndexer) -> PotashResult<()> {
        self.inner.register(|pending| {
            pending.indexers.insert(plugin.index_type(), plugin);
            pending.capabilities.insert(Capability::SpatialIndexer);
        })
    }
}

#[derive(Default)]
struct PendingPlugins {
    store: Option<PotashStore>,
    mapper: Option<PotashMapper>,
    indexers: IndexMap<String, PotashIndexer>,
    capabilities: IndexSet<Capability>,
}

struct RegisteredPlugins {
    store: PotashStore,
    mapper: Option<PotashMapper>,
    indexers: IndexMap<String, PotashIndexer>,
    capabilities: IndexSet<Capability>,
}

struct PluginManagerInner {
    pending: Mutex<PendingPlugins>,
    frozen: OnceLock<RegisteredPlugins>,
}

impl PluginManagerInner {
    fn new() -> Self {
        PluginManagerInner {
            pending: Mutex::new(PendingPlugins::default()),
            frozen: OnceLock::new(),
        }
    }

    fn register(&self, f: impl FnOnce(&mut PendingPlugins)) -> PotashResult<()> {
        if self.frozen.get().is_some() {
            log::error!("Plugins cannot be registered after the database is opened");
            return Err(PotashError::new(
                "Plugins cannot be registered after the database is opened",
                ErrorKind::InvalidOperation,
            ));
        }
        let mut pending = self.pending.lock();
        f(&mut pending);
        Ok(())
    }

    fn load_plugins(&self) -> PotashResult<()> {
        let mut pending = self.pending.lock();

        if !pending.capabilities.contains(&Capability::Mapper)
            && !pending.capabilities.contains(&Capability::SpatialIndexer)
        {
            log::debug!("No mapper or spatial indexer registered, loading the document mapper");
            pending.mapper = Some(PotashMapper::new(DocumentMapper::new()));
            pending.capabilities.insert(Capability::Mapper);
        }

        if !pending.indexers.contains_key(UNIQUE_INDEX) {
            pending
                .indexers
                .insert(UNIQUE_INDEX.to_string(), PotashIndexer::new(UniqueIndexer::new()));
        }
        if !pending.indexers.contains_key(NON_UNIQUE_INDEX) {
            pending
                .indexers
                .insert(NON_UNIQUE_INDEX.to_string(), PotashIndexer::new(NonUniqueIndexer::new()));
        }
        if !pending.indexers.contains_key(FULL_TEXT_INDEX) {
            pending
                .indexers
                .insert(FULL_TEXT_INDEX.to_string(), PotashIndexer::new(FullTextIndexer::new()));
        }
        pending.capabilities.insert(Capability::Indexer);

        if pending.store.is_none() {
            log::debug!("No store registered, using the in-memory store");
            pending.store = Some(PotashStore::new(InMemoryStore::new(InMemoryStoreConfig::new())));
            pending.capabilities.insert(Capability::Store);
        }
        Ok(())
    }

    fn freeze(&self) -> PotashResult<()> {
        let mut pending = self.pending.lock();
        let store = match pending.store.take() {
            Some(store) => store,
            None => {
                log::error!("No store plugin registered");
                return Err(PotashError::new("No store plugin registered", ErrorKind::PluginError));
            }
        };

        let registered = RegisteredPlugins {
            store,
            mapper: pending.mapper.take(),
            indexers: std::mem::take(&mut pending.indexers),
            capabilities: std::mem::take(&mut pending.capabilities),
        };

        if self.frozen.set(registered).is_err() {
            log::error!("Plugin registry is already frozen");
            return Err(PotashError::new(
                "Plugin registry is already frozen",
                ErrorKind::InvalidOperation,
            ));
        }
        Ok(())
    }

    fn has_capability(&self, capability: Capability) -> bool {
        match self.frozen.get() {
            Some(registered) => registered.capabilities.contains(&capability),
            None => self.pending.lock().capabilities.contains(&capability),
        }
    }

    fn get_indexer(&self, index_type: &str) -> Option<PotashIndexer> {
        match self.frozen.get() {
            Some(registered) => registered.indexers.get(index_type).cloned(),
            None => self.pending.lock().indexers.get(index_type).cloned(),
        }
    }

    fn get_store(&self) -> Option<PotashStore> {
        match self.frozen.get() {
            Some(registered) => Some(registered.store.clone()),
            None => self.pending.lock().store.clone(),
        }
    }

    fn get_mapper(&self) -> Option<PotashMapper> {
        match self.frozen.get() {
            Some(registered) => registered.mapper.clone(),
            None => self.pending.lock().mapper.clone(),
        }
    }

    fn initialize_plugins(&self, config: &PotashConfig) -> PotashResult<()> {
        match self.frozen.get() {
            Some(registered) => {
                registered.store.initialize(config.clone())?;
                for indexer in registered.indexers.values() {
                    indexer.initialize(config.clone())?;
                }
                if let Some(mapper) = &registered.mapper {
                    mapper.initialize(config.clone())?;
                }
                Ok(())
            }
            None => {
                log::error!("Plugins must be frozen before initialization");
                Err(PotashError::new(
                    "Plugins must be frozen before initialization",
                    ErrorKind::PluginError,
                ))
            }
        }
    }

    fn close(&self) -> PotashResult<()> {
        if let Some(registered) = self.frozen.get() {
            for indexer in registered.indexers.values() {
                if let Err(e) = indexer.close() {
                    log::warn!("Failed to close indexer {}: {}", indexer.index_type(), e);
                }
            }
            if let Some(mapper) = &registered.mapper {
                if let Err(e) = mapper.close() {
                    log::warn!("Failed to close mapper {}: {}", mapper.mapper_id(), e);
                }
            }
            registered.store.close()?;
        }
        Ok(())
    }
}

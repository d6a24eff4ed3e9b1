use super::plugin_manager::PluginRegistrar;
use crate::errors::PotashResult;
use crate::potash_config::PotashConfig;
use std::ops::Deref;
use std::sync::Arc;

/// Lifecycle hooks shared by every plugin: stores, indexers and mappers.
pub trait PotashPluginProvider: Send + Sync {
    /// Called once when the database opens, after the configuration is frozen.
    fn initialize(&self, config: PotashConfig) -> PotashResult<()>;

    fn close(&self) -> PotashResult<()>;

    fn as_plugin(&self) -> PotashPlugin;
}

/// A bundle of plugins loaded into a database before it opens.
///
/// A module registers each of its plugins through the [PluginRegistrar]
/// under an explicit capability; see
/// [PluginManager](crate::common::PluginManager) for how conflicts and
/// gaps are resolved.
pub trait PotashModule: Send + Sync {
    fn load(&self, plugin_registrar: &PluginRegistrar) -> PotashResult<()>;
}

#[derive(Clone)]
pub struct PotashPlugin {
    inner: Arc<dyn PotashPluginProvider>,
}

impl PotashPlugin {
    pub fn new<T: PotashPluginProvider + 'static>(inner: T) -> Self {
        PotashPlugin { inner: Arc::new(inner) }
    }
}

impl Deref for PotashPlugin {
    type Target = Arc<dyn PotashPluginProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

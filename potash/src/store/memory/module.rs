use crate::common::{PluginRegistrar, PotashModule};
use crate::errors::PotashResult;
use crate::store::memory::{InMemoryStore, InMemoryStoreConfig};
use crate::store::{PotashStore, StoreModule};

#[derive(Default)]
pub struct InMemoryStoreModule {
    store_config: InMemoryStoreConfig,
}

impl InMemoryStoreModule {
    pub fn new() -> InMemoryStoreModule {
        InMemoryStoreModule {
            store_config: InMemoryStoreConfig::new(),
        }
    }
}

impl PotashModule for InMemoryStoreModule {
    fn load(&self, plugin_registrar: &PluginRegistrar) -> PotashResult<()> {
        let store = self.get_store()?;
        plugin_registrar.register_store_plugin(store)
    }
}

impl StoreModule for InMemoryStoreModule {
    fn get_store(&self) -> PotashResult<PotashStore> {
        let store = InMemoryStore::new(self.store_config.clone());
        Ok(PotashStore::new(store))
    }
}

use crate::store::StoreConfigProvider;
use std::any::Any;

#[derive(Clone, Default)]
pub struct InMemoryStoreConfig;

impl InMemoryStoreConfig {
    pub fn new() -> InMemoryStoreConfig {
        InMemoryStoreConfig
    }
}

impl StoreConfigProvider for InMemoryStoreConfig {
    fn file_path(&self) -> String {
        String::new()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_config() {
        let config = InMemoryStoreConfig::new();
        assert!(config.is_in_memory());
        assert!(config.as_any().downcast_ref::<InMemoryStoreConfig>().is_some());
    }
}

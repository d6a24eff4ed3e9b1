use crate::errors::{ErrorKind, PotashError, PotashResult};
use std::any::Any;
use std::ops::Deref;
use std::sync::Arc;

pub trait StoreConfigProvider: Any + Send + Sync {
    /// Directory of a file-backed store; empty for in-memory stores.
    fn file_path(&self) -> String;

    fn is_in_memory(&self) -> bool {
        self.file_path().is_empty()
    }

    fn as_any(&self) -> &dyn Any;
}

#[derive(Clone)]
pub struct StoreConfig {
    inner: Arc<dyn StoreConfigProvider>,
}

impl StoreConfig {
    pub fn new<T: StoreConfigProvider + 'static>(inner: T) -> Self {
        StoreConfig { inner: Arc::new(inner) }
    }

    pub fn as_ref<T: StoreConfigProvider + 'static>(&self) -> PotashResult<&T> {
        self.inner.as_any().downcast_ref::<T>().ok_or_else(|| {
            log::error!("Store config type mismatch");
            PotashError::new(
                "Store config type mismatch: cannot downcast to requested config type",
                ErrorKind::InvalidOperation,
            )
        })
    }
}

impl Deref for StoreConfig {
    type Target = Arc<dyn StoreConfigProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

use crate::common::PotashModule;
use crate::errors::PotashResult;
use crate::store::PotashStore;

/// A module whose main plugin is a store.
pub trait StoreModule: PotashModule {
    fn get_store(&self) -> PotashResult<PotashStore>;
}

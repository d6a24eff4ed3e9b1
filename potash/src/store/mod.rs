//! Storage backends and abstractions.
//!
//! A store holds named maps of key-ordered [Value](crate::common::Value)
//! records. All reads go through an O(1) [StoreSnapshot]; all writes are
//! grouped into a [WriteBatch] and committed atomically.
//!
//! Potash ships the [memory::InMemoryStoreModule]; the
//! `potash-file-adapter` crate provides a durable store behind the same
//! [PotashStoreProvider] contract.

mod iters;
mod mem_table;
pub mod memory;
mod potash_map;
mod potash_store;
mod snapshot;
mod staged_write;
mod store_catalog;
mod store_config;
mod store_module;
mod write_batch;

pub use iters::*;
pub use mem_table::*;
pub use potash_map::*;
pub use potash_store::*;
pub use snapshot::*;
pub use staged_write::*;
pub use store_catalog::*;
pub use store_config::*;
pub use store_module::*;
pub use write_batch::*;

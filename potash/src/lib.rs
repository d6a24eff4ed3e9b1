//! # Potash - Embedded Document Database
//!
//! Potash is an embedded, single-process document database. It stores
//! schemaless [documents](collection::Document) in named collections, keeps
//! unique and non-unique secondary indexes consistent with every write,
//! maps Rust types to documents through typed repositories and offers
//! snapshot-isolated transactions.
//!
//! ## Quick Start
//!
//! ```rust
//! use potash::doc;
//! use potash::filter::field;
//! use potash::index::unique_index;
//! use potash::potash::Potash;
//!
//! # fn main() -> potash::errors::PotashResult<()> {
//! let db = Potash::builder().open_or_create(None, None)?;
//!
//! let users = db.collection("users")?;
//! users.create_index(vec!["id"], &unique_index())?;
//! users.insert(doc! { "id": 1, "name": "a" })?;
//! users.insert(doc! { "id": 2, "name": "b" })?;
//!
//! let found = users.find(field("id").eq(2))?;
//! assert_eq!(found.count(), 1);
//!
//! db.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`collection`] - documents, collections, cursors and options
//! - [`common`] - values, conversions, plugins and shared utilities
//! - [`errors`] - the error type shared by every crate of the workspace
//! - [`filter`] - filters used to query collections
//! - [`index`] - index descriptors and the built-in indexers
//! - [`potash`] - the database handle
//! - [`potash_builder`] - builder used to open a database
//! - [`potash_config`] - database configuration
//! - [`repository`] - typed object repositories
//! - [`store`] - the record store contract and the in-memory store
//! - [`transaction`] - sessions and transactions

use crate::collection::snowflake::SnowflakeIdGenerator;
use once_cell::sync::Lazy;

pub mod collection;
pub mod common;
pub mod errors;
pub mod filter;
pub mod index;
pub mod potash;
pub mod potash_builder;
pub mod potash_config;
pub mod repository;
pub mod store;
pub mod transaction;

pub(crate) static ID_GENERATOR: Lazy<SnowflakeIdGenerator> = Lazy::new(SnowflakeIdGenerator::new);

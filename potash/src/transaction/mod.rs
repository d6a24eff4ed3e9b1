//! Sessions and snapshot-isolated transactions.
//!
//! ```rust
//! use potash::doc;
//! use potash::potash::Potash;
//!
//! # fn main() -> potash::errors::PotashResult<()> {
//! let db = Potash::builder().open_or_create(None, None)?;
//! db.with_session(|session| {
//!     session.with_transaction(|tx| {
//!         tx.collection("orders")?.insert(doc! { "item": "tea" })?;
//!         Ok(())
//!     })
//! })?;
//! assert_eq!(db.collection("orders")?.size()?, 1);
//! # Ok(())
//! # }
//! ```

mod potash_transaction;
mod session;
mod transaction_store;

pub use potash_transaction::*;
pub use session::*;

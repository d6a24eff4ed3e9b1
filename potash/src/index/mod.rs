//! Secondary indexes.
//!
//! An index maps the values of one or more document fields to the ids of
//! the documents holding them. Index contents are ordinary store maps, so
//! they are written in the same atomic commit as the documents and follow
//! transactions and snapshots like any other record.
//!
//! The `unique`, `non-unique` and `full-text` indexers are built in; other
//! index types (such as `spatial`) are supplied by modules. A `full-text`
//! index answers [text](crate::filter::FluentFilter::text) filters.
//!
//! ```rust,ignore
//! use potash::index::{non_unique_index, unique_index};
//!
//! let users = db.collection("users")?;
//! users.create_index(vec!["email"], &unique_index())?;
//! users.create_index(vec!["last_name", "first_name"], &non_unique_index())?;
//! ```

mod descriptor;
mod options;
mod potash_indexer;
mod simple_index;
pub(crate) mod full_text_indexer;
pub(crate) mod non_unique_indexer;
pub(crate) mod unique_indexer;

pub use descriptor::*;
pub use options::*;
pub use potash_indexer::*;

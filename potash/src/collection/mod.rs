//! Documents and the collections that store them.
//!
//! A [Document] is an ordered map of field names to
//! [Value](crate::common::Value)s. Nested fields are addressed with the
//! database field separator (`.` by default), e.g. `address.city`.
//!
//! ```rust
//! use potash::doc;
//!
//! let document = doc! { "name": "Alice", "address": { "city": "Oslo" } };
//! assert_eq!(document.get_embedded("address.city", ".").as_str(), Some("Oslo"));
//! ```
//!
//! A [PotashCollection] is a named set of documents. Each document gets a
//! [PotashId] in its `_id` field on insert, a `_revision` that grows with
//! every write and a `_modified` timestamp. These three fields are reserved.

mod collection_factory;
mod default_potash_collection;
mod document;
mod document_cursor;
mod event;
mod find_options;
mod find_plan;
pub(crate) mod operation;
mod potash_collection;
mod potash_id;
pub(crate) mod snowflake;
mod update_options;

pub(crate) use collection_factory::*;
pub use document::*;
pub use document_cursor::*;
pub use event::{CollectionEventCallback, CollectionEventInfo, CollectionEventListener, CollectionEvents};
pub(crate) use event::{CollectionEventBus, CollectionEventRegistry, EventDispatch, PendingEvents};
pub use find_options::*;
pub use find_plan::*;
pub use operation::WriteResult;
pub use potash_collection::*;
pub use potash_id::*;
pub use update_options::*;

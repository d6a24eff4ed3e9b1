//! Filters select documents in `find`, `update` and `remove` calls.
//!
//! Build them with [field] and combine with [and], [or] and [not]. Equality,
//! `in` and range filters on an indexed field, and conjunctions of
//! equalities covering a compound index, are answered from the index; every
//! filter is still re-checked against the candidate documents.

mod basic_filters;
mod filter;
mod fluent;
mod logical_filters;
mod pattern_filters;

pub(crate) use basic_filters::*;
pub use filter::*;
pub use fluent::*;
pub(crate) use logical_filters::*;
pub(crate) use pattern_filters::*;

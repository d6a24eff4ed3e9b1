//! Typed repositories over collections.
//!
//! An [ObjectRepository] stores values of one Rust type. The type names its
//! collection and declares its id and indexes through [PotashEntity], and
//! converts itself to a [Value](crate::common::Value) through
//! [Convertible](crate::common::Convertible); the database mapper turns
//! that value into the stored document.
//!
//! A keyed repository stores the same type in a separate collection named
//! `entity+key`.

mod cursor;
mod default_object_repository;
mod entity;
mod repository;
mod repository_factory;
mod repository_operations;

pub use cursor::*;
pub use entity::*;
pub use repository::*;
pub(crate) use repository_factory::*;

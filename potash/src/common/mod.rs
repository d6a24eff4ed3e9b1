mod constants;
mod convertible;
mod event_bus;
mod fields;
mod lock;
mod mapper;
mod module;
mod persistent_collection;
pub(crate) mod security;
pub mod util;
mod value;

pub use constants::*;
pub use convertible::*;
pub use event_bus::*;
pub use fields::*;
pub use lock::*;
pub use mapper::*;
pub use module::*;
pub use persistent_collection::*;
pub use util::*;
pub use value::*;

//! Durable file storage for Potash.
//!
//! A database directory holds:
//!
//! - `potash.lock`, locked exclusively while the store is open;
//! - `potash.log`, the header `POTASHDB` + major + minor version (`u16`
//!   little endian each) followed by one `[u32 length][u32 crc32][payload]`
//!   frame per committed batch, the payload being the bincode encoding of
//!   the batch.
//!
//! Opening replays the log. A header or frame that fails validation makes
//! the open fail with `Corruption`.

mod codec;
mod config;
mod lock;
mod log_file;
mod module;
mod store;

pub use codec::FileCodecError;
pub use config::FileStoreConfig;
pub use module::*;
pub use store::FileStore;

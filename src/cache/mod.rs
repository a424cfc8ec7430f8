//! HTTP response cache.
//!
//! [`record::cache_of`] turns response headers into a born/death/gone
//! lifetime, [`file::CacheFile`] stores one response on disk and
//! [`manager::DiskCacheManager`] decides when to serve from the store.

pub mod control;
pub mod file;
pub mod manager;
pub mod record;

pub use control::{CacheControl, CacheFlag, CacheParam, MAX_DELTA_SECONDS};
pub use file::CacheFile;
pub use manager::{CacheManager, DiskCacheManager};
pub use record::{cache_of, CacheRecord};

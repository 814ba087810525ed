//! Durable local cache of the place list.
//!
//! Used as the fallback data source when the remote is unreachable, and
//! written through after every successful mutation.

pub mod manager;

pub use manager::{CacheManager, CachedData};

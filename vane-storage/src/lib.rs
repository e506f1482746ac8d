//! Vane Storage - Cache and Record Store
//!
//! Defines the storage abstraction layer for the weather service: the
//! durable [`RecordStore`] trait with its in-memory implementation, and
//! the fail-open cache layer. The Postgres record store lives in vane-api
//! alongside its connection pool.

pub mod cache;
pub mod store;

pub use cache::{
    CacheConfig, CacheKey, CacheStats, CacheStore, InMemoryCache, LmdbCache, LmdbCacheError,
    ReadThroughCache, DEFAULT_ENTRY_TTL,
};
pub use store::{MemoryRecordStore, RecordStore};

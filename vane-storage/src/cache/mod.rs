//! Cache layer with a uniform TTL and fail-open degradation.
//!
//! This module provides the read-through cache that sits in front of the
//! record store and the weather provider. The contract is deliberately
//! small:
//!
//! - Every entry expires on the same fixed TTL; there is no per-key tuning
//!   and no active refresh.
//! - Writers invalidate; they never repopulate. The next read misses and
//!   fetches fresh state.
//! - The cache is an optimization, not a dependency: any backend failure
//!   degrades to a slower uncached read, never to a request failure.
//!
//! Two backends implement [`CacheStore`]: [`InMemoryCache`] for a single
//! process and [`LmdbCache`] when cached weather should survive restarts.

pub mod key;
pub mod lmdb;
pub mod memory;
pub mod read_through;
pub mod traits;

pub use key::CacheKey;
pub use lmdb::{LmdbCache, LmdbCacheError};
pub use memory::InMemoryCache;
pub use read_through::{CacheConfig, ReadThroughCache, DEFAULT_ENTRY_TTL};
pub use traits::{CacheStats, CacheStore};

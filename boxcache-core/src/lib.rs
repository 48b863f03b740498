//! # boxcache-core
//!
//! Core implementation of a bounded, thread-safe, multi-policy associative
//! cache: a single hash table substrate shared by seven interchangeable
//! eviction/expiry policies (`None`, FIFO, LRU, LFU, RR, TTL, VTTL), plus a
//! function-level memoization wrapper with single-flight coordination.
//!
//! ## Module organization
//!
//! - [`entry`] — `Slot<V>`, the per-entry value + policy metadata wrapper
//! - [`error`] — `CacheError`, the one error type every operation surfaces
//! - [`policy`] — `Policy`, `PolicyState<K>`, and the eviction-selection helpers
//! - [`cache`] — `Cache<K, V, S>` and `CacheBuilder`, the map-like surface itself
//! - [`iter`] — generation-checked snapshot iteration
//! - [`serialize`] — versioned `save`/`load`
//! - [`memoize`] — `Cached<K, V>`, the sync single-flight memoization wrapper
//! - [`memoize_async`] (feature `async`) — `AsyncCached<K, V>`, its tokio counterpart
//! - [`memory_estimator`] — opt-in byte-size estimation for `cache_info()`
//! - [`stats`] (feature `stats`) — atomic hit/miss counters
mod cache;
mod entry;
mod error;
mod iter;
mod memoize;
mod memory_estimator;
mod policy;
mod serialize;

#[cfg(feature = "async")]
mod memoize_async;

#[cfg(feature = "stats")]
mod stats;

pub use cache::{Cache, CacheBuilder};
pub use entry::Slot;
pub use error::CacheError;
pub use iter::CacheIter;
pub use memoize::{CacheInfo, Cached, CopyLevel, DefaultKeyMaker, KeyMaker, HIT, MISS};
pub use memory_estimator::MemoryEstimator;
pub use policy::Policy;
pub use serialize::FORMAT_MAJOR;

#[cfg(feature = "async")]
pub use memoize_async::AsyncCached;

#[cfg(feature = "stats")]
pub use stats::CacheStats;

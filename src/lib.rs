//! # boxcache
//!
//! Bounded, thread-safe, in-process caches keyed by arbitrary hashable
//! values, with seven interchangeable eviction/expiry policies behind one
//! map-like type, plus a single-flight memoization wrapper on top.
//!
//! ## Policies
//!
//! - [`Policy::None`] — hard-bounded map, rejects insertion past `maxsize`
//! - [`Policy::Fifo`] — evicts the oldest-inserted entry
//! - [`Policy::Lru`] — evicts the least-recently-touched entry
//! - [`Policy::Lfu`] — evicts the minimum-frequency entry
//! - [`Policy::Rr`] — evicts a uniformly random entry
//! - [`Policy::Ttl`] — a single `ttl` applied to every entry
//! - [`Policy::Vttl`] — a per-key deadline set at insert time
//!
//! ## Quick start
//!
//! ```rust
//! use boxcache::Cache;
//!
//! let cache: Cache<&str, i32> = Cache::lru(2);
//! cache.insert("a", 1).unwrap();
//! cache.insert("b", 2).unwrap();
//! assert_eq!(cache.get(&"a"), Some(1));
//!
//! cache.insert("c", 3).unwrap(); // evicts "b" — "a" was just touched
//! assert!(!cache.contains(&"b"));
//! ```
//!
//! ## Memoization
//!
//! ```rust
//! use boxcache::{Cache, Cached};
//!
//! let cached: Cached<i32, i32> = Cached::new(Cache::lru(64));
//! let result = cached.call::<_, ()>(7, || Ok(7 * 7)).unwrap();
//! assert_eq!(*result, 49);
//! ```
pub use boxcache_core::*;

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

use dashmap::mapref::entry::Entry as DashEntry;
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::cache::Cache;
use crate::memoize::{CacheInfo, CopyLevel, HIT, MISS};

#[cfg(feature = "stats")]
use crate::memory_estimator::MemoryEstimator;

type Callback<K, V> = Arc<dyn Fn(u8, &K, &V) + Send + Sync>;

struct AsyncFlight<V> {
    result: Mutex<Option<Result<Arc<V>, String>>>,
    notify: Notify,
}

impl<V> AsyncFlight<V> {
    fn new() -> Self {
        Self {
            result: Mutex::new(None),
            notify: Notify::new(),
        }
    }
}

/// Async counterpart to [`crate::Cached`] with identical single-flight
/// semantics, but a follower suspends on a [`tokio::sync::Notify`] instead
/// of blocking an OS thread.
///
/// # Examples
///
/// ```
/// use boxcache_core::{AsyncCached, Cache};
///
/// # #[tokio::main]
/// # async fn main() {
/// let cached: AsyncCached<&str, i32> = AsyncCached::new(Cache::lru(16));
/// let v = cached.call::<_, _, ()>("pi", || async { Ok(314) }).await.unwrap();
/// assert_eq!(*v, 314);
/// # }
/// ```
pub struct AsyncCached<K, V, S = RandomState>
where
    K: Hash + Eq + Clone + Ord,
{
    pub cache: Cache<K, Arc<V>, S>,
    copy_level: CopyLevel,
    callback: Option<Callback<K, V>>,
    clear_reuse: bool,
    flights: DashMap<K, Arc<AsyncFlight<V>>>,
}

impl<K, V, S> AsyncCached<K, V, S>
where
    K: Hash + Eq + Clone + Ord + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    S: BuildHasher + Default,
{
    pub fn new(cache: Cache<K, Arc<V>, S>) -> Self {
        Self {
            cache,
            copy_level: CopyLevel::Never,
            callback: None,
            clear_reuse: false,
            flights: DashMap::new(),
        }
    }

    pub fn with_copy_level(mut self, level: CopyLevel) -> Self {
        self.copy_level = level;
        self
    }

    pub fn with_callback(mut self, callback: impl Fn(u8, &K, &V) + Send + Sync + 'static) -> Self {
        self.callback = Some(Arc::new(callback));
        self
    }

    /// Sets the default `reuse` behavior [`AsyncCached::cache_clear`] applies
    /// when called with no explicit override.
    pub fn with_clear_reuse(mut self, reuse: bool) -> Self {
        self.clear_reuse = reuse;
        self
    }

    fn emit(&self, event: u8, key: &K, value: &V) {
        if let Some(cb) = &self.callback {
            cb(event, key, value);
        }
    }

    fn copy_out(&self, arc: &Arc<V>) -> Arc<V> {
        match self.copy_level {
            CopyLevel::Never | CopyLevel::Shallow => arc.clone(),
            CopyLevel::Deep => Arc::new((**arc).clone()),
        }
    }

    /// Looks `key` up; on miss, awaits `compute` with single-flight
    /// coordination. A caller cancelled while awaiting a follower's
    /// [`Notify`] simply drops out without affecting the leader or other
    /// waiters.
    pub async fn call<F, Fut, E>(&self, key: K, compute: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<V, E>>,
        E: std::fmt::Display,
    {
        if let Some(hit) = self.cache.get(&key) {
            self.emit(HIT, &key, &hit);
            return Ok(self.copy_out(&hit));
        }

        let (flight, is_leader) = match self.flights.entry(key.clone()) {
            DashEntry::Occupied(e) => (e.get().clone(), false),
            DashEntry::Vacant(e) => {
                let flight = Arc::new(AsyncFlight::new());
                e.insert(flight.clone());
                (flight, true)
            }
        };

        if is_leader {
            let outcome = compute().await;
            let stringified: Result<Arc<V>, String> = match &outcome {
                Ok(v) => Ok(Arc::new(v.clone())),
                Err(e) => Err(e.to_string()),
            };
            *flight.result.lock() = Some(stringified);
            flight.notify.notify_waiters();
            self.flights.remove(&key);
            match outcome {
                Ok(v) => {
                    let arc = Arc::new(v);
                    let _ = self.cache.insert(key.clone(), arc.clone());
                    self.emit(MISS, &key, &arc);
                    Ok(self.copy_out(&arc))
                }
                Err(e) => {
                    tracing::trace!(error = %e, "async memoized call failed; result will not be cached");
                    Err(e)
                }
            }
        } else {
            drop(self.flights.get(&key));
            loop {
                let notified = flight.notify.notified();
                if let Some(result) = flight.result.lock().clone() {
                    return match result {
                        Ok(arc) => Ok(self.copy_out(&arc)),
                        Err(_) => match compute().await {
                            Ok(v) => {
                                let arc = Arc::new(v);
                                let _ = self.cache.insert(key.clone(), arc.clone());
                                self.emit(MISS, &key, &arc);
                                Ok(self.copy_out(&arc))
                            }
                            Err(e) => Err(e),
                        },
                    };
                }
                // The `Notified` future was constructed before this check, so
                // a `notify_waiters()` landing between the check above and
                // this await is still observed (tokio::sync::Notify's
                // documented "enroll before check" pattern).
                notified.await;
            }
        }
    }

    /// Derives the cache key from `args` via an injected [`crate::memoize::KeyMaker`],
    /// then behaves exactly like [`AsyncCached::call`].
    pub async fn call_keyed<M, Args, F, Fut, E>(&self, maker: &M, args: &Args, compute: F) -> Result<Arc<V>, E>
    where
        M: crate::memoize::KeyMaker<Args, Key = K>,
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<V, E>>,
        E: std::fmt::Display,
    {
        self.call(maker.make_key(args), compute).await
    }

    #[cfg(feature = "stats")]
    pub fn cache_info(&self) -> CacheInfo {
        let stats = self.cache.stats();
        CacheInfo {
            hits: stats.hits(),
            misses: stats.misses(),
            maxsize: self.cache.maxsize(),
            length: self.cache.len(),
            memory_bytes: None,
        }
    }

    /// Clears the backing cache and every in-flight computation, using the
    /// default `reuse` set via [`AsyncCached::with_clear_reuse`] (`false`
    /// unless overridden).
    pub fn cache_clear(&self) {
        self.cache_clear_with(self.clear_reuse);
    }

    /// Like [`AsyncCached::cache_clear`] but with an explicit `reuse` override.
    pub fn cache_clear_with(&self, reuse: bool) {
        self.cache.clear(reuse);
        self.flights.clear();
    }
}

#[cfg(feature = "stats")]
impl<K, V, S> AsyncCached<K, V, S>
where
    K: Hash + Eq + Clone + Ord + Send + Sync + 'static,
    V: Clone + Send + Sync + MemoryEstimator + 'static,
    S: BuildHasher + Default,
{
    pub fn cache_info_with_memory(&self) -> CacheInfo {
        let mut info = self.cache_info();
        let total: usize = self.cache.values().iter().map(|v| v.estimate_memory()).sum();
        info.memory_bytes = Some(total);
        info
    }
}

use std::collections::hash_map::DefaultHasher;
use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash, Hasher};
use std::sync::Arc;

use dashmap::mapref::entry::Entry as DashEntry;
use dashmap::DashMap;
use parking_lot::{Condvar, Mutex};

use crate::cache::Cache;

#[cfg(feature = "stats")]
use crate::memory_estimator::MemoryEstimator;

/// Integer code passed to a memoize callback on a cache miss.
pub const MISS: u8 = 0;
/// Integer code passed to a memoize callback on a cache hit.
pub const HIT: u8 = 1;

/// How aggressively [`Cached::call`] decouples a hit's return value from the
/// value stored in the backing cache.
///
/// Cached values live behind an `Arc<V>`; `Never`/`Shallow` both return a
/// clone of that `Arc` (an O(1) pointer bump — the natural zero-copy
/// behavior a Rust cache gets for free, since mutating through a returned
/// `Arc<V>` already requires `Arc::get_mut`/interior mutability and can't
/// silently corrupt the cached entry). `Deep` allocates a fresh `Arc` around
/// a clone of `V`, guaranteeing the caller holds the only reference. Rust's
/// `Clone` has no generic "shallow vs deep" distinction the way Python's
/// `copy`/`copy.deepcopy` do, so `Shallow` and `Never` coincide here; this is
/// a deliberate, documented simplification of the three-level knob.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CopyLevel {
    #[default]
    Never,
    Shallow,
    Deep,
}

/// A derives-the-key-from-arguments trait, injectable into call sites that
/// build their own key before calling [`Cached::call`].
///
/// The default implementation hashes `Args` into a single `u64`. A caller
/// wrapping a method just omits `self` from the `Args` it hands to the key
/// maker.
pub trait KeyMaker<Args: ?Sized> {
    type Key: Hash + Eq + Clone + Ord;
    fn make_key(&self, args: &Args) -> Self::Key;
}

/// Default [`KeyMaker`]: a stable `u64` hash of the arguments.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultKeyMaker;

impl<Args: Hash + ?Sized> KeyMaker<Args> for DefaultKeyMaker {
    type Key = u64;

    fn make_key(&self, args: &Args) -> u64 {
        let mut hasher = DefaultHasher::new();
        args.hash(&mut hasher);
        hasher.finish()
    }
}

type Callback<K, V> = Arc<dyn Fn(u8, &K, &V) + Send + Sync>;

struct Flight<V, E> {
    lock: Mutex<Option<Result<Arc<V>, E>>>,
    cond: Condvar,
}

impl<V, E> Flight<V, E> {
    fn new() -> Self {
        Self {
            lock: Mutex::new(None),
            cond: Condvar::new(),
        }
    }
}

/// Hit/miss/length/maxsize snapshot returned by [`Cached::cache_info`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CacheInfo {
    pub hits: u64,
    pub misses: u64,
    pub maxsize: usize,
    pub length: usize,
    pub memory_bytes: Option<usize>,
}

/// Function-level memoization wrapper with single-flight (cache-stampede)
/// coordination.
///
/// Wraps a backing [`Cache<K, Arc<V>>`]; concurrent callers for the same
/// key that miss block on a per-key [`Flight`] instead of all recomputing.
/// Exactly one caller (the "leader") invokes the supplied closure; the rest
/// ("followers") wait and receive the leader's result. A closure that
/// returns `Err` propagates that error to every waiter and is *not* cached —
/// the next call for that key retries.
///
/// # Examples
///
/// ```
/// use boxcache_core::{Cache, Cached};
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::sync::Arc;
///
/// let cached: Cached<&str, i32> = Cached::new(Cache::lru(16));
/// let calls = Arc::new(AtomicU32::new(0));
///
/// let c = calls.clone();
/// let first = cached.call::<_, ()>("pi", || {
///     c.fetch_add(1, Ordering::SeqCst);
///     Ok(314)
/// }).unwrap();
/// assert_eq!(*first, 314);
///
/// let c = calls.clone();
/// let second = cached.call::<_, ()>("pi", || {
///     c.fetch_add(1, Ordering::SeqCst);
///     Ok(271)
/// }).unwrap();
/// assert_eq!(*second, 314); // served from cache
/// assert_eq!(calls.load(Ordering::SeqCst), 1);
/// ```
pub struct Cached<K, V, S = RandomState>
where
    K: Hash + Eq + Clone + Ord,
{
    pub cache: Cache<K, Arc<V>, S>,
    copy_level: CopyLevel,
    callback: Option<Callback<K, V>>,
    clear_reuse: bool,
    flights: DashMap<K, Arc<Flight<V, String>>>,
}

impl<K, V, S> Cached<K, V, S>
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

    /// Sets the default `reuse` behavior [`Cached::cache_clear`] applies when
    /// called with no explicit override.
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

    /// Calls through, bypassing the cache entirely — the Rust analogue of
    /// the reserved `cachebox__ignore=True` call kwarg.
    pub fn call_ignoring_cache<F, E>(&self, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        compute()
    }

    /// Derives the cache key from `args` via an injected [`KeyMaker`], then
    /// behaves exactly like [`Cached::call`].
    ///
    /// The spec's "injectable key-maker" constructor option becomes, in
    /// Rust, a value the caller holds and passes per call rather than a
    /// type-erased closure stored on `Cached` itself — `K` is already a
    /// concrete type parameter here, so there is nothing to erase.
    pub fn call_keyed<M, Args, F, E>(&self, maker: &M, args: &Args, compute: F) -> Result<Arc<V>, E>
    where
        M: KeyMaker<Args, Key = K>,
        F: FnOnce() -> Result<V, E>,
        E: std::fmt::Display,
    {
        self.call(maker.make_key(args), compute)
    }

    /// Looks `key` up; on miss, coordinates single-flight computation of `compute`.
    pub fn call<F, E>(&self, key: K, compute: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
        E: std::fmt::Display,
    {
        if let Some(hit) = self.cache.get(&key) {
            self.emit(HIT, &key, &hit);
            return Ok(self.copy_out(&hit));
        }

        let (flight, is_leader) = match self.flights.entry(key.clone()) {
            DashEntry::Occupied(e) => (e.get().clone(), false),
            DashEntry::Vacant(e) => {
                let flight = Arc::new(Flight::new());
                e.insert(flight.clone());
                (flight, true)
            }
        };

        if is_leader {
            let outcome = compute();
            let stringified: Result<Arc<V>, String> = match &outcome {
                Ok(v) => Ok(Arc::new(v.clone())),
                Err(e) => Err(e.to_string()),
            };
            {
                let mut guard = flight.lock.lock();
                *guard = Some(stringified.clone());
                flight.cond.notify_all();
            }
            self.flights.remove(&key);
            match outcome {
                Ok(v) => {
                    let arc = Arc::new(v);
                    let _ = self.cache.insert(key.clone(), arc.clone());
                    self.emit(MISS, &key, &arc);
                    Ok(self.copy_out(&arc))
                }
                Err(e) => {
                    tracing::trace!(error = %e, "memoized call failed; result will not be cached");
                    Err(e)
                }
            }
        } else {
            drop(self.flights.get(&key));
            let mut guard = flight.lock.lock();
            while guard.is_none() {
                flight.cond.wait(&mut guard);
            }
            let result = guard.clone().unwrap();
            drop(guard);
            match result {
                Ok(arc) => Ok(self.copy_out(&arc)),
                // The leader's error can't be replayed verbatim (E isn't
                // storable behind the shared, non-generic Flight slot), and a
                // failed call is never cached anyway — the follower
                // recomputes with its own closure instead.
                Err(_) => match compute() {
                    Ok(v) => {
                        let arc = Arc::new(v);
                        let _ = self.cache.insert(key.clone(), arc.clone());
                        self.emit(MISS, &key, &arc);
                        Ok(self.copy_out(&arc))
                    }
                    Err(e) => Err(e),
                },
            }
        }
    }

    /// Hit/miss counters (feature `stats`), current length and `maxsize`.
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
    /// default `reuse` set via [`Cached::with_clear_reuse`] (`false` unless
    /// overridden).
    pub fn cache_clear(&self) {
        self.cache_clear_with(self.clear_reuse);
    }

    /// Like [`Cached::cache_clear`] but with an explicit `reuse` override.
    pub fn cache_clear_with(&self, reuse: bool) {
        self.cache.clear(reuse);
        self.flights.clear();
    }
}

#[cfg(feature = "stats")]
impl<K, V, S> Cached<K, V, S>
where
    K: Hash + Eq + Clone + Ord + Send + Sync + 'static,
    V: Clone + Send + Sync + MemoryEstimator + 'static,
    S: BuildHasher + Default,
{
    /// Like [`Cached::cache_info`] but with `memory_bytes` populated via `V: MemoryEstimator`.
    pub fn cache_info_with_memory(&self) -> CacheInfo {
        let mut info = self.cache_info();
        let total: usize = self.cache.values().iter().map(|v| v.estimate_memory()).sum();
        info.memory_bytes = Some(total);
        info
    }
}

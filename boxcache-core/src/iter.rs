use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash};

use crate::cache::Cache;
use crate::error::CacheError;

/// A snapshot-safe iterator over a cache's live entries at the moment of
/// creation. Ordering is unspecified beyond what the dedicated ordering
/// helpers (`first`, `least_recently_used`, …) guarantee.
///
/// Each `next()` call re-checks the cache's `generation` counter against the
/// value recorded at construction; any intervening mutation fails the whole
/// iteration fast with [`CacheError::ConcurrentModification`] rather than
/// yielding stale or duplicated items.
pub struct CacheIter<'a, K, V, S = RandomState> {
    cache: &'a Cache<K, V, S>,
    generation: u64,
    items: std::vec::IntoIter<(K, V)>,
    poisoned: bool,
}

impl<'a, K, V, S> CacheIter<'a, K, V, S>
where
    K: Hash + Eq + Clone + Ord,
    V: Clone,
    S: BuildHasher + Default,
{
    pub(crate) fn new(cache: &'a Cache<K, V, S>) -> Self {
        Self {
            generation: cache.generation(),
            items: cache.items().into_iter(),
            cache,
            poisoned: false,
        }
    }
}

impl<'a, K, V, S> Iterator for CacheIter<'a, K, V, S>
where
    K: Hash + Eq + Clone + Ord,
    V: Clone,
    S: BuildHasher + Default,
{
    type Item = Result<(K, V), CacheError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.poisoned {
            return None;
        }
        if self.cache.generation() != self.generation {
            self.poisoned = true;
            return Some(Err(CacheError::ConcurrentModification));
        }
        self.items.next().map(Ok)
    }
}

impl<K, V, S> Cache<K, V, S>
where
    K: Hash + Eq + Clone + Ord,
    V: Clone,
    S: BuildHasher + Default,
{
    /// Creates a generation-checked snapshot iterator.
    pub fn iter(&self) -> CacheIter<'_, K, V, S> {
        CacheIter::new(self)
    }
}

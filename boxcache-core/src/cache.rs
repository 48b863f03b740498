use std::collections::HashMap;
use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::entry::Slot;
use crate::error::CacheError;
use crate::policy::{find_min_frequency_key, random_live_key, Deadline, Policy, PolicyState};

#[cfg(feature = "stats")]
use crate::stats::CacheStats;

pub(crate) struct Inner<K, V, S> {
    pub(crate) map: HashMap<K, Slot<V>, S>,
    pub(crate) state: PolicyState<K>,
    /// Monotonic counter handing out tie-break values for VTTL's
    /// deadline-ordered `BTreeSet` (see `Deadline::seq`); unused by every
    /// other policy.
    pub(crate) next_seq: u64,
}

/// A bounded, thread-safe, associative cache with a pluggable eviction
/// policy.
///
/// All seven policies share this one type; the policy is a runtime value
/// chosen at construction (`Cache::fifo`, `Cache::lru`, …, or
/// [`CacheBuilder`]) rather than a type parameter, since callers routinely
/// need to swap policies without touching call sites. A single
/// [`parking_lot::RwLock`] guards the backing map *and* the policy's
/// auxiliary ring/index together — collapsing the original two-lock split
/// (`RwLock` map + `Mutex` order) into one lock.
///
/// # Examples
///
/// ```
/// use boxcache_core::Cache;
///
/// let cache: Cache<&str, i32> = Cache::fifo(2);
/// cache.insert("a", 1).unwrap();
/// cache.insert("b", 2).unwrap();
/// cache.insert("c", 3).unwrap();
///
/// assert!(!cache.contains(&"a"));
/// assert_eq!(cache.get(&"b"), Some(2));
/// assert_eq!(cache.popitem().unwrap(), ("b", 2));
/// ```
pub struct Cache<K, V, S = RandomState> {
    inner: RwLock<Inner<K, V, S>>,
    generation: AtomicU64,
    maxsize: usize,
    policy: Policy,
    ttl: Option<Duration>,
    #[cfg(feature = "stats")]
    stats: CacheStats,
}

fn effective(maxsize: usize) -> usize {
    if maxsize == 0 {
        usize::MAX
    } else {
        maxsize
    }
}

impl<K, V> Cache<K, V, RandomState>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// `Policy::None`: a hard-bounded map, no eviction. Insert past `maxsize` fails.
    pub fn none(maxsize: usize) -> Self {
        Self::with_policy(Policy::None, maxsize, None)
    }

    /// `Policy::Fifo`: evicts the oldest-inserted live entry.
    pub fn fifo(maxsize: usize) -> Self {
        Self::with_policy(Policy::Fifo, maxsize, None)
    }

    /// `Policy::Lru`: evicts the least-recently-touched entry.
    pub fn lru(maxsize: usize) -> Self {
        Self::with_policy(Policy::Lru, maxsize, None)
    }

    /// `Policy::Lfu`: evicts the minimum-frequency entry, ties broken by insertion order.
    pub fn lfu(maxsize: usize) -> Self {
        Self::with_policy(Policy::Lfu, maxsize, None)
    }

    /// `Policy::Rr`: evicts a uniformly random live entry.
    pub fn rr(maxsize: usize) -> Self {
        Self::with_policy(Policy::Rr, maxsize, None)
    }

    /// `Policy::Ttl`: a single uniform `ttl` applied to every entry.
    pub fn ttl(maxsize: usize, ttl: Duration) -> Result<Self, CacheError> {
        if ttl.is_zero() {
            return Err(CacheError::InvalidArgument("ttl must be > 0".into()));
        }
        Ok(Self::with_policy(Policy::Ttl, maxsize, Some(ttl)))
    }

    /// `Policy::Vttl`: a per-key deadline, set at insert time.
    pub fn vttl(maxsize: usize) -> Self {
        Self::with_policy(Policy::Vttl, maxsize, None)
    }

    fn with_policy(policy: Policy, maxsize: usize, ttl: Option<Duration>) -> Self {
        tracing::debug!(?policy, maxsize, "constructing cache");
        Self {
            inner: RwLock::new(Inner {
                map: HashMap::new(),
                state: PolicyState::new(policy),
                next_seq: 0,
            }),
            generation: AtomicU64::new(0),
            maxsize,
            policy,
            ttl,
            #[cfg(feature = "stats")]
            stats: CacheStats::new(),
        }
    }
}

impl<K, V, S> Cache<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Default,
{
    /// Like the policy constructors on `Cache<K, V, RandomState>` but with an
    /// explicit hasher, for callers who want e.g. `ahash` or a fixed-seed hasher.
    pub fn with_hasher(policy: Policy, maxsize: usize, ttl: Option<Duration>) -> Result<Self, CacheError> {
        if policy == Policy::Ttl {
            match ttl {
                Some(d) if !d.is_zero() => {}
                _ => return Err(CacheError::InvalidArgument("ttl must be > 0 for Policy::Ttl".into())),
            }
        }
        Ok(Self {
            inner: RwLock::new(Inner {
                map: HashMap::with_hasher(S::default()),
                state: PolicyState::new(policy),
                next_seq: 0,
            }),
            generation: AtomicU64::new(0),
            maxsize,
            policy,
            ttl,
            #[cfg(feature = "stats")]
            stats: CacheStats::new(),
        })
    }

    pub(crate) fn ttl_duration(&self) -> Option<Duration> {
        self.ttl
    }

    /// Live entries plus the policy's ring order, for [`crate::serialize`].
    /// `remaining` is populated for `Ttl`/`Vttl` entries (seconds until
    /// deadline) and `None` otherwise.
    pub(crate) fn snapshot_for_save(&self) -> (Vec<K>, Vec<(K, V, u64, Option<f64>)>) {
        let now = Instant::now();
        let guard = self.inner.read();
        let order: Vec<K> = guard
            .state
            .ring()
            .map(|r| r.iter().cloned().collect())
            .unwrap_or_else(|| guard.map.keys().cloned().collect());
        let entries = guard
            .map
            .iter()
            .filter(|(_, slot)| !self.expired_at(slot, now))
            .map(|(k, slot)| {
                let remaining = match self.policy {
                    Policy::Ttl | Policy::Vttl => Some(self.remaining_secs(slot, now)),
                    _ => None,
                };
                (k.clone(), slot.value.clone(), slot.frequency, remaining)
            })
            .collect();
        (order, entries)
    }

    /// Rebuilds a cache from a decoded save envelope (`crate::serialize::load`).
    /// `order` drives ring/insertion order; entries absent from `order` (should
    /// not happen for a well-formed envelope) are dropped rather than guessed at.
    pub(crate) fn from_parts(
        policy: Policy,
        maxsize: usize,
        ttl: Option<Duration>,
        order: Vec<K>,
        entries: Vec<(K, V, u64, Option<f64>)>,
    ) -> Self {
        let now = Instant::now();
        let mut lookup: HashMap<K, (V, u64, Option<f64>)> =
            entries.into_iter().map(|(k, v, freq, remaining)| (k, (v, freq, remaining))).collect();
        let mut map: HashMap<K, Slot<V>, S> = HashMap::with_hasher(S::default());
        let mut state = PolicyState::new(policy);
        let mut next_seq: u64 = 0;
        for key in order {
            if let Some((value, frequency, remaining)) = lookup.remove(&key) {
                let (inserted_at, deadline) = match policy {
                    Policy::Ttl => {
                        let ttl_dur = ttl.unwrap_or_default();
                        let elapsed = remaining
                            .map(|r| ttl_dur.saturating_sub(Duration::from_secs_f64(r.max(0.0))))
                            .unwrap_or(Duration::ZERO);
                        (now.checked_sub(elapsed).unwrap_or(now), None)
                    }
                    Policy::Vttl => (now, remaining.map(|r| now + Duration::from_secs_f64(r.max(0.0)))),
                    _ => (now, None),
                };
                if let PolicyState::Vttl(_, set) = &mut state {
                    if let Some(at) = deadline {
                        set.insert(Deadline { at, seq: next_seq, key: key.clone() });
                    }
                    next_seq += 1;
                }
                state.ring_push_back(key.clone());
                map.insert(key, Slot { value, inserted_at, frequency, deadline });
            }
        }
        Self {
            inner: RwLock::new(Inner { map, state, next_seq }),
            generation: AtomicU64::new(0),
            maxsize,
            policy,
            ttl,
            #[cfg(feature = "stats")]
            stats: CacheStats::new(),
        }
    }

    fn bump_generation(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// `0` if unbounded, else the configured bound — the caller's sentinel
    /// passed straight back (internally treated as `usize::MAX`).
    pub fn maxsize(&self) -> usize {
        self.maxsize
    }

    pub fn len(&self) -> usize {
        self.inner.read().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() >= effective(self.maxsize)
    }

    pub fn capacity(&self) -> usize {
        self.inner.read().map.capacity()
    }

    fn record_hit(&self) {
        #[cfg(feature = "stats")]
        self.stats.record_hit();
    }

    fn record_miss(&self) {
        #[cfg(feature = "stats")]
        self.stats.record_miss();
    }

    /// Returns a reference to this cache's hit/miss counters.
    #[cfg(feature = "stats")]
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    fn expired_at(&self, slot: &Slot<V>, now: Instant) -> bool {
        match self.policy {
            Policy::Ttl => slot.is_ttl_expired(self.ttl.unwrap_or_default(), now),
            Policy::Vttl => slot.is_vttl_expired(now),
            _ => false,
        }
    }

    /// Membership test, expiry-aware: an expired TTL/VTTL entry reports
    /// absent without being physically removed (removal happens on the next
    /// mutating operation, or via [`Cache::expire`]).
    pub fn contains(&self, key: &K) -> bool {
        let now = Instant::now();
        let guard = self.inner.read();
        guard
            .map
            .get(key)
            .is_some_and(|slot| !self.expired_at(slot, now))
    }

    /// Reads a value without touching recency/frequency.
    pub fn peek(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let guard = self.inner.read();
        guard.map.get(key).and_then(|slot| {
            if self.expired_at(slot, now) {
                None
            } else {
                Some(slot.value.clone())
            }
        })
    }

    /// Reads a value, touching recency (LRU) or frequency (LFU); removes and
    /// reports absent for an expired TTL/VTTL entry.
    ///
    /// Only `Lru`/`Lfu` hits (which mutate the ring/frequency counter) and
    /// expiry-driven removals take the exclusive lock and bump `generation`;
    /// every other policy's hit is a pure shared-lock read, like [`Cache::peek`].
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let touches_structure = matches!(self.policy, Policy::Lru | Policy::Lfu);

        if !touches_structure {
            let guard = self.inner.read();
            match guard.map.get(key) {
                None => {
                    drop(guard);
                    self.record_miss();
                    return None;
                }
                Some(slot) if !self.expired_at(slot, now) => {
                    let value = slot.value.clone();
                    drop(guard);
                    self.record_hit();
                    return Some(value);
                }
                Some(_) => {
                    // Expired — fall through to the exclusive path to remove it.
                }
            }
        }

        let mut guard = self.inner.write();
        let expired = guard
            .map
            .get(key)
            .is_some_and(|slot| self.expired_at(slot, now));
        if expired {
            guard.map.remove(key);
            guard.state.ring_remove(key);
            if let PolicyState::Vttl(_, set) = &mut guard.state {
                set.retain(|d| &d.key != key);
            }
            drop(guard);
            self.bump_generation();
            self.record_miss();
            return None;
        }
        let value = guard.map.get(key).map(|s| s.value.clone());
        match (&value, self.policy) {
            (Some(_), Policy::Lru) => {
                guard.state.ring_move_to_back(key);
                drop(guard);
                self.bump_generation();
                self.record_hit();
            }
            (Some(_), Policy::Lfu) => {
                if let Some(slot) = guard.map.get_mut(key) {
                    slot.increment_frequency();
                }
                drop(guard);
                self.bump_generation();
                self.record_hit();
            }
            (Some(_), _) => {
                // Reached only via the expiry-fallthrough race above: the
                // entry turned out to still be live once the exclusive lock
                // was taken (a concurrent insert refreshed it). No
                // structural touch, so no generation bump either.
                drop(guard);
                self.record_hit();
            }
            (None, _) => {
                // Absent, or a concurrent `delete`/`popitem` removed it
                // between the shared-lock peek and this exclusive recheck.
                drop(guard);
                self.record_miss();
            }
        }
        value
    }

    /// Like [`Cache::get`], returning `KeyNotFound` instead of `None`.
    pub fn index(&self, key: &K) -> Result<V, CacheError> {
        self.get(key).ok_or(CacheError::KeyNotFound)
    }

    /// Sweeps entries with an expired TTL/VTTL deadline. Returns the number removed.
    pub fn expire(&self) -> usize {
        if !matches!(self.policy, Policy::Ttl | Policy::Vttl) {
            return 0;
        }
        let now = Instant::now();
        let mut guard = self.inner.write();
        let removed = self.sweep_expired(&mut guard, now);
        drop(guard);
        if removed > 0 {
            self.bump_generation();
            tracing::trace!(removed, "expiry sweep");
        }
        removed
    }

    /// Removes every entry whose deadline has passed. Must be called under the write lock.
    fn sweep_expired(&self, guard: &mut Inner<K, V, S>, now: Instant) -> usize {
        let mut removed = 0;
        match self.policy {
            Policy::Ttl => {
                let ttl = self.ttl.unwrap_or_default();
                if let PolicyState::Ttl(ring) = &mut guard.state {
                    while let Some(key) = ring.front() {
                        let expired = guard
                            .map
                            .get(key)
                            .is_some_and(|slot| slot.is_ttl_expired(ttl, now));
                        if !expired {
                            break;
                        }
                        let key = ring.pop_front().unwrap();
                        guard.map.remove(&key);
                        removed += 1;
                    }
                }
            }
            Policy::Vttl => {
                if let PolicyState::Vttl(order, set) = &mut guard.state {
                    loop {
                        let due = match set.iter().next() {
                            Some(d) if d.at <= now => Some(d.key.clone()),
                            _ => None,
                        };
                        match due {
                            Some(key) => {
                                set.retain(|d| d.key != key);
                                if let Some(pos) = order.iter().position(|k| *k == key) {
                                    order.remove(pos);
                                }
                                guard.map.remove(&key);
                                removed += 1;
                            }
                            None => break,
                        }
                    }
                }
            }
            _ => {}
        }
        removed
    }

    fn evict_one(&self, guard: &mut Inner<K, V, S>) -> Option<(K, V)> {
        let victim = match self.policy {
            Policy::None => None,
            Policy::Fifo | Policy::Ttl => guard.state.ring().and_then(|r| r.front().cloned()),
            Policy::Lru => guard.state.ring().and_then(|r| r.front().cloned()),
            Policy::Lfu => guard
                .state
                .ring()
                .and_then(|r| find_min_frequency_key(&guard.map, r)),
            Policy::Rr => random_live_key(&guard.map),
            Policy::Vttl => match &guard.state {
                PolicyState::Vttl(order, set) => set
                    .iter()
                    .next()
                    .map(|d| d.key.clone())
                    .or_else(|| order.front().cloned()),
                _ => None,
            },
        }?;
        let value = guard.map.remove(&victim)?;
        guard.state.ring_remove(&victim);
        if let PolicyState::Vttl(_, set) = &mut guard.state {
            set.retain(|d| d.key != victim);
        }
        tracing::trace!(policy = ?self.policy, "evicted entry to respect maxsize");
        Some((victim, value.value))
    }

    fn deadline_for_insert(&self, explicit_ttl: Option<Duration>) -> Option<Instant> {
        match self.policy {
            Policy::Vttl => explicit_ttl.map(|d| Instant::now() + d),
            _ => None,
        }
    }

    /// Upserts `key` → `value`. Returns the previous value, if any.
    ///
    /// On `Policy::Vttl`, a plain `insert` (no explicit ttl) clears any prior
    /// deadline to "never" — see `DESIGN.md`'s Open Question 1 resolution.
    pub fn insert(&self, key: K, value: V) -> Result<Option<V>, CacheError> {
        self.insert_ttl(key, value, None)
    }

    /// `Policy::Vttl` insert with an explicit per-key deadline (`None` = never expires).
    /// Passing `Some(ttl)` against any other policy is an `InvalidArgument`.
    pub fn insert_ttl(&self, key: K, value: V, ttl: Option<Duration>) -> Result<Option<V>, CacheError> {
        if ttl.is_some() && self.policy != Policy::Vttl {
            return Err(CacheError::InvalidArgument(
                "per-call ttl is only accepted by Policy::Vttl".into(),
            ));
        }
        let now = Instant::now();
        let mut guard = self.inner.write();
        self.sweep_expired(&mut guard, now);

        let existed = guard.map.contains_key(&key);
        if !existed && guard.map.len() >= effective(self.maxsize) {
            if self.policy == Policy::None {
                drop(guard);
                tracing::trace!("insert rejected: cache full under Policy::None");
                return Err(CacheError::Overflow);
            }
            self.evict_one(&mut guard);
        }

        let deadline = self.deadline_for_insert(ttl);
        if matches!(guard.state, PolicyState::Vttl(_, _)) {
            let seq = guard.next_seq;
            guard.next_seq += 1;
            if let PolicyState::Vttl(_, set) = &mut guard.state {
                set.retain(|d| d.key != key);
                if let Some(at) = deadline {
                    set.insert(Deadline { at, seq, key: key.clone() });
                }
            }
        }
        let slot = Slot::with_deadline(value, deadline);
        let old = guard.map.insert(key.clone(), slot).map(|s| s.value);
        // On update of a present key, the ring position is left unchanged —
        // only a freshly-inserted key is appended (spec: FIFO's "node's
        // position is unchanged" on update, generalized to every ring-backed
        // policy since none of them define update as a touch either).
        if !existed {
            guard.state.ring_push_back(key);
        }
        drop(guard);
        self.bump_generation();
        Ok(old)
    }

    /// Inserts `default` only if `key` is absent; returns the value now stored.
    pub fn setdefault(&self, key: K, default: V) -> Result<V, CacheError> {
        if let Some(v) = self.get(&key) {
            return Ok(v);
        }
        self.insert(key, default.clone())?;
        Ok(default)
    }

    /// Removes `key`. `KeyNotFound` if absent.
    pub fn delete(&self, key: &K) -> Result<V, CacheError> {
        let mut guard = self.inner.write();
        let removed = guard.map.remove(key).ok_or(CacheError::KeyNotFound)?;
        guard.state.ring_remove(key);
        if let PolicyState::Vttl(_, set) = &mut guard.state {
            set.retain(|d| &d.key != key);
        }
        drop(guard);
        self.bump_generation();
        Ok(removed.value)
    }

    /// Removes `key`, returning `None` instead of erroring when absent.
    pub fn pop(&self, key: &K) -> Option<V> {
        self.delete(key).ok()
    }

    /// Removes and returns the policy-chosen eviction victim.
    /// `InvalidArgument` under `Policy::None`, `KeyNotFound` if empty.
    pub fn popitem(&self) -> Result<(K, V), CacheError> {
        if self.policy == Policy::None {
            return Err(CacheError::InvalidArgument(
                "popitem is not supported by Policy::None".into(),
            ));
        }
        let now = Instant::now();
        let mut guard = self.inner.write();
        self.sweep_expired(&mut guard, now);
        let victim = self.evict_one(&mut guard).ok_or(CacheError::KeyNotFound);
        drop(guard);
        if victim.is_ok() {
            self.bump_generation();
        }
        victim
    }

    /// Calls [`Cache::popitem`] up to `n` times. Returns the number actually removed.
    pub fn drain(&self, n: usize) -> Result<usize, CacheError> {
        if self.policy == Policy::None && n > 0 {
            return Err(CacheError::InvalidArgument(
                "drain is not supported by Policy::None".into(),
            ));
        }
        let mut removed = 0;
        for _ in 0..n {
            match self.popitem() {
                Ok(_) => removed += 1,
                Err(CacheError::KeyNotFound) => break,
                Err(e) => return Err(e),
            }
        }
        Ok(removed)
    }

    /// Bulk upsert.
    pub fn update<I: IntoIterator<Item = (K, V)>>(&self, iter: I) -> Result<(), CacheError> {
        for (k, v) in iter {
            self.insert(k, v)?;
        }
        Ok(())
    }

    /// Removes all entries. `reuse = true` preserves table capacity.
    pub fn clear(&self, reuse: bool) {
        let mut guard = self.inner.write();
        if reuse {
            guard.map.clear();
        } else {
            guard.map = HashMap::with_hasher(S::default());
        }
        guard.state = PolicyState::new(self.policy);
        drop(guard);
        self.bump_generation();
    }

    /// Reallocates the backing table to the smallest capacity holding `len()` entries.
    pub fn shrink_to_fit(&self) {
        let mut guard = self.inner.write();
        guard.map.shrink_to_fit();
        drop(guard);
        self.bump_generation();
    }

    /// Ensures capacity for `len() + extra` without resizing again immediately.
    pub fn reserve(&self, extra: usize) {
        let mut guard = self.inner.write();
        guard.map.reserve(extra);
    }

    fn live_snapshot(&self) -> Vec<(K, V)> {
        let now = Instant::now();
        let guard = self.inner.read();
        guard
            .map
            .iter()
            .filter(|(_, slot)| !self.expired_at(slot, now))
            .map(|(k, s)| (k.clone(), s.value.clone()))
            .collect()
    }

    pub fn keys(&self) -> Vec<K> {
        self.live_snapshot().into_iter().map(|(k, _)| k).collect()
    }

    pub fn values(&self) -> Vec<V> {
        self.live_snapshot().into_iter().map(|(_, v)| v).collect()
    }

    pub fn items(&self) -> Vec<(K, V)> {
        self.live_snapshot()
    }
}

// --- TTL / VTTL expiry-aware variants -------------------------------------------------

impl<K, V, S> Cache<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Default,
{
    pub(crate) fn remaining_secs(&self, slot: &Slot<V>, now: Instant) -> f64 {
        match self.policy {
            Policy::Ttl => {
                let ttl = self.ttl.unwrap_or_default();
                let deadline = slot.inserted_at + ttl;
                deadline
                    .checked_duration_since(now)
                    .map(|d| d.as_secs_f64())
                    .unwrap_or(0.0)
            }
            Policy::Vttl => match slot.deadline {
                None => 0.0,
                Some(d) => d.checked_duration_since(now).map(|d| d.as_secs_f64()).unwrap_or(0.0),
            },
            _ => 0.0,
        }
    }

    /// `(value, remaining_seconds)`; `(None, 0.0)` if absent or expired.
    pub fn get_with_expire(&self, key: &K) -> (Option<V>, f64) {
        let now = Instant::now();
        let value = self.get(key);
        if value.is_none() {
            return (None, 0.0);
        }
        let guard = self.inner.read();
        let remaining = guard.map.get(key).map(|s| self.remaining_secs(s, now)).unwrap_or(0.0);
        (value, remaining)
    }

    /// Removes `key`, returning `(value, remaining_seconds_at_removal_time)`.
    pub fn pop_with_expire(&self, key: &K) -> (Option<V>, f64) {
        let now = Instant::now();
        let mut guard = self.inner.write();
        let removed = guard.map.remove(key);
        guard.state.ring_remove(key);
        if let PolicyState::Vttl(_, set) = &mut guard.state {
            set.retain(|d| &d.key != key);
        }
        drop(guard);
        match removed {
            Some(slot) => {
                self.bump_generation();
                let remaining = self.remaining_secs(&slot, now);
                (Some(slot.value), remaining)
            }
            None => (None, 0.0),
        }
    }

    /// `popitem` variant surfacing `(key, value, remaining_seconds)`.
    pub fn popitem_with_expire(&self) -> Result<(K, V, f64), CacheError> {
        let now = Instant::now();
        let mut guard = self.inner.write();
        self.sweep_expired(&mut guard, now);
        let victim = match self.policy {
            Policy::Ttl => guard.state.ring().and_then(|r| r.front().cloned()),
            Policy::Vttl => match &guard.state {
                PolicyState::Vttl(order, set) => set
                    .iter()
                    .next()
                    .map(|d| d.key.clone())
                    .or_else(|| order.front().cloned()),
                _ => None,
            },
            _ => None,
        };
        let key = victim.ok_or(CacheError::KeyNotFound)?;
        let slot = guard.map.remove(&key).ok_or(CacheError::KeyNotFound)?;
        guard.state.ring_remove(&key);
        if let PolicyState::Vttl(_, set) = &mut guard.state {
            set.retain(|d| d.key != key);
        }
        drop(guard);
        self.bump_generation();
        Ok((key, slot.value.clone(), self.remaining_secs(&slot, now)))
    }

    /// Snapshot of every live VTTL entry with its remaining seconds (0.0 if "never").
    pub fn items_with_expire(&self) -> Vec<(K, V, f64)> {
        let now = Instant::now();
        let guard = self.inner.read();
        guard
            .map
            .iter()
            .filter(|(_, slot)| !self.expired_at(slot, now))
            .map(|(k, s)| (k.clone(), s.value.clone(), self.remaining_secs(s, now)))
            .collect()
    }

    /// Snapshot of every live LFU entry with its frequency counter.
    pub fn items_with_frequency(&self) -> Vec<(K, V, u64)> {
        let guard = self.inner.read();
        guard
            .map
            .iter()
            .map(|(k, s)| (k.clone(), s.value.clone(), s.frequency))
            .collect()
    }
}

// --- ordering helpers (Fifo/Ttl/Lru/Lfu/Rr) -------------------------------------------

impl<K, V, S> Cache<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Default,
{
    /// Oldest-first rank-`n` key for `Fifo`/`Ttl`/`Vttl` (insertion order).
    pub fn first(&self, n: usize) -> Option<K> {
        let guard = self.inner.read();
        match self.policy {
            Policy::Fifo | Policy::Ttl | Policy::Vttl => guard.state.ring().and_then(|r| r.get(n).cloned()),
            _ => None,
        }
    }

    /// Newest key for `Fifo`/`Ttl`/`Vttl`.
    pub fn last(&self) -> Option<K> {
        let guard = self.inner.read();
        match self.policy {
            Policy::Fifo | Policy::Ttl | Policy::Vttl => guard.state.ring().and_then(|r| r.back().cloned()),
            _ => None,
        }
    }

    /// Rank-`n` key from the LRU head (least-recently-used first).
    pub fn least_recently_used(&self, n: usize) -> Option<K> {
        let guard = self.inner.read();
        guard.state.ring().and_then(|r| r.get(n).cloned())
    }

    /// The most-recently-touched key under `Policy::Lru`.
    pub fn most_recently_used(&self) -> Option<K> {
        let guard = self.inner.read();
        guard.state.ring().and_then(|r| r.back().cloned())
    }

    /// Rank-`n` key in ascending frequency order under `Policy::Lfu`.
    pub fn least_frequently_used(&self, n: usize) -> Option<K> {
        let guard = self.inner.read();
        let ring = guard.state.ring()?;
        let mut scored: Vec<(u64, usize, &K)> = ring
            .iter()
            .enumerate()
            .filter_map(|(i, k)| guard.map.get(k).map(|s| (s.frequency, i, k)))
            .collect();
        scored.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));
        scored.get(n).map(|(_, _, k)| (*k).clone())
    }

    /// A uniformly random live key, without evicting it.
    pub fn random_key(&self) -> Option<K> {
        let guard = self.inner.read();
        random_live_key(&guard.map)
    }
}

impl<K, V, S> PartialEq for Cache<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone + PartialEq,
    S: BuildHasher + Default,
{
    /// Two caches compare equal iff they hold the same key→value pairs (order-insensitive).
    fn eq(&self, other: &Self) -> bool {
        let a = self.inner.read();
        let b = other.inner.read();
        if a.map.len() != b.map.len() {
            return false;
        }
        a.map.iter().all(|(k, slot)| b.map.get(k).is_some_and(|o| o.value == slot.value))
    }
}

/// Builder for [`Cache`], centralizing the validation that used to be
/// spread across `GlobalCache::new`'s seven positional parameters.
///
/// # Examples
///
/// ```
/// use boxcache_core::{CacheBuilder, Policy};
/// use std::time::Duration;
///
/// let cache = CacheBuilder::<&str, i32>::new(Policy::Ttl)
///     .maxsize(10)
///     .ttl(Duration::from_secs(30))
///     .build()
///     .unwrap();
/// assert_eq!(cache.maxsize(), 10);
/// ```
pub struct CacheBuilder<K, V> {
    policy: Policy,
    maxsize: usize,
    ttl: Option<Duration>,
    capacity: usize,
    preload: Vec<(K, V)>,
}

impl<K, V> CacheBuilder<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    pub fn new(policy: Policy) -> Self {
        Self {
            policy,
            maxsize: 0,
            ttl: None,
            capacity: 0,
            preload: Vec::new(),
        }
    }

    pub fn maxsize(mut self, maxsize: usize) -> Self {
        self.maxsize = maxsize;
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn preload<I: IntoIterator<Item = (K, V)>>(mut self, iter: I) -> Self {
        self.preload.extend(iter);
        self
    }

    pub fn build(self) -> Result<Cache<K, V, RandomState>, CacheError> {
        if self.policy == Policy::Ttl {
            match self.ttl {
                Some(d) if !d.is_zero() => {}
                _ => return Err(CacheError::InvalidArgument("ttl must be > 0 for Policy::Ttl".into())),
            }
        }
        if !self.preload.is_empty() && self.policy == Policy::None && self.maxsize != 0 && self.preload.len() > self.maxsize {
            return Err(CacheError::Overflow);
        }
        let cache = Cache::<K, V, RandomState>::with_hasher(self.policy, self.maxsize, self.ttl)?;
        if self.capacity > 0 {
            cache.reserve(self.capacity);
        }
        for (k, v) in self.preload {
            cache.insert(k, v)?;
        }
        Ok(cache)
    }
}

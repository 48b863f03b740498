use std::collections::{BTreeSet, VecDeque};
use std::hash::{BuildHasher, Hash};
use std::time::Instant;

use crate::entry::Slot;

/// Which eviction/expiry policy a [`crate::Cache`] was built with.
///
/// This is the runtime tag; [`PolicyState`] carries the matching auxiliary
/// structure. Extends the original two-variant `EvictionPolicy` (FIFO/LRU)
/// to the seven this crate supports.
///
/// # Examples
///
/// ```
/// use boxcache_core::Policy;
///
/// assert_eq!(Policy::default(), Policy::None);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Policy {
    /// Rejects insertion past `maxsize`; no `popitem`/`drain`.
    None,
    /// Evicts the oldest-inserted entry.
    Fifo,
    /// Evicts the least-recently-touched entry; reads move the key to MRU.
    Lru,
    /// Evicts the minimum-frequency entry, ties broken by insertion order.
    Lfu,
    /// Evicts a uniformly random live entry.
    Rr,
    /// Single uniform `ttl`; insertion order doubles as expiry order.
    Ttl,
    /// Per-key deadline; deadline-ordered index with lazy expiry.
    Vttl,
}

impl Default for Policy {
    fn default() -> Self {
        Policy::None
    }
}

/// A `(deadline, sequence)` pair ordered by deadline first, then by
/// insertion sequence — the VTTL counterpart to `jaemk-cached`'s
/// `stores::expiring_sized::Stamped`, minus the `Arc` wrapper since `K:
/// Clone` already holds here. Ties break on `seq` (a per-cache monotonic
/// counter assigned at insert time) rather than on `K` itself, so this
/// carries no ordering requirement on the key type.
#[derive(Clone, Debug)]
pub struct Deadline<K> {
    pub at: Instant,
    pub seq: u64,
    pub key: K,
}

impl<K> PartialEq for Deadline<K> {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}
impl<K> Eq for Deadline<K> {}

impl<K> PartialOrd for Deadline<K> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl<K> Ord for Deadline<K> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.at.cmp(&other.at).then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Policy-specific auxiliary structure, kept alongside the hash table.
///
/// `Fifo`/`Lru`/`Ttl` share a `VecDeque<K>` ring (insertion or recency
/// order); `Lfu` keeps the same shape purely to break eviction ties by
/// insertion order; `Vttl` keeps its own insertion-order ring *and* a
/// deadline-ordered `BTreeSet` side index; `None`/`Rr` need nothing beyond
/// the table itself.
pub(crate) enum PolicyState<K> {
    None,
    Fifo(VecDeque<K>),
    Lru(VecDeque<K>),
    Lfu(VecDeque<K>),
    Rr,
    Ttl(VecDeque<K>),
    Vttl(VecDeque<K>, BTreeSet<Deadline<K>>),
}

impl<K> PolicyState<K> {
    pub(crate) fn new(policy: Policy) -> Self {
        match policy {
            Policy::None => PolicyState::None,
            Policy::Fifo => PolicyState::Fifo(VecDeque::new()),
            Policy::Lru => PolicyState::Lru(VecDeque::new()),
            Policy::Lfu => PolicyState::Lfu(VecDeque::new()),
            Policy::Rr => PolicyState::Rr,
            Policy::Ttl => PolicyState::Ttl(VecDeque::new()),
            Policy::Vttl => PolicyState::Vttl(VecDeque::new(), BTreeSet::new()),
        }
    }
}

impl<K: Clone + Eq> PolicyState<K> {
    /// The insertion/recency ring, for every policy that keeps one —
    /// including `Vttl`'s insertion-order ring (`first`/`last` read this;
    /// the `BTreeSet` side index is deadline-ordered, not insertion-ordered).
    pub(crate) fn ring_mut(&mut self) -> Option<&mut VecDeque<K>> {
        match self {
            PolicyState::Fifo(r) | PolicyState::Lru(r) | PolicyState::Lfu(r) | PolicyState::Ttl(r) => Some(r),
            PolicyState::Vttl(r, _) => Some(r),
            PolicyState::None | PolicyState::Rr => None,
        }
    }

    pub(crate) fn ring(&self) -> Option<&VecDeque<K>> {
        match self {
            PolicyState::Fifo(r) | PolicyState::Lru(r) | PolicyState::Lfu(r) | PolicyState::Ttl(r) => Some(r),
            PolicyState::Vttl(r, _) => Some(r),
            PolicyState::None | PolicyState::Rr => None,
        }
    }

    /// Appends `key` to the back of the ring (new / most-recent position),
    /// removing any prior occurrence first so a re-insert doesn't duplicate it.
    pub(crate) fn ring_push_back(&mut self, key: K) {
        if let Some(ring) = self.ring_mut() {
            if let Some(pos) = ring.iter().position(|k| *k == key) {
                ring.remove(pos);
            }
            ring.push_back(key);
        }
    }

    /// Moves an existing key to the back of the ring (LRU touch). No-op if absent.
    pub(crate) fn ring_move_to_back(&mut self, key: &K) {
        if let Some(ring) = self.ring_mut() {
            if let Some(pos) = ring.iter().position(|k| k == key) {
                let k = ring.remove(pos).unwrap();
                ring.push_back(k);
            }
        }
    }

    pub(crate) fn ring_remove(&mut self, key: &K) {
        if let Some(ring) = self.ring_mut() {
            if let Some(pos) = ring.iter().position(|k| k == key) {
                ring.remove(pos);
            }
        }
    }
}

/// Finds the key with the minimum frequency in `ring`, tie-broken by the
/// ring's own (insertion) order — the older entry wins the tie.
pub(crate) fn find_min_frequency_key<K, V, S>(
    map: &std::collections::HashMap<K, Slot<V>, S>,
    ring: &VecDeque<K>,
) -> Option<K>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    let mut best: Option<(&K, u64)> = None;
    for key in ring {
        if let Some(slot) = map.get(key) {
            match best {
                Some((_, freq)) if freq <= slot.frequency => {}
                _ => best = Some((key, slot.frequency)),
            }
        }
    }
    best.map(|(k, _)| k.clone())
}

/// Picks a uniformly random live key from `map` for RR eviction / `random_key()`.
pub(crate) fn random_live_key<K, V, S>(map: &std::collections::HashMap<K, Slot<V>, S>) -> Option<K>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    let len = map.len();
    if len == 0 {
        return None;
    }
    let idx = fastrand::usize(..len);
    map.keys().nth(idx).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_policy_is_none() {
        assert_eq!(Policy::default(), Policy::None);
    }

    #[test]
    fn ring_push_back_dedupes_prior_position() {
        let mut state: PolicyState<&str> = PolicyState::new(Policy::Fifo);
        state.ring_push_back("a");
        state.ring_push_back("b");
        state.ring_push_back("a");
        assert_eq!(state.ring().unwrap().iter().collect::<Vec<_>>(), vec![&"b", &"a"]);
    }

    #[test]
    fn ring_move_to_back_reorders() {
        let mut state: PolicyState<&str> = PolicyState::new(Policy::Lru);
        state.ring_push_back("a");
        state.ring_push_back("b");
        state.ring_move_to_back(&"a");
        assert_eq!(state.ring().unwrap().iter().collect::<Vec<_>>(), vec![&"b", &"a"]);
    }

    #[test]
    fn min_frequency_tie_break_prefers_insertion_order() {
        let mut map = HashMap::new();
        map.insert("a", Slot::new(1));
        map.insert("b", Slot::new(2));
        let ring: VecDeque<&str> = VecDeque::from(["a", "b"]);
        // equal frequency (both default to 1): "a" was inserted first, wins the tie.
        assert_eq!(find_min_frequency_key(&map, &ring), Some("a"));
    }

    #[test]
    fn min_frequency_picks_lower_counter() {
        let mut map = HashMap::new();
        map.insert("a", Slot::new(1));
        map.get_mut("a").unwrap().frequency = 5;
        map.insert("b", Slot::new(2));
        let ring: VecDeque<&str> = VecDeque::from(["a", "b"]);
        assert_eq!(find_min_frequency_key(&map, &ring), Some("b"));
    }

    #[test]
    fn deadline_orders_by_time_then_sequence() {
        let t0 = Instant::now();
        let d1 = Deadline { at: t0, seq: 1, key: "b" };
        let d2 = Deadline { at: t0, seq: 0, key: "a" };
        let d3 = Deadline { at: t0 + std::time::Duration::from_secs(1), seq: 0, key: "a" };
        assert!(d2 < d1);
        assert!(d1 < d3);
    }
}

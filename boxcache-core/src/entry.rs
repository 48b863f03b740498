use std::time::Instant;

/// Internal wrapper that tracks policy metadata alongside a cached value.
///
/// Every policy shares this one entry shape; unused fields simply stay at
/// their defaults (e.g. `frequency` is never read outside LFU, `deadline` is
/// only populated by VTTL). Generalizes the original single-purpose
/// `CacheEntry<R>` with a `deadline` field for per-key TTL.
///
/// # Examples
///
/// ```
/// use boxcache_core::Slot;
///
/// let slot = Slot::new(42);
/// assert_eq!(slot.value, 42);
/// assert_eq!(slot.frequency, 1);
/// assert!(slot.deadline.is_none());
/// ```
#[derive(Clone, Debug)]
pub struct Slot<V> {
    pub value: V,
    pub inserted_at: Instant,
    pub frequency: u64,
    pub deadline: Option<Instant>,
}

impl<V> Slot<V> {
    /// Creates a new slot with the current timestamp and a frequency of 1 —
    /// an entry is "used" by virtue of being inserted, so every live LFU
    /// entry has frequency at least 1.
    pub fn new(value: V) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
            frequency: 1,
            deadline: None,
        }
    }

    /// Creates a slot carrying an explicit VTTL deadline.
    pub fn with_deadline(value: V, deadline: Option<Instant>) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
            frequency: 1,
            deadline,
        }
    }

    /// True once `now` has passed a uniform TTL computed from `inserted_at + ttl`.
    pub fn is_ttl_expired(&self, ttl: std::time::Duration, now: Instant) -> bool {
        now.checked_duration_since(self.inserted_at)
            .is_some_and(|age| age >= ttl)
    }

    /// True once `now` has passed this entry's own deadline (VTTL). Entries
    /// with `deadline = None` ("never") are never expired.
    pub fn is_vttl_expired(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }

    pub fn increment_frequency(&mut self) {
        self.frequency = self.frequency.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn new_slot_has_frequency_one() {
        let slot = Slot::new("x");
        assert_eq!(slot.frequency, 1);
        assert!(slot.deadline.is_none());
    }

    #[test]
    fn ttl_expiry_is_monotonic_in_age() {
        let slot = Slot::new(1);
        let now = slot.inserted_at + Duration::from_secs(2);
        assert!(!slot.is_ttl_expired(Duration::from_secs(3), now));
        assert!(slot.is_ttl_expired(Duration::from_secs(1), now));
    }

    #[test]
    fn vttl_never_expires_without_deadline() {
        let slot = Slot::with_deadline(1, None);
        assert!(!slot.is_vttl_expired(Instant::now() + Duration::from_secs(3600)));
    }

    #[test]
    fn vttl_expires_at_deadline() {
        let deadline = Instant::now();
        let slot = Slot::with_deadline(1, Some(deadline));
        assert!(slot.is_vttl_expired(deadline + Duration::from_millis(1)));
        assert!(!slot.is_vttl_expired(deadline - Duration::from_millis(1)));
    }

    #[test]
    fn increment_frequency_saturates() {
        let mut slot = Slot::new(1);
        slot.frequency = u64::MAX;
        slot.increment_frequency();
        assert_eq!(slot.frequency, u64::MAX);
    }
}

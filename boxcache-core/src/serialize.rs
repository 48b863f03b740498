use std::hash::{BuildHasher, Hash};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::cache::Cache;
use crate::error::CacheError;
use crate::policy::Policy;

/// Bumped on any change that makes an older `load` unable to read a newer
/// `save` (or vice versa) — a new entry field, a changed encoding. Loading a
/// different major version fails deterministically rather than attempting
/// a best-effort read.
pub const FORMAT_MAJOR: u32 = 1;
const FORMAT_MINOR: u32 = 0;

#[derive(Serialize, Deserialize)]
struct Envelope<K, V> {
    major: u32,
    minor: u32,
    policy: Policy,
    maxsize: usize,
    ttl_secs: Option<f64>,
    order: Vec<K>,
    entries: Vec<(K, V, u64, Option<f64>)>,
}

impl<K, V, S> Cache<K, V, S>
where
    K: Hash + Eq + Clone + Ord + Serialize + DeserializeOwned,
    V: Clone + Serialize + DeserializeOwned,
    S: BuildHasher + Default,
{
    /// Byte-stable save including policy metadata (frequencies, insertion
    /// order, deadlines). Expired entries are dropped, not saved.
    pub fn save(&self) -> Result<Vec<u8>, CacheError> {
        let (order, entries) = self.snapshot_for_save();
        let envelope = Envelope {
            major: FORMAT_MAJOR,
            minor: FORMAT_MINOR,
            policy: self.policy(),
            maxsize: self.maxsize(),
            ttl_secs: self.ttl_duration().map(|d| d.as_secs_f64()),
            order,
            entries,
        };
        bincode::serialize(&envelope).map_err(|e| CacheError::SerializationError(e.to_string()))
    }

    /// Loads a cache previously produced by [`Cache::save`]. Fails with
    /// `SerializationError` on a corrupted stream or a `major` version this
    /// build doesn't understand — never silently reinterprets the bytes.
    pub fn load(bytes: &[u8]) -> Result<Self, CacheError> {
        let envelope: Envelope<K, V> =
            bincode::deserialize(bytes).map_err(|e| CacheError::SerializationError(e.to_string()))?;
        if envelope.major != FORMAT_MAJOR {
            return Err(CacheError::SerializationError(format!(
                "incompatible save format: major version {} (this build reads major version {})",
                envelope.major, FORMAT_MAJOR
            )));
        }
        let ttl = envelope.ttl_secs.map(Duration::from_secs_f64);
        if envelope.policy == Policy::Ttl && ttl.is_none() {
            return Err(CacheError::SerializationError(
                "corrupted stream: Ttl cache saved without a ttl".into(),
            ));
        }
        Ok(Cache::from_parts(envelope.policy, envelope.maxsize, ttl, envelope.order, envelope.entries))
    }
}

use thiserror::Error;

/// Errors surfaced by cache operations.
///
/// Cache operations return these directly; nothing here is wrapped further
/// up the call stack. Expiry sweeps never raise one of these — they are a
/// silent, best-effort housekeeping pass.
///
/// # Examples
///
/// ```
/// use boxcache_core::CacheError;
///
/// let err = CacheError::KeyNotFound;
/// assert_eq!(err.to_string(), "key not found");
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// `index`/`delete`/`popitem` against an absent key.
    #[error("key not found")]
    KeyNotFound,

    /// Insert into a non-evicting (`Policy::None`) cache that is already at `maxsize`.
    #[error("cache is full (maxsize reached) and the policy does not evict")]
    Overflow,

    /// A constructor or call argument violates its contract (negative maxsize,
    /// non-positive ttl, `popitem`/`drain` on a no-policy cache, an explicit
    /// `ttl` on a plain VTTL index-assignment).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An iterator observed a `generation` change since it was created.
    #[error("cache changed during iteration")]
    ConcurrentModification,

    /// `save`/`load` hit an incompatible format version or a corrupted stream.
    #[error("serialization error: {0}")]
    SerializationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_stable() {
        assert_eq!(CacheError::KeyNotFound.to_string(), "key not found");
        assert_eq!(
            CacheError::Overflow.to_string(),
            "cache is full (maxsize reached) and the policy does not evict"
        );
        assert_eq!(
            CacheError::InvalidArgument("ttl must be > 0".into()).to_string(),
            "invalid argument: ttl must be > 0"
        );
        assert_eq!(
            CacheError::ConcurrentModification.to_string(),
            "cache changed during iteration"
        );
        assert_eq!(
            CacheError::SerializationError("bad magic".into()).to_string(),
            "serialization error: bad magic"
        );
    }

    #[test]
    fn errors_are_cloneable_and_comparable() {
        let a = CacheError::InvalidArgument("x".into());
        let b = a.clone();
        assert_eq!(a, b);
    }
}

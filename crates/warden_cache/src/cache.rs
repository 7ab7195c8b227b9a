//! TTL cache implementation.

use derive_getters::Getters;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Initial number of slots reserved by [`ResponseCache::new`].
pub const DEFAULT_CAPACITY: usize = 256;

/// Cache entry with value and expiration.
#[derive(Debug, Clone, Getters)]
pub struct CacheEntry {
    value: String,
    created_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    /// An entry is expired once `now >= created_at + ttl`.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.created_at.checked_add(self.ttl) {
            Some(expires_at) => now >= expires_at,
            None => false,
        }
    }

    /// Remaining time until expiration.
    pub fn time_remaining_at(&self, now: Instant) -> Option<Duration> {
        self.ttl
            .checked_sub(now.saturating_duration_since(self.created_at))
            .filter(|remaining| !remaining.is_zero())
    }
}

/// Cache for rendered command answers.
///
/// Reads take a shared lock and writes an exclusive one; neither holds the
/// lock for longer than a map lookup and one expiry comparison.
///
/// Expired entries are ignored on read but never removed, and there is no
/// size limit. Memory therefore grows with the number of distinct keys seen
/// during the process lifetime. Keys are day-granular query windows, which
/// keeps that growth small in practice.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use warden_cache::ResponseCache;
///
/// let cache = ResponseCache::new();
/// cache.insert("duty:2024-03-04_2024-03-05", "ann is on duty", Duration::from_secs(60));
///
/// assert_eq!(
///     cache.get("duty:2024-03-04_2024-03-05").as_deref(),
///     Some("ann is on duty")
/// );
/// assert!(cache.get("duty:2024-03-05_2024-03-06").is_none());
/// ```
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    /// Create a cache with [`DEFAULT_CAPACITY`] preallocated slots.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a cache with `capacity` preallocated slots.
    pub fn with_capacity(capacity: usize) -> Self {
        tracing::debug!(capacity, "Creating new ResponseCache");
        Self {
            entries: RwLock::new(HashMap::with_capacity(capacity)),
        }
    }

    /// Get a cached value.
    ///
    /// Missing and expired keys are indistinguishable: both return `None`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.get_at(key, Instant::now())
    }

    /// Get a cached value as seen at `now`.
    #[tracing::instrument(skip(self, now), fields(key = %key))]
    pub fn get_at(&self, key: &str, now: Instant) -> Option<String> {
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        if entry.is_expired_at(now) {
            tracing::debug!("Cache entry expired");
            return None;
        }

        tracing::debug!(time_remaining = ?entry.time_remaining_at(now), "Cache hit");
        Some(entry.value.clone())
    }

    /// Store `value` under `key` for `ttl`, replacing any previous entry.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>, ttl: Duration) {
        self.insert_at(key, value, ttl, Instant::now());
    }

    /// Store `value` under `key` as if written at `now`.
    pub fn insert_at(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
        ttl: Duration,
        now: Instant,
    ) {
        let key = key.into();
        let entry = CacheEntry {
            value: value.into(),
            created_at: now,
            ttl,
        };

        tracing::debug!(key = %key, ttl = ?ttl, "Inserted entry into cache");
        self.entries.write().insert(key, entry);
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_expiry_boundary() {
        let now = Instant::now();
        let entry = CacheEntry {
            value: "v".into(),
            created_at: now,
            ttl: Duration::from_secs(10),
        };
        assert!(!entry.is_expired_at(now + Duration::from_secs(9)));
        assert!(entry.is_expired_at(now + Duration::from_secs(10)));
        assert_eq!(entry.time_remaining_at(now + Duration::from_secs(4)), Some(Duration::from_secs(6)));
        assert_eq!(entry.time_remaining_at(now + Duration::from_secs(10)), None);
    }
}

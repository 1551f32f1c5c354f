//! Caller-owned caching with per-entry TTLs
//!
//! The analysis engine never caches. Callers that fetch the same repository
//! repeatedly wrap their source in a [`CachedClient`] backed by whatever
//! [`Cache`] they own.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::clock::{Clock, SystemClock};
use crate::error::SourceError;
use crate::model::ActivitySnapshot;
use crate::platform::{PlatformClient, RepoIdentity};

/// Default time-to-live for cached entries (5 minutes)
pub const DEFAULT_TTL_SECS: i64 = 5 * 60;

/// Key/value cache with expiry
pub trait Cache<V> {
    /// Fetch a live entry; expired entries behave as missing
    fn get(&self, key: &str) -> Option<V>;

    /// Store with the cache's default TTL
    fn set(&self, key: &str, value: V);

    /// Store with an explicit TTL
    fn set_with_ttl(&self, key: &str, value: V, ttl: Duration);

    /// Drop one entry
    fn invalidate(&self, key: &str);
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: DateTime<Utc>,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.stored_at) > self.ttl
    }
}

/// In-process cache keyed by string
#[derive(Debug)]
pub struct MemoryCache<V, C = SystemClock> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    default_ttl: Duration,
    clock: C,
}

impl<V: Clone> MemoryCache<V, SystemClock> {
    pub fn new(default_ttl: Duration) -> Self {
        Self::with_clock(default_ttl, SystemClock)
    }
}

impl<V: Clone> Default for MemoryCache<V, SystemClock> {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_TTL_SECS))
    }
}

impl<V: Clone, C: Clock> MemoryCache<V, C> {
    pub fn with_clock(default_ttl: Duration, clock: C) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
            clock,
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a live entry exists for the key
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries().clear();
    }

    /// Remove expired entries, returning how many were dropped
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Number of stored entries, expired or not
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Clone, C: Clock> Cache<V> for MemoryCache<V, C> {
    fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.entries();
        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    fn set(&self, key: &str, value: V) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    fn set_with_ttl(&self, key: &str, value: V, ttl: Duration) {
        let entry = CacheEntry {
            value,
            stored_at: self.clock.now(),
            ttl,
        };
        self.entries().insert(key.to_string(), entry);
    }

    fn invalidate(&self, key: &str) {
        self.entries().remove(key);
    }
}

/// A platform source whose snapshots are memoized in a caller-owned cache
#[derive(Debug)]
pub struct CachedClient<P, K> {
    inner: P,
    cache: K,
}

impl<P, K> CachedClient<P, K>
where
    P: PlatformClient,
    K: Cache<ActivitySnapshot>,
{
    pub fn new(inner: P, cache: K) -> Self {
        Self { inner, cache }
    }

    /// Forget the cached snapshot for a repository
    pub fn invalidate(&self, repo: &RepoIdentity) {
        self.cache.invalidate(&repo.key());
    }

    pub fn cache(&self) -> &K {
        &self.cache
    }
}

impl<P, K> PlatformClient for CachedClient<P, K>
where
    P: PlatformClient,
    K: Cache<ActivitySnapshot>,
{
    fn parse_identity(&self, url: &str) -> Option<RepoIdentity> {
        self.inner.parse_identity(url)
    }

    fn fetch_snapshot(&self, repo: &RepoIdentity) -> Result<ActivitySnapshot, SourceError> {
        let key = repo.key();
        if let Some(snapshot) = self.cache.get(&key) {
            tracing::debug!(repo = %key, "snapshot cache hit");
            return Ok(snapshot);
        }

        tracing::debug!(repo = %key, "snapshot cache miss");
        let snapshot = self.inner.fetch_snapshot(repo)?;
        self.cache.set(&key, snapshot.clone());
        Ok(snapshot)
    }
}

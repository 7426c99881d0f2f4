//! Expiring cache with per-entry TTL.
//!
//! Entries are removed lazily: an expired entry stays in the map until the
//! next `get` for its key or an explicit [`ExpiringCache::purge_expired`].
//! To callers an expired entry is indistinguishable from an absent one.
//!
//! # Concurrency model
//!
//! The map sits behind a single `Mutex` that is never held across an
//! `.await`. Callers share the cache through an `Arc` and key it so that
//! concurrent tasks rarely touch the same entry.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use bytes::Bytes;
use tracing::debug;

struct CacheEntry {
    value: Bytes,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Hit/miss counters since the cache was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Misses caused by an entry whose TTL had elapsed.
    pub expirations: u64,
}

struct Inner {
    entries: HashMap<String, CacheEntry>,
    stats: CacheStats,
}

/// Thread-safe key → bytes cache with per-entry expiration.
pub struct ExpiringCache {
    inner: Mutex<Inner>,
    default_ttl: Duration,
}

impl ExpiringCache {
    /// Create a cache whose [`insert`](Self::insert) uses `default_ttl`.
    pub fn with_default_ttl(default_ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                stats: CacheStats::default(),
            }),
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Look up `key`. Returns `None` if it was never set or has expired.
    pub fn get(&self, key: &str) -> Option<Bytes> {
        let now = Instant::now();
        let mut guard = self.lock();
        let inner = &mut *guard;

        let expired = match inner.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => {
                let value = entry.value.clone();
                inner.stats.hits += 1;
                debug!(key, hits = inner.stats.hits, "cache hit");
                return Some(value);
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            inner.entries.remove(key);
            inner.stats.expirations += 1;
        }
        inner.stats.misses += 1;
        debug!(key, expired, misses = inner.stats.misses, "cache miss");
        None
    }

    /// Store `value` under `key` for `ttl`, replacing any previous value and TTL.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Bytes>, ttl: Duration) {
        let now = Instant::now();
        let expires_at = now.checked_add(ttl).unwrap_or(now);
        let entry = CacheEntry {
            value: value.into(),
            expires_at,
        };
        self.lock().entries.insert(key.into(), entry);
    }

    /// Store `value` under `key` for the default TTL.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Bytes>) {
        self.set(key, value, self.default_ttl);
    }

    /// Drop every expired entry; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut inner = self.lock();
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before - inner.entries.len();
        if removed > 0 {
            debug!(removed, "purged expired cache entries");
        }
        removed
    }

    /// Entries currently held, including expired ones not yet removed.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().stats
    }

    // A panic while holding the lock cannot leave an entry half-written,
    // so a poisoned mutex is still safe to use.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn cache() -> ExpiringCache {
        ExpiringCache::with_default_ttl(Duration::from_secs(300))
    }

    // ── Set and Get ──────────────────────────────────────────────────

    #[test]
    fn new_cache_is_empty() {
        let cache = cache();
        assert!(cache.is_empty());
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.default_ttl(), Duration::from_secs(300));
    }

    #[test]
    fn set_then_get_returns_value() {
        let cache = cache();
        cache.set("k", Bytes::from_static(b"v"), Duration::from_secs(30));
        assert_eq!(cache.get("k"), Some(Bytes::from_static(b"v")));
    }

    #[test]
    fn get_unknown_key_misses() {
        let cache = cache();
        assert_eq!(cache.get("nope"), None);
        assert_eq!(cache.stats().misses, 1);
        assert_eq!(cache.stats().expirations, 0);
    }

    #[test]
    fn set_overwrites_value() {
        let cache = cache();
        cache.insert("k", "first");
        cache.insert("k", "second");
        assert_eq!(cache.get("k"), Some(Bytes::from("second")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn set_overwrites_ttl() {
        let cache = cache();
        cache.set("k", "v", Duration::from_secs(60));
        cache.set("k", "v", Duration::from_millis(20));
        thread::sleep(Duration::from_millis(50));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn keys_are_independent() {
        let cache = cache();
        cache.insert("account-a", "a");
        cache.insert("account-b", "b");
        assert_eq!(cache.get("account-a"), Some(Bytes::from("a")));
        assert_eq!(cache.get("account-b"), Some(Bytes::from("b")));
    }

    // ── TTL Expiration ───────────────────────────────────────────────

    #[test]
    fn entry_expires_after_ttl() {
        let cache = cache();
        cache.set("expiring", "v", Duration::from_millis(50));
        assert!(cache.get("expiring").is_some());

        thread::sleep(Duration::from_millis(80));

        assert_eq!(cache.get("expiring"), None);
        assert!(cache.is_empty());
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn zero_ttl_is_never_visible() {
        let cache = cache();
        cache.set("k", "v", Duration::ZERO);
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn expired_entry_removed_lazily() {
        let cache = cache();
        cache.set("temp", "v", Duration::from_millis(20));
        thread::sleep(Duration::from_millis(50));

        // Still held until touched.
        assert_eq!(cache.len(), 1);
        cache.get("temp");
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn purge_removes_only_expired() {
        let cache = cache();
        cache.set("short", "v", Duration::from_millis(20));
        cache.set("long", "v", Duration::from_secs(60));
        thread::sleep(Duration::from_millis(50));

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("long").is_some());
    }

    #[test]
    fn stats_count_hits_and_misses() {
        let cache = cache();
        cache.insert("k", "v");
        cache.get("k");
        cache.get("k");
        cache.get("other");
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 2,
                misses: 1,
                expirations: 0
            }
        );
    }

    // ── Concurrency ──────────────────────────────────────────────────

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_tasks_per_key() {
        let cache = Arc::new(cache());
        let mut handles = Vec::new();

        for i in 0..16 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                let key = format!("account-{i}");
                for round in 0..50 {
                    cache.insert(key.clone(), format!("{round}"));
                    assert!(cache.get(&key).is_some());
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(cache.len(), 16);
        assert_eq!(cache.get("account-3"), Some(Bytes::from("49")));
    }
}

use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Default time-to-live of an entry.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Value of the cache together with the moment it was stored.
#[derive(Debug, Clone)]
struct CacheEntry<Value> {
    value: Value,
    stored_at: Instant,
}

impl<Value> CacheEntry<Value> {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() >= ttl
    }
}

/// Concurrent in-memory cache whose entries expire after a fixed time-to-live.
///
/// Expired entries are evicted lazily by the first [`MemCache::load`] that finds them;
/// there is no background sweeper.
///
/// Each instance holds a single `Value` type. Callers that need to keep different kinds of
/// values behind one key space should use an enum as `Value`.
#[derive(Debug)]
pub struct MemCache<Value> {
    entries: DashMap<String, CacheEntry<Value>>,
    ttl: Duration,
}

impl<Value> MemCache<Value> {
    /// Create an empty cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        MemCache { entries: DashMap::new(), ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Insert `value` under `key`, replacing whatever was there and restarting its lifetime.
    pub fn store(&self, key: impl Into<String>, value: Value) {
        let key = key.into();
        tracing::trace!(target: "tapster::mem_cache", ?key, "Store");
        self.entries.insert(key, CacheEntry { value, stored_at: Instant::now() });
    }

    /// Number of entries currently held, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `key` is physically present, regardless of expiry.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl<Value: Clone> MemCache<Value> {
    /// Get a copy of the value stored under `key`.
    ///
    /// Returns `None` when the key was never stored or when its entry has expired, in which
    /// case the entry is removed.
    pub fn load(&self, key: &str) -> Option<Value> {
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(self.ttl) {
                return Some(entry.value.clone());
            }
        }

        // the shard guard from `get` must be released before this point
        let ttl = self.ttl;
        if self.entries.remove_if(key, |_, entry| entry.is_expired(ttl)).is_some() {
            tracing::debug!(target: "tapster::mem_cache", ?key, "Evict expired entry");
        }
        None
    }
}

impl<Value> Default for MemCache<Value> {
    fn default() -> Self {
        MemCache::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::{sync::Arc, thread};

    #[test]
    fn never_stored_key_is_not_found() {
        let cache = MemCache::<String>::default();
        assert_eq!(cache.load("git"), None);
        assert!(!cache.contains_key("git"));
    }

    #[test]
    fn load_returns_the_latest_value() {
        let cache = MemCache::default();
        cache.store("git", 1);
        assert_eq!(cache.load("git"), Some(1));
        cache.store("git", 2);
        assert_eq!(cache.load("git"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn expired_entry_is_evicted_on_load() {
        let cache = MemCache::new(Duration::from_millis(20));
        cache.store("git", "2.44.0".to_string());
        assert_eq!(cache.load("git").as_deref(), Some("2.44.0"));

        thread::sleep(Duration::from_millis(40));
        assert!(cache.contains_key("git"), "eviction only happens on load");
        assert_eq!(cache.load("git"), None);
        assert!(!cache.contains_key("git"));
        assert_eq!(cache.load("git"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn store_after_expiry_revives_the_key() {
        let cache = MemCache::new(Duration::from_millis(20));
        cache.store("node", 1);
        thread::sleep(Duration::from_millis(40));
        cache.store("node", 2);
        assert_eq!(cache.load("node"), Some(2));
    }

    #[test]
    fn concurrent_store_and_load() {
        let cache = Arc::new(MemCache::default());
        let handles = (0..8)
            .map(|worker| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for index in 0..100 {
                        let key = format!("item-{}", index % 10);
                        cache.store(key.clone(), worker);
                        assert!(cache.load(&key).is_some());
                    }
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 10);
    }
}

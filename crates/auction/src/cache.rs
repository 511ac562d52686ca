//! TTL cache for derived read views
//!
//! A small read-through cache: callers try `get`, fall through to the
//! authoritative source on a miss, and repopulate with `set`. Writers call
//! `invalidate` for the affected key as part of the same logical operation
//! as their write. The cache is advisory only; it is never consulted to
//! decide write validity, and concurrent `set`/`invalidate` races are
//! tolerated within the TTL bound.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// A bounded map of values that expire after a fixed TTL
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    ttl: Duration,
    max_entries: usize,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a cache whose entries expire `ttl` after insertion
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            max_entries,
        }
    }

    /// Fetch a live entry; expired entries count as misses and are evicted
    pub fn get(&self, key: &K) -> Option<V> {
        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Some(entry.value.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        // found but expired: evict under the write lock, re-checking in
        // case a writer refreshed the entry in between
        let mut entries = self.entries.write();
        let refreshed = match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            _ => None,
        };
        if refreshed.is_none() {
            entries.remove(key);
        }
        refreshed
    }

    /// Insert or refresh an entry, stamping the configured TTL
    pub fn set(&self, key: K, value: V) {
        let mut entries = self.entries.write();

        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            let now = Instant::now();
            entries.retain(|_, entry| entry.expires_at > now);
            if entries.len() >= self.max_entries {
                // still full of live entries; drop one to stay bounded
                let evict = entries.keys().next().cloned();
                if let Some(evict) = evict {
                    entries.remove(&evict);
                }
            }
        }

        entries.insert(
            key,
            CacheEntry {
                value,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Remove an entry, if present
    pub fn invalidate(&self, key: &K) {
        self.entries.write().remove(key);
    }

    /// Number of entries currently held, including not-yet-evicted expired
    /// ones
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

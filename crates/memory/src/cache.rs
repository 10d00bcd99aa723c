//! Reply cache: exact-match, TTL-bounded, LRU-evicted.
//!
//! Keyed by the normalized message text only; it is shared by every client.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
struct CacheEntry {
    reply: String,
    expires_at: Instant,
}

/// LRU-based reply cache with per-entry TTL.
pub struct ResponseCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
}

/// Trim and collapse whitespace runs to one space. Case is preserved.
pub fn cache_key(utterance: &str) -> String {
    utterance.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl ResponseCache {
    /// `capacity` is clamped to at least one entry.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Look up a live entry. Expired entries are removed and reported as a miss.
    pub async fn get(&self, key: &str, now: Instant) -> Option<String> {
        let key = cache_key(key);
        let mut entries = self.entries.lock().await;

        match entries.get(&key) {
            Some(entry) if now < entry.expires_at => Some(entry.reply.clone()),
            Some(_) => {
                entries.pop(&key);
                None
            }
            None => None,
        }
    }

    /// Insert or replace; the least recently used entry is evicted when full.
    pub async fn put(&self, key: &str, reply: impl Into<String>, ttl: Duration, now: Instant) {
        let entry = CacheEntry {
            reply: reply.into(),
            expires_at: now + ttl,
        };
        self.entries.lock().await.put(cache_key(key), entry);
    }

    /// Drop every expired entry.
    pub async fn prune_expired(&self, now: Instant) -> usize {
        let mut entries = self.entries.lock().await;
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| now >= entry.expires_at)
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            entries.pop(key);
        }
        expired.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

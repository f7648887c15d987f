//! In-process response cache for the general reasoning path.
//!
//! Keyed by a hash of the normalized query plus a short recent-context
//! string, bounded by a TTL and a capacity cap (oldest entry evicted on
//! overflow). Transactional queries never reach this cache; the caller
//! gates them.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};

#[derive(Debug, Clone)]
struct CacheEntry {
    response: String,
    created_at: Instant,
}

/// TTL + capacity bounded response cache.
#[derive(Debug)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    max_size: usize,
    ttl: Duration,
}

impl ResponseCache {
    /// Creates a cache with the given capacity and entry lifetime.
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_size,
            ttl,
        }
    }

    /// The production configuration: 50 entries, 15 minutes.
    pub fn standard() -> Self {
        Self::new(50, Duration::from_secs(15 * 60))
    }

    fn key(query: &str, context: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(query.trim().to_lowercase().as_bytes());
        hasher.update(context.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Returns the cached response if present and unexpired.
    pub fn get(&self, query: &str, context: &str) -> Option<String> {
        let key = Self::key(query, context);
        let mut entries = self.entries.lock().unwrap();

        match entries.get(&key) {
            Some(entry) if entry.created_at.elapsed() <= self.ttl => {
                tracing::debug!("response cache hit");
                Some(entry.response.clone())
            }
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    /// Stores a response, evicting the oldest entry at capacity.
    pub fn set(&self, query: &str, response: impl Into<String>, context: &str) {
        let key = Self::key(query, context);
        let mut entries = self.entries.lock().unwrap();

        if entries.len() >= self.max_size && !entries.contains_key(&key) {
            if let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, e)| e.created_at)
                .map(|(k, _)| k.clone())
            {
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                response: response.into(),
                created_at: Instant::now(),
            },
        );
    }

    /// Number of live entries (expired entries may still be counted
    /// until touched).
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips() {
        let cache = ResponseCache::new(10, Duration::from_secs(60));
        cache.set("What laptops do you have?", "We have several.", "");
        assert_eq!(
            cache.get("What laptops do you have?", ""),
            Some("We have several.".to_string())
        );
    }

    #[test]
    fn key_normalizes_case_and_whitespace() {
        let cache = ResponseCache::new(10, Duration::from_secs(60));
        cache.set("  HELLO WORLD  ", "hi", "");
        assert_eq!(cache.get("hello world", ""), Some("hi".to_string()));
    }

    #[test]
    fn different_context_is_a_different_key() {
        let cache = ResponseCache::new(10, Duration::from_secs(60));
        cache.set("query", "answer-a", "ctx-a");
        assert_eq!(cache.get("query", "ctx-b"), None);
    }

    #[test]
    fn expired_entries_are_dropped() {
        let cache = ResponseCache::new(10, Duration::from_millis(0));
        cache.set("query", "answer", "");
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get("query", ""), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn capacity_evicts_oldest_entry() {
        let cache = ResponseCache::new(2, Duration::from_secs(60));
        cache.set("first", "1", "");
        std::thread::sleep(Duration::from_millis(2));
        cache.set("second", "2", "");
        std::thread::sleep(Duration::from_millis(2));
        cache.set("third", "3", "");

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("first", ""), None);
        assert_eq!(cache.get("third", ""), Some("3".to_string()));
    }
}

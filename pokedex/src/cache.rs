//! In-memory response cache with lazy age-based expiry.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Clone, Debug)]
pub struct CacheEntry<V> {
    pub payload: V,
    pub stored_at: Instant,
}

/// Keyed payload store. Entries older than the TTL are dropped on the next
/// read of their key; nothing sweeps in the background and there is no
/// capacity bound.
#[derive(Debug)]
pub struct ResponseCache<V> {
    entries: HashMap<String, CacheEntry<V>>,
    ttl: Duration,
}

impl<V: Clone> ResponseCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&mut self, key: &str) -> Option<V> {
        let entry = self.entries.get(key)?;
        if entry.stored_at.elapsed() > self.ttl {
            self.entries.remove(key);
            tracing::debug!(key, "cache expired");
            return None;
        }
        tracing::debug!(key, "cache hit");
        Some(entry.payload.clone())
    }

    pub fn set(&mut self, key: impl Into<String>, payload: V) {
        let key = key.into();
        tracing::debug!(key = key.as_str(), "cache set");
        self.entries.insert(
            key,
            CacheEntry {
                payload,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        tracing::debug!("cache cleared");
    }

    /// Counts stored entries, including expired ones not yet read.
    pub fn size(&self) -> usize {
        self.entries.len()
    }
}

impl<V: Clone> Default for ResponseCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

pub fn list_key(category_id: &str) -> String {
    format!("list:{category_id}")
}

pub fn detail_key(category_id: &str, id: &str) -> String {
    format!("detail:{category_id}:{id}")
}

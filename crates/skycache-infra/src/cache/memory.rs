//! In-memory cache - for single-process deployments, tests, and as an opt-in
//! fallback when Redis is unreachable.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use skycache_core::ports::{Cache, CacheError};

struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// In-memory cache using a HashMap behind an async RwLock.
///
/// Note: Data is lost on process restart and is not shared between instances.
pub struct InMemoryCache {
    store: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }

    /// Drop all expired entries.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|_, entry| entry.expires_at > now);
        before - store.len()
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let store = self.store.read().await;
        let entry = store.get(key)?;

        if Instant::now() >= entry.expires_at {
            drop(store);
            let mut store = self.store.write().await;
            // Re-check under the write lock; a concurrent set may have refreshed it.
            if store
                .get(key)
                .is_some_and(|entry| Instant::now() >= entry.expires_at)
            {
                store.remove(key);
            }
            return None;
        }

        Some(entry.value.clone())
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let expires_at = Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| CacheError::Operation(format!("TTL {ttl:?} is out of range")))?;

        let mut store = self.store.write().await;
        store.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }
}

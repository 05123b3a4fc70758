use std::num::NonZeroUsize;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use lru::LruCache;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedPayload {
    pub key: String,
    pub payload: String,
    pub expires_at: i64,
}

#[async_trait]
pub trait Storage: Send + Sync {
    async fn get_cache(&self, key: &str, now: i64) -> Result<Option<String>>;
    async fn put_cache(&self, key: &str, payload: &str, expires_at: i64) -> Result<()>;
    async fn clear_cache(&self) -> Result<u64>;
}

/// In-process LRU cache with per-entry expiry. Nothing is written to disk.
pub struct MemoryCache {
    entries: Mutex<LruCache<String, CachedPayload>>,
}

impl MemoryCache {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self { entries: Mutex::new(LruCache::new(cap)) }
    }

    pub fn len(&self) -> usize { self.entries.lock().map(|c| c.len()).unwrap_or(0) }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

#[async_trait]
impl Storage for MemoryCache {
    async fn get_cache(&self, key: &str, now: i64) -> Result<Option<String>> {
        let mut entries = self.entries.lock().map_err(|_| anyhow!("cache lock poisoned"))?;
        match entries.get(key) {
            None => return Ok(None),
            Some(hit) if hit.expires_at > now => return Ok(Some(hit.payload.clone())),
            Some(_) => {}
        }
        entries.pop(key);
        Ok(None)
    }

    async fn put_cache(&self, key: &str, payload: &str, expires_at: i64) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| anyhow!("cache lock poisoned"))?;
        entries.put(key.to_string(), CachedPayload { key: key.to_string(), payload: payload.to_string(), expires_at });
        Ok(())
    }

    async fn clear_cache(&self) -> Result<u64> {
        let mut entries = self.entries.lock().map_err(|_| anyhow!("cache lock poisoned"))?;
        let n = entries.len() as u64;
        entries.clear();
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hit_before_expiry_miss_after() {
        let cache = MemoryCache::new(4);
        cache.put_cache("k", "v", 100).await.unwrap();
        assert_eq!(cache.get_cache("k", 99).await.unwrap().as_deref(), Some("v"));
        assert_eq!(cache.get_cache("k", 100).await.unwrap(), None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn evicts_least_recently_used() {
        let cache = MemoryCache::new(2);
        cache.put_cache("a", "1", i64::MAX).await.unwrap();
        cache.put_cache("b", "2", i64::MAX).await.unwrap();
        // touch "a" so "b" is the eviction candidate
        cache.get_cache("a", 0).await.unwrap();
        cache.put_cache("c", "3", i64::MAX).await.unwrap();
        assert_eq!(cache.get_cache("b", 0).await.unwrap(), None);
        assert!(cache.get_cache("a", 0).await.unwrap().is_some());
        assert!(cache.get_cache("c", 0).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn clear_reports_removed_entries() {
        let cache = MemoryCache::new(8);
        cache.put_cache("a", "1", i64::MAX).await.unwrap();
        cache.put_cache("b", "2", i64::MAX).await.unwrap();
        assert_eq!(cache.clear_cache().await.unwrap(), 2);
        assert_eq!(cache.len(), 0);
    }
}

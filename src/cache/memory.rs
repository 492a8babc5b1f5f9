//! In-process response cache with per-entry expiry

use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use serde_json::Value;
use std::time::{Duration, Instant};

use super::ResponseCache;
use crate::error::Result;

#[derive(Debug, Clone)]
struct CachedEntry {
    value: Value,
    ttl: Duration,
}

/// Expires each entry after the TTL it was stored with
struct EntryExpiry;

impl Expiry<String, CachedEntry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// moka-backed [`ResponseCache`]
#[derive(Clone)]
pub struct MemoryCache {
    entries: Cache<String, CachedEntry>,
}

impl MemoryCache {
    /// Create a cache holding at most `max_entries` entries
    pub fn new(max_entries: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(EntryExpiry)
            .build();

        Self { entries }
    }

    /// Approximate number of live entries
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }
}

#[async_trait]
impl ResponseCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.get(key).await.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<()> {
        self.entries
            .insert(key.to_string(), CachedEntry { value, ttl })
            .await;
        Ok(())
    }
}

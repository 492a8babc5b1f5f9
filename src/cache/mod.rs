//! Response caching
//!
//! Results are cached whole, as JSON, under keys derived from the operation
//! name and its serialized arguments. Every writer for a key computes the same
//! value, so last-writer-wins is fine.
//!
//! - [`memory`] - in-process cache with per-entry TTL (moka)
//! - [`redis_cache`] - shared cache in Redis
//!
//! # Example
//!
//! ```rust,ignore
//! use newsquery::cache::OptionalCache;
//! use newsquery::config::CacheConfig;
//!
//! let cache = OptionalCache::from_config(&CacheConfig::default()).await;
//! let key = cache.key("get_concept", &("http://dbpedia.org/resource/Europe", 10));
//! cache.set(&key, &value).await;
//! let hit: Option<serde_json::Value> = cache.get(&key).await;
//! ```

pub mod memory;
pub mod redis_cache;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{CacheBackend, CacheConfig};
use crate::error::Result;

pub use memory::MemoryCache;
pub use redis_cache::RedisCache;

/// Key-value store with per-entry expiry
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Look up a previously stored value
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Store `value` under `key` for `ttl`
    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<()>;
}

/// Build a deterministic cache key: `{prefix}:{operation}:{sha256}`
pub fn cache_key<A: Serialize + ?Sized>(prefix: &str, operation: &str, args: &A) -> String {
    let payload = serde_json::to_vec(args).unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(operation.as_bytes());
    hasher.update(&payload);
    format!("{prefix}:{operation}:{:x}", hasher.finalize())
}

/// Cache handle that tolerates a missing or failing backend
///
/// Lookups that fail are treated as misses and failed writes are logged and
/// dropped, so caching never changes the outcome of a call.
#[derive(Clone)]
pub struct OptionalCache {
    inner: Option<Arc<dyn ResponseCache>>,
    ttl: Duration,
    key_prefix: String,
}

impl OptionalCache {
    /// Create with an optional backend
    pub fn new(
        cache: Option<Arc<dyn ResponseCache>>,
        ttl: Duration,
        key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            inner: cache,
            ttl,
            key_prefix: key_prefix.into(),
        }
    }

    /// A handle that never caches
    pub fn disabled() -> Self {
        Self::new(None, Duration::ZERO, "newsquery")
    }

    /// Create from config; an unreachable Redis yields a disabled cache
    pub async fn from_config(config: &CacheConfig) -> Self {
        let ttl = Duration::from_secs(config.ttl_secs);
        let backend: Option<Arc<dyn ResponseCache>> = match config.backend {
            CacheBackend::None => None,
            CacheBackend::Memory => Some(Arc::new(MemoryCache::new(config.max_entries))),
            CacheBackend::Redis => RedisCache::try_new(config)
                .await
                .map(|cache| Arc::new(cache) as Arc<dyn ResponseCache>),
        };

        Self::new(backend, ttl, config.key_prefix.clone())
    }

    /// Check if a backend is configured
    pub fn is_available(&self) -> bool {
        self.inner.is_some()
    }

    /// Cache key for `operation` called with `args`
    pub fn key<A: Serialize + ?Sized>(&self, operation: &str, args: &A) -> String {
        cache_key(&self.key_prefix, operation, args)
    }

    /// Get a cached value, treating errors and undecodable entries as misses
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let cache = self.inner.as_ref()?;

        match cache.get(key).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(decoded) => {
                    tracing::debug!(key = %key, "Cache hit");
                    Some(decoded)
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Discarding undecodable cache entry");
                    None
                }
            },
            Ok(None) => {
                tracing::debug!(key = %key, "Cache miss");
                None
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache lookup failed");
                None
            }
        }
    }

    /// Store a value with the configured TTL
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let Some(cache) = &self.inner else {
            return;
        };

        let encoded = match serde_json::to_value(value) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to encode cache entry");
                return;
            }
        };

        if let Err(e) = cache.set(key, encoded, self.ttl).await {
            tracing::warn!(key = %key, error = %e, "Failed to write cache entry");
        }
    }
}

impl std::fmt::Debug for OptionalCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionalCache")
            .field("available", &self.is_available())
            .field("ttl", &self.ttl)
            .field("key_prefix", &self.key_prefix)
            .finish()
    }
}

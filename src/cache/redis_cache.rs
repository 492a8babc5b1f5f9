//! Redis-backed response cache
//!
//! Lets several processes share cached responses. Values are stored as JSON
//! with `SET EX`, so Redis handles expiry.

use async_trait::async_trait;
use deadpool_redis::{Config as PoolConfig, Pool, Runtime};
use redis::AsyncCommands;
use serde_json::Value;
use std::time::Duration;

use super::ResponseCache;
use crate::config::CacheConfig;
use crate::error::{Error, Result};

/// Redis cache client
pub struct RedisCache {
    /// Connection pool
    pool: Pool,
}

impl RedisCache {
    /// Connect to Redis and verify the connection with `PING`
    pub async fn new(config: &CacheConfig) -> Result<Self> {
        let pool_config = PoolConfig::from_url(&config.redis_url);
        let pool = pool_config
            .builder()
            .map_err(|e| Error::Cache(format!("Failed to create pool builder: {e}")))?
            .max_size(config.pool_size)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| Error::Cache(format!("Failed to create Redis connection pool: {e}")))?;

        let mut conn = pool
            .get()
            .await
            .map_err(|e| Error::Cache(format!("Failed to get Redis connection: {e}")))?;

        let _: String = redis::cmd("PING")
            .query_async(&mut *conn)
            .await
            .map_err(|e| Error::Cache(format!("Failed to ping Redis: {e}")))?;

        tracing::info!(url = %config.redis_url, "Connected to Redis");

        Ok(Self { pool })
    }

    /// Connect, returning None if Redis is unavailable
    pub async fn try_new(config: &CacheConfig) -> Option<Self> {
        match Self::new(config).await {
            Ok(cache) => Some(cache),
            Err(e) => {
                tracing::warn!(error = %e, "Redis cache unavailable, continuing without cache");
                None
            }
        }
    }

    /// Check if the server still answers `PING`
    pub async fn health_check(&self) -> Result<bool> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| Error::Cache(e.to_string()))?;
        let result: String = redis::cmd("PING")
            .query_async(&mut *conn)
            .await
            .map_err(|e| Error::Cache(e.to_string()))?;
        Ok(result == "PONG")
    }
}

#[async_trait]
impl ResponseCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| Error::Cache(format!("Failed to get connection: {e}")))?;

        let bytes: Option<Vec<u8>> = conn
            .get(key)
            .await
            .map_err(|e| Error::Cache(format!("Failed to get from cache: {e}")))?;

        match bytes {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| Error::Cache(format!("Failed to decode cache entry: {e}"))),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<()> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| Error::Cache(format!("Failed to get connection: {e}")))?;

        let bytes = serde_json::to_vec(&value)
            .map_err(|e| Error::Cache(format!("Failed to encode cache entry: {e}")))?;

        // SET EX rejects a zero expiry
        let seconds = ttl.as_secs().max(1);

        conn.set_ex::<_, _, ()>(key, bytes, seconds)
            .await
            .map_err(|e| Error::Cache(format!("Failed to set cache: {e}")))?;

        Ok(())
    }
}

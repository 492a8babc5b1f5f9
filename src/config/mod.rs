//! Configuration management for newsquery
//!
//! A [`Config`] is an explicit, immutable value handed to
//! [`NewsQuery`](crate::client::NewsQuery) at construction. It can be built
//! from environment variables, a TOML file, or in code.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default host of the semantic news API
pub const DEFAULT_SEMANTIC_HOST: &str = "http://data.bbc.co.uk/v1/bbcrd-newslabs";

/// Default host of the Juicer keyword-search API
pub const DEFAULT_JUICER_HOST: &str = "http://data.bbc.co.uk/bbcrd-juicer";

/// Default endpoint listing the sources known to the semantic API
pub const DEFAULT_SOURCES_URL: &str = "http://triplestore.bbcnewslabs.co.uk/api/products";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upstream API endpoints and credentials
    pub api: ApiConfig,

    /// HTTP gateway configuration
    pub http: HttpConfig,

    /// Response cache configuration
    pub cache: CacheConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Upstream API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API key appended to every request
    pub api_key: String,

    /// Semantic news API base URL
    pub semantic_host: String,

    /// Juicer API base URL
    pub juicer_host: String,

    /// Full URL of the source listing
    pub sources_url: String,
}

/// HTTP gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// User agent string
    pub user_agent: String,

    /// Upper bound on in-flight requests during a date-range fan-out
    pub max_concurrent_requests: usize,

    /// Optional client-side rate limit (requests per second)
    pub requests_per_second: Option<u32>,

    /// Retries for recoverable failures (0 disables retrying)
    pub max_retries: u32,
}

/// Which cache backend to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// No caching
    #[default]
    None,
    /// In-process cache
    Memory,
    /// Shared Redis cache
    Redis,
}

impl std::str::FromStr for CacheBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" | "off" => Ok(Self::None),
            "memory" | "inmem" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            other => anyhow::bail!("unknown cache backend: {other}"),
        }
    }
}

/// Response cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Backend selection
    pub backend: CacheBackend,

    /// Time-to-live of cached responses in seconds
    pub ttl_secs: u64,

    /// Maximum entries held by the in-process cache
    pub max_entries: u64,

    /// Redis URL (e.g., redis://localhost:6379)
    pub redis_url: String,

    /// Redis connection pool size
    pub pool_size: usize,

    /// Key prefix for namespacing
    pub key_prefix: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            semantic_host: String::from(DEFAULT_SEMANTIC_HOST),
            juicer_host: String::from(DEFAULT_JUICER_HOST),
            sources_url: String::from(DEFAULT_SOURCES_URL),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            user_agent: format!("newsquery/{}", env!("CARGO_PKG_VERSION")),
            max_concurrent_requests: 32,
            requests_per_second: None,
            max_retries: 0,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::None,
            ttl_secs: 600,
            max_entries: 10_000,
            redis_url: String::from("redis://localhost:6379"),
            pool_size: 10,
            key_prefix: String::from("newsquery"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

impl Config {
    /// Create a configuration with defaults and the given API key
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.api.api_key = api_key.into();
        config
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let api_key = std::env::var("NEWSQUERY_API_KEY").unwrap_or_default();

        let semantic_host = std::env::var("NEWSQUERY_SEMANTIC_HOST")
            .unwrap_or_else(|_| defaults.api.semantic_host.clone());

        let juicer_host = std::env::var("NEWSQUERY_JUICER_HOST")
            .unwrap_or_else(|_| defaults.api.juicer_host.clone());

        let sources_url = std::env::var("NEWSQUERY_SOURCES_URL")
            .unwrap_or_else(|_| defaults.api.sources_url.clone());

        let request_timeout_secs = env_parse("NEWSQUERY_REQUEST_TIMEOUT")
            .unwrap_or(defaults.http.request_timeout_secs);

        let user_agent = std::env::var("NEWSQUERY_USER_AGENT")
            .unwrap_or_else(|_| defaults.http.user_agent.clone());

        let max_concurrent_requests = env_parse("NEWSQUERY_MAX_CONCURRENT_REQUESTS")
            .unwrap_or(defaults.http.max_concurrent_requests);

        let requests_per_second = env_parse("NEWSQUERY_RATE_LIMIT");

        let max_retries = env_parse("NEWSQUERY_MAX_RETRIES").unwrap_or(defaults.http.max_retries);

        let backend = match std::env::var("NEWSQUERY_CACHE") {
            Ok(value) => value
                .parse::<CacheBackend>()
                .context("Invalid NEWSQUERY_CACHE")?,
            Err(_) => defaults.cache.backend,
        };

        let ttl_secs = env_parse("NEWSQUERY_CACHE_TTL").unwrap_or(defaults.cache.ttl_secs);

        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| defaults.cache.redis_url.clone());

        let log_level =
            std::env::var("NEWSQUERY_LOG_LEVEL").unwrap_or_else(|_| defaults.logging.level.clone());

        let log_format = std::env::var("NEWSQUERY_LOG_FORMAT")
            .unwrap_or_else(|_| defaults.logging.format.clone());

        Ok(Self {
            api: ApiConfig {
                api_key,
                semantic_host,
                juicer_host,
                sources_url,
            },
            http: HttpConfig {
                request_timeout_secs,
                user_agent,
                max_concurrent_requests,
                requests_per_second,
                max_retries,
            },
            cache: CacheConfig {
                backend,
                ttl_secs,
                redis_url,
                ..defaults.cache
            },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("semantic_host", &self.api.semantic_host),
            ("juicer_host", &self.api.juicer_host),
            ("sources_url", &self.api.sources_url),
        ] {
            url::Url::parse(value).with_context(|| format!("{name} is not a valid URL: {value}"))?;
        }

        if self.http.max_concurrent_requests == 0 {
            anyhow::bail!("max_concurrent_requests must be greater than 0");
        }

        if self.http.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if self.http.requests_per_second == Some(0) {
            anyhow::bail!("requests_per_second must be greater than 0 when set");
        }

        if self.cache.backend != CacheBackend::None && self.cache.ttl_secs == 0 {
            anyhow::bail!("cache ttl_secs must be greater than 0");
        }

        if self.cache.backend == CacheBackend::Redis && self.cache.pool_size == 0 {
            anyhow::bail!("pool_size must be greater than 0");
        }

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.http.request_timeout_secs)
    }

    /// Get cache TTL as Duration
    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.api.semantic_host, DEFAULT_SEMANTIC_HOST);
        assert_eq!(config.cache.backend, CacheBackend::None);
    }

    #[test]
    fn test_invalid_concurrent_requests() {
        let mut config = Config::default();
        config.http.max_concurrent_requests = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_host() {
        let mut config = Config::default();
        config.api.semantic_host = String::from("not a url");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_rate_limit_rejected() {
        let mut config = Config::default();
        config.http.requests_per_second = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_request_timeout_conversion() {
        let config = Config::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_cache_backend_parse() {
        assert_eq!("memory".parse::<CacheBackend>().unwrap(), CacheBackend::Memory);
        assert_eq!("Redis".parse::<CacheBackend>().unwrap(), CacheBackend::Redis);
        assert_eq!("none".parse::<CacheBackend>().unwrap(), CacheBackend::None);
        assert!("memcached".parse::<CacheBackend>().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [api]
            api_key = "secret"

            [cache]
            backend = "memory"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.api_key, "secret");
        assert_eq!(config.api.juicer_host, DEFAULT_JUICER_HOST);
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(config.http.max_retries, 0);
        assert!(config.validate().is_ok());
    }
}

//! Client for the semantic news API and the Juicer
//!
//! [`NewsQuery`] owns everything a call needs: an immutable [`Config`], a
//! [`RequestGateway`], the [`OntologyResolver`] and a cache handle. Instances
//! share nothing with each other.
//!
//! # Submodules
//!
//! - [`concepts`] - concept lookup, search and co-occurrence
//! - [`articles`] - creative works and sources
//! - [`occurrences`] - daily mention counts over a date range
//! - [`juicer`] - keyword search and similar-article lookup
//!
//! # Example
//!
//! ```no_run
//! use newsquery::client::NewsQuery;
//! use newsquery::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = NewsQuery::connect(Config::from_env()?).await?;
//!     let series = client
//!         .occurrences_over_time(
//!             "http://dbpedia.org/resource/Ukraine",
//!             Some("2024-01-01"),
//!             Some("2024-01-08"),
//!             None,
//!         )
//!         .await?;
//!     println!("{} days", series.len());
//!     Ok(())
//! }
//! ```

pub mod articles;
pub mod concepts;
pub mod juicer;
pub mod occurrences;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use url::Url;

use crate::cache::OptionalCache;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::gateway::{HttpGateway, RequestGateway};
use crate::ontology::OntologyResolver;

pub use occurrences::{day_list, MAX_SERIES_DAYS};

/// Result count used when the caller does not give one
pub const DEFAULT_LIMIT: u32 = 10;

/// Apply the limit policy shared by every endpoint
///
/// A missing limit becomes [`DEFAULT_LIMIT`]. Zero is raised to one, because
/// the upstream API fails on a zero limit.
pub fn normalize_limit(limit: Option<u32>) -> u32 {
    match limit {
        None => DEFAULT_LIMIT,
        Some(0) => 1,
        Some(n) => n,
    }
}

/// Semantic news API and Juicer client
#[derive(Clone)]
pub struct NewsQuery {
    config: Arc<Config>,
    gateway: Arc<dyn RequestGateway>,
    ontology: Arc<OntologyResolver>,
    cache: OptionalCache,
}

impl NewsQuery {
    /// Build a client with an HTTP gateway and the cache backend from `config`
    ///
    /// An unreachable Redis does not fail construction; the client then runs
    /// without a cache.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for invalid settings, or an error if the HTTP
    /// client or the bundled ontology table cannot be set up.
    pub async fn connect(config: Config) -> Result<Self> {
        let gateway = HttpGateway::new(&config.http)?;
        let cache = OptionalCache::from_config(&config.cache).await;

        Ok(Self::with_gateway(config, Arc::new(gateway))?.with_cache(cache))
    }

    /// Build a client over any gateway, without a cache
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for invalid settings, or `Error::Ontology` if
    /// the bundled ontology table cannot be loaded.
    pub fn with_gateway(config: Config, gateway: Arc<dyn RequestGateway>) -> Result<Self> {
        config
            .validate()
            .map_err(|e| Error::config(format!("{e:#}")))?;

        Ok(Self {
            config: Arc::new(config),
            gateway,
            ontology: Arc::new(OntologyResolver::builtin()?),
            cache: OptionalCache::disabled(),
        })
    }

    /// Replace the cache handle
    #[must_use]
    pub fn with_cache(mut self, cache: OptionalCache) -> Self {
        self.cache = cache;
        self
    }

    /// Replace the ontology resolver
    #[must_use]
    pub fn with_ontology(mut self, ontology: OntologyResolver) -> Self {
        self.ontology = Arc::new(ontology);
        self
    }

    /// Configuration this client was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The ontology resolver used to expand concept types
    pub fn ontology(&self) -> &OntologyResolver {
        &self.ontology
    }

    /// Ancestor chain of an ontology class URI
    ///
    /// See [`OntologyResolver::resolve_ancestors`].
    pub fn resolve_ancestors(&self, class_uri: &str) -> Vec<String> {
        self.ontology.resolve_ancestors(class_uri)
    }

    /// URL on the semantic API, with the API key appended
    fn semantic_url(&self, segments: &[&str], params: &[(&str, String)]) -> String {
        self.build_url(&self.config.api.semantic_host, segments, params)
    }

    /// URL on the Juicer API, with the API key appended
    fn juicer_url(&self, segments: &[&str], params: &[(&str, String)]) -> String {
        self.build_url(&self.config.api.juicer_host, segments, params)
    }

    fn build_url(&self, base: &str, segments: &[&str], params: &[(&str, String)]) -> String {
        let Ok(mut url) = Url::parse(base) else {
            // The gateway rejects this and degrades to an empty response
            return base.to_string();
        };

        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }

        url.query_pairs_mut()
            .extend_pairs(params)
            .append_pair("apikey", &self.config.api.api_key);

        url.to_string()
    }

    /// Serve `operation(args)` from the cache, or run `compute` and store it
    ///
    /// Empty results are not stored, so a degraded upstream response is not
    /// pinned for a whole TTL.
    async fn cached<T, A, Fut>(&self, operation: &str, args: &A, compute: Fut) -> T
    where
        T: Serialize + DeserializeOwned,
        A: Serialize + ?Sized,
        Fut: Future<Output = T>,
    {
        let key = self.cache.key(operation, args);

        if let Some(hit) = self.cache.get::<T>(&key).await {
            return hit;
        }

        let result = compute.await;

        if self.cache.is_available() {
            match serde_json::to_value(&result) {
                Ok(encoded) if !is_blank(&encoded) => self.cache.set(&key, &encoded).await,
                Ok(_) => tracing::debug!(operation = operation, "Not caching empty result"),
                Err(e) => tracing::warn!(operation = operation, error = %e, "Unencodable result"),
            }
        }

        result
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        _ => false,
    }
}

impl std::fmt::Debug for NewsQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsQuery")
            .field("semantic_host", &self.config.api.semantic_host)
            .field("juicer_host", &self.config.api.juicer_host)
            .field("ontology_classes", &self.ontology.len())
            .field("cache", &self.cache)
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedGateway;
    use super::*;
    use crate::cache::MemoryCache;
    use serde_json::json;
    use std::time::Duration;

    fn client(gateway: ScriptedGateway) -> NewsQuery {
        NewsQuery::with_gateway(Config::with_api_key("test-key"), Arc::new(gateway)).unwrap()
    }

    #[test]
    fn test_normalize_limit() {
        assert_eq!(normalize_limit(None), 10);
        assert_eq!(normalize_limit(Some(0)), 1);
        assert_eq!(normalize_limit(Some(5)), 5);
    }

    #[test]
    fn test_semantic_url_encodes_params() {
        let client = client(ScriptedGateway::new());
        let url = client.semantic_url(
            &["concepts", "tagged"],
            &[("q", "Apple Records".to_string()), ("limit", "6".to_string())],
        );

        assert!(url.starts_with("http://data.bbc.co.uk/v1/bbcrd-newslabs/concepts/tagged?"));
        assert!(url.contains("q=Apple+Records"));
        assert!(url.contains("limit=6"));
        assert!(url.ends_with("apikey=test-key"));
    }

    #[test]
    fn test_trailing_slash_segment() {
        let client = client(ScriptedGateway::new());
        let url = client.semantic_url(&["concepts", "co-occurrences", ""], &[]);
        assert!(url.contains("/concepts/co-occurrences/?"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = Config::with_api_key("k");
        config.http.max_concurrent_requests = 0;
        let result = NewsQuery::with_gateway(config, Arc::new(ScriptedGateway::new()));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_resolve_ancestors_delegates() {
        let client = client(ScriptedGateway::new());
        assert_eq!(
            client.resolve_ancestors("http://dbpedia.org/ontology/Company"),
            vec![
                "http://dbpedia.org/ontology/Company",
                "http://dbpedia.org/ontology/Organisation",
                "http://dbpedia.org/ontology/Agent",
            ]
        );
        assert!(client
            .resolve_ancestors("http://dbpedia.org/resource/Europe")
            .is_empty());
    }

    #[tokio::test]
    async fn test_cached_skips_empty_results() {
        let cache = OptionalCache::new(
            Some(Arc::new(MemoryCache::new(10))),
            Duration::from_secs(60),
            "t",
        );
        let client = client(ScriptedGateway::new()).with_cache(cache.clone());

        let empty: Vec<u32> = client.cached("op", &1, async { Vec::new() }).await;
        assert!(empty.is_empty());
        assert!(cache.get::<Vec<u32>>(&cache.key("op", &1)).await.is_none());

        let full: Vec<u32> = client.cached("op", &2, async { vec![7] }).await;
        assert_eq!(full, vec![7]);

        let again: Vec<u32> = client.cached("op", &2, async { vec![8] }).await;
        assert_eq!(again, vec![7]);
    }

    #[tokio::test]
    async fn test_scripted_gateway_records_requests() {
        let gateway = ScriptedGateway::new().route("/products", json!({"@graph": []}));
        let value = gateway.get_json("http://x/products").await;
        assert_eq!(value, json!({"@graph": []}));
        assert_eq!(gateway.requested(), vec!["http://x/products".to_string()]);
    }
}

//! HTTP gateway backed by reqwest
//!
//! Features:
//! - Request timeout and user agent from [`HttpConfig`]
//! - Optional client-side rate limiting with governor
//! - Optional retry with exponential backoff on recoverable failures
//! - Degrade-to-empty on every failure, logged with the API key masked

use async_trait::async_trait;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::{
    header::{HeaderValue, ACCEPT},
    Client, RequestBuilder,
};
use serde_json::Value;
use std::num::NonZeroU32;
use tracing::{debug, warn};

use super::{empty_response, redact_api_key, RequestGateway};
use crate::config::HttpConfig;
use crate::utils::error::FetchError;
use crate::utils::retry::{with_retry, RetryConfig};

/// reqwest-backed [`RequestGateway`]
pub struct HttpGateway {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Optional limiter controlling request frequency
    rate_limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,

    /// Retry policy for recoverable failures
    retry: RetryConfig,
}

impl HttpGateway {
    /// Create a gateway from HTTP settings
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(config: &HttpConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .gzip(true)
            .build()?;

        let rate_limiter = config
            .requests_per_second
            .and_then(NonZeroU32::new)
            .map(|rate| RateLimiter::direct(Quota::per_second(rate)));

        Ok(Self {
            client,
            rate_limiter,
            retry: RetryConfig::new(config.max_retries),
        })
    }

    /// Replace the retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// GET `url`, surfacing the failure mode instead of degrading
    pub async fn try_get_json(&self, url: &str) -> Result<Value, FetchError> {
        self.execute(url, || self.client.get(url)).await
    }

    /// POST a url-encoded form, surfacing the failure mode instead of degrading
    pub async fn try_post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<Value, FetchError> {
        self.execute(url, || self.client.post(url).form(form)).await
    }

    /// POST a JSON body, surfacing the failure mode instead of degrading
    pub async fn try_post_json(&self, url: &str, body: &Value) -> Result<Value, FetchError> {
        self.execute(url, || self.client.post(url).json(body)).await
    }

    /// Send the request built by `build`, with rate limiting and retries
    async fn execute<F>(&self, url: &str, build: F) -> Result<Value, FetchError>
    where
        F: Fn() -> RequestBuilder,
    {
        url::Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;

        debug!(url = %redact_api_key(url), "Sending upstream request");

        let this = self;
        let build = &build;
        with_retry(&self.retry, move || async move {
            if let Some(limiter) = &this.rate_limiter {
                limiter.until_ready().await;
            }

            let response = build()
                .header(ACCEPT, HeaderValue::from_static("application/json"))
                .send()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        FetchError::Timeout
                    } else {
                        FetchError::Http(e)
                    }
                })?;

            let status = response.status();
            if status.as_u16() == 429 {
                return Err(FetchError::RateLimit);
            }
            if !status.is_success() {
                return Err(FetchError::ServerError(status.as_u16()));
            }

            let bytes = response.bytes().await?;
            serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()))
        })
        .await
    }

    fn degrade(method: &str, url: &str, result: Result<Value, FetchError>) -> Value {
        match result {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    method = method,
                    url = %redact_api_key(url),
                    error = %e,
                    "Upstream request failed, using empty response"
                );
                empty_response()
            }
        }
    }
}

#[async_trait]
impl RequestGateway for HttpGateway {
    async fn get_json(&self, url: &str) -> Value {
        Self::degrade("GET", url, self.try_get_json(url).await)
    }

    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Value {
        Self::degrade("POST", url, self.try_post_form(url, form).await)
    }

    async fn post_json(&self, url: &str, body: &Value) -> Value {
        Self::degrade("POST", url, self.try_post_json(url, body).await)
    }
}

//! Request gateway between the client and the upstream APIs
//!
//! Every call returns JSON. Failures of any kind (transport errors, non-2xx
//! statuses, bodies that are not JSON) degrade to an empty object, so the
//! layers above only ever see "successful but possibly empty" responses.
//!
//! # Submodules
//!
//! - [`http`] - reqwest-backed implementation with rate limiting and retries

pub mod http;

use async_trait::async_trait;
use serde_json::{Map, Value};

pub use http::HttpGateway;

/// Transport boundary used by [`NewsQuery`](crate::client::NewsQuery)
///
/// Implementations must never fail outward: on any error they return
/// [`empty_response`].
#[async_trait]
pub trait RequestGateway: Send + Sync {
    /// GET `url` and decode the body as JSON
    async fn get_json(&self, url: &str) -> Value;

    /// POST `form` url-encoded to `url` and decode the reply as JSON
    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Value;

    /// POST `body` as JSON to `url` and decode the reply as JSON
    async fn post_json(&self, url: &str, body: &Value) -> Value;
}

/// The neutral value returned in place of a failed response
pub fn empty_response() -> Value {
    Value::Object(Map::new())
}

/// Mask the `apikey` query parameter so URLs can be logged
pub fn redact_api_key(raw: &str) -> String {
    let Ok(mut parsed) = url::Url::parse(raw) else {
        return raw.to_string();
    };

    if !parsed.query_pairs().any(|(k, _)| k == "apikey") {
        return raw.to_string();
    }

    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "apikey" {
                "***".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();

    parsed.query_pairs_mut().clear().extend_pairs(pairs);
    parsed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_response_is_object() {
        let empty = empty_response();
        assert!(empty.as_object().is_some_and(|m| m.is_empty()));
    }

    #[test]
    fn test_redact_api_key() {
        let url = "http://example.com/concepts?uri=x&apikey=secret&limit=1";
        let redacted = redact_api_key(url);
        assert!(!redacted.contains("secret"));
        assert!(redacted.contains("apikey=***") || redacted.contains("apikey=%2A%2A%2A"));
        assert!(redacted.contains("limit=1"));
    }

    #[test]
    fn test_redact_without_key_is_unchanged() {
        let url = "http://example.com/products";
        assert_eq!(redact_api_key(url), url);
        assert_eq!(redact_api_key("not a url"), "not a url");
    }
}

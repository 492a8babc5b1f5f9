//! Common test utilities

use newsquery::config::{CacheBackend, Config};
use newsquery::NewsQuery;
use serde_json::{json, Value};
use wiremock::MockServer;

/// Path prefix of the semantic API on the mock server
pub const SEMANTIC_PREFIX: &str = "/v1/bbcrd-newslabs";

/// Path prefix of the Juicer on the mock server
#[allow(dead_code)]
pub const JUICER_PREFIX: &str = "/bbcrd-juicer";

pub const UKRAINE: &str = "http://dbpedia.org/resource/Ukraine";

/// Configuration pointing every host at `server`
pub fn config_for(server: &MockServer) -> Config {
    let mut config = Config::with_api_key("test-key");
    config.api.semantic_host = format!("{}{SEMANTIC_PREFIX}", server.uri());
    config.api.juicer_host = format!("{}{JUICER_PREFIX}", server.uri());
    config.api.sources_url = format!("{}/api/products", server.uri());
    config.http.request_timeout_secs = 5;
    config
}

/// Client without a cache
pub async fn client_for(server: &MockServer) -> NewsQuery {
    NewsQuery::connect(config_for(server)).await.unwrap()
}

/// Client with an in-process cache
#[allow(dead_code)]
pub async fn cached_client_for(server: &MockServer) -> NewsQuery {
    let mut config = config_for(server);
    config.cache.backend = CacheBackend::Memory;
    NewsQuery::connect(config).await.unwrap()
}

/// Co-occurrence response carrying a single count
#[allow(dead_code)]
pub fn occurrence_body(count: u64) -> Value {
    json!({
        "co-occurrences": [
            {"thing": UKRAINE, "label": "Ukraine", "occurrence": count.to_string()}
        ]
    })
}

/// `/concepts/tagged` response for "Apple"
#[allow(dead_code)]
pub fn tagged_body() -> Value {
    json!([
        "Apple",
        ["Apple Inc.", "Apple Records"],
        ["Company", "Record Label"],
        [
            "http://dbpedia.org/resource/Apple_Inc.",
            "http://dbpedia.org/resource/Apple_Records"
        ],
        [
            {"type": "http://dbpedia.org/ontology/Company", "thumbnail": "http://img/apple.png"},
            {"type": "http://dbpedia.org/ontology/RecordLabel"}
        ]
    ])
}

/// `/creative-works` response with one tagged article
#[allow(dead_code)]
pub fn creative_works_body() -> Value {
    json!({
        "@graph": [{
            "identifier": "25663926",
            "product": {"@id": "http://www.bbc.co.uk/ontologies/bbc/NewsWeb"},
            "primaryContentOf": "http://www.bbc.co.uk/news/world-europe-25663926",
            "dateCreated": "2014-01-08T11:23:45Z",
            "title": "Ukraine crisis",
            "description": "Talks continue",
            "tag": {"@set": [
                {"@id": "http://dbpedia.org/resource/Kiev", "label": "Kiev", "@type": "City", "lat": 50.45, "long": 30.52}
            ]}
        }]
    })
}

/// Juicer search response
#[allow(dead_code)]
pub fn juicer_body() -> Value {
    json!({
        "hits": [
            {"id": 25663926, "title": "Ukraine crisis", "url": "http://www.bbc.co.uk/news/world-europe-25663926", "published": "2014-01-08", "source": {"source-name": "BBC News"}},
            {"id": "g-1", "title": "Kiev talks", "url": "http://example.com/kiev", "source": "The Guardian"}
        ]
    })
}

//! Creative works and sources

use serde_json::Value;
use tracing::warn;

use super::{normalize_limit, NewsQuery};
use crate::models::{Article, ArticleConcept, Source};
use crate::ontology::{OntologyResolver, DBPEDIA_ONTOLOGY_NS};
use crate::utils::{json_string, parse_coordinate};

impl NewsQuery {
    /// List the sources (products) the semantic API indexes
    pub async fn get_sources(&self) -> Vec<Source> {
        self.cached("get_sources", &(), self.fetch_sources()).await
    }

    async fn fetch_sources(&self) -> Vec<Source> {
        let response = self.gateway.get_json(&self.config.api.sources_url).await;
        map_sources(&response)
    }

    /// Articles tagged with every one of `concept_uris`
    ///
    /// `offset` pages through the results in steps of `limit`.
    pub async fn get_articles_by_concept(
        &self,
        concept_uris: &[&str],
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Vec<Article> {
        let limit = normalize_limit(limit);
        let offset = offset.unwrap_or(0);
        self.cached(
            "get_articles_by_concept",
            &(concept_uris, limit, offset),
            self.fetch_articles(concept_uris, limit, offset),
        )
        .await
    }

    async fn fetch_articles(&self, concept_uris: &[&str], limit: u32, offset: u32) -> Vec<Article> {
        let mut params = vec![
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
        ];
        params.extend(concept_uris.iter().map(|uri| ("tag", uri.to_string())));

        let url = self.semantic_url(&["creative-works"], &params);
        let response = self.gateway.get_json(&url).await;
        map_creative_works(&self.ontology, &response)
    }
}

pub(crate) fn map_sources(response: &Value) -> Vec<Source> {
    let Some(graph) = response.get("@graph").and_then(Value::as_array) else {
        warn!("Source listing did not contain a @graph");
        return Vec::new();
    };

    graph
        .iter()
        .map(|product| Source {
            name: json_string(&product["label"]),
            uri: json_string(&product["@id"]),
        })
        .collect()
}

/// Map a creative-works payload to articles
///
/// Accepts either a `{"@graph": [...]}` document or a bare array of works.
pub(crate) fn map_creative_works(ontology: &OntologyResolver, response: &Value) -> Vec<Article> {
    let works = match response {
        Value::Array(works) => works,
        _ => match response.get("@graph").and_then(Value::as_array) {
            Some(works) => works,
            None => return Vec::new(),
        },
    };

    works
        .iter()
        .map(|work| map_creative_work(ontology, work))
        .collect()
}

pub(crate) fn map_creative_work(ontology: &OntologyResolver, work: &Value) -> Article {
    Article {
        id: json_string(&work["identifier"]),
        source: json_string(&work["product"]["@id"]),
        url: json_string(&work["primaryContentOf"]),
        date_created: json_string(&work["dateCreated"]),
        title: json_string(&work["title"]),
        description: json_string(&work["description"]),
        image: json_string(&work["thumbnail"]),
        concepts: tags(&work["tag"])
            .iter()
            .map(|tag| map_tag(ontology, tag))
            .collect(),
    }
}

/// Tags arrive as `{"@set": [...]}`, a plain array, or a single object
fn tags(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::Object(fields) => match fields.get("@set") {
            Some(Value::Array(items)) => items.clone(),
            Some(single @ Value::Object(_)) => vec![single.clone()],
            Some(_) => Vec::new(),
            None => vec![value.clone()],
        },
        _ => Vec::new(),
    }
}

fn map_tag(ontology: &OntologyResolver, tag: &Value) -> ArticleConcept {
    let class = json_string(&tag["@type"]);
    let types = if class.is_empty() {
        Vec::new()
    } else if class.starts_with("http") {
        ontology.resolve_ancestors(&class)
    } else {
        ontology.resolve_ancestors(&format!("{DBPEDIA_ONTOLOGY_NS}{class}"))
    };

    ArticleConcept {
        name: json_string(&tag["label"]),
        uri: json_string(&tag["@id"]),
        image: json_string(&tag["thumbnail"]),
        types,
        lat: parse_coordinate(&tag["lat"]),
        lon: parse_coordinate(&tag["long"]),
    }
}

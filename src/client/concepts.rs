//! Concept lookup, search and co-occurrence

use serde_json::Value;
use tracing::debug;

use super::articles::map_creative_works;
use super::{normalize_limit, NewsQuery};
use crate::gateway::empty_response;
use crate::models::{CoOccurringConcept, Concept, ConceptSummary};
use crate::ontology::OntologyResolver;
use crate::utils::{json_opt_string, json_string, parse_count};

impl NewsQuery {
    /// Get a concept by URI, with articles that mention it
    ///
    /// Returns `None` when the API does not know the concept (or is
    /// unreachable). The concept's `type` is expanded to its full ontology
    /// class chain.
    pub async fn get_concept(&self, concept_uri: &str, article_limit: Option<u32>) -> Option<Concept> {
        let limit = normalize_limit(article_limit);
        self.cached(
            "get_concept",
            &(concept_uri, limit),
            self.fetch_concept(concept_uri, limit),
        )
        .await
    }

    async fn fetch_concept(&self, concept_uri: &str, limit: u32) -> Option<Concept> {
        let url = self.semantic_url(
            &["concepts"],
            &[("uri", concept_uri.to_string()), ("limit", limit.to_string())],
        );
        let response = self.gateway.get_json(&url).await;
        map_concept(&self.ontology, response)
    }

    /// Search concepts by free text, optionally restricted to ontology classes
    ///
    /// Subclasses match too: searching "Apple" among companies also finds
    /// "Apple Records", since a record label is a kind of company.
    pub async fn get_concepts(
        &self,
        keywords: &str,
        limit: Option<u32>,
        class_uris: &[&str],
    ) -> Vec<ConceptSummary> {
        let limit = normalize_limit(limit);
        self.cached(
            "get_concepts",
            &(keywords, limit, class_uris),
            self.fetch_concepts(keywords, limit, class_uris),
        )
        .await
    }

    /// Alias of [`NewsQuery::get_concepts`]
    pub async fn find_concepts(
        &self,
        keywords: &str,
        limit: Option<u32>,
        class_uris: &[&str],
    ) -> Vec<ConceptSummary> {
        self.get_concepts(keywords, limit, class_uris).await
    }

    async fn fetch_concepts(
        &self,
        keywords: &str,
        limit: u32,
        class_uris: &[&str],
    ) -> Vec<ConceptSummary> {
        // The endpoint sometimes returns one result too few; ask for one more
        // and trim afterwards.
        let mut params = vec![
            ("q", keywords.to_string()),
            ("limit", limit.saturating_add(1).to_string()),
        ];
        params.extend(class_uris.iter().map(|uri| ("class", uri.to_string())));

        let url = self.semantic_url(&["concepts", "tagged"], &params);
        let response = self.gateway.get_json(&url).await;
        map_concept_search(&self.ontology, &response, limit as usize)
    }

    /// Concepts mentioned in the same articles as `concept_uri`
    ///
    /// The queried concept itself is never part of the result. `source_uri`
    /// restricts counting to articles from one source.
    pub async fn get_co_occurring_concepts(
        &self,
        concept_uri: &str,
        limit: Option<u32>,
        class_uris: &[&str],
        source_uri: Option<&str>,
    ) -> Vec<CoOccurringConcept> {
        let limit = normalize_limit(limit);
        self.cached(
            "get_co_occurring_concepts",
            &(concept_uri, limit, class_uris, source_uri),
            self.fetch_co_occurring(concept_uri, limit, class_uris, source_uri),
        )
        .await
    }

    /// Older name of [`NewsQuery::get_co_occurring_concepts`]
    #[deprecated(since = "0.2.0", note = "use get_co_occurring_concepts() instead")]
    pub async fn get_related_concepts(
        &self,
        concept_uri: &str,
        limit: Option<u32>,
        class_uris: &[&str],
    ) -> Vec<CoOccurringConcept> {
        self.get_co_occurring_concepts(concept_uri, limit, class_uris, None)
            .await
    }

    async fn fetch_co_occurring(
        &self,
        concept_uri: &str,
        limit: u32,
        class_uris: &[&str],
        source_uri: Option<&str>,
    ) -> Vec<CoOccurringConcept> {
        // One extra: the first entry is usually the queried concept
        let mut params = vec![
            ("uri", concept_uri.to_string()),
            ("limit", limit.saturating_add(1).to_string()),
        ];
        params.extend(class_uris.iter().map(|uri| ("type", uri.to_string())));
        if let Some(source) = source_uri {
            params.push(("source", source.to_string()));
        }

        let url = self.semantic_url(&["concepts", "co-occurrences", ""], &params);
        let response = self.gateway.get_json(&url).await;
        map_co_occurrences(&response, concept_uri, limit as usize)
    }

    /// Total mentions of a concept across every indexed article
    ///
    /// An unreachable API reads as zero and is not cached.
    pub async fn get_concept_occurrences(&self, concept_uri: &str) -> u64 {
        self.cached(
            "get_concept_occurrences",
            &concept_uri,
            self.fetch_concept_occurrences(concept_uri),
        )
        .await
        .unwrap_or(0)
    }

    /// `None` when the gateway degraded to an empty response
    async fn fetch_concept_occurrences(&self, concept_uri: &str) -> Option<u64> {
        let url = self.semantic_url(
            &["concepts", "co-occurrences", ""],
            &[("uri", concept_uri.to_string()), ("limit", "1".to_string())],
        );
        let response = self.gateway.get_json(&url).await;
        if response == empty_response() {
            return None;
        }
        Some(first_occurrence_count(&response))
    }
}

/// Reshape a `/concepts` response
pub(crate) fn map_concept(ontology: &OntologyResolver, response: Value) -> Option<Concept> {
    let Value::Object(mut fields) = response else {
        return None;
    };

    let uri = fields
        .remove("uri")
        .and_then(|v| json_opt_string(&v))?;

    let name = fields.remove("label").map(|v| json_string(&v)).unwrap_or_default();
    let description = fields
        .remove("abstract")
        .map(|v| json_string(&v))
        .unwrap_or_default();
    let types = fields
        .remove("type")
        .map(|v| ontology.resolve_ancestors(&json_string(&v)))
        .unwrap_or_default();
    let image = fields
        .remove("thumbnail")
        .map(|v| json_string(&v))
        .unwrap_or_default();
    let articles = fields
        .remove("articles")
        .map(|v| map_creative_works(ontology, &v))
        .unwrap_or_default();
    fields.remove("typeLabel");

    Some(Concept {
        uri,
        name,
        description,
        types,
        image,
        articles,
        extra: fields,
    })
}

/// Reshape a `/concepts/tagged` response
///
/// The endpoint answers with parallel arrays:
/// `[query, [names], [type labels], [uris], [{type, thumbnail}]]`.
pub(crate) fn map_concept_search(
    ontology: &OntologyResolver,
    response: &Value,
    limit: usize,
) -> Vec<ConceptSummary> {
    let Some(names) = response.get(1).and_then(Value::as_array) else {
        debug!("Concept search returned no name list");
        return Vec::new();
    };

    names
        .iter()
        .enumerate()
        .take(limit)
        .map(|(i, name)| {
            let meta = &response[4][i];
            ConceptSummary {
                name: json_string(name),
                uri: json_string(&response[3][i]),
                image: json_string(&meta["thumbnail"]),
                types: ontology.resolve_ancestors(&json_string(&meta["type"])),
            }
        })
        .collect()
}

/// Reshape a `/concepts/co-occurrences/` response
pub(crate) fn map_co_occurrences(
    response: &Value,
    concept_uri: &str,
    limit: usize,
) -> Vec<CoOccurringConcept> {
    let Some(entries) = response.get("co-occurrences").and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter(|entry| json_string(&entry["thing"]) != concept_uri)
        .take(limit)
        .map(|entry| CoOccurringConcept {
            name: json_string(&entry["label"]),
            uri: json_string(&entry["thing"]),
            occurrences: parse_count(&entry["occurrence"]),
            image: json_string(&entry["img"]),
        })
        .collect()
}

/// Occurrence count of the first co-occurrence entry, or zero
pub(crate) fn first_occurrence_count(response: &Value) -> u64 {
    response
        .get("co-occurrences")
        .and_then(Value::as_array)
        .and_then(|entries| entries.first())
        .map(|entry| parse_count(&entry["occurrence"]))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryCache, OptionalCache};
    use crate::client::testing::ScriptedGateway;
    use crate::config::Config;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn ontology() -> OntologyResolver {
        OntologyResolver::builtin().unwrap()
    }

    fn tagged_response() -> Value {
        json!([
            "Apple",
            ["Apple Inc.", "Apple Records", "Apple Daily"],
            ["Company", "Record Label", "Newspaper"],
            [
                "http://dbpedia.org/resource/Apple_Inc.",
                "http://dbpedia.org/resource/Apple_Records",
                "http://dbpedia.org/resource/Apple_Daily"
            ],
            [
                {"type": "http://dbpedia.org/ontology/Company", "thumbnail": "http://img/apple.png"},
                {"type": "http://dbpedia.org/ontology/RecordLabel"},
                {"type": "http://dbpedia.org/ontology/Newspaper"}
            ]
        ])
    }

    #[test]
    fn test_map_concept_search() {
        let result = map_concept_search(&ontology(), &tagged_response(), 2);

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].name, "Apple Inc.");
        assert_eq!(result[0].image, "http://img/apple.png");
        assert_eq!(result[0].types.len(), 3);
        assert_eq!(result[1].uri, "http://dbpedia.org/resource/Apple_Records");
        assert_eq!(result[1].image, "");
        assert_eq!(result[1].types[1], "http://dbpedia.org/ontology/Company");
    }

    #[test]
    fn test_map_concept_search_tolerates_garbage() {
        assert!(map_concept_search(&ontology(), &json!({}), 5).is_empty());
        assert!(map_concept_search(&ontology(), &json!(["q", []]), 5).is_empty());

        // Parallel arrays of uneven length must not panic
        let short = json!(["q", ["Only name"]]);
        let result = map_concept_search(&ontology(), &short, 5);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].uri, "");
        assert!(result[0].types.is_empty());
    }

    #[test]
    fn test_map_concept_renames_fields() {
        let response = json!({
            "uri": "http://dbpedia.org/resource/David_Cameron",
            "label": "David Cameron",
            "abstract": "British politician",
            "type": "http://dbpedia.org/ontology/PrimeMinister",
            "typeLabel": "Prime Minister",
            "sameAs": "http://www.wikidata.org/entity/Q192"
        });

        let concept = map_concept(&ontology(), response).unwrap();
        assert_eq!(concept.name, "David Cameron");
        assert_eq!(concept.description, "British politician");
        assert_eq!(concept.types[0], "http://dbpedia.org/ontology/PrimeMinister");
        assert_eq!(concept.types[1], "http://dbpedia.org/ontology/Politician");
        assert!(concept.extra.contains_key("sameAs"));
        assert!(!concept.extra.contains_key("typeLabel"));
        assert!(!concept.extra.contains_key("label"));
    }

    #[test]
    fn test_map_concept_without_uri_is_none() {
        assert!(map_concept(&ontology(), json!({})).is_none());
        assert!(map_concept(&ontology(), json!([])).is_none());
        assert!(map_concept(&ontology(), json!({"label": "x"})).is_none());
    }

    #[test]
    fn test_map_co_occurrences_skips_self() {
        let response = json!({
            "co-occurrences": [
                {"thing": "http://dbpedia.org/resource/Ukraine", "label": "Ukraine", "occurrence": "900"},
                {"thing": "http://dbpedia.org/resource/Russia", "label": "Russia", "occurrence": "512", "img": "http://img/ru.png"},
                {"thing": "http://dbpedia.org/resource/Crimea", "label": "Crimea", "occurrence": 80},
                {"thing": "http://dbpedia.org/resource/Kiev", "label": "Kiev", "occurrence": "40"}
            ]
        });

        let result = map_co_occurrences(&response, "http://dbpedia.org/resource/Ukraine", 2);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].name, "Russia");
        assert_eq!(result[0].occurrences, 512);
        assert_eq!(result[0].image, "http://img/ru.png");
        assert_eq!(result[1].occurrences, 80);
        assert_eq!(result[1].image, "");
    }

    #[test]
    fn test_first_occurrence_count() {
        assert_eq!(
            first_occurrence_count(&json!({"co-occurrences": [{"occurrence": "31"}]})),
            31
        );
        assert_eq!(first_occurrence_count(&json!({"co-occurrences": []})), 0);
        assert_eq!(first_occurrence_count(&json!({})), 0);
    }

    #[tokio::test]
    async fn test_get_concepts_requests_one_extra() {
        let gateway = Arc::new(ScriptedGateway::new().route("/concepts/tagged", tagged_response()));
        let client = NewsQuery::with_gateway(Config::with_api_key("k"), gateway.clone()).unwrap();

        let result = client
            .get_concepts("Apple", Some(2), &["http://dbpedia.org/ontology/Company"])
            .await;

        assert_eq!(result.len(), 2);
        let requested = gateway.requested();
        assert_eq!(requested.len(), 1);
        assert!(requested[0].contains("limit=3"));
        assert!(requested[0].contains("class=http%3A%2F%2Fdbpedia.org%2Fontology%2FCompany"));
    }

    #[tokio::test]
    async fn test_zero_limit_is_raised_to_one() {
        let gateway = Arc::new(ScriptedGateway::new().route("/concepts/tagged", tagged_response()));
        let client = NewsQuery::with_gateway(Config::with_api_key("k"), gateway.clone()).unwrap();

        let result = client.get_concepts("Apple", Some(0), &[]).await;
        assert_eq!(result.len(), 1);
        assert!(gateway.requested()[0].contains("limit=2"));
    }

    #[tokio::test]
    async fn test_co_occurrence_source_filter() {
        let gateway = Arc::new(
            ScriptedGateway::new().route("/concepts/co-occurrences/", json!({"co-occurrences": []})),
        );
        let client = NewsQuery::with_gateway(Config::with_api_key("k"), gateway.clone()).unwrap();

        let result = client
            .get_co_occurring_concepts(
                "http://dbpedia.org/resource/Ukraine",
                Some(5),
                &["http://dbpedia.org/ontology/Person"],
                Some("http://www.bbc.co.uk/ontologies/bbc/SkyNews"),
            )
            .await;

        assert!(result.is_empty());
        let url = &gateway.requested()[0];
        assert!(url.contains("limit=6"));
        assert!(url.contains("type=http%3A%2F%2Fdbpedia.org%2Fontology%2FPerson"));
        assert!(url.contains("source=http%3A%2F%2Fwww.bbc.co.uk%2Fontologies%2Fbbc%2FSkyNews"));
    }

    #[tokio::test]
    #[allow(deprecated)]
    async fn test_related_concepts_alias() {
        let gateway = Arc::new(ScriptedGateway::new().route(
            "/concepts/co-occurrences/",
            json!({"co-occurrences": [{"thing": "http://dbpedia.org/resource/Russia", "label": "Russia", "occurrence": "5"}]}),
        ));
        let client = NewsQuery::with_gateway(Config::with_api_key("k"), gateway).unwrap();

        let related = client
            .get_related_concepts("http://dbpedia.org/resource/Ukraine", None, &[])
            .await;
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].occurrences, 5);
    }

    #[tokio::test]
    async fn test_max_limit_does_not_overflow() {
        let gateway = Arc::new(
            ScriptedGateway::new()
                .route("/concepts/tagged", tagged_response())
                .route("/concepts/co-occurrences/", json!({"co-occurrences": []})),
        );
        let client = NewsQuery::with_gateway(Config::with_api_key("k"), gateway.clone()).unwrap();

        let concepts = client.get_concepts("Apple", Some(u32::MAX), &[]).await;
        assert_eq!(concepts.len(), 3);

        let related = client
            .get_co_occurring_concepts(
                "http://dbpedia.org/resource/Ukraine",
                Some(u32::MAX),
                &[],
                None,
            )
            .await;
        assert!(related.is_empty());

        let requested = gateway.requested();
        assert_eq!(requested.len(), 2);
        assert!(requested[0].contains("limit=4294967295"));
        assert!(requested[1].contains("limit=4294967295"));
    }

    fn memory_cache() -> OptionalCache {
        OptionalCache::new(
            Some(Arc::new(MemoryCache::new(10))),
            Duration::from_secs(60),
            "t",
        )
    }

    #[tokio::test]
    async fn test_unreachable_occurrence_count_is_not_cached() {
        let gateway = Arc::new(ScriptedGateway::new());
        let client = NewsQuery::with_gateway(Config::with_api_key("k"), gateway.clone())
            .unwrap()
            .with_cache(memory_cache());

        let uri = "http://dbpedia.org/resource/Ukraine";
        assert_eq!(client.get_concept_occurrences(uri).await, 0);
        assert_eq!(client.get_concept_occurrences(uri).await, 0);

        // Both calls reach the gateway
        assert_eq!(gateway.requested().len(), 2);
    }

    #[tokio::test]
    async fn test_occurrence_count_is_cached() {
        let gateway = Arc::new(ScriptedGateway::new().route(
            "/concepts/co-occurrences/",
            json!({"co-occurrences": [{"occurrence": "77"}]}),
        ));
        let client = NewsQuery::with_gateway(Config::with_api_key("k"), gateway.clone())
            .unwrap()
            .with_cache(memory_cache());

        let uri = "http://dbpedia.org/resource/Ukraine";
        assert_eq!(client.get_concept_occurrences(uri).await, 77);
        assert_eq!(client.get_concept_occurrences(uri).await, 77);
        assert_eq!(gateway.requested().len(), 1);
    }
}

// Application-facing shapes of upstream responses

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Number of mentions of a concept on one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccurrenceSample {
    pub date: String, // YYYY-MM-DD
    pub value: u64,
}

impl OccurrenceSample {
    /// Sample with no recorded mentions
    pub fn zero(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            value: 0,
        }
    }
}

/// A source (product) indexed by the semantic API, e.g. a news outlet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub uri: String,
}

/// Result of a free-text concept search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptSummary {
    pub name: String,
    pub uri: String,
    pub image: String,
    /// Ontology class chain, most specific first
    #[serde(rename = "type")]
    pub types: Vec<String>,
}

/// A single concept with its description and recent articles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    pub uri: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub types: Vec<String>,
    pub image: String,
    pub articles: Vec<Article>,
    /// Upstream fields without a dedicated slot, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A concept mentioned alongside another one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoOccurringConcept {
    pub name: String,
    pub uri: String,
    pub occurrences: u64,
    pub image: String,
}

/// An indexed news article ("creative work")
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub source: String,
    pub url: String,
    pub date_created: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub concepts: Vec<ArticleConcept>,
}

/// A concept an article is tagged with
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArticleConcept {
    pub name: String,
    pub uri: String,
    pub image: String,
    #[serde(rename = "type", default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
}

/// A keyword-search hit from the Juicer API
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JuicerArticle {
    pub id: String,
    pub title: String,
    pub url: String,
    pub published: String,
    pub source: String,
    pub description: String,
    pub image: String,
}

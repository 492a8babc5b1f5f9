//! newsquery - BBC News Labs semantic news API client
//!
//! Concept search, co-occurrence analysis, article retrieval and mention
//! time series over the News Labs semantic API, plus keyword search on the
//! Juicer. Raw upstream JSON is reshaped into flat structs, and concept types
//! are expanded through the DBpedia ontology.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`client`] - The [`NewsQuery`] client and every API operation
//! - [`gateway`] - HTTP access that degrades to an empty response on failure
//! - [`cache`] - Optional in-process or Redis response cache
//! - [`ontology`] - DBpedia class ancestor lookup
//! - [`models`] - Reshaped response types
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use newsquery::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = NewsQuery::connect(Config::from_env()?).await?;
//!     for concept in client.get_concepts("Apple", Some(5), &[]).await {
//!         println!("{} <{}>", concept.name, concept.uri);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod ontology;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::client::NewsQuery;
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, NewsQueryErrorTrait, Result};
    pub use crate::gateway::RequestGateway;
    pub use crate::models::{
        Article, CoOccurringConcept, Concept, ConceptSummary, JuicerArticle, OccurrenceSample,
        Source,
    };
    pub use crate::ontology::OntologyResolver;
}

// Direct re-exports for convenience
pub use client::NewsQuery;
pub use models::{Concept, ConceptSummary, OccurrenceSample};
pub use ontology::OntologyResolver;

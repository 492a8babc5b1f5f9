//! DBpedia ontology support
//!
//! Concept types returned by the semantic API are DBpedia class URIs. The
//! [`OntologyResolver`] expands such a URI into the class and all its parent
//! classes, which makes it easy to check whether a concept is a "Company",
//! "Person", "Place" or some other high-level kind of entity.
//!
//! ```ignore
//! use newsquery::ontology::OntologyResolver;
//!
//! let resolver = OntologyResolver::builtin()?;
//! let chain = resolver.resolve_ancestors("http://dbpedia.org/ontology/RecordLabel");
//! assert!(chain.contains(&"http://dbpedia.org/ontology/Company".to_string()));
//! ```

pub mod resolver;

pub use resolver::{OntologyResolver, DBPEDIA_ONTOLOGY_NS};

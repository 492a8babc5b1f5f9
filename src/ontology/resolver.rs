//! Ancestor lookup for DBpedia ontology classes

use std::collections::HashMap;

use crate::error::{Error, Result};

/// Namespace of resolvable class URIs
pub const DBPEDIA_ONTOLOGY_NS: &str = "http://dbpedia.org/ontology/";

/// Flattened class table shipped with the crate
const BUILTIN_TABLE: &str = include_str!("../../data/dbpedia-ontology-flat.json");

/// Resolves a class URI to its chain of ancestor classes
///
/// The table maps a bare class name (`"RecordLabel"`) to its ancestors,
/// closest first (`["Company", "Organisation", "Agent"]`). It is loaded once
/// and never changes, so a resolver can be shared freely between tasks.
#[derive(Debug, Clone)]
pub struct OntologyResolver {
    table: HashMap<String, Vec<String>>,
}

impl OntologyResolver {
    /// Resolver over the bundled DBpedia table
    ///
    /// # Errors
    ///
    /// Returns `Error::Ontology` if the bundled table is malformed
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_TABLE)
    }

    /// Resolver over a JSON object of `class -> [ancestor, ...]`
    ///
    /// # Errors
    ///
    /// Returns `Error::Ontology` if `json` is not such an object
    pub fn from_json(json: &str) -> Result<Self> {
        let table: HashMap<String, Vec<String>> = serde_json::from_str(json)
            .map_err(|e| Error::Ontology(format!("invalid ontology table: {e}")))?;

        tracing::debug!(classes = table.len(), "Loaded ontology table");

        Ok(Self::from_table(table))
    }

    /// Resolver over an in-memory table
    pub fn from_table(table: HashMap<String, Vec<String>>) -> Self {
        Self { table }
    }

    /// Number of classes with a table entry
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Ancestor chain of `uri`, starting with `uri` itself
    ///
    /// - URIs outside [`DBPEDIA_ONTOLOGY_NS`] resolve to an empty chain.
    /// - Classes without a table entry resolve to `[uri]`.
    pub fn resolve_ancestors(&self, uri: &str) -> Vec<String> {
        let Some(class) = uri.strip_prefix(DBPEDIA_ONTOLOGY_NS) else {
            return Vec::new();
        };

        let ancestors = self.table.get(class).map(Vec::as_slice).unwrap_or_default();

        let mut chain = Vec::with_capacity(ancestors.len() + 1);
        chain.push(uri.to_string());
        chain.extend(
            ancestors
                .iter()
                .map(|ancestor| format!("{DBPEDIA_ONTOLOGY_NS}{ancestor}")),
        );
        chain
    }

    /// Ancestor chain for a bare class name such as `"Company"`
    pub fn resolve_class(&self, class: &str) -> Vec<String> {
        self.resolve_ancestors(&format!("{DBPEDIA_ONTOLOGY_NS}{class}"))
    }
}

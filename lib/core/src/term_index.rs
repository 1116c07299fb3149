use crate::{Error, Result, Vector};
use ahash::AHashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A standard financial term as stored in the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialTerm {
    pub term_id: String,
    pub term_name: String,
    pub term_type: String,
    pub domain: String,
    pub category: String,
}

impl FinancialTerm {
    /// Term with the default `Finance` / `Standard` classification.
    pub fn standard(term_id: impl Into<String>, term_name: impl Into<String>, term_type: impl Into<String>) -> Self {
        Self {
            term_id: term_id.into(),
            term_name: term_name.into(),
            term_type: term_type.into(),
            domain: "Finance".to_string(),
            category: "Standard".to_string(),
        }
    }
}

/// A search hit. `distance` carries the cosine similarity, higher is closer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermMatch {
    #[serde(flatten)]
    pub term: FinancialTerm,
    pub distance: f32,
}

/// Configuration for a term index
#[derive(Debug, Clone)]
pub struct TermIndexConfig {
    pub name: String,
    pub vector_dim: usize,
}

struct IndexedTerm {
    term: FinancialTerm,
    vector: Vector,
}

/// Flat cosine index over financial terms.
///
/// Vectors are normalized on insert so search is a dot product per term.
pub struct TermIndex {
    config: TermIndexConfig,
    terms: RwLock<AHashMap<String, IndexedTerm>>,
}

impl TermIndex {
    pub fn new(config: TermIndexConfig) -> Self {
        Self {
            config,
            terms: RwLock::new(AHashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn vector_dim(&self) -> usize {
        self.config.vector_dim
    }

    pub fn count(&self) -> usize {
        self.terms.read().len()
    }

    /// Insert or replace a term
    pub fn upsert(&self, term: FinancialTerm, vector: Vector) -> Result<()> {
        if vector.dim() != self.config.vector_dim {
            return Err(Error::InvalidDimension {
                expected: self.config.vector_dim,
                actual: vector.dim(),
            });
        }

        let id = term.term_id.clone();
        self.terms.write().insert(
            id,
            IndexedTerm {
                term,
                vector: vector.normalized(),
            },
        );
        Ok(())
    }

    /// Insert many terms, failing on the first bad dimension
    pub fn batch_upsert(&self, terms: Vec<(FinancialTerm, Vector)>) -> Result<()> {
        if let Some((_, bad)) = terms.iter().find(|(_, v)| v.dim() != self.config.vector_dim) {
            return Err(Error::InvalidDimension {
                expected: self.config.vector_dim,
                actual: bad.dim(),
            });
        }

        let mut index = self.terms.write();
        for (term, vector) in terms {
            index.insert(
                term.term_id.clone(),
                IndexedTerm {
                    term,
                    vector: vector.normalized(),
                },
            );
        }
        Ok(())
    }

    /// Top `limit` terms by cosine similarity, best first
    pub fn search(&self, query: &Vector, limit: usize) -> Result<Vec<TermMatch>> {
        if query.dim() != self.config.vector_dim {
            return Err(Error::InvalidDimension {
                expected: self.config.vector_dim,
                actual: query.dim(),
            });
        }

        let normalized_query = query.normalized();
        let terms = self.terms.read();
        let mut results: Vec<TermMatch> = terms
            .values()
            .map(|indexed| TermMatch {
                term: indexed.term.clone(),
                distance: indexed.vector.dot(&normalized_query),
            })
            .collect();

        results.sort_by(|a, b| {
            b.distance
                .total_cmp(&a.distance)
                .then_with(|| a.term.term_id.cmp(&b.term.term_id))
        });
        results.truncate(limit);
        Ok(results)
    }
}

/// Named term indexes shared across requests
#[derive(Default)]
pub struct TermStore {
    indexes: RwLock<AHashMap<String, Arc<TermIndex>>>,
}

impl TermStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_index(&self, config: TermIndexConfig) -> Result<Arc<TermIndex>> {
        let mut indexes = self.indexes.write();
        if indexes.contains_key(&config.name) {
            return Err(Error::IndexExists(config.name));
        }
        let name = config.name.clone();
        let index = Arc::new(TermIndex::new(config));
        indexes.insert(name, index.clone());
        Ok(index)
    }

    /// First index found among `names`, in order
    pub fn resolve(&self, names: &[&str]) -> Result<Arc<TermIndex>> {
        let indexes = self.indexes.read();
        names
            .iter()
            .find_map(|name| indexes.get(*name).cloned())
            .ok_or_else(|| Error::IndexNotFound(names.join(" / ")))
    }

    pub fn list_indexes(&self) -> Vec<String> {
        let mut names: Vec<String> = self.indexes.read().keys().cloned().collect();
        names.sort();
        names
    }
}

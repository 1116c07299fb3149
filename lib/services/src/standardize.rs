use crate::embedding::{EmbedderFactory, EmbeddingOptions};
use crate::ner::NerService;
use crate::Result;
use finterm_core::{EntityGroup, NerOptions, TermMatch, TermStore, TermTypes};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Nearest terms returned per recognized entity
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

/// Options of a standardization request.
///
/// `allFinancialTerms` decides whether recognized entities are kept at all;
/// the remaining keys are passed on to recognition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StdOptions {
    pub all_financial_terms: bool,
    #[serde(flatten)]
    pub ner: NerOptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct StandardizedTerm {
    pub original_term: String,
    pub entity_group: EntityGroup,
    pub standardized_results: Vec<TermMatch>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StdOutput {
    pub message: String,
    pub standardized_terms: Vec<StandardizedTerm>,
}

/// Maps recognized financial terms onto standard terms by vector search
pub struct StdService {
    ner: Arc<NerService>,
    store: Arc<TermStore>,
    embedders: Arc<dyn EmbedderFactory>,
}

impl StdService {
    pub fn new(ner: Arc<NerService>, store: Arc<TermStore>, embedders: Arc<dyn EmbedderFactory>) -> Self {
        Self { ner, store, embedders }
    }

    /// Nearest standard terms for `query` in the index selected by `options`.
    ///
    /// The index is looked up by `dbName` first, then `collectionName`.
    pub async fn search_similar_terms(
        &self,
        query: &str,
        options: &EmbeddingOptions,
        limit: usize,
    ) -> Result<Vec<TermMatch>> {
        let index = self
            .store
            .resolve(&[options.db_name.as_str(), options.collection_name.as_str()])
            .map_err(|e| {
                warn!(db_name = %options.db_name, "term index not loaded: {}", e);
                e
            })?;

        let embedder = self.embedders.embedder(options)?;
        let vector = embedder.embed(query).await?;
        let results = index.search(&vector, limit)?;
        debug!(query, index = index.name(), hits = results.len(), "term search");
        Ok(results)
    }

    /// Recognize entities in `text` and standardize each of them.
    pub async fn standardize(
        &self,
        text: &str,
        options: &StdOptions,
        embedding_options: &EmbeddingOptions,
    ) -> Result<StdOutput> {
        let term_types = TermTypes {
            all_financial_terms: options.all_financial_terms,
            ..TermTypes::default()
        };
        let recognized = self.ner.process(text, &options.ner, &term_types).await?;

        if recognized.entities.is_empty() {
            return Ok(StdOutput {
                message: "No financial terms have been recognized".to_string(),
                standardized_terms: Vec::new(),
            });
        }

        let mut standardized_terms = Vec::with_capacity(recognized.entities.len());
        for entity in recognized.entities {
            let standardized_results = self
                .search_similar_terms(&entity.word, embedding_options, DEFAULT_SEARCH_LIMIT)
                .await?;
            standardized_terms.push(StandardizedTerm {
                original_term: entity.word,
                entity_group: entity.entity_group,
                standardized_results,
            });
        }

        Ok(StdOutput {
            message: format!(
                "{} financial terms have been recognized and standardized",
                standardized_terms.len()
            ),
            standardized_terms,
        })
    }
}

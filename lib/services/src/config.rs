use crate::catalog::{db_name_for_model, DEFAULT_COLLECTION_NAME, DEFAULT_EMBEDDING_MODEL};
use crate::embedding::{EmbeddingOptions, EmbeddingProvider};
use finterm_core::OverlapPolicy;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_NER_URL: &str = "http://localhost:8080";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";
pub const DEFAULT_EMBEDDING_URL: &str = "http://localhost:8081";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Endpoints and defaults the services are built from
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub ner_url: String,
    pub ollama_url: String,
    pub openai_url: String,
    pub openai_api_key: Option<String>,
    pub embedding_url: String,
    pub embedding_provider: EmbeddingProvider,
    pub embedding_model: String,
    /// Header-less `term_name,term_type` CSV; no index is seeded when unset
    pub terms_file: Option<PathBuf>,
    pub collection_name: String,
    pub overlap_policy: OverlapPolicy,
    pub request_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            ner_url: DEFAULT_NER_URL.to_string(),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            openai_url: DEFAULT_OPENAI_URL.to_string(),
            openai_api_key: None,
            embedding_url: DEFAULT_EMBEDDING_URL.to_string(),
            embedding_provider: EmbeddingProvider::default(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            terms_file: None,
            collection_name: DEFAULT_COLLECTION_NAME.to_string(),
            overlap_policy: OverlapPolicy::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ServiceConfig {
    /// Embedding selection matching the seeded term index
    pub fn embedding_options(&self) -> EmbeddingOptions {
        EmbeddingOptions {
            provider: self.embedding_provider,
            model: self.embedding_model.clone(),
            db_name: db_name_for_model(&self.embedding_model).to_string(),
            collection_name: self.collection_name.clone(),
        }
    }
}

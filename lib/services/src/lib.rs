//! # finterm Services
//!
//! Request-level services on top of `finterm-core`, and the remote
//! collaborators they call:
//!
//! - [`NerService`] - recognizer call plus entity post-processing
//! - [`StdService`] - standardization of recognized terms against a [`finterm_core::TermIndex`]
//! - [`AbbrService`], [`CorrService`], [`GenService`] - LLM backed text tasks
//!
//! Recognizer, embedder and LLM are injected as trait objects. [`Services`]
//! wires them together, either from a [`ServiceConfig`] or from explicit doubles.

pub mod abbr;
pub mod catalog;
pub mod config;
pub mod corr;
pub mod embedding;
pub mod error;
pub mod generate;
mod http;
pub mod llm;
pub mod ner;
pub mod recognizer;
pub mod standardize;
pub mod terms;

#[cfg(test)]
mod testing;

pub use abbr::{AbbrMethod, AbbrOutput, AbbrService};
pub use catalog::{available_models, db_name_for_model, model_info, ModelInfo};
pub use config::ServiceConfig;
pub use corr::{CorrMethod, CorrOutput, CorrService, ErrorOptions, KeyboardLayout};
pub use embedding::{
    Embedder, EmbedderFactory, EmbeddingOptions, EmbeddingProvider, HashingEmbedder, HttpEmbedderFactory,
};
pub use error::{Result, ServiceError};
pub use generate::{CompanyInfo, GenMethod, GenOutput, GenRequest, GenService};
pub use llm::{HttpLlmFactory, LlmClient, LlmFactory, LlmOptions, LlmProvider};
pub use ner::{NerOutput, NerService};
pub use recognizer::{EntityRecognizer, HttpRecognizer};
pub use standardize::{StandardizedTerm, StdOptions, StdOutput, StdService};

use finterm_core::{TermIndex, TermStore};
use std::sync::Arc;
use tracing::info;

/// All request services sharing one term store and one set of collaborators
pub struct Services {
    config: ServiceConfig,
    store: Arc<TermStore>,
    embedders: Arc<dyn EmbedderFactory>,
    ner: Arc<NerService>,
    standardizer: Arc<StdService>,
    abbr: AbbrService,
    corr: CorrService,
    generator: GenService,
}

impl Services {
    pub fn new(
        config: ServiceConfig,
        recognizer: Arc<dyn EntityRecognizer>,
        embedders: Arc<dyn EmbedderFactory>,
        llms: Arc<dyn LlmFactory>,
        store: Arc<TermStore>,
    ) -> Self {
        let ner = Arc::new(NerService::new(recognizer, config.overlap_policy));
        let standardizer = Arc::new(StdService::new(ner.clone(), store.clone(), embedders.clone()));

        Self {
            abbr: AbbrService::new(llms.clone(), standardizer.clone()),
            corr: CorrService::new(llms.clone()),
            generator: GenService::new(llms),
            config,
            store,
            embedders,
            ner,
            standardizer,
        }
    }

    /// HTTP collaborators at the configured endpoints, sharing one client
    pub fn from_config(config: ServiceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let recognizer = Arc::new(HttpRecognizer::new(config.ner_url.clone(), client.clone()));
        let embedders = Arc::new(HttpEmbedderFactory::new(
            client.clone(),
            config.embedding_url.clone(),
            config.openai_url.clone(),
            config.openai_api_key.clone(),
        ));
        let llms = Arc::new(HttpLlmFactory::new(
            client,
            config.ollama_url.clone(),
            config.openai_url.clone(),
            config.openai_api_key.clone(),
        ));

        info!(ner_url = %config.ner_url, policy = ?config.overlap_policy, "Services configured");
        Ok(Self::new(config, recognizer, embedders, llms, Arc::new(TermStore::new())))
    }

    /// Load the configured terms file into the index of the configured embedding model.
    ///
    /// Returns `None` when no terms file is configured.
    pub async fn seed_terms(&self) -> Result<Option<Arc<TermIndex>>> {
        let Some(path) = &self.config.terms_file else {
            return Ok(None);
        };

        let options = self.config.embedding_options();
        let terms = terms::load_terms_csv(path)?;
        let embedder = self.embedders.embedder(&options)?;
        let index = terms::seed_term_index(&self.store, &options.db_name, embedder.as_ref(), terms).await?;
        Ok(Some(index))
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<TermStore> {
        &self.store
    }

    pub fn ner(&self) -> &NerService {
        &self.ner
    }

    pub fn standardizer(&self) -> &StdService {
        &self.standardizer
    }

    pub fn abbr(&self) -> &AbbrService {
        &self.abbr
    }

    pub fn corr(&self) -> &CorrService {
        &self.corr
    }

    pub fn generator(&self) -> &GenService {
        &self.generator
    }
}

//! Collaborator doubles shared by the service tests

use crate::embedding::{Embedder, EmbedderFactory, EmbeddingOptions, EmbeddingProvider, HashingEmbedder};
use crate::llm::{LlmClient, LlmFactory, LlmOptions};
use crate::ner::NerService;
use crate::recognizer::EntityRecognizer;
use crate::standardize::StdService;
use crate::Result;
use async_trait::async_trait;
use finterm_core::{Entity, FinancialTerm, OverlapPolicy, TermIndexConfig, TermStore};
use parking_lot::Mutex;
use std::sync::Arc;

pub const TEST_DIM: usize = 64;
pub const TEST_TERMS: [&str; 3] = ["Common stock", "Corporate bond", "Interest rate"];

/// LLM that answers every prompt with a fixed reply and records the user prompts
#[derive(Clone, Default)]
pub struct EchoLlm {
    reply: String,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl EchoLlm {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Arc::default(),
        }
    }

    pub fn last_prompt(&self) -> String {
        self.prompts.lock().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for EchoLlm {
    async fn complete(&self, _system_prompt: &str, user_prompt: &str) -> Result<String> {
        self.prompts.lock().push(user_prompt.to_string());
        Ok(self.reply.clone())
    }

    fn model_name(&self) -> &str {
        "echo"
    }
}

impl LlmFactory for EchoLlm {
    fn client(&self, options: &LlmOptions) -> Result<Arc<dyn LlmClient>> {
        options.provider()?;
        Ok(Arc::new(self.clone()))
    }
}

pub struct FixedRecognizer(pub Vec<Entity>);

#[async_trait]
impl EntityRecognizer for FixedRecognizer {
    async fn recognize(&self, _text: &str) -> Result<Vec<Entity>> {
        Ok(self.0.clone())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

pub struct HashingOnly(pub Arc<HashingEmbedder>);

impl EmbedderFactory for HashingOnly {
    fn embedder(&self, _options: &EmbeddingOptions) -> Result<Arc<dyn Embedder>> {
        Ok(self.0.clone())
    }
}

pub fn hashing_options() -> EmbeddingOptions {
    EmbeddingOptions {
        provider: EmbeddingProvider::Hashing,
        ..EmbeddingOptions::default()
    }
}

/// Standardizer over a small hashed index named after the default embedding model
pub fn hashing_std_service() -> StdService {
    let embedder = Arc::new(HashingEmbedder::new(TEST_DIM));
    let store = Arc::new(TermStore::new());
    let index = store
        .create_index(TermIndexConfig {
            name: hashing_options().db_name,
            vector_dim: TEST_DIM,
        })
        .unwrap();
    for (i, name) in TEST_TERMS.iter().enumerate() {
        index
            .upsert(
                FinancialTerm::standard(crate::terms::term_id(i), *name, "FINTERM"),
                embedder.embed_sync(name),
            )
            .unwrap();
    }

    let ner = Arc::new(NerService::new(
        Arc::new(FixedRecognizer(Vec::new())),
        OverlapPolicy::Compatible,
    ));
    StdService::new(ner, store, Arc::new(HashingOnly(embedder)))
}

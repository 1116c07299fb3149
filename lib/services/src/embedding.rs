//! Embedding collaborators
//!
//! Term standardization needs a dense vector per query string. Providers are a
//! closed set; `bedrock` is recognised on the wire but not wired up, and
//! answers with [`ServiceError::UnsupportedProvider`].

use crate::catalog::{db_name_for_model, DEFAULT_COLLECTION_NAME, DEFAULT_EMBEDDING_MODEL};
use crate::http::{base_url, send_json};
use crate::{Result, ServiceError};
use async_trait::async_trait;
use finterm_core::Vector;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Dimension of the offline hashing embedder
pub const DEFAULT_HASHING_DIM: usize = 384;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    #[default]
    HuggingFace,
    OpenAi,
    Bedrock,
    Hashing,
}

impl EmbeddingProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbeddingProvider::HuggingFace => "huggingface",
            EmbeddingProvider::OpenAi => "openai",
            EmbeddingProvider::Bedrock => "bedrock",
            EmbeddingProvider::Hashing => "hashing",
        }
    }
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "huggingface" => Ok(EmbeddingProvider::HuggingFace),
            "openai" => Ok(EmbeddingProvider::OpenAi),
            "bedrock" => Ok(EmbeddingProvider::Bedrock),
            "hashing" => Ok(EmbeddingProvider::Hashing),
            other => Err(ServiceError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// Vector database options sent with a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbeddingOptions {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub db_name: String,
    pub collection_name: String,
}

impl Default for EmbeddingOptions {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::HuggingFace,
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            db_name: db_name_for_model(DEFAULT_EMBEDDING_MODEL).to_string(),
            collection_name: DEFAULT_COLLECTION_NAME.to_string(),
        }
    }
}

/// Turns text into dense vectors
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vector>;

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vector>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    fn model_name(&self) -> &str;
}

/// Picks an embedder for the provider/model named in a request
pub trait EmbedderFactory: Send + Sync {
    fn embedder(&self, options: &EmbeddingOptions) -> Result<Arc<dyn Embedder>>;
}

/// Feature-hashing embedder over character trigrams and words.
///
/// Deterministic within a build, needs no model server. Only useful for
/// near-duplicate spellings, not semantics.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dim: usize,
}

impl HashingEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    pub fn embed_sync(&self, text: &str) -> Vector {
        let mut vector = vec![0.0f32; self.dim];
        let normalized = text.to_lowercase();

        let padded: Vec<char> = format!("  {}  ", normalized).chars().collect();
        for window in padded.windows(3) {
            vector[self.bucket(window)] += 1.0;
        }

        for word in normalized.split_whitespace() {
            vector[self.bucket(word)] += 2.0;
        }

        let mut vector = Vector::new(vector);
        vector.normalize();
        vector
    }

    fn bucket<T: Hash + ?Sized>(&self, value: &T) -> usize {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        (hasher.finish() as usize) % self.dim
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_HASHING_DIM)
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vector> {
        Ok(self.embed_sync(text))
    }

    fn model_name(&self) -> &str {
        "hashing"
    }
}

/// text-embeddings-inference server (`POST /embed`)
pub struct TeiEmbedder {
    url: String,
    model: String,
    client: reqwest::Client,
}

impl TeiEmbedder {
    pub fn new(url: impl Into<String>, model: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            model: model.into(),
            client,
        }
    }
}

#[async_trait]
impl Embedder for TeiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vector> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| ServiceError::Embedding("empty embedding response".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vector>> {
        let request = self
            .client
            .post(format!("{}/embed", base_url(&self.url)))
            .json(&serde_json::json!({ "inputs": texts, "normalize": true }));

        let vectors: Vec<Vec<f32>> = send_json(request, ServiceError::Embedding).await?;
        if vectors.len() != texts.len() {
            return Err(ServiceError::Embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                vectors.len()
            )));
        }
        Ok(vectors.into_iter().map(Vector::new).collect())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// OpenAI-compatible `/v1/embeddings`
pub struct OpenAiEmbedder {
    url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct OpenAiEmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct OpenAiEmbeddingResponse {
    data: Vec<OpenAiEmbeddingData>,
}

impl OpenAiEmbedder {
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            model: model.into(),
            client,
        }
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vector> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| ServiceError::Embedding("empty embedding response".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vector>> {
        let request = self
            .client
            .post(format!("{}/v1/embeddings", base_url(&self.url)))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "model": self.model, "input": texts }));

        let mut response: OpenAiEmbeddingResponse = send_json(request, ServiceError::Embedding).await?;
        if response.data.len() != texts.len() {
            return Err(ServiceError::Embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                response.data.len()
            )));
        }
        response.data.sort_by_key(|d| d.index);
        Ok(response.data.into_iter().map(|d| Vector::new(d.embedding)).collect())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Builds HTTP-backed embedders from configured endpoints
pub struct HttpEmbedderFactory {
    client: reqwest::Client,
    tei_url: String,
    openai_url: String,
    openai_api_key: Option<String>,
    hashing: Arc<HashingEmbedder>,
}

impl HttpEmbedderFactory {
    pub fn new(
        client: reqwest::Client,
        tei_url: impl Into<String>,
        openai_url: impl Into<String>,
        openai_api_key: Option<String>,
    ) -> Self {
        Self {
            client,
            tei_url: tei_url.into(),
            openai_url: openai_url.into(),
            openai_api_key,
            hashing: Arc::new(HashingEmbedder::default()),
        }
    }
}

impl EmbedderFactory for HttpEmbedderFactory {
    fn embedder(&self, options: &EmbeddingOptions) -> Result<Arc<dyn Embedder>> {
        match options.provider {
            EmbeddingProvider::HuggingFace => Ok(Arc::new(TeiEmbedder::new(
                self.tei_url.clone(),
                options.model.clone(),
                self.client.clone(),
            ))),
            EmbeddingProvider::OpenAi => {
                let api_key = self.openai_api_key.clone().ok_or_else(|| {
                    ServiceError::Embedding("OPENAI_API_KEY is not configured".to_string())
                })?;
                Ok(Arc::new(OpenAiEmbedder::new(
                    self.openai_url.clone(),
                    api_key,
                    options.model.clone(),
                    self.client.clone(),
                )))
            }
            EmbeddingProvider::Hashing => Ok(self.hashing.clone()),
            EmbeddingProvider::Bedrock => Err(ServiceError::UnsupportedProvider(
                EmbeddingProvider::Bedrock.as_str().to_string(),
            )),
        }
    }
}

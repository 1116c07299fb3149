//! Large language model collaborators
//!
//! Requests name a provider and model in `llmOptions`. The provider string is
//! parsed into [`LlmProvider`]; anything else is refused with
//! [`ServiceError::UnsupportedProvider`] before any network call.

use crate::http::{base_url, send_json};
use crate::{Result, ServiceError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const DEFAULT_LLM_PROVIDER: &str = "ollama";
pub const DEFAULT_LLM_MODEL: &str = "qwen2.5:7b";

/// Sampling temperature for hosted chat models
pub const OPENAI_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    Ollama,
    OpenAi,
}

impl std::str::FromStr for LlmProvider {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ollama" => Ok(LlmProvider::Ollama),
            "openai" => Ok(LlmProvider::OpenAi),
            other => Err(ServiceError::UnsupportedProvider(format!("LLM provider '{}'", other))),
        }
    }
}

/// Model selection sent with a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmOptions {
    pub provider: String,
    pub model: String,
}

impl Default for LlmOptions {
    fn default() -> Self {
        Self {
            provider: DEFAULT_LLM_PROVIDER.to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
        }
    }
}

impl LlmOptions {
    pub fn provider(&self) -> Result<LlmProvider> {
        self.provider.parse()
    }
}

/// Chat-style completion
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;

    /// Get the model name for logging
    fn model_name(&self) -> &str;
}

/// Resolves `llmOptions` to a client
pub trait LlmFactory: Send + Sync {
    fn client(&self, options: &LlmOptions) -> Result<Arc<dyn LlmClient>>;
}

fn chat_messages(system_prompt: &str, user_prompt: &str) -> Vec<serde_json::Value> {
    let mut messages = Vec::with_capacity(2);
    if !system_prompt.is_empty() {
        messages.push(serde_json::json!({ "role": "system", "content": system_prompt }));
    }
    messages.push(serde_json::json!({ "role": "user", "content": user_prompt }));
    messages
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

/// Local Ollama server (`POST /api/chat`)
pub struct OllamaClient {
    url: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(url: impl Into<String>, model: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            model: model.into(),
            client,
        }
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        #[derive(Deserialize)]
        struct ApiResponse {
            message: ChatMessage,
        }

        let request = self
            .client
            .post(format!("{}/api/chat", base_url(&self.url)))
            .json(&serde_json::json!({
                "model": self.model,
                "stream": false,
                "messages": chat_messages(system_prompt, user_prompt),
            }));

        let response: ApiResponse = send_json(request, ServiceError::Llm).await?;
        Ok(response.message.content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// OpenAI-compatible chat completions (`POST /v1/chat/completions`)
pub struct OpenAiClient {
    url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiClient {
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
impl LlmClient for OpenAiClient {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        #[derive(Deserialize)]
        struct Choice {
            message: ChatMessage,
        }
        #[derive(Deserialize)]
        struct ApiResponse {
            choices: Vec<Choice>,
        }

        let request = self
            .client
            .post(format!("{}/v1/chat/completions", base_url(&self.url)))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": self.model,
                "temperature": OPENAI_TEMPERATURE,
                "messages": chat_messages(system_prompt, user_prompt),
            }));

        let response: ApiResponse = send_json(request, ServiceError::Llm).await?;
        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ServiceError::Llm("no choices in completion response".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Builds Ollama / OpenAI clients against configured endpoints
pub struct HttpLlmFactory {
    client: reqwest::Client,
    ollama_url: String,
    openai_url: String,
    openai_api_key: Option<String>,
}

impl HttpLlmFactory {
    pub fn new(
        client: reqwest::Client,
        ollama_url: impl Into<String>,
        openai_url: impl Into<String>,
        openai_api_key: Option<String>,
    ) -> Self {
        Self {
            client,
            ollama_url: ollama_url.into(),
            openai_url: openai_url.into(),
            openai_api_key,
        }
    }
}

impl LlmFactory for HttpLlmFactory {
    fn client(&self, options: &LlmOptions) -> Result<Arc<dyn LlmClient>> {
        match options.provider()? {
            LlmProvider::Ollama => Ok(Arc::new(OllamaClient::new(
                self.ollama_url.clone(),
                options.model.clone(),
                self.client.clone(),
            ))),
            LlmProvider::OpenAi => {
                let api_key = self
                    .openai_api_key
                    .clone()
                    .ok_or_else(|| ServiceError::Llm("OPENAI_API_KEY is not configured".to_string()))?;
                Ok(Arc::new(OpenAiClient::new(
                    self.openai_url.clone(),
                    api_key,
                    options.model.clone(),
                    self.client.clone(),
                )))
            }
        }
    }
}

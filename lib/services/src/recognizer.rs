//! Token-classification collaborator
//!
//! The recognition model runs out of process. [`HttpRecognizer`] talks to a
//! Hugging Face style inference endpoint; tests inject their own
//! [`EntityRecognizer`].

use crate::http::send_json;
use crate::{Result, ServiceError};
use async_trait::async_trait;
use finterm_core::Entity;
use serde::Deserialize;

/// Produces raw tagged spans for a text
#[async_trait]
pub trait EntityRecognizer: Send + Sync {
    async fn recognize(&self, text: &str) -> Result<Vec<Entity>>;

    /// Model or endpoint name for logging
    fn name(&self) -> &str;
}

/// Recognizer payload: either a bare span list or an object wrapping one
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RecognizerResponse {
    Entities(Vec<Entity>),
    Wrapped { entities: Vec<Entity> },
}

impl RecognizerResponse {
    pub fn into_entities(self) -> Vec<Entity> {
        match self {
            RecognizerResponse::Entities(entities) => entities,
            RecognizerResponse::Wrapped { entities } => entities,
        }
    }
}

/// Calls a token-classification endpoint with `aggregation_strategy=simple`
pub struct HttpRecognizer {
    url: String,
    client: reqwest::Client,
}

impl HttpRecognizer {
    pub fn new(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }
}

#[async_trait]
impl EntityRecognizer for HttpRecognizer {
    async fn recognize(&self, text: &str) -> Result<Vec<Entity>> {
        let request = self.client.post(&self.url).json(&serde_json::json!({
            "inputs": text,
            "parameters": { "aggregation_strategy": "simple" }
        }));

        let response: RecognizerResponse = send_json(request, ServiceError::Recognizer).await?;
        Ok(response.into_entities())
    }

    fn name(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finterm_core::EntityGroup;

    #[test]
    fn test_bare_response() {
        let json = r#"[{"entity_group": "ORG", "word": "Acme", "start": 0, "end": 4, "score": 0.99}]"#;
        let response: RecognizerResponse = serde_json::from_str(json).unwrap();
        let entities = response.into_entities();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].entity_group, EntityGroup::Org);
    }

    #[test]
    fn test_wrapped_response() {
        let json = r#"{"entities": [{"entity_group": "MONEY", "word": "$5", "start": 10, "end": 12, "score": 0.8}]}"#;
        let response: RecognizerResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.into_entities()[0].entity_group, EntityGroup::Money);
    }

    #[test]
    fn test_malformed_span_rejects_batch() {
        let json = r#"[{"entity_group": "ORG", "start": 0, "end": 4}, {"entity_group": "MONEY", "score": 0.5}]"#;
        assert!(serde_json::from_str::<RecognizerResponse>(json).is_err());
    }
}

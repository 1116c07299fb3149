use crate::recognizer::EntityRecognizer;
use crate::Result;
use finterm_core::{Entity, EntityPostProcessor, NerOptions, OverlapPolicy, TermTypes};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Recognized entities for a text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NerOutput {
    pub text: String,
    pub entities: Vec<Entity>,
}

/// Named entity recognition for financial text
pub struct NerService {
    recognizer: Arc<dyn EntityRecognizer>,
    processor: EntityPostProcessor,
}

impl NerService {
    pub fn new(recognizer: Arc<dyn EntityRecognizer>, policy: OverlapPolicy) -> Self {
        Self {
            recognizer,
            processor: EntityPostProcessor::new(policy),
        }
    }

    /// Recognize entities, then combine, de-overlap and filter them.
    pub async fn process(
        &self,
        text: &str,
        options: &NerOptions,
        term_types: &TermTypes,
    ) -> Result<NerOutput> {
        let raw = self.recognizer.recognize(text).await?;
        let raw_count = raw.len();

        let entities = self.processor.process(text, raw, options, term_types);
        debug!(
            recognizer = self.recognizer.name(),
            raw = raw_count,
            kept = entities.len(),
            "entity post-processing finished"
        );

        Ok(NerOutput {
            text: text.to_string(),
            entities,
        })
    }
}

//! Known embedding and NER models, and the term database each embedding model maps to

use serde::Serialize;

pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";
pub const DEFAULT_COLLECTION_NAME: &str = "financial_terms";

#[derive(Debug, Clone, Copy, Serialize)]
pub struct EmbeddingModel {
    /// Tier key: `lightweight`, `balanced` or `complete`
    #[serde(skip)]
    pub tier: &'static str,
    pub model: &'static str,
    pub size: &'static str,
    pub dimension: usize,
    #[serde(rename = "dbName")]
    pub db_name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct NerModel {
    #[serde(skip)]
    pub tier: &'static str,
    pub name: &'static str,
    pub size: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    #[serde(rename = "type")]
    pub kind: String,
    pub size: String,
    pub description: String,
}

pub const EMBEDDING_MODELS: &[EmbeddingModel] = &[
    EmbeddingModel {
        tier: "lightweight",
        model: "sentence-transformers/all-MiniLM-L6-v2",
        size: "90MB",
        dimension: 384,
        db_name: "financial_terms_minilm",
        description: "Lightweight and fast, suited to development and testing",
    },
    EmbeddingModel {
        tier: "balanced",
        model: "sentence-transformers/all-mpnet-base-v2",
        size: "420MB",
        dimension: 768,
        db_name: "financial_terms_mpnet",
        description: "Balanced size and quality, recommended for production",
    },
    EmbeddingModel {
        tier: "complete",
        model: "BAAI/bge-m3",
        size: "2.27GB",
        dimension: 1024,
        db_name: "financial_terms_bge_m3",
        description: "Best quality, multilingual",
    },
];

pub const NER_MODELS: &[NerModel] = &[
    NerModel {
        tier: "general",
        name: "dbmdz/bert-large-cased-finetuned-conll03-english",
        size: "1.3GB",
        description: "General English NER: persons, organizations, locations",
    },
    NerModel {
        tier: "lightweight",
        name: "dslim/bert-base-NER",
        size: "420MB",
        description: "Lightweight NER model",
    },
    NerModel {
        tier: "financial",
        name: "models/Financial-NER",
        size: "varies",
        description: "Local financial-domain NER model, when available",
    },
];

/// Term database name for an embedding model, matched by substring
pub fn db_name_for_model(model: &str) -> &'static str {
    if model.contains("all-MiniLM-L6-v2") {
        "financial_terms_minilm"
    } else if model.contains("all-mpnet-base-v2") {
        "financial_terms_mpnet"
    } else if model.contains("bge-m3") {
        "financial_terms_bge_m3"
    } else {
        "financial_terms_custom"
    }
}

pub fn embedding_model(model: &str) -> Option<&'static EmbeddingModel> {
    EMBEDDING_MODELS.iter().find(|m| m.model == model)
}

pub fn model_info(model: &str) -> ModelInfo {
    match embedding_model(model) {
        Some(known) => ModelInfo {
            kind: known.tier.to_string(),
            size: known.size.to_string(),
            description: known.description.to_string(),
        },
        None => ModelInfo {
            kind: "custom".to_string(),
            size: "unknown".to_string(),
            description: "Custom model".to_string(),
        },
    }
}

/// Available embedding models keyed by tier, as exposed by `/api/config`
pub fn available_models() -> serde_json::Value {
    let tiers: serde_json::Map<String, serde_json::Value> = EMBEDDING_MODELS
        .iter()
        .map(|m| {
            (
                m.tier.to_string(),
                serde_json::to_value(m).unwrap_or(serde_json::Value::Null),
            )
        })
        .collect();
    serde_json::Value::Object(tiers)
}

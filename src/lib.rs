//! # finterm
//!
//! Financial-domain NLP service: entity recognition with span
//! post-processing, term standardization against an embedded term index,
//! abbreviation expansion, spelling correction and text generation.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! finterm --http-port 8000 --ner-url http://localhost:8080 --terms-file data/terms.csv
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use finterm::prelude::*;
//!
//! let text = "Acme Co $500000";
//! let raw = vec![
//!     Entity::new("ORG", "Acme Co", 0, 7, 0.9),
//!     Entity::new("MONEY", "$500000", 8, 15, 0.7),
//! ];
//! let options = NerOptions { combine_financial_entities: true };
//!
//! let entities = EntityPostProcessor::new(OverlapPolicy::Compatible)
//!     .process(text, raw, &options, &TermTypes::all());
//! assert_eq!(entities[0].entity_group, EntityGroup::CombinedFinancial);
//! assert_eq!(entities[0].word, "Acme Co $500000");
//! ```
//!
//! ## Crate Structure
//!
//! - `finterm-core` - entities, post-processing pipeline, term index
//! - `finterm-services` - recognizer, embedding and LLM collaborators and the request services
//! - `finterm-api` - actix-web REST API

// Re-export core types
pub use finterm_core::{
    Entity, EntityGroup, EntityPostProcessor,
    NerOptions, TermTypes, OverlapPolicy,
    FinancialTerm, TermIndex, TermIndexConfig, TermMatch, TermStore,
    Vector, Error, Result,
};

// Re-export services
pub use finterm_services::{
    Services, ServiceConfig, ServiceError,
    NerService, NerOutput, StdService, StdOptions, StdOutput,
    AbbrService, AbbrMethod, CorrService, CorrMethod, ErrorOptions,
    GenService, GenMethod, GenRequest,
    EmbeddingOptions, EmbeddingProvider, LlmOptions,
};

// Re-export API
pub use finterm_api::RestApi;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Entity, EntityGroup, EntityPostProcessor,
        NerOptions, TermTypes, OverlapPolicy,
        TermStore, Vector,
        Services, ServiceConfig,
        RestApi,
    };
}

/// The pure post-processing stages
pub mod pipeline {
    pub use finterm_core::postprocess::{
        combine_entities, filter_entities, remove_overlapping_entities,
    };
}

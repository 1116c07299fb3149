//! # finterm Core
//!
//! Core library for the finterm financial NLP service.
//!
//! This crate provides the request-independent building blocks:
//!
//! - [`Entity`] / [`EntityGroup`] - recognized spans as produced by a token-classification model
//! - [`NerOptions`] / [`TermTypes`] - typed request options
//! - [`EntityPostProcessor`] - combine, overlap removal and term-type filtering
//! - [`Vector`] - dense embedding
//! - [`TermIndex`] / [`TermStore`] - in-memory cosine index over standard financial terms
//!
//! ## Example
//!
//! ```rust
//! use finterm_core::{Entity, EntityPostProcessor, NerOptions, TermTypes};
//!
//! let text = "Acme $100";
//! let raw = vec![
//!     Entity::new("ORG", "Acme", 0, 4, 0.9),
//!     Entity::new("MONEY", "$100", 5, 9, 0.8),
//! ];
//! let options = NerOptions { combine_financial_entities: true };
//!
//! let entities = EntityPostProcessor::default().process(text, raw, &options, &TermTypes::all());
//! assert_eq!(entities.len(), 1);
//! assert_eq!(entities[0].word, "Acme $100");
//! ```

pub mod entity;
pub mod error;
pub mod options;
pub mod postprocess;
pub mod term_index;
pub mod vector;

pub use entity::{slice_chars, Entity, EntityGroup};
pub use error::{Error, Result};
pub use options::{NerOptions, OverlapPolicy, TermTypes};
pub use postprocess::{
    combine_entities, create_combined_entity, filter_entities, remove_overlapping_entities,
    EntityPostProcessor,
};
pub use term_index::{FinancialTerm, TermIndex, TermIndexConfig, TermMatch, TermStore};
pub use vector::Vector;

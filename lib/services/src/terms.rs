//! Loading standard financial terms into a [`TermIndex`]
//!
//! The terms file is a header-less CSV of `term_name,term_type` rows.
//! Missing cells become `NA`.

use crate::embedding::Embedder;
use crate::Result;
use finterm_core::{FinancialTerm, TermIndex, TermIndexConfig, TermStore};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Terms embedded per request to the embedding backend
pub const SEED_BATCH_SIZE: usize = 1024;

const MISSING: &str = "NA";
const PROBE_TEXT: &str = "Sample Financial Term";

pub fn term_id(position: usize) -> String {
    format!("FIN_{:06}", position)
}

/// Read a terms CSV into standard terms with sequential `FIN_` ids
pub fn load_terms_csv<P: AsRef<Path>>(path: P) -> Result<Vec<FinancialTerm>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path.as_ref())?;

    let mut terms = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let cell = |i: usize| {
            record
                .get(i)
                .filter(|value| !value.is_empty())
                .unwrap_or(MISSING)
                .to_string()
        };
        terms.push(FinancialTerm::standard(term_id(terms.len()), cell(0), cell(1)));
    }

    info!("Loaded {} financial terms from {:?}", terms.len(), path.as_ref());
    Ok(terms)
}

/// Create index `name` in `store` and fill it with embedded `terms`.
///
/// The vector dimension is probed from the embedder before any term is inserted.
pub async fn seed_term_index(
    store: &TermStore,
    name: &str,
    embedder: &dyn Embedder,
    terms: Vec<FinancialTerm>,
) -> Result<Arc<TermIndex>> {
    let vector_dim = embedder.embed(PROBE_TEXT).await?.dim();
    info!(index = name, model = embedder.model_name(), vector_dim, "Creating term index");

    let index = store.create_index(TermIndexConfig {
        name: name.to_string(),
        vector_dim,
    })?;

    let total_batches = terms.len().div_ceil(SEED_BATCH_SIZE);
    for (batch_no, batch) in terms.chunks(SEED_BATCH_SIZE).enumerate() {
        let names: Vec<String> = batch.iter().map(|t| t.term_name.clone()).collect();
        let vectors = embedder.embed_batch(&names).await?;
        index.batch_upsert(batch.iter().cloned().zip(vectors).collect())?;
        info!("Inserted batch {}/{}", batch_no + 1, total_batches);
    }

    info!(index = name, terms = index.count(), "Term index ready");
    Ok(index)
}

//! Abbreviation expansion

use crate::embedding::EmbeddingOptions;
use crate::llm::{LlmFactory, LlmOptions};
use crate::standardize::{StdService, DEFAULT_SEARCH_LIMIT};
use crate::Result;
use finterm_core::TermMatch;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::info;

/// Candidates pulled from the term index before LLM reranking
pub const RERANK_CANDIDATES: usize = 10;

const EXPAND_SYSTEM_PROMPT: &str = "You are a financial terminology expert. \
Expand every abbreviation and acronym in the user's text into its full form. \
Keep the rest of the text unchanged and return only the rewritten text.";

const RERANK_SYSTEM_PROMPT: &str = "You are a financial terminology expert. \
Given an abbreviation, its context and a numbered list of standard financial terms, \
choose the term that is the correct expansion. Answer with the term name only.";

const PROPOSE_SYSTEM_PROMPT: &str = "You are a financial terminology expert. \
Give the most likely full form of the abbreviation in the given context. \
Answer with the expansion only.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbbrMethod {
    /// LLM expansion only
    #[default]
    SimpleOllama,
    /// Index candidates, LLM picks the best one
    QueryDbLlmRerank,
    /// LLM expands, result is standardized against the index
    LlmRankQueryDb,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AbbrOutput {
    Expanded {
        input: String,
        output: String,
    },
    Reranked {
        input: String,
        context: String,
        candidates: Vec<TermMatch>,
        output: String,
    },
    Standardized {
        input: String,
        context: String,
        expansion: String,
        standardized_results: Vec<TermMatch>,
    },
}

pub struct AbbrService {
    llms: Arc<dyn LlmFactory>,
    standardizer: Arc<StdService>,
}

impl AbbrService {
    pub fn new(llms: Arc<dyn LlmFactory>, standardizer: Arc<StdService>) -> Self {
        Self { llms, standardizer }
    }

    pub async fn expand(
        &self,
        method: AbbrMethod,
        text: &str,
        context: &str,
        llm_options: &LlmOptions,
        embedding_options: &EmbeddingOptions,
    ) -> Result<AbbrOutput> {
        info!(?method, model = %llm_options.model, "abbreviation expansion");
        match method {
            AbbrMethod::SimpleOllama => self.simple_expansion(text, llm_options).await,
            AbbrMethod::QueryDbLlmRerank => {
                self.query_db_llm_rerank(text, context, llm_options, embedding_options)
                    .await
            }
            AbbrMethod::LlmRankQueryDb => {
                self.llm_rank_query_db(text, context, llm_options, embedding_options)
                    .await
            }
        }
    }

    pub async fn simple_expansion(&self, text: &str, llm_options: &LlmOptions) -> Result<AbbrOutput> {
        let llm = self.llms.client(llm_options)?;
        let output = llm.complete(EXPAND_SYSTEM_PROMPT, text).await?;
        Ok(AbbrOutput::Expanded {
            input: text.to_string(),
            output: output.trim().to_string(),
        })
    }

    pub async fn query_db_llm_rerank(
        &self,
        text: &str,
        context: &str,
        llm_options: &LlmOptions,
        embedding_options: &EmbeddingOptions,
    ) -> Result<AbbrOutput> {
        let llm = self.llms.client(llm_options)?;
        let candidates = self
            .standardizer
            .search_similar_terms(text, embedding_options, RERANK_CANDIDATES)
            .await?;

        let output = if candidates.is_empty() {
            String::new()
        } else {
            let mut prompt = format!("Abbreviation: {}\nContext: {}\nCandidates:\n", text, context);
            for (i, candidate) in candidates.iter().enumerate() {
                let _ = writeln!(prompt, "{}. {}", i + 1, candidate.term.term_name);
            }
            llm.complete(RERANK_SYSTEM_PROMPT, &prompt).await?.trim().to_string()
        };

        Ok(AbbrOutput::Reranked {
            input: text.to_string(),
            context: context.to_string(),
            candidates,
            output,
        })
    }

    pub async fn llm_rank_query_db(
        &self,
        text: &str,
        context: &str,
        llm_options: &LlmOptions,
        embedding_options: &EmbeddingOptions,
    ) -> Result<AbbrOutput> {
        let llm = self.llms.client(llm_options)?;
        let prompt = format!("Abbreviation: {}\nContext: {}", text, context);
        let expansion = llm.complete(PROPOSE_SYSTEM_PROMPT, &prompt).await?.trim().to_string();

        let standardized_results = self
            .standardizer
            .search_similar_terms(&expansion, embedding_options, DEFAULT_SEARCH_LIMIT)
            .await?;

        Ok(AbbrOutput::Standardized {
            input: text.to_string(),
            context: context.to_string(),
            expansion,
            standardized_results,
        })
    }
}

//! Spelling correction and typo injection

use crate::llm::{LlmFactory, LlmOptions};
use crate::{Result, ServiceError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

const CORRECT_SYSTEM_PROMPT: &str = "You are a financial editor. \
Correct the spelling mistakes in the user's text. Keep financial terminology, \
tickers and figures exactly as written and return only the corrected text.";

const QWERTY_ROWS: [&str; 3] = ["qwertyuiop", "asdfghjkl", "zxcvbnm"];
const AZERTY_ROWS: [&str; 3] = ["azertyuiop", "qsdfghjklm", "wxcvbn"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrMethod {
    #[default]
    CorrectSpelling,
    AddMistakes,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyboardLayout {
    #[default]
    Qwerty,
    Azerty,
}

impl KeyboardLayout {
    fn rows(&self) -> [&'static str; 3] {
        match self {
            KeyboardLayout::Qwerty => QWERTY_ROWS,
            KeyboardLayout::Azerty => AZERTY_ROWS,
        }
    }

    /// Keys physically adjacent to `key` (lowercase), empty when the key is not on the layout
    pub fn neighbours(&self, key: char) -> Vec<char> {
        let rows: Vec<Vec<char>> = self.rows().iter().map(|r| r.chars().collect()).collect();
        let Some((row, col)) = rows
            .iter()
            .enumerate()
            .find_map(|(r, keys)| keys.iter().position(|&k| k == key).map(|c| (r, c)))
        else {
            return Vec::new();
        };

        let row = row as isize;
        let col = col as isize;
        let candidates = [
            (row, col - 1),
            (row, col + 1),
            (row - 1, col),
            (row - 1, col + 1),
            (row + 1, col - 1),
            (row + 1, col),
        ];

        candidates
            .iter()
            .filter_map(|&(r, c)| {
                if r < 0 || c < 0 {
                    return None;
                }
                rows.get(r as usize)?.get(c as usize).copied()
            })
            .collect()
    }
}

/// Typo injection settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorOptions {
    pub probability: f64,
    pub max_errors: usize,
    pub keyboard: KeyboardLayout,
}

impl Default for ErrorOptions {
    fn default() -> Self {
        Self {
            probability: 0.3,
            max_errors: 5,
            keyboard: KeyboardLayout::Qwerty,
        }
    }
}

impl ErrorOptions {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.probability) {
            return Err(ServiceError::InvalidInput(format!(
                "probability must be within [0, 1], got {}",
                self.probability
            )));
        }
        if self.max_errors < 1 {
            return Err(ServiceError::InvalidInput("maxErrors must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Replace letters of `text` by keyboard neighbours.
///
/// Returns the rewritten text and the number of substitutions made.
pub fn add_mistakes<R: Rng>(text: &str, options: &ErrorOptions, rng: &mut R) -> (String, usize) {
    let mut errors = 0;
    let output = text
        .chars()
        .map(|ch| {
            if errors >= options.max_errors || !ch.is_alphabetic() {
                return ch;
            }
            let neighbours = options.keyboard.neighbours(ch.to_ascii_lowercase());
            if neighbours.is_empty() || !rng.random_bool(options.probability) {
                return ch;
            }

            errors += 1;
            let replacement = neighbours[rng.random_range(0..neighbours.len())];
            if ch.is_uppercase() {
                replacement.to_ascii_uppercase()
            } else {
                replacement
            }
        })
        .collect();
    (output, errors)
}

#[derive(Debug, Clone, Serialize)]
pub struct CorrOutput {
    pub input: String,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<usize>,
}

pub struct CorrService {
    llms: Arc<dyn LlmFactory>,
}

impl CorrService {
    pub fn new(llms: Arc<dyn LlmFactory>) -> Self {
        Self { llms }
    }

    pub async fn correct(
        &self,
        method: CorrMethod,
        text: &str,
        error_options: &ErrorOptions,
        llm_options: &LlmOptions,
    ) -> Result<CorrOutput> {
        info!(?method, "spelling correction");
        match method {
            CorrMethod::CorrectSpelling => self.correct_spelling(text, llm_options).await,
            CorrMethod::AddMistakes => self.add_mistakes(text, error_options),
        }
    }

    pub async fn correct_spelling(&self, text: &str, llm_options: &LlmOptions) -> Result<CorrOutput> {
        let llm = self.llms.client(llm_options)?;
        let output = llm.complete(CORRECT_SYSTEM_PROMPT, text).await?;
        Ok(CorrOutput {
            input: text.to_string(),
            output: output.trim().to_string(),
            errors: None,
        })
    }

    pub fn add_mistakes(&self, text: &str, options: &ErrorOptions) -> Result<CorrOutput> {
        options.validate()?;
        let (output, errors) = add_mistakes(text, options, &mut rand::rng());
        Ok(CorrOutput {
            input: text.to_string(),
            output,
            errors: Some(errors),
        })
    }
}

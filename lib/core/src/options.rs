use serde::{Deserialize, Serialize};

/// Processing options for a recognition request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NerOptions {
    /// Merge organizations with adjacent money/percent spans
    pub combine_financial_entities: bool,
}

/// Term-type buckets a caller wants back. All flags default to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TermTypes {
    pub all_financial_terms: bool,
    pub company: bool,
    pub product: bool,
    pub transaction: bool,
}

impl TermTypes {
    #[inline]
    #[must_use]
    pub fn all() -> Self {
        Self {
            all_financial_terms: true,
            ..Self::default()
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.all_financial_terms || self.company || self.product || self.transaction)
    }
}

/// How overlapping spans from different bound groups are treated.
///
/// `Compatible` reproduces the historical behaviour, where a span that
/// starts inside the last accepted span but ends after it is still kept.
/// `Strict` drops such spans so results never overlap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    #[default]
    Compatible,
    Strict,
}

impl std::str::FromStr for OverlapPolicy {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "compatible" => Ok(OverlapPolicy::Compatible),
            "strict" => Ok(OverlapPolicy::Strict),
            other => Err(crate::Error::InvalidConfig(format!(
                "unknown overlap policy '{}', expected 'compatible' or 'strict'",
                other
            ))),
        }
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category label attached to a recognized span.
///
/// Known tags get their own variant; anything else the model emits is kept
/// verbatim in [`EntityGroup::Other`] and never matches a combinable or
/// filter category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityGroup {
    Org,
    Organization,
    Money,
    Percent,
    Product,
    Misc,
    Person,
    Location,
    CombinedFinancial,
    Other(String),
}

impl EntityGroup {
    pub fn as_str(&self) -> &str {
        match self {
            EntityGroup::Org => "ORG",
            EntityGroup::Organization => "ORGANIZATION",
            EntityGroup::Money => "MONEY",
            EntityGroup::Percent => "PERCENT",
            EntityGroup::Product => "PRODUCT",
            EntityGroup::Misc => "MISC",
            EntityGroup::Person => "PER",
            EntityGroup::Location => "LOC",
            EntityGroup::CombinedFinancial => "COMBINED_FINANCIAL",
            EntityGroup::Other(tag) => tag,
        }
    }

    /// Company or institution tags.
    #[inline]
    pub fn is_organization(&self) -> bool {
        matches!(self, EntityGroup::Org | EntityGroup::Organization)
    }

    /// Tags eligible for adjacency merging.
    #[inline]
    pub fn is_combinable(&self) -> bool {
        matches!(self, EntityGroup::Org | EntityGroup::Money | EntityGroup::Percent)
    }

    #[inline]
    pub fn is_product(&self) -> bool {
        matches!(self, EntityGroup::Product | EntityGroup::Misc)
    }

    #[inline]
    pub fn is_transaction(&self) -> bool {
        matches!(self, EntityGroup::Money | EntityGroup::Percent)
    }
}

impl Default for EntityGroup {
    fn default() -> Self {
        EntityGroup::Other(String::new())
    }
}

impl From<String> for EntityGroup {
    fn from(tag: String) -> Self {
        let trimmed = tag.trim();
        // token-level models emit BIO tags when no aggregation is applied
        let bare = trimmed
            .strip_prefix("B-")
            .or_else(|| trimmed.strip_prefix("I-"))
            .unwrap_or(trimmed);

        match bare.to_ascii_uppercase().as_str() {
            "ORG" => EntityGroup::Org,
            "ORGANIZATION" => EntityGroup::Organization,
            "MONEY" => EntityGroup::Money,
            "PERCENT" => EntityGroup::Percent,
            "PRODUCT" => EntityGroup::Product,
            "MISC" => EntityGroup::Misc,
            "PER" | "PERSON" => EntityGroup::Person,
            "LOC" | "LOCATION" => EntityGroup::Location,
            "COMBINED_FINANCIAL" => EntityGroup::CombinedFinancial,
            _ => EntityGroup::Other(tag),
        }
    }
}

impl From<&str> for EntityGroup {
    fn from(tag: &str) -> Self {
        EntityGroup::from(tag.to_string())
    }
}

impl From<EntityGroup> for String {
    fn from(group: EntityGroup) -> Self {
        match group {
            EntityGroup::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EntityGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tagged substring of the source text.
///
/// Offsets are half-open character offsets. Field names follow the
/// token-classification output so recognizer payloads deserialize directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(default, alias = "entity", alias = "label", alias = "group")]
    pub entity_group: EntityGroup,
    #[serde(default, alias = "text")]
    pub word: String,
    pub start: usize,
    pub end: usize,
    #[serde(default)]
    pub score: f64,
    /// The two spans a combined entity was built from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_entities: Option<Vec<Entity>>,
}

impl Entity {
    #[inline]
    #[must_use]
    pub fn new(
        entity_group: impl Into<EntityGroup>,
        word: impl Into<String>,
        start: usize,
        end: usize,
        score: f64,
    ) -> Self {
        Self {
            entity_group: entity_group.into(),
            word: word.into(),
            start,
            end,
            score,
            original_entities: None,
        }
    }

    /// End offset with inverted spans collapsed to zero width.
    #[inline]
    pub fn effective_end(&self) -> usize {
        self.end.max(self.start)
    }

    #[inline]
    pub fn is_combined(&self) -> bool {
        self.original_entities.is_some()
    }
}

/// Slice `text` by character offsets, clamping to the text length.
pub fn slice_chars(text: &str, start: usize, end: usize) -> String {
    if end <= start {
        return String::new();
    }
    text.chars().skip(start).take(end - start).collect()
}

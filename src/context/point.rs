//! Context points: single remembered narrative facts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What aspect of the narrative a context point describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextCategory {
    Character,
    Plot,
    Setting,
    Theme,
}

impl ContextCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextCategory::Character => "character",
            ContextCategory::Plot => "plot",
            ContextCategory::Setting => "setting",
            ContextCategory::Theme => "theme",
        }
    }
}

impl fmt::Display for ContextCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Qualitative importance, mapped onto integer weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    Low,
    Medium,
    High,
    Critical,
}

impl Importance {
    /// Weight for this importance. `Critical` always lands on the critical threshold.
    pub fn weight(&self, critical_weight: u32) -> u32 {
        match self {
            Importance::Low => 1,
            Importance::Medium => 2,
            Importance::High => 3,
            Importance::Critical => critical_weight,
        }
    }
}

/// A single narrative fact. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextPoint {
    text: String,
    category: ContextCategory,
    weight: u32,
    origin_chapter: u32,
}

impl ContextPoint {
    pub fn new(
        text: impl Into<String>,
        category: ContextCategory,
        weight: u32,
        origin_chapter: u32,
    ) -> Self {
        Self {
            text: text.into(),
            category,
            weight,
            origin_chapter,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn category(&self) -> ContextCategory {
        self.category
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    pub fn origin_chapter(&self) -> u32 {
        self.origin_chapter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_importance_weights() {
        assert_eq!(Importance::Low.weight(5), 1);
        assert_eq!(Importance::Medium.weight(5), 2);
        assert_eq!(Importance::High.weight(5), 3);
        assert_eq!(Importance::Critical.weight(5), 5);
        assert_eq!(Importance::Critical.weight(9), 9);
    }

    #[test]
    fn test_category_serialization() {
        let json = serde_json::to_string(&ContextCategory::Setting).unwrap();
        assert_eq!(json, "\"setting\"");
        let parsed: ContextCategory = serde_json::from_str("\"theme\"").unwrap();
        assert_eq!(parsed, ContextCategory::Theme);
    }
}

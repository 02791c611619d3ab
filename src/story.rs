//! Story artifacts produced by the generation pipeline.
//!
//! Model output is loosely typed: list fields sometimes come back as a single
//! string and text fields as arrays or numbers. The lenient deserializers here
//! normalize those shapes so that validation only rejects output that is
//! actually missing content.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub mod chapter;
pub mod characters;
pub mod decisions;
pub mod enrich;
pub mod genre;
pub mod outline;

pub use chapter::Chapter;
pub use characters::{CharacterCast, CharacterList, CharacterProfile, SupportingCharacter, SupportingCharacterList};
pub use decisions::{Branch, Choice, DecisionPoint, DecisionPointList};
pub use genre::{arc_stages, guidance_for, trajectory_hint, GenreEmphasis, GenreGuidance, GenreStage, NarrativePhase};
pub use outline::{ChapterOutline, ChapterOutlineList, StoryOutline};

fn value_to_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Array(items) => items
            .into_iter()
            .map(value_to_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// Accept a string, number, array of strings (joined), or null.
pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_text(value))
}

/// Accept an array, a single string (one element, or none when empty), or null.
pub(crate) fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .into_iter()
            .map(value_to_text)
            .filter(|s| !s.trim().is_empty())
            .collect(),
        other => {
            let text = value_to_text(other);
            if text.trim().is_empty() {
                Vec::new()
            } else {
                vec![text]
            }
        }
    })
}

/// Accept an unsigned integer or a string holding one; anything else becomes 0.
pub(crate) fn lenient_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()).unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

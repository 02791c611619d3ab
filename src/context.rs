//! Narrative context: the facts carried from one chapter into the next.

pub mod point;
pub mod store;

pub use point::{ContextCategory, ContextPoint, Importance};
pub use store::{ChapterContext, ChapterSummary, ContextStore};

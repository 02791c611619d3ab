//! Pipeline stages and the run state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One model invocation within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Foundation,
    ChapterOutlines,
    MainCharacters,
    SupportingCharacters,
    Chapter(u32),
    DecisionPoints(u32),
    Branch(u32),
    Suggestions,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::Foundation => f.write_str("foundation"),
            PipelineStage::ChapterOutlines => f.write_str("chapter outlines"),
            PipelineStage::MainCharacters => f.write_str("main characters"),
            PipelineStage::SupportingCharacters => f.write_str("supporting characters"),
            PipelineStage::Chapter(n) => write!(f, "chapter {}", n),
            PipelineStage::DecisionPoints(n) => write!(f, "decision points for chapter {}", n),
            PipelineStage::Branch(n) => write!(f, "branch for chapter {}", n),
            PipelineStage::Suggestions => f.write_str("element suggestions"),
        }
    }
}

/// Where a story run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    FoundationGenerated,
    CharactersGenerated,
    /// Chapter `n` has been generated and persisted.
    ChapterLoop(u32),
    /// Decision points for chapter `n` have been generated and persisted.
    DecisionPoints(u32),
    Complete,
    Failed(PipelineStage),
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Complete | PipelineState::Failed(_))
    }

    /// Whether `next` is a legal successor of `self` in a run of `total_chapters`.
    pub fn can_transition_to(&self, next: &PipelineState, total_chapters: u32) -> bool {
        use PipelineState::*;

        if let Failed(_) = next {
            return !self.is_terminal();
        }
        match (*self, *next) {
            (Idle, FoundationGenerated) => true,
            (FoundationGenerated, CharactersGenerated) => true,
            (CharactersGenerated, ChapterLoop(1)) => true,
            (ChapterLoop(i), DecisionPoints(j)) => i == j,
            (ChapterLoop(i), ChapterLoop(j)) | (DecisionPoints(i), ChapterLoop(j)) => {
                j == i + 1 && j <= total_chapters
            }
            (ChapterLoop(i), Complete) | (DecisionPoints(i), Complete) => i == total_chapters,
            _ => false,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Idle => f.write_str("idle"),
            PipelineState::FoundationGenerated => f.write_str("foundation generated"),
            PipelineState::CharactersGenerated => f.write_str("characters generated"),
            PipelineState::ChapterLoop(n) => write!(f, "chapter {} generated", n),
            PipelineState::DecisionPoints(n) => write!(f, "decision points for chapter {} generated", n),
            PipelineState::Complete => f.write_str("complete"),
            PipelineState::Failed(stage) => write!(f, "failed at {}", stage),
        }
    }
}

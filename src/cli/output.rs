//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{ApiError, PipelineError};

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::Pipeline(PipelineError::StageFailed { stage, source }) => match source.raw_response() {
            Some(raw) if !raw.trim().is_empty() => format!(
                "Generation failed at {}: {}\nLast model response:\n{}",
                stage,
                source,
                truncate(raw.trim(), 500)
            ),
            _ => format!("Generation failed at {}: {}", stage, source),
        },
        other => other.to_string(),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

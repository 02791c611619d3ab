//! Error types for the Storyloom generation pipeline.

use crate::pipeline::PipelineStage;
use std::path::PathBuf;
use thiserror::Error;

/// Prompt template errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("Template '{template}' requires placeholder '{{{placeholder}}}' but no value was supplied")]
    MissingPlaceholder {
        template: String,
        placeholder: String,
    },

    #[error("Template '{template}' is malformed at byte {offset}: {reason}")]
    Malformed {
        template: String,
        offset: usize,
        reason: String,
    },
}

/// Failures of the opaque model call itself
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Provider authentication failed: {0}")]
    AuthFailed(String),

    #[error("Provider rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Provider model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider request failed: {0}")]
    RequestFailed(String),

    #[error("Provider returned an unreadable response: {0}")]
    InvalidResponse(String),

    #[error("Failed to create provider client: {0}")]
    Client(String),
}

/// Outcome of a structured generation call that did not succeed
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    /// Model output never matched the expected schema within the attempt budget.
    #[error("Model output did not match schema '{schema}' after {attempts} attempt(s): {reason}")]
    Parse {
        schema: &'static str,
        attempts: u32,
        reason: String,
        raw_response: String,
    },

    /// Call-layer failure; never retried locally.
    #[error("Model call failed: {0}")]
    Transport(#[from] ProviderError),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl GenerationError {
    /// Last raw model response, when the failure was a parse failure.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            GenerationError::Parse { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }
}

/// Story directory persistence errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Story artifact not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to serialize {path}: {message}")]
    Serialization { path: PathBuf, message: String },

    #[error("Storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Run-level failures of the orchestrator
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Stage '{stage}' failed: {source}")]
    StageFailed {
        stage: PipelineStage,
        #[source]
        source: GenerationError,
    },

    #[error("Failed to persist artifacts: {0}")]
    Storage(#[from] StorageError),

    #[error("Invalid story request: {0}")]
    InvalidRequest(String),

    #[error("Failed to serialize prompt input: {0}")]
    PromptInput(#[from] serde_json::Error),
}

impl PipelineError {
    /// Stage that aborted the run, if the failure came from a model call.
    pub fn failed_stage(&self) -> Option<PipelineStage> {
        match self {
            PipelineError::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Top-level error surfaced to the CLI
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

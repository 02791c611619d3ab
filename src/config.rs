//! Configuration System
//!
//! Layered configuration for the story pipeline: built-in defaults, the global
//! config file, workspace config files and `STORYLOOM__SECTION__KEY` environment
//! overrides, merged with the `config` crate and validated before a run starts.

use crate::context::Importance;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use crate::provider::{ProviderConfig, ProviderType};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryloomConfig {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub generation: GenerationSettings,

    #[serde(default)]
    pub context: ContextSettings,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub prompts: PromptsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_max_attempts() -> u32 {
    2
}

/// Retry budget for structured model calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Total model calls per stage, first attempt included
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_max_points() -> usize {
    30
}

fn default_critical_weight() -> u32 {
    5
}

fn default_chapter_context_limit() -> usize {
    15
}

/// Narrative context store limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSettings {
    /// Store capacity
    #[serde(default = "default_max_points")]
    pub max_points: usize,

    /// Points at or above this weight are evicted last
    #[serde(default = "default_critical_weight")]
    pub critical_weight: u32,

    /// Points handed to a single chapter prompt
    #[serde(default = "default_chapter_context_limit")]
    pub chapter_context_limit: usize,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            max_points: default_max_points(),
            critical_weight: default_critical_weight(),
            chapter_context_limit: default_chapter_context_limit(),
        }
    }
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("stories")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Parent directory of per-story directories
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptsConfig {
    /// Directory of `<template_name>.txt` overrides
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Provider(String),
    Generation(String),
    Context(String),
    Output(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Provider(msg) => write!(f, "Provider: {}", msg),
            ValidationError::Generation(msg) => write!(f, "Generation: {}", msg),
            ValidationError::Context(msg) => write!(f, "Context: {}", msg),
            ValidationError::Output(msg) => write!(f, "Output: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl StoryloomConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.provider.validate() {
            errors.push(ValidationError::Provider(e));
        }

        if self.generation.max_attempts == 0 {
            errors.push(ValidationError::Generation(
                "max_attempts must be at least 1".to_string(),
            ));
        }

        if self.context.max_points == 0 {
            errors.push(ValidationError::Context(
                "max_points must be at least 1".to_string(),
            ));
        }
        let high = Importance::High.weight(self.context.critical_weight);
        if self.context.critical_weight <= high {
            errors.push(ValidationError::Context(format!(
                "critical_weight must be greater than {}",
                high
            )));
        }
        if self.context.chapter_context_limit == 0 {
            errors.push(ValidationError::Context(
                "chapter_context_limit must be at least 1".to_string(),
            ));
        }

        if self.output.directory.as_os_str().is_empty() {
            errors.push(ValidationError::Output(
                "output directory cannot be empty".to_string(),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("provider.type", "openai")?
        .set_default("provider.model", "gpt-4o")?
        .set_default("generation.max_attempts", 2)?
        .set_default("output.directory", "stories")
}

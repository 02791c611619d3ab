//! Config loader: merges every source into a validated `StoryloomConfig`.

use super::merge::merge_policy;
use super::sources::{environment, global_file, workspace_file};
use super::StoryloomConfig;
use config::{ConfigError, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads configuration in precedence order (lowest first): built-in defaults,
/// the global file, `config/config.toml`, `config/{STORYLOOM_ENV}.toml`, then
/// `STORYLOOM__SECTION__KEY` environment variables.
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(workspace_root: &Path) -> Result<StoryloomConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder);

        let config: StoryloomConfig = builder.build()?.try_deserialize()?;
        Self::check(config)
    }

    /// Load a single file on top of the defaults; no other sources apply.
    pub fn load_from_file(path: &Path) -> Result<StoryloomConfig, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let builder = merge_policy::builder_with_defaults()?;
        let config: StoryloomConfig = builder
            .add_source(File::from(path.to_path_buf()))
            .build()?
            .try_deserialize()?;
        Self::check(config)
    }

    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }

    fn check(config: StoryloomConfig) -> Result<StoryloomConfig, ConfigError> {
        if let Err(errors) = config.validate() {
            let joined = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ConfigError::Message(format!(
                "Invalid configuration: {}",
                joined
            )));
        }
        debug!(
            provider = %config.provider.provider_type,
            model = %config.provider.model,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Defaults only, ignoring files and environment.
    pub fn defaults() -> Result<StoryloomConfig, ConfigError> {
        merge_policy::builder_with_defaults()?
            .build()?
            .try_deserialize()
    }
}

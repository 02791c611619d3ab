//! Environment source: STORYLOOM__SECTION__KEY

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("STORYLOOM")
            .prefix_separator("__")
            .separator("__")
            .ignore_empty(true)
            .try_parsing(true),
    )
}

//! Integration tests for the configuration system and the CLI run context

use crate::integration::test_utils::with_isolated_env;
use std::path::PathBuf;
use storyloom::cli::{Commands, RunContext};
use storyloom::config::{ConfigLoader, ProviderType};
use storyloom::error::{ApiError, ProviderError};
use storyloom::pipeline::StoryPipeline;
use tempfile::TempDir;

fn write(path: PathBuf, contents: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

#[test]
fn test_all_layers_merge_in_order() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    let config = with_isolated_env(&test_dir, || {
        write(
            test_dir.path().join("xdg/storyloom/config.toml"),
            r#"
[provider]
type = "anthropic"
model = "global-model"
temperature = 0.3

[context]
max_points = 12
"#,
        );
        write(
            workspace.path().join("config/config.toml"),
            r#"
[provider]
model = "workspace-model"

[output]
directory = "library"
"#,
        );
        std::env::set_var("STORYLOOM__GENERATION__MAX_ATTEMPTS", "4");
        ConfigLoader::load(workspace.path()).unwrap()
    });

    assert_eq!(config.provider.provider_type, ProviderType::Anthropic);
    assert_eq!(config.provider.model, "workspace-model");
    assert!((config.provider.temperature - 0.3).abs() < f32::EPSILON);
    assert_eq!(config.context.max_points, 12);
    assert_eq!(config.context.critical_weight, 5);
    assert_eq!(config.generation.max_attempts, 4);
    assert_eq!(config.output.directory, PathBuf::from("library"));
}

#[test]
fn test_invalid_workspace_config_is_rejected() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    let result = with_isolated_env(&test_dir, || {
        write(
            workspace.path().join("config/config.toml"),
            "[provider]\ntype = \"local\"\n\n[generation]\nmax_attempts = 0\n",
        );
        RunContext::new(workspace.path().to_path_buf(), None)
    });

    match result {
        Err(ApiError::ConfigError(message)) => {
            assert!(message.contains("requires an endpoint"), "{message}");
            assert!(message.contains("max_attempts"), "{message}");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("invalid configuration was accepted"),
    }
}

#[tokio::test]
async fn test_run_context_lists_stories_from_configured_directory() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();
    let explicit = workspace.path().join("custom.toml");
    write(explicit.clone(), "[output]\ndirectory = \"my_stories\"\n");

    let context = with_isolated_env(&test_dir, || {
        RunContext::new(workspace.path().to_path_buf(), Some(explicit.clone())).unwrap()
    });
    assert_eq!(context.output_dir(), workspace.path().join("my_stories"));

    write(
        workspace.path().join("my_stories/Old_Tale/story_outline.json"),
        r#"{"title": "Old Tale", "synopsis": "Once."}"#,
    );
    let listed = context.execute(&Commands::List).await.unwrap();
    assert!(listed.contains("Old Tale"), "{listed}");
    assert!(listed.contains("Total: 1 story(ies)"));
}

#[test]
fn test_pipeline_requires_api_key_for_hosted_providers() {
    let test_dir = TempDir::new().unwrap();
    let workspace = TempDir::new().unwrap();

    let (hosted, local) = with_isolated_env(&test_dir, || {
        let hosted = ConfigLoader::load(workspace.path()).unwrap();
        write(
            workspace.path().join("config/config.toml"),
            "[provider]\ntype = \"ollama\"\nmodel = \"llama3\"\n",
        );
        let local = ConfigLoader::load(workspace.path()).unwrap();
        (StoryPipeline::from_config(&hosted), StoryPipeline::from_config(&local))
    });

    assert!(matches!(
        hosted,
        Err(ApiError::Provider(ProviderError::NotConfigured(_)))
    ));
    assert_eq!(local.unwrap().model_name(), "llama3");
}

//! Prompt template overrides and rendering through the pipeline

use crate::integration::test_utils::{replies, ScriptedProvider};
use storyloom::config::ContextSettings;
use storyloom::error::{ApiError, PipelineError, StorageError, TemplateError};
use storyloom::generation::GenerationCaller;
use storyloom::pipeline::{PipelineStage, StoryPipeline};
use storyloom::provider::CompletionOptions;
use storyloom::template::catalog::{TemplateCatalog, TemplateName};
use tempfile::TempDir;

#[test]
fn test_builtin_templates_declare_their_inputs() {
    let catalog = TemplateCatalog::builtin().unwrap();
    let chapter = catalog.get(TemplateName::ChapterGeneration).placeholders();
    for name in ["chapter_num", "total_chapters", "previous_context", "genre_guidance", "format_instructions"] {
        assert!(chapter.contains(&name), "chapter template lacks {name}");
    }
    let suggestions = catalog.get(TemplateName::ElementSuggestions).placeholders();
    assert!(suggestions.contains(&"plot_concept"));
}

#[test]
fn test_override_directory_replaces_only_present_files() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(TemplateName::ElementSuggestions.file_name()),
        "CUSTOM {plot_concept}\n{format_instructions}",
    )
    .unwrap();

    let catalog = TemplateCatalog::load(Some(dir.path())).unwrap();
    assert_eq!(
        catalog.get(TemplateName::ElementSuggestions).placeholders(),
        vec!["plot_concept", "format_instructions"]
    );
    let builtin = TemplateCatalog::builtin().unwrap();
    assert_eq!(
        catalog.get(TemplateName::StoryFoundation),
        builtin.get(TemplateName::StoryFoundation)
    );
}

#[test]
fn test_malformed_override_is_rejected() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("chapter_outline.txt"), "Plan {num_chapters chapters").unwrap();
    let err = TemplateCatalog::load(Some(dir.path())).unwrap_err();
    assert!(matches!(err, ApiError::Template(TemplateError::Malformed { .. })));
}

#[test]
fn test_missing_override_directory() {
    let dir = TempDir::new().unwrap();
    let err = TemplateCatalog::load(Some(dir.path().join("absent").as_path())).unwrap_err();
    assert!(matches!(err, ApiError::Storage(StorageError::NotFound(_))));
}

#[tokio::test]
async fn test_pipeline_renders_override() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("element_suggestions.txt"),
        "CUSTOM PROMPT for {plot_concept}; genres: {available_genres}\n{format_instructions}",
    )
    .unwrap();
    let provider = ScriptedProvider::new([replies::SUGGESTIONS]);
    let caller = GenerationCaller::new(provider.clone(), CompletionOptions::default(), 1);
    let pipeline = StoryPipeline::new(
        caller,
        TemplateCatalog::load(Some(dir.path())).unwrap(),
        ContextSettings::default(),
    );

    pipeline
        .suggest_elements("A postman in Shimla reads the letters he delivers")
        .await
        .unwrap();
    let prompt = &provider.prompts()[0];
    assert!(prompt.starts_with("CUSTOM PROMPT for A postman in Shimla"));
    assert!(prompt.contains("Magical Realism"));
}

#[tokio::test]
async fn test_unknown_placeholder_fails_the_stage_without_a_call() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("element_suggestions.txt"), "{plot_concept} {mood_board}").unwrap();
    let provider = ScriptedProvider::new([replies::SUGGESTIONS]);
    let caller = GenerationCaller::new(provider.clone(), CompletionOptions::default(), 1);
    let pipeline = StoryPipeline::new(
        caller,
        TemplateCatalog::load(Some(dir.path())).unwrap(),
        ContextSettings::default(),
    );

    let err = pipeline
        .suggest_elements("A postman in Shimla reads the letters he delivers")
        .await
        .unwrap_err();
    assert_eq!(err.failed_stage(), Some(PipelineStage::Suggestions));
    assert!(matches!(err, PipelineError::StageFailed { .. }));
    assert_eq!(provider.call_count(), 0);
}

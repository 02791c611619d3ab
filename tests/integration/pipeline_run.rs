//! End-to-end runs through the public pipeline API into a story directory

use crate::integration::test_utils::{pipeline_with, replies, ScriptedProvider};
use storyloom::error::{GenerationError, PipelineError, ProviderError};
use storyloom::options::{NarrativeTone, StoryRequest};
use storyloom::pipeline::{BranchRequest, PipelineStage};
use storyloom::storage::{LibrarySink, StoryLibrary};
use std::path::Path;
use tempfile::TempDir;

fn request(chapters: u32, decisions: u32) -> StoryRequest {
    let mut request = StoryRequest::new(
        "A postman in Shimla reads the letters he delivers",
        vec!["Mystery".to_string(), "drama".to_string()],
    );
    request.chapter_count = chapters;
    request.decision_points_per_chapter = decisions;
    request.tone = NarrativeTone::Mysterious;
    request
}

#[tokio::test]
async fn test_run_persists_every_artifact() {
    let temp = TempDir::new().unwrap();
    let provider = ScriptedProvider::new([
        replies::FOUNDATION,
        replies::OUTLINES,
        replies::MAIN,
        replies::SUPPORTING,
        replies::CHAPTER_ONE,
        replies::DECISIONS,
        replies::CHAPTER_TWO,
        replies::DECISIONS,
    ]);
    let pipeline = pipeline_with(provider.clone(), 2);
    let mut sink = LibrarySink::new(StoryLibrary::new(temp.path()));

    let run = pipeline.run(request(2, 1), &mut sink).await.unwrap();
    assert_eq!(provider.call_count(), 8);

    let storage = sink.storage().unwrap();
    assert_eq!(storage.dir(), temp.path().join("The_Letters_of_Shimla"));

    let outline = storage.load_outline().unwrap();
    assert_eq!(outline, run.outline);
    assert_eq!(outline.genres, vec!["Mystery", "Drama"]);

    let metadata = storage.load_metadata().unwrap();
    assert_eq!(metadata.title, "The Letters of Shimla");
    assert_eq!(metadata.chapter_count, 2);
    assert_eq!(metadata.model, "scripted-model");
    assert_eq!(metadata.narrative_tone, NarrativeTone::Mysterious);

    let cast = storage.load_characters().unwrap();
    assert_eq!(cast.main_characters[0].name, "Ravi");
    assert_eq!(cast.supporting_characters[0].name, "Mr. Sood");

    assert_eq!(storage.chapter_numbers().unwrap(), vec![1, 2]);
    assert!(storage.chapter_path(1).with_extension("md").is_file());
    let decisions = storage.load_decisions(2).unwrap();
    assert_eq!(decisions.decision_points[0].point_id, "dp_2_1");
}

#[tokio::test]
async fn test_saved_artifacts_carry_genre_fields() {
    let temp = TempDir::new().unwrap();
    let provider = ScriptedProvider::new([
        replies::FOUNDATION,
        replies::OUTLINES,
        replies::MAIN,
        replies::SUPPORTING,
        replies::CHAPTER_ONE,
        replies::DECISIONS,
        replies::CHAPTER_TWO,
        replies::DECISIONS,
    ]);
    let pipeline = pipeline_with(provider, 1);
    let mut sink = LibrarySink::new(StoryLibrary::new(temp.path()));
    pipeline.run(request(2, 1), &mut sink).await.unwrap();
    let storage = sink.storage().unwrap();

    let cast = storage.load_characters().unwrap();
    let ravi = &cast.main_characters[0];
    assert_eq!(ravi.narrative_role, "Mystery Participant");
    assert_eq!(ravi.emotional_landscape, "Emotionally guarded with hidden depths");
    assert_eq!(ravi.genre_traits, "Observant and analytical, Emotionally expressive");
    assert_eq!(cast.supporting_characters[0].genre_role, "Information Provider or Red Herring");
    assert!(!cast.supporting_characters[0].genre_purpose.is_empty());

    let point = &storage.load_decisions(2).unwrap().decision_points[0];
    assert_eq!(
        point.genre_impacts,
        "This decision could lead toward solving the mystery; This decision resolves Drama elements"
    );
    assert_eq!(point.choices[0].genre_emphasis, "Drama");
    assert_eq!(point.choices[1].genre_emphasis, "Mystery");
}

#[tokio::test]
async fn test_chapter_prompts_carry_previous_context() {
    let temp = TempDir::new().unwrap();
    let provider = ScriptedProvider::new([
        replies::FOUNDATION,
        replies::OUTLINES,
        replies::MAIN,
        replies::SUPPORTING,
        replies::CHAPTER_ONE,
        replies::CHAPTER_TWO,
    ]);
    let pipeline = pipeline_with(provider.clone(), 1);
    let mut sink = LibrarySink::new(StoryLibrary::new(temp.path()));
    pipeline.run(request(2, 0), &mut sink).await.unwrap();

    let prompts = provider.prompts();
    assert_eq!(prompts.len(), 6);
    assert!(!prompts[4].contains("A critical letter names Meera"));
    assert!(prompts[5].contains("A critical letter names Meera"));
    assert!(prompts[5].contains("Ravi reads a letter."));
}

#[tokio::test]
async fn test_failed_stage_keeps_completed_artifacts() {
    let temp = TempDir::new().unwrap();
    let provider = ScriptedProvider::new([
        replies::FOUNDATION,
        replies::OUTLINES,
        replies::MAIN,
        replies::SUPPORTING,
        replies::CHAPTER_ONE,
        "I would rather not write chapter two.",
    ]);
    let pipeline = pipeline_with(provider.clone(), 2);
    let mut sink = LibrarySink::new(StoryLibrary::new(temp.path()));

    let err = pipeline.run(request(2, 0), &mut sink).await.unwrap_err();
    match err {
        PipelineError::StageFailed {
            stage,
            source: GenerationError::Parse { attempts, .. },
        } => {
            assert_eq!(stage, PipelineStage::Chapter(2));
            assert_eq!(attempts, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
    // One retry of the unusable reply, then stop.
    assert_eq!(provider.call_count(), 7);

    let storage = sink.storage().unwrap();
    assert_eq!(storage.chapter_numbers().unwrap(), vec![1]);
    assert!(storage.load_characters().is_ok());
}

#[tokio::test]
async fn test_transport_failure_is_not_retried() {
    let temp = TempDir::new().unwrap();
    let provider = ScriptedProvider::with_results(vec![Err(ProviderError::RateLimited(
        "slow down".to_string(),
    ))]);
    let pipeline = pipeline_with(provider.clone(), 3);
    let mut sink = LibrarySink::new(StoryLibrary::new(temp.path()));

    let err = pipeline.run(request(1, 0), &mut sink).await.unwrap_err();
    assert_eq!(err.failed_stage(), Some(PipelineStage::Foundation));
    assert_eq!(provider.call_count(), 1);
    assert!(sink.storage().is_none());
}

#[tokio::test]
async fn test_branch_from_saved_story() {
    let temp = TempDir::new().unwrap();
    let provider = ScriptedProvider::new([
        replies::FOUNDATION,
        replies::OUTLINES,
        replies::MAIN,
        replies::SUPPORTING,
        replies::CHAPTER_ONE,
        replies::DECISIONS,
        replies::BRANCH,
    ]);
    let pipeline = pipeline_with(provider.clone(), 1);
    let library = StoryLibrary::new(temp.path());
    let mut sink = LibrarySink::new(library.clone());
    pipeline.run(request(1, 1), &mut sink).await.unwrap();

    let storage = library.open(Path::new("The_Letters_of_Shimla")).unwrap();
    let metadata = storage.load_metadata().unwrap();
    let outline = storage.load_outline().unwrap();
    let cast = storage.load_characters().unwrap();
    let chapter = storage.load_chapter(1).unwrap();
    let decisions = storage.load_decisions(1).unwrap();
    let point = decisions.find("dp_1_1").unwrap();

    let branch = pipeline
        .generate_branch(BranchRequest {
            metadata: &metadata,
            outline: &outline,
            cast: &cast,
            chapter: &chapter,
            decision_point: point,
            choice_id: "c_1_1_2",
        })
        .await
        .unwrap();
    assert_eq!(branch.decision_point_id, "dp_1_1");
    assert_eq!(branch.choice_id, "c_1_1_2");
    assert_eq!(
        branch.genre_elements,
        vec!["Mystery progression with new revelations (Mystery)"]
    );
    assert_eq!(branch.genre_shift, "Leans further into mystery");
    assert_eq!(branch.follow_up_hooks, vec!["Mr. Sood notices"]);

    let path = storage.save_branch(&branch).unwrap();
    assert!(path.ends_with("branches/dp_1_1/c_1_1_2.json"));
    assert_eq!(storage.load_branch("dp_1_1", "c_1_1_2").unwrap(), branch);
}

#[tokio::test]
async fn test_unknown_choice_makes_no_model_call() {
    let temp = TempDir::new().unwrap();
    let provider = ScriptedProvider::new([
        replies::FOUNDATION,
        replies::OUTLINES,
        replies::MAIN,
        replies::SUPPORTING,
        replies::CHAPTER_ONE,
        replies::DECISIONS,
    ]);
    let pipeline = pipeline_with(provider.clone(), 1);
    let mut sink = LibrarySink::new(StoryLibrary::new(temp.path()));
    let run = pipeline.run(request(1, 1), &mut sink).await.unwrap();
    let calls = provider.call_count();

    let result = pipeline
        .generate_branch(BranchRequest {
            metadata: &run.metadata,
            outline: &run.outline,
            cast: &run.cast,
            chapter: &run.chapters[0],
            decision_point: &run.decisions[&1].decision_points[0],
            choice_id: "c_9_9_9",
        })
        .await;
    assert!(matches!(result, Err(PipelineError::InvalidRequest(_))));
    assert_eq!(provider.call_count(), calls);
}

#[tokio::test]
async fn test_suggestions_are_filtered_to_known_options() {
    let provider = ScriptedProvider::new([replies::SUGGESTIONS]);
    let pipeline = pipeline_with(provider.clone(), 1);

    let suggestions = pipeline
        .suggest_elements("A postman in Shimla reads the letters he delivers")
        .await
        .unwrap();
    assert_eq!(suggestions.genre_names(), vec!["Mystery"]);
    assert_eq!(suggestions.suggested_tones[0].name, "Suspenseful");
    assert_eq!(suggestions.suggested_pacing[0].name, "Slow-burning");
    assert!(!suggestions.suggested_pacing[0].reason.is_empty());

    let short = pipeline.suggest_elements("Letters").await.unwrap();
    assert_eq!(short.genre_names(), vec!["Drama", "Family Saga", "Social Commentary"]);
    assert_eq!(provider.call_count(), 1);
}

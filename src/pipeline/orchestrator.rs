//! Story run orchestration.
//!
//! A run is strictly sequential: every stage is one `GenerationCaller` call whose
//! prompt depends on the validated output of the stages before it. Artifacts are
//! handed to an `ArtifactSink` as soon as their stage succeeds, so a failed run
//! keeps everything generated up to the failing stage.

use crate::config::{ContextSettings, StoryloomConfig};
use crate::context::ContextStore;
use crate::error::{ApiError, GenerationError, PipelineError, StorageError};
use crate::generation::{GenerationCaller, StructuredOutput};
use crate::options::{
    ElementSuggestions, Language, NamedOption, NarrativePacing, NarrativeTone, Region, StoryRequest,
    AVAILABLE_GENRES, MIN_CONCEPT_LEN,
};
use crate::pipeline::state::{PipelineStage, PipelineState};
use crate::provider::ProviderFactory;
use crate::story::enrich::{
    enrich_branch, enrich_decision_points, enrich_main_characters, enrich_supporting_characters,
};
use crate::story::{
    guidance_for, trajectory_hint, Branch, Chapter, CharacterCast, CharacterList, ChapterOutlineList,
    DecisionPoint, DecisionPointList, StoryOutline, SupportingCharacterList,
};
use crate::template::{TemplateCatalog, TemplateName, TemplateValues};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Run parameters recorded next to the story (`metadata.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryMetadata {
    #[serde(default)]
    pub title: String,
    pub concept: String,
    pub genres: Vec<String>,
    pub region: Region,
    pub narrative_tone: NarrativeTone,
    pub narrative_pacing: NarrativePacing,
    pub language: Language,
    pub chapter_count: u32,
    #[serde(default)]
    pub decision_points_per_chapter: u32,
    pub model: String,
    pub created_at: DateTime<Utc>,
}

impl StoryMetadata {
    pub fn from_request(request: &StoryRequest, model: &str) -> Self {
        Self {
            title: String::new(),
            concept: request.concept.clone(),
            genres: request.genres.clone(),
            region: request.region,
            narrative_tone: request.tone,
            narrative_pacing: request.pacing,
            language: request.language,
            chapter_count: request.chapter_count,
            decision_points_per_chapter: request.decision_points_per_chapter,
            model: model.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Placeholders shared by every story prompt.
    fn base_values(&self) -> TemplateValues {
        TemplateValues::new()
            .with("region", self.region.name())
            .with("narrative_tone", self.narrative_tone.name())
            .with("narrative_pacing", self.narrative_pacing.name())
            .with("genres", self.genres.join(", "))
            .with("language", self.language.name())
    }
}

/// Receives each artifact once its stage has succeeded.
pub trait ArtifactSink: Send {
    fn save_outline(&mut self, outline: &StoryOutline, metadata: &StoryMetadata) -> Result<(), StorageError>;

    fn save_characters(&mut self, cast: &CharacterCast) -> Result<(), StorageError>;

    fn save_chapter(&mut self, chapter: &Chapter) -> Result<(), StorageError>;

    fn save_decisions(&mut self, chapter_number: u32, decisions: &DecisionPointList) -> Result<(), StorageError>;

    fn stage_started(&mut self, _stage: PipelineStage) {}

    fn state_changed(&mut self, _state: PipelineState) {}
}

/// Everything a completed run produced.
#[derive(Debug, Clone)]
pub struct StoryRun {
    pub metadata: StoryMetadata,
    pub outline: StoryOutline,
    pub cast: CharacterCast,
    pub chapters: Vec<Chapter>,
    pub decisions: BTreeMap<u32, DecisionPointList>,
}

/// Inputs for generating one branch of a saved story.
#[derive(Debug, Clone, Copy)]
pub struct BranchRequest<'a> {
    pub metadata: &'a StoryMetadata,
    pub outline: &'a StoryOutline,
    pub cast: &'a CharacterCast,
    pub chapter: &'a Chapter,
    pub decision_point: &'a DecisionPoint,
    pub choice_id: &'a str,
}

struct Progress {
    state: PipelineState,
    stage: PipelineStage,
    total_chapters: u32,
}

impl Progress {
    fn new(total_chapters: u32) -> Self {
        Self {
            state: PipelineState::Idle,
            stage: PipelineStage::Foundation,
            total_chapters,
        }
    }

    fn begin(&mut self, stage: PipelineStage, sink: &mut dyn ArtifactSink) {
        self.stage = stage;
        info!(stage = %stage, "Starting stage");
        sink.stage_started(stage);
    }

    fn advance(&mut self, next: PipelineState, sink: &mut dyn ArtifactSink) {
        debug_assert!(
            self.state.can_transition_to(&next, self.total_chapters),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        debug!(from = %self.state, to = %next, "Pipeline state change");
        self.state = next;
        sink.state_changed(next);
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, PipelineError> {
    Ok(serde_json::to_string(value)?)
}

/// Drives one story from concept to final chapter.
pub struct StoryPipeline {
    caller: GenerationCaller,
    templates: TemplateCatalog,
    context: ContextSettings,
}

impl StoryPipeline {
    pub fn new(caller: GenerationCaller, templates: TemplateCatalog, context: ContextSettings) -> Self {
        Self {
            caller,
            templates,
            context,
        }
    }

    /// Build the provider client, caller and template catalog from configuration.
    pub fn from_config(config: &StoryloomConfig) -> Result<Self, ApiError> {
        let client = ProviderFactory::from_config(&config.provider)?;
        let caller = GenerationCaller::new(
            Arc::from(client),
            config.provider.completion_options(),
            config.generation.max_attempts,
        );
        let templates = TemplateCatalog::load(config.prompts.directory.as_deref())?;
        Ok(Self::new(caller, templates, config.context.clone()))
    }

    pub fn model_name(&self) -> &str {
        self.caller.model_name()
    }

    async fn stage<T: StructuredOutput>(
        &self,
        stage: PipelineStage,
        template: TemplateName,
        mut values: TemplateValues,
    ) -> Result<T, PipelineError> {
        values.set("format_instructions", T::SCHEMA.format_instructions());
        let prompt = self
            .templates
            .get(template)
            .render(&values)
            .map_err(|e| PipelineError::StageFailed {
                stage,
                source: e.into(),
            })?;
        self.caller
            .call::<T>(stage, &prompt)
            .await
            .map_err(|source| PipelineError::StageFailed { stage, source })
    }

    /// Generate a full story, handing artifacts to `sink` as they are produced.
    pub async fn run(
        &self,
        mut request: StoryRequest,
        sink: &mut dyn ArtifactSink,
    ) -> Result<StoryRun, PipelineError> {
        request.validate().map_err(PipelineError::InvalidRequest)?;

        let mut progress = Progress::new(request.chapter_count);
        info!(
            chapters = request.chapter_count,
            genres = %request.genres_joined(),
            model = self.caller.model_name(),
            "Starting story run"
        );

        match self.execute(&request, sink, &mut progress).await {
            Ok(run) => {
                info!(title = %run.outline.title, chapters = run.chapters.len(), "Story run complete");
                Ok(run)
            }
            Err(err) => {
                let stage = err.failed_stage().unwrap_or(progress.stage);
                warn!(stage = %stage, error = %err, "Story run failed");
                progress.advance(PipelineState::Failed(stage), sink);
                Err(err)
            }
        }
    }

    async fn execute(
        &self,
        request: &StoryRequest,
        sink: &mut dyn ArtifactSink,
        progress: &mut Progress,
    ) -> Result<StoryRun, PipelineError> {
        let mut metadata = StoryMetadata::from_request(request, self.caller.model_name());
        let base = metadata.base_values();
        let pacing = request.pacing.name();

        progress.begin(PipelineStage::Foundation, sink);
        let mut outline: StoryOutline = self
            .stage(
                PipelineStage::Foundation,
                TemplateName::StoryFoundation,
                base.clone().with("plot_concept", request.concept.as_str()),
            )
            .await?;
        outline.genres = request.genres.clone();
        outline.chapters.clear();
        metadata.title = outline.title.clone();

        progress.begin(PipelineStage::ChapterOutlines, sink);
        let planned: ChapterOutlineList = self
            .stage(
                PipelineStage::ChapterOutlines,
                TemplateName::ChapterOutline,
                base.clone()
                    .with("num_chapters", request.chapter_count.to_string())
                    .with("story_outline", to_json(&outline)?),
            )
            .await?;
        outline.chapters = planned.normalized(request.chapter_count, &request.genres, pacing);
        sink.save_outline(&outline, &metadata)?;
        progress.advance(PipelineState::FoundationGenerated, sink);

        let story_json = to_json(&outline)?;

        progress.begin(PipelineStage::MainCharacters, sink);
        let main: CharacterList = self
            .stage(
                PipelineStage::MainCharacters,
                TemplateName::MainCharacters,
                base.clone()
                    .with("num_characters", request.main_character_count.to_string())
                    .with("story_outline", story_json.as_str()),
            )
            .await?;
        let mut main_characters = main.characters;
        enrich_main_characters(&mut main_characters, &request.genres, request.tone.name());
        let main_json = to_json(&main_characters)?;

        let supporting = if request.supporting_character_count > 0 {
            progress.begin(PipelineStage::SupportingCharacters, sink);
            let list: SupportingCharacterList = self
                .stage(
                    PipelineStage::SupportingCharacters,
                    TemplateName::SupportingCharacters,
                    base.clone()
                        .with("num_characters", request.supporting_character_count.to_string())
                        .with("story_outline", story_json.as_str())
                        .with("main_characters", main_json.as_str()),
                )
                .await?;
            let mut supporting = list.supporting_characters;
            enrich_supporting_characters(&mut supporting, &request.genres, request.tone.name(), &outline.theme);
            supporting
        } else {
            Vec::new()
        };

        let cast = CharacterCast {
            main_characters,
            supporting_characters: supporting,
        };
        sink.save_characters(&cast)?;
        progress.advance(PipelineState::CharactersGenerated, sink);

        let supporting_json = to_json(&cast.supporting_characters)?;
        let mut store = ContextStore::from_settings(&self.context);
        let mut chapters = Vec::with_capacity(request.chapter_count as usize);
        let mut decisions = BTreeMap::new();
        let total = request.chapter_count;

        for number in 1..=total {
            let stage = PipelineStage::Chapter(number);
            progress.begin(stage, sink);

            let previous = store.chapter_context(number, self.context.chapter_context_limit);
            let guidance = match guidance_for(&request.genres, number, total) {
                Some(g) => to_json(&g)?,
                None => "No specific genre guidance.".to_string(),
            };
            let chapter_outline = match outline.chapter_outline(number) {
                Some(c) => to_json(c)?,
                None => String::new(),
            };

            let mut chapter: Chapter = self
                .stage(
                    stage,
                    TemplateName::ChapterGeneration,
                    base.clone()
                        .with("chapter_num", number.to_string())
                        .with("total_chapters", total.to_string())
                        .with("chapter_outline", chapter_outline)
                        .with("story_outline", story_json.as_str())
                        .with("main_characters", main_json.as_str())
                        .with("supporting_characters", supporting_json.as_str())
                        .with("previous_context", to_json(&previous)?)
                        .with("genre_guidance", guidance),
                )
                .await?;
            chapter.chapter_number = number;
            if let Some(hint) = trajectory_hint(&request.genres, number, total) {
                if !chapter.next_chapter_hooks.contains(&hint) {
                    chapter.next_chapter_hooks.push(hint);
                }
            }

            store.record_chapter(&chapter, number);
            sink.save_chapter(&chapter)?;
            debug!(
                chapter = number,
                words = chapter.word_count(),
                context_points = store.len(),
                "Chapter recorded"
            );
            progress.advance(PipelineState::ChapterLoop(number), sink);

            if request.decision_points_per_chapter > 0 {
                let stage = PipelineStage::DecisionPoints(number);
                progress.begin(stage, sink);
                let mut list: DecisionPointList = self
                    .stage(
                        stage,
                        TemplateName::DecisionPoints,
                        base.clone()
                            .with("num_decisions", request.decision_points_per_chapter.to_string())
                            .with("chapter_num", number.to_string())
                            .with("chapter_content", to_json(&chapter)?)
                            .with("story_outline", story_json.as_str())
                            .with("main_characters", main_json.as_str()),
                    )
                    .await?;
                list.assign_ids(number);
                enrich_decision_points(&mut list, &request.genres, number, total);
                sink.save_decisions(number, &list)?;
                decisions.insert(number, list);
                progress.advance(PipelineState::DecisionPoints(number), sink);
            }

            chapters.push(chapter);
        }

        progress.advance(PipelineState::Complete, sink);

        Ok(StoryRun {
            metadata,
            outline,
            cast,
            chapters,
            decisions,
        })
    }

    /// Continue a saved chapter along one choice of one of its decision points.
    pub async fn generate_branch(&self, request: BranchRequest<'_>) -> Result<Branch, PipelineError> {
        let point = request.decision_point;
        let choice = point.choice(request.choice_id).ok_or_else(|| {
            PipelineError::InvalidRequest(format!(
                "choice '{}' not found in decision point '{}'",
                request.choice_id, point.point_id
            ))
        })?;

        let stage = PipelineStage::Branch(request.chapter.chapter_number);
        info!(
            stage = %stage,
            decision_point = %point.point_id,
            choice = %choice.choice_id,
            "Starting stage"
        );
        let mut branch: Branch = self
            .stage(
                stage,
                TemplateName::BranchGeneration,
                request
                    .metadata
                    .base_values()
                    .with("chapter_content", to_json(request.chapter)?)
                    .with("decision_point", to_json(point)?)
                    .with("selected_choice", to_json(choice)?)
                    .with("story_outline", to_json(request.outline)?)
                    .with("main_characters", to_json(&request.cast.main_characters)?),
            )
            .await?;

        branch.decision_point_id = point.point_id.clone();
        branch.choice_id = choice.choice_id.clone();
        enrich_branch(&mut branch, choice, &request.metadata.genres);
        Ok(branch)
    }

    /// Suggested genres, tones and pacing for a concept.
    ///
    /// Short concepts get the defaults without a model call, and so does a reply that
    /// never parses. Transport failures are returned.
    pub async fn suggest_elements(&self, concept: &str) -> Result<ElementSuggestions, PipelineError> {
        if concept.trim().chars().count() < MIN_CONCEPT_LEN {
            debug!("Concept too short for analysis, using default suggestions");
            return Ok(ElementSuggestions::defaults());
        }

        let names = |all: &[&str]| all.join(", ");
        let tones: Vec<&str> = NarrativeTone::ALL.iter().map(|t| t.name()).collect();
        let pacing: Vec<&str> = NarrativePacing::ALL.iter().map(|p| p.name()).collect();
        let values = TemplateValues::new()
            .with("available_genres", names(&AVAILABLE_GENRES[..]))
            .with("available_tones", names(&tones))
            .with("available_pacing", names(&pacing))
            .with("plot_concept", concept.trim());

        match self
            .stage::<ElementSuggestions>(PipelineStage::Suggestions, TemplateName::ElementSuggestions, values)
            .await
        {
            Ok(suggestions) => Ok(suggestions.filtered()),
            Err(PipelineError::StageFailed {
                source: source @ GenerationError::Parse { .. },
                ..
            }) => {
                warn!(error = %source, "Unusable suggestions, using defaults");
                Ok(ElementSuggestions::defaults())
            }
            Err(err) => Err(err),
        }
    }
}

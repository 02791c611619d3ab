//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::cli::parse::{Commands, NewArgs};
use crate::cli::presentation::{
    format_branch_result, format_options, format_run_summary, format_stage_started, format_state_changed,
    format_story_list, format_suggestions,
};
use crate::cli::wizard::run_wizard;
use crate::config::{ConfigLoader, StoryloomConfig};
use crate::error::{ApiError, StorageError};
use crate::export::{export_story, ExportFormat};
use crate::options::StoryRequest;
use crate::pipeline::{
    ArtifactSink, BranchRequest, PipelineStage, PipelineState, StoryMetadata, StoryPipeline,
};
use crate::storage::{LibrarySink, StoryLibrary, StoryStorage};
use crate::story::{Chapter, CharacterCast, DecisionPointList, StoryOutline};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Sink that persists through the library and echoes progress to stderr.
struct ConsoleSink {
    inner: LibrarySink,
}

impl ArtifactSink for ConsoleSink {
    fn save_outline(&mut self, outline: &StoryOutline, metadata: &StoryMetadata) -> Result<(), StorageError> {
        self.inner.save_outline(outline, metadata)
    }

    fn save_characters(&mut self, cast: &CharacterCast) -> Result<(), StorageError> {
        self.inner.save_characters(cast)
    }

    fn save_chapter(&mut self, chapter: &Chapter) -> Result<(), StorageError> {
        self.inner.save_chapter(chapter)
    }

    fn save_decisions(&mut self, chapter_number: u32, decisions: &DecisionPointList) -> Result<(), StorageError> {
        self.inner.save_decisions(chapter_number, decisions)
    }

    fn stage_started(&mut self, stage: PipelineStage) {
        eprintln!("{}", format_stage_started(stage));
    }

    fn state_changed(&mut self, state: PipelineState) {
        if let Some(line) = format_state_changed(state) {
            eprintln!("{}", line);
        }
    }
}

/// Build a request from `new` flags alone.
pub fn request_from_args(args: &NewArgs) -> Result<StoryRequest, ApiError> {
    let concept = args
        .concept
        .clone()
        .ok_or_else(|| ApiError::InvalidInput("--concept is required with --no-interactive".to_string()))?;
    if args.genres.is_empty() {
        return Err(ApiError::InvalidInput(
            "at least one --genre is required with --no-interactive".to_string(),
        ));
    }

    let mut request = StoryRequest::new(concept, args.genres.clone());
    if let Some(region) = args.region {
        request.region = region;
    }
    if let Some(tone) = args.tone {
        request.tone = tone;
    }
    if let Some(pacing) = args.pacing {
        request.pacing = pacing;
    }
    if let Some(chapters) = args.chapters {
        request.chapter_count = chapters;
    }
    if let Some(language) = args.language {
        request.language = language;
    }
    if let Some(n) = args.main_characters {
        request.main_character_count = n;
    }
    if let Some(n) = args.supporting_characters {
        request.supporting_character_count = n;
    }
    if let Some(n) = args.decisions {
        request.decision_points_per_chapter = n;
    }
    request.validate().map_err(ApiError::InvalidInput)?;
    Ok(request)
}

/// Runtime context for CLI execution: workspace and loaded configuration.
pub struct RunContext {
    workspace_root: PathBuf,
    config: StoryloomConfig,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        Ok(Self::with_config(workspace_root, config))
    }

    pub fn with_config(workspace_root: PathBuf, config: StoryloomConfig) -> Self {
        Self {
            workspace_root,
            config,
        }
    }

    pub fn config(&self) -> &StoryloomConfig {
        &self.config
    }

    /// Output directory, relative paths resolved against the workspace.
    pub fn output_dir(&self) -> PathBuf {
        resolve(&self.workspace_root, &self.config.output.directory)
    }

    fn library(&self) -> StoryLibrary {
        StoryLibrary::new(self.output_dir())
    }

    fn pipeline(&self) -> Result<StoryPipeline, ApiError> {
        let mut config = self.config.clone();
        config.prompts.directory = config
            .prompts
            .directory
            .as_deref()
            .map(|dir| resolve(&self.workspace_root, dir));
        StoryPipeline::from_config(&config)
    }

    /// Execute a CLI command via the single route table.
    pub async fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        debug!(command = ?command, "Executing command");
        match command {
            Commands::New(args) => self.handle_new(args).await,
            Commands::Suggest { concept } => self.handle_suggest(concept).await,
            Commands::Branch {
                story,
                chapter,
                decision,
                choice,
            } => self.handle_branch(story, *chapter, decision, choice).await,
            Commands::Export { story, format } => self.handle_export(story, *format),
            Commands::List => self.handle_list(),
            Commands::Options => Ok(format_options()),
        }
    }

    async fn handle_new(&self, args: &NewArgs) -> Result<String, ApiError> {
        let pipeline = self.pipeline()?;
        let request = if args.no_interactive {
            request_from_args(args)?
        } else {
            match run_wizard(&pipeline, args).await? {
                Some(request) => request,
                None => return Ok("Story generation cancelled".to_string()),
            }
        };

        let mut sink = ConsoleSink {
            inner: LibrarySink::new(self.library()),
        };
        let result = pipeline.run(request, &mut sink).await;
        let directory = sink.inner.storage().map(|s| s.dir().to_path_buf());

        let run = match result {
            Ok(run) => run,
            Err(e) => {
                if let Some(dir) = directory {
                    eprintln!("Completed stages were saved to {}", dir.display());
                }
                return Err(e.into());
            }
        };
        let storage = sink
            .inner
            .storage()
            .ok_or_else(|| StorageError::NotFound(self.output_dir()))?;

        let mut exports = Vec::new();
        for format in &args.export {
            exports.push(export_story(storage, *format)?);
        }
        info!(directory = %storage.dir().display(), "Story saved");
        Ok(format_run_summary(&run, storage.dir(), &exports))
    }

    async fn handle_suggest(&self, concept: &str) -> Result<String, ApiError> {
        let suggestions = self.pipeline()?.suggest_elements(concept).await?;
        Ok(format_suggestions(&suggestions))
    }

    async fn handle_branch(
        &self,
        story: &Path,
        chapter_number: u32,
        decision: &str,
        choice: &str,
    ) -> Result<String, ApiError> {
        let storage = self.open_story(story)?;
        let metadata = storage.load_metadata()?;
        let outline = storage.load_outline()?;
        let cast = storage.load_characters()?;
        let chapter = storage.load_chapter(chapter_number)?;
        let decisions = storage.load_decisions(chapter_number)?;
        let point = decisions.find(decision).ok_or_else(|| {
            ApiError::InvalidInput(format!(
                "decision point '{}' not found in chapter {}",
                decision, chapter_number
            ))
        })?;

        let branch = self
            .pipeline()?
            .generate_branch(BranchRequest {
                metadata: &metadata,
                outline: &outline,
                cast: &cast,
                chapter: &chapter,
                decision_point: point,
                choice_id: choice,
            })
            .await?;
        let path = storage.save_branch(&branch)?;
        Ok(format_branch_result(&branch, &path))
    }

    fn handle_export(&self, story: &Path, format: ExportFormat) -> Result<String, ApiError> {
        let storage = self.open_story(story)?;
        let path = export_story(&storage, format)?;
        Ok(format!("Exported: {}", path.display()))
    }

    fn handle_list(&self) -> Result<String, ApiError> {
        let library = self.library();
        let stories = library.list()?;
        Ok(format_story_list(&stories, library.root()))
    }

    fn open_story(&self, story: &Path) -> Result<StoryStorage, ApiError> {
        let candidate = resolve(&self.workspace_root, story);
        if let Ok(storage) = StoryStorage::open(&candidate) {
            return Ok(storage);
        }
        Ok(self.library().open(story)?)
    }
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

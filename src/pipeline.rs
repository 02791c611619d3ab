//! Story generation pipeline: stage state machine and the orchestrator that drives it.

pub mod orchestrator;
pub mod state;

pub use orchestrator::{ArtifactSink, BranchRequest, StoryMetadata, StoryPipeline, StoryRun};
pub use state::{PipelineStage, PipelineState};

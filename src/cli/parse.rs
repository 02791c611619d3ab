//! CLI parse: clap types for storyloom. No behavior; definitions only.

use crate::export::ExportFormat;
use crate::options::{Language, NarrativePacing, NarrativeTone, Region};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// storyloom - multi-chapter story generation with a language model
#[derive(Parser, Debug)]
#[command(name = "storyloom")]
#[command(about = "Generate multi-chapter stories with outlines, characters and branching decisions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (holds config/ and the output directory)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, short, default_value = "false")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a new story (interactive wizard unless --no-interactive)
    New(NewArgs),
    /// Suggest genres, tones and pacing for a concept
    Suggest {
        /// Plot concept to analyse
        concept: String,
    },
    /// Generate the branch for one choice of a saved decision point
    Branch {
        /// Story directory (path, or name under the output directory)
        #[arg(long)]
        story: PathBuf,
        /// Chapter the decision point belongs to
        #[arg(long)]
        chapter: u32,
        /// Decision point id (e.g. dp_2_1)
        #[arg(long)]
        decision: String,
        /// Choice id (e.g. c_2_1_2)
        #[arg(long)]
        choice: String,
    },
    /// Export a saved story
    Export {
        /// Story directory (path, or name under the output directory)
        #[arg(long)]
        story: PathBuf,
        /// Export format
        #[arg(long, value_enum, default_value = "markdown")]
        format: ExportFormat,
    },
    /// List saved stories
    List,
    /// Show the available genres, regions, tones, pacing and languages
    Options,
}

#[derive(Args, Debug, Clone, Default)]
pub struct NewArgs {
    /// Skip the wizard; requires --concept and at least one --genre
    #[arg(long)]
    pub no_interactive: bool,

    /// Plot concept
    #[arg(long)]
    pub concept: Option<String>,

    /// Genre (repeatable)
    #[arg(long = "genre", short = 'g')]
    pub genres: Vec<String>,

    #[arg(long, value_enum)]
    pub region: Option<Region>,

    #[arg(long, value_enum)]
    pub tone: Option<NarrativeTone>,

    #[arg(long, value_enum)]
    pub pacing: Option<NarrativePacing>,

    /// Number of chapters
    #[arg(long)]
    pub chapters: Option<u32>,

    #[arg(long, value_enum)]
    pub language: Option<Language>,

    /// Number of main characters
    #[arg(long)]
    pub main_characters: Option<u32>,

    /// Number of supporting characters
    #[arg(long)]
    pub supporting_characters: Option<u32>,

    /// Decision points per chapter (0 disables branching)
    #[arg(long)]
    pub decisions: Option<u32>,

    /// Export after generation (repeatable)
    #[arg(long, value_enum)]
    pub export: Vec<ExportFormat>,
}

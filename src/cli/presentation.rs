//! CLI presentation: text formatters for run progress, listings and summaries.

use crate::options::{
    ElementSuggestions, Language, NamedOption, NarrativePacing, NarrativeTone, Region, StoryRequest,
    Suggestion, AVAILABLE_GENRES,
};
use crate::pipeline::{PipelineStage, PipelineState, StoryRun};
use crate::storage::StorySummary;
use crate::story::Branch;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

fn section_title(title: &str) -> String {
    format!("{}", title.bold().underline())
}

pub fn format_stage_started(stage: PipelineStage) -> String {
    format!("{} Generating {}...", "▸".cyan(), stage)
}

/// Progress line for a state change; `None` for states with nothing to report.
pub fn format_state_changed(state: PipelineState) -> Option<String> {
    match state {
        PipelineState::Idle => None,
        PipelineState::Failed(stage) => Some(format!("{} Failed at {}", "✗".red(), stage)),
        PipelineState::Complete => Some(format!("{} Story complete", "✓".green().bold())),
        other => Some(format!("{} {}", "✓".green(), capitalize(&other.to_string()))),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn format_run_summary(run: &StoryRun, directory: &Path, exports: &[PathBuf]) -> String {
    let mut output = format!("{}\n\n", section_title(&run.outline.title));
    output.push_str(&format!("{}\n\n", run.outline.synopsis.trim()));

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Chapter", "Title", "Words", "Decision points"]);
    for chapter in &run.chapters {
        let decisions = run
            .decisions
            .get(&chapter.chapter_number)
            .map(|d| d.decision_points.len())
            .unwrap_or(0);
        table.add_row(vec![
            chapter.chapter_number.to_string(),
            chapter.title.clone(),
            chapter.word_count().to_string(),
            decisions.to_string(),
        ]);
    }
    output.push_str(&format!("{}\n\n", table));

    output.push_str(&format!(
        "Characters: {}\n",
        run.cast.names().collect::<Vec<_>>().join(", ")
    ));
    output.push_str(&format!("Saved to: {}\n", directory.display()));
    for path in exports {
        output.push_str(&format!("Exported: {}\n", path.display()));
    }
    output
}

fn suggestion_table(header: &str, items: &[Suggestion]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec![header, "Why"]);
    for item in items {
        table.add_row(vec![item.name.clone(), item.reason.clone()]);
    }
    table.to_string()
}

pub fn format_suggestions(suggestions: &ElementSuggestions) -> String {
    format!(
        "{}\n\n{}\n\n{}\n\n{}\n",
        section_title("Suggested story elements"),
        suggestion_table("Genre", &suggestions.suggested_genres),
        suggestion_table("Tone", &suggestions.suggested_tones),
        suggestion_table("Pacing", &suggestions.suggested_pacing),
    )
}

pub fn format_story_list(stories: &[StorySummary], root: &Path) -> String {
    if stories.is_empty() {
        return format!("No stories found in {}", root.display());
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Directory", "Title", "Chapters", "Genres", "Created"]);
    for story in stories {
        let name = story
            .directory
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let (chapters, genres, created) = match &story.metadata {
            Some(m) => (
                format!("{}/{}", story.chapters_saved, m.chapter_count),
                m.genres.join(", "),
                m.created_at.format("%Y-%m-%d %H:%M").to_string(),
            ),
            None => (story.chapters_saved.to_string(), String::new(), String::new()),
        };
        table.add_row(vec![name, story.title.clone(), chapters, genres, created]);
    }
    format!("{}\n\nTotal: {} story(ies)", table, stories.len())
}

fn names<T: NamedOption>() -> String {
    T::ALL.iter().map(|o| o.name()).collect::<Vec<_>>().join(", ")
}

pub fn format_options() -> String {
    let mut genres = Table::new();
    genres.load_preset(UTF8_BORDERS_ONLY);
    genres.set_header(vec!["#", "Genre", "#", "Genre", "#", "Genre"]);
    let rows = AVAILABLE_GENRES.len().div_ceil(3);
    for row in 0..rows {
        let mut cells = Vec::with_capacity(6);
        for col in 0..3 {
            let index = row + col * rows;
            match AVAILABLE_GENRES.get(index) {
                Some(genre) => {
                    cells.push((index + 1).to_string());
                    cells.push(genre.to_string());
                }
                None => {
                    cells.push(String::new());
                    cells.push(String::new());
                }
            }
        }
        genres.add_row(cells);
    }

    let mut other = Table::new();
    other.load_preset(UTF8_BORDERS_ONLY);
    other.set_header(vec!["Option", "Values"]);
    other.add_row(vec!["Region".to_string(), names::<Region>()]);
    other.add_row(vec!["Tone".to_string(), names::<NarrativeTone>()]);
    other.add_row(vec!["Pacing".to_string(), names::<NarrativePacing>()]);
    other.add_row(vec!["Language".to_string(), names::<Language>()]);

    format!(
        "{}\n\n{}\n\n{}\n\n{}",
        section_title("Available genres"),
        genres,
        section_title("Other options"),
        other
    )
}

pub fn format_request_summary(request: &StoryRequest) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.add_row(vec!["Concept".to_string(), request.concept.clone()]);
    table.add_row(vec!["Genres".to_string(), request.genres_joined()]);
    table.add_row(vec!["Region".to_string(), request.region.to_string()]);
    table.add_row(vec!["Tone".to_string(), request.tone.to_string()]);
    table.add_row(vec!["Pacing".to_string(), request.pacing.to_string()]);
    table.add_row(vec!["Chapters".to_string(), request.chapter_count.to_string()]);
    table.add_row(vec!["Language".to_string(), request.language.to_string()]);
    table.add_row(vec![
        "Decision points per chapter".to_string(),
        request.decision_points_per_chapter.to_string(),
    ]);
    table.to_string()
}

pub fn format_branch_result(branch: &Branch, path: &Path) -> String {
    let mut output = format!("{}\n\n", section_title(&branch.title));
    output.push_str(&format!("{}\n\n", branch.content.trim()));
    if !branch.consequences.trim().is_empty() {
        output.push_str(&format!("Consequences: {}\n", branch.consequences.trim()));
    }
    if !branch.genre_shift.trim().is_empty() {
        output.push_str(&format!("Genre shift: {}\n", branch.genre_shift.trim()));
    }
    output.push_str(&format!("Saved to: {}", path.display()));
    output
}

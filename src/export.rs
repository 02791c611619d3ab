//! Story exports: a single Markdown book and an audiobook narration script.

use crate::error::StorageError;
use crate::options::NamedOption;
use crate::pipeline::StoryMetadata;
use crate::storage::{sanitize_title, StoryStorage};
use crate::story::{Chapter, CharacterCast, StoryOutline};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::info;

const RULE_WIDTH: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// `<Title>_full.md`
    Markdown,
    /// `<Title>_audiobook.txt`
    Audiobook,
}

impl ExportFormat {
    pub fn file_name(&self, title: &str) -> String {
        let stem = sanitize_title(title);
        match self {
            ExportFormat::Markdown => format!("{}_full.md", stem),
            ExportFormat::Audiobook => format!("{}_audiobook.txt", stem),
        }
    }
}

/// Loaded story content an export is rendered from.
#[derive(Debug, Clone)]
pub struct StoryDocument {
    pub outline: StoryOutline,
    pub metadata: Option<StoryMetadata>,
    pub cast: Option<CharacterCast>,
    pub chapters: Vec<Chapter>,
}

impl StoryDocument {
    /// Outline and chapters are required; metadata and characters are optional.
    pub fn load(storage: &StoryStorage) -> Result<Self, StorageError> {
        Ok(Self {
            outline: storage.load_outline()?,
            metadata: storage.load_metadata().ok(),
            cast: storage.load_characters().ok(),
            chapters: storage.load_chapters()?,
        })
    }

    fn title(&self) -> &str {
        if self.outline.title.trim().is_empty() {
            "Untitled Story"
        } else {
            &self.outline.title
        }
    }

    fn genres(&self) -> &[String] {
        match &self.metadata {
            Some(metadata) => &metadata.genres,
            None => &self.outline.genres,
        }
    }
}

/// The whole story as one Markdown document.
pub fn render_markdown(doc: &StoryDocument) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}\n", doc.title());
    if !doc.outline.setting.trim().is_empty() {
        let _ = writeln!(out, "*{}*\n", doc.outline.setting.trim());
    }
    if !doc.outline.theme.trim().is_empty() {
        let _ = writeln!(out, "**Theme**: {}\n", doc.outline.theme.trim());
    }
    if !doc.genres().is_empty() {
        let _ = writeln!(out, "**Genres**: {}\n", doc.genres().join(", "));
    }
    if let Some(metadata) = &doc.metadata {
        let _ = writeln!(
            out,
            "**Narrative Style**: Tone: {}, Pacing: {}\n",
            metadata.narrative_tone.name(),
            metadata.narrative_pacing.name()
        );
    }
    let _ = writeln!(out, "{}\n", doc.outline.synopsis.trim());
    out.push_str("---\n\n");

    for chapter in &doc.chapters {
        let _ = writeln!(out, "## Chapter {}: {}\n", chapter.chapter_number, chapter.title);
        let _ = writeln!(out, "{}\n", chapter.content.trim_end());
        out.push_str("---\n\n");
    }
    out
}

fn is_dialogue(paragraph: &str) -> bool {
    paragraph.contains(['"', '\u{201C}', '\u{201D}'])
}

/// Narration script with speaker and pause cues.
pub fn render_audiobook(doc: &StoryDocument) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "AUDIOBOOK SCRIPT: {}", doc.title());
    let _ = writeln!(out, "{}\n", rule);

    out.push_str("NARRATION NOTES:\n");
    if !doc.genres().is_empty() {
        let _ = writeln!(out, "- This story combines elements of {}", doc.genres().join(", "));
    }
    if let Some(metadata) = &doc.metadata {
        let _ = writeln!(out, "- Set in {}", metadata.region.name());
        let _ = writeln!(out, "- Narrative Tone: {}", metadata.narrative_tone.name());
        let _ = writeln!(out, "- Narrative Pacing: {}", metadata.narrative_pacing.name());
    }
    out.push_str("- Pronunciation guide included with character names\n\n");
    let _ = writeln!(out, "{}\n", rule);

    out.push_str("INTRODUCTION:\n");
    let _ = writeln!(out, "[NARRATOR, CALM VOICE] {}.\n", doc.title());
    out.push_str("[PAUSE 2s]\n\n");
    let _ = writeln!(out, "[NARRATOR] {}\n", doc.outline.synopsis.trim());
    let _ = writeln!(out, "{}\n", rule);

    if let Some(cast) = &doc.cast {
        out.push_str("CHARACTER PRONUNCIATION GUIDE:\n");
        for character in &cast.main_characters {
            let _ = writeln!(out, "- {}: [Standard pronunciation]", character.name);
        }
        out.push('\n');
    }

    for chapter in &doc.chapters {
        let _ = writeln!(out, "CHAPTER {}: {}", chapter.chapter_number, chapter.title);
        let _ = writeln!(out, "{}\n", rule);
        let _ = writeln!(out, "[NARRATOR] Chapter {}. {}\n", chapter.chapter_number, chapter.title);
        out.push_str("[PAUSE 1s]\n\n");

        for paragraph in chapter.content.split("\n\n") {
            let paragraph = paragraph.trim();
            if paragraph.is_empty() {
                continue;
            }
            let cue = if is_dialogue(paragraph) { "DIALOGUE" } else { "NARRATOR" };
            let _ = writeln!(out, "[{}] {}\n", cue, paragraph);
        }

        out.push_str("[PAUSE 2s]\n\n");
        let _ = writeln!(out, "{}\n", rule);
    }
    out
}

/// Render `format` and write it into the story directory.
pub fn export_story(storage: &StoryStorage, format: ExportFormat) -> Result<PathBuf, StorageError> {
    let doc = StoryDocument::load(storage)?;
    let rendered = match format {
        ExportFormat::Markdown => render_markdown(&doc),
        ExportFormat::Audiobook => render_audiobook(&doc),
    };
    let path = storage.dir().join(format.file_name(doc.title()));
    std::fs::write(&path, rendered).map_err(|e| StorageError::io(&path, e))?;
    info!(format = ?format, path = %path.display(), chapters = doc.chapters.len(), "Exported story");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::CharacterProfile;

    fn document() -> StoryDocument {
        StoryDocument {
            outline: StoryOutline {
                title: "The Letters of Shimla".to_string(),
                setting: "Shimla, 1962".to_string(),
                theme: "Secrets".to_string(),
                synopsis: "A postman reads the letters he delivers.".to_string(),
                genres: vec!["Mystery".to_string()],
                ..StoryOutline::default()
            },
            metadata: None,
            cast: Some(CharacterCast {
                main_characters: vec![CharacterProfile {
                    name: "Ravi".to_string(),
                    ..CharacterProfile::default()
                }],
                supporting_characters: Vec::new(),
            }),
            chapters: vec![Chapter {
                chapter_number: 1,
                title: "The First Letter".to_string(),
                content: "Ravi broke the seal.\n\n\"Who sent this?\" he asked.".to_string(),
                ..Chapter::default()
            }],
        }
    }

    #[test]
    fn test_markdown_export() {
        let markdown = render_markdown(&document());
        assert!(markdown.starts_with("# The Letters of Shimla\n\n*Shimla, 1962*"));
        assert!(markdown.contains("**Genres**: Mystery"));
        assert!(markdown.contains("## Chapter 1: The First Letter\n\nRavi broke the seal."));
    }

    #[test]
    fn test_audiobook_cues() {
        let script = render_audiobook(&document());
        assert!(script.starts_with("AUDIOBOOK SCRIPT: The Letters of Shimla\n"));
        assert!(script.contains("- Ravi: [Standard pronunciation]"));
        assert!(script.contains("CHAPTER 1: The First Letter"));
        assert!(script.contains("[NARRATOR] Ravi broke the seal."));
        assert!(script.contains("[DIALOGUE] \"Who sent this?\" he asked."));
        assert!(script.contains(&"=".repeat(50)));
    }

    #[test]
    fn test_export_file_names() {
        assert_eq!(
            ExportFormat::Markdown.file_name("The Letters of Shimla"),
            "The_Letters_of_Shimla_full.md"
        );
        assert_eq!(ExportFormat::Audiobook.file_name("A/B"), "A_B_audiobook.txt");
    }
}

//! Story foundation and per-chapter plan.

use crate::generation::schema::{require_text, OutputSchema, SchemaField, StructuredOutput};
use crate::story::{lenient_number, lenient_text, string_or_list};
use serde::{Deserialize, Serialize};

/// Overall story foundation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryOutline {
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub theme: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub setting: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub synopsis: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub narrative_arc: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub genre_elements: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub narrative_tone: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub social_context: String,
    /// Filled from the chapter-outline stage.
    #[serde(default)]
    pub chapters: Vec<ChapterOutline>,
    #[serde(default)]
    pub genres: Vec<String>,
}

impl StoryOutline {
    pub fn chapter_outline(&self, chapter_number: u32) -> Option<&ChapterOutline> {
        self.chapters
            .iter()
            .find(|c| c.chapter_number == chapter_number)
    }
}

impl StructuredOutput for StoryOutline {
    const SCHEMA: OutputSchema = OutputSchema {
        name: "story_outline",
        fields: &[
            SchemaField { name: "title", description: "The title of the story" },
            SchemaField { name: "theme", description: "The main theme or themes of the story" },
            SchemaField {
                name: "setting",
                description: "Detailed description of the setting including location, social context, and cultural elements",
            },
            SchemaField { name: "synopsis", description: "A brief synopsis of the overall story" },
            SchemaField {
                name: "narrative_arc",
                description: "The main narrative arc with beginning, middle, and end",
            },
            SchemaField {
                name: "genre_elements",
                description: "How the selected genres are woven into the story",
            },
            SchemaField { name: "narrative_tone", description: "The overall tone and mood of the narrative" },
            SchemaField { name: "social_context", description: "Broader social and cultural context of the story" },
        ],
    };

    fn validate(&self) -> Result<(), String> {
        require_text("title", &self.title)?;
        require_text("synopsis", &self.synopsis)
    }
}

/// Plan for a single chapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterOutline {
    #[serde(default, deserialize_with = "lenient_number")]
    pub chapter_number: u32,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub summary: String,
    #[serde(default, deserialize_with = "string_or_list")]
    pub key_points: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub characters_involved: Vec<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub setting_details: String,
    #[serde(default, deserialize_with = "string_or_list")]
    pub cultural_elements: Vec<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub genre_elements: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub narrative_progression: String,
}

impl ChapterOutline {
    /// Stand-in for a chapter the outline stage did not plan.
    pub fn placeholder(chapter_number: u32, genres: &[String], pacing: &str) -> Self {
        Self {
            chapter_number,
            title: format!("Chapter {}", chapter_number),
            summary: "To be determined".to_string(),
            genre_elements: format!("Incorporating elements of {}", genres.join(", ")),
            narrative_progression: format!("Moving forward with {} pace", pacing),
            ..Self::default()
        }
    }
}

/// Wrapper for the chapter-outline stage response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterOutlineList {
    #[serde(default)]
    pub chapters: Vec<ChapterOutline>,
}

impl ChapterOutlineList {
    /// Renumber sequentially and force exactly `count` chapters.
    pub fn normalized(mut self, count: u32, genres: &[String], pacing: &str) -> Vec<ChapterOutline> {
        self.chapters.truncate(count as usize);
        for (index, chapter) in self.chapters.iter_mut().enumerate() {
            chapter.chapter_number = index as u32 + 1;
            if chapter.title.trim().is_empty() {
                chapter.title = format!("Chapter {}", chapter.chapter_number);
            }
        }
        let planned = self.chapters.len() as u32;
        for number in planned + 1..=count {
            self.chapters
                .push(ChapterOutline::placeholder(number, genres, pacing));
        }
        self.chapters
    }
}

impl StructuredOutput for ChapterOutlineList {
    const SCHEMA: OutputSchema = OutputSchema {
        name: "chapter_outlines",
        fields: &[SchemaField {
            name: "chapters",
            description: "Array of chapter outlines, each an object with chapter_number, title, summary, key_points (array), characters_involved (array), setting_details, cultural_elements (array), genre_elements, narrative_progression",
        }],
    };

    fn validate(&self) -> Result<(), String> {
        if self.chapters.is_empty() {
            return Err("field 'chapters' is empty".to_string());
        }
        Ok(())
    }
}

//! Generated chapter.

use crate::generation::schema::{require_text, OutputSchema, SchemaField, StructuredOutput};
use crate::story::{lenient_text, string_or_list};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// Assigned by the pipeline, not by the model.
    #[serde(default)]
    pub chapter_number: u32,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub content: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub summary: String,
    #[serde(default, deserialize_with = "string_or_list")]
    pub key_events: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub character_development: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub cultural_elements_used: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub genre_elements_used: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub next_chapter_hooks: Vec<String>,
}

impl Chapter {
    /// Markdown rendering saved next to the chapter JSON.
    pub fn to_markdown(&self) -> String {
        let mut out = format!("# Chapter {}: {}\n\n{}\n", self.chapter_number, self.title, self.content.trim_end());
        if !self.summary.trim().is_empty() {
            out.push_str(&format!("\n## Summary\n\n{}\n", self.summary.trim_end()));
        }
        out
    }

    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

impl StructuredOutput for Chapter {
    const SCHEMA: OutputSchema = OutputSchema {
        name: "chapter",
        fields: &[
            SchemaField { name: "title", description: "The title of the chapter" },
            SchemaField { name: "content", description: "The full content of the chapter" },
            SchemaField { name: "summary", description: "A brief summary of what happened in the chapter" },
            SchemaField {
                name: "key_events",
                description: "List of important events that happened in the chapter",
            },
            SchemaField {
                name: "character_development",
                description: "List of ways characters developed or changed in this chapter",
            },
            SchemaField {
                name: "cultural_elements_used",
                description: "List of cultural elements that were incorporated",
            },
            SchemaField {
                name: "genre_elements_used",
                description: "List of ways the selected genres were incorporated in this chapter",
            },
            SchemaField {
                name: "next_chapter_hooks",
                description: "List of story hooks or open questions for the next chapter",
            },
        ],
    };

    fn validate(&self) -> Result<(), String> {
        require_text("title", &self.title)?;
        require_text("content", &self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::schema::parse_response;

    #[test]
    fn test_chapter_requires_content() {
        assert!(parse_response::<Chapter>(r#"{"title": "Dawn", "content": ""}"#).is_err());
    }

    #[test]
    fn test_single_string_lists_are_normalized() {
        let chapter: Chapter = parse_response(
            r#"{"title": "Dawn", "content": "The river rose.", "key_events": "The flood", "next_chapter_hooks": null}"#,
        )
        .unwrap();
        assert_eq!(chapter.key_events, vec!["The flood"]);
        assert!(chapter.next_chapter_hooks.is_empty());
        assert_eq!(chapter.chapter_number, 0);
        assert_eq!(chapter.word_count(), 3);
    }

    #[test]
    fn test_markdown_has_heading_and_summary() {
        let chapter = Chapter {
            chapter_number: 2,
            title: "Dawn".to_string(),
            content: "The river rose.".to_string(),
            summary: "Water everywhere.".to_string(),
            ..Chapter::default()
        };
        let md = chapter.to_markdown();
        assert!(md.starts_with("# Chapter 2: Dawn\n\nThe river rose.\n"));
        assert!(md.contains("## Summary\n\nWater everywhere."));
    }
}

//! Run parameters: the enumerated story options and the request a run is built from.

use crate::generation::schema::{OutputSchema, SchemaField, StructuredOutput};
use crate::story::lenient_text;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Genres a story can combine.
pub const AVAILABLE_GENRES: [&str; 40] = [
    "Drama",
    "Romance",
    "Adventure",
    "Mystery",
    "Historical Fiction",
    "Fantasy",
    "Mythology",
    "Folklore",
    "Family Saga",
    "Coming of Age",
    "Social Commentary",
    "Political",
    "Comedy",
    "Thriller",
    "Magical Realism",
    "Epic",
    "Devotional",
    "Philosophical",
    "Satire",
    "Fable",
    "Horror",
    "Supernatural",
    "Science Fiction",
    "Dystopian",
    "Utopian",
    "Action",
    "War",
    "Inspirational",
    "Biographical",
    "Psychological",
    "Crime",
    "Spiritual",
    "Travelogue",
    "Epistolary",
    "Poetic Narrative",
    "Rural",
    "Urban",
    "Diaspora",
    "Revolutionary",
    "Postcolonial",
];

pub const DEFAULT_CHAPTERS: u32 = 10;

/// Concepts shorter than this get the default suggestions without a model call.
pub const MIN_CONCEPT_LEN: usize = 10;

/// Canonical spelling of a genre, matched case-insensitively.
pub fn canonical_genre(name: &str) -> Option<&'static str> {
    let name = name.trim();
    AVAILABLE_GENRES
        .iter()
        .copied()
        .find(|g| g.eq_ignore_ascii_case(name))
}

/// Enumerated option with a display name used in prompts and menus.
pub trait NamedOption: Copy + Sized + 'static {
    const ALL: &'static [Self];

    fn name(&self) -> &'static str;

    fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|o| o.name().eq_ignore_ascii_case(name))
    }
}

macro_rules! named_option {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl NamedOption for $ty {
            const ALL: &'static [Self] = &[$($ty::$variant),+];

            fn name(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum Region {
    #[default]
    North,
    South,
    East,
    West,
    Central,
}

named_option!(Region {
    North => "North India",
    South => "South India",
    East => "East India",
    West => "West India",
    Central => "Central India",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum NarrativeTone {
    #[default]
    Dramatic,
    Humorous,
    Suspenseful,
    Inspirational,
    Mysterious,
    Emotional,
    Philosophical,
    Introspective,
}

named_option!(NarrativeTone {
    Dramatic => "Dramatic",
    Humorous => "Humorous",
    Suspenseful => "Suspenseful",
    Inspirational => "Inspirational",
    Mysterious => "Mysterious",
    Emotional => "Emotional",
    Philosophical => "Philosophical",
    Introspective => "Introspective",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum NarrativePacing {
    #[default]
    SlowBurning,
    FastPaced,
    Episodic,
    Continuous,
    NonLinear,
    Cyclical,
}

named_option!(NarrativePacing {
    SlowBurning => "Slow-burning",
    FastPaced => "Fast-paced",
    Episodic => "Episodic",
    Continuous => "Continuous",
    NonLinear => "Non-linear",
    Cyclical => "Cyclical",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum Language {
    #[default]
    English,
    Hindi,
}

named_option!(Language {
    English => "English",
    Hindi => "Hindi",
});

fn default_main_characters() -> u32 {
    3
}

fn default_supporting_characters() -> u32 {
    5
}

fn default_chapter_count() -> u32 {
    DEFAULT_CHAPTERS
}

/// Everything a run needs from the user. Fixed for the lifetime of the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryRequest {
    pub concept: String,
    pub genres: Vec<String>,
    #[serde(default)]
    pub region: Region,
    #[serde(default)]
    pub tone: NarrativeTone,
    #[serde(default)]
    pub pacing: NarrativePacing,
    #[serde(default = "default_chapter_count")]
    pub chapter_count: u32,
    #[serde(default)]
    pub language: Language,
    #[serde(default = "default_main_characters")]
    pub main_character_count: u32,
    #[serde(default = "default_supporting_characters")]
    pub supporting_character_count: u32,
    #[serde(default)]
    pub decision_points_per_chapter: u32,
}

impl StoryRequest {
    pub fn new(concept: impl Into<String>, genres: Vec<String>) -> Self {
        Self {
            concept: concept.into(),
            genres,
            region: Region::default(),
            tone: NarrativeTone::default(),
            pacing: NarrativePacing::default(),
            chapter_count: DEFAULT_CHAPTERS,
            language: Language::default(),
            main_character_count: default_main_characters(),
            supporting_character_count: default_supporting_characters(),
            decision_points_per_chapter: 0,
        }
    }

    /// Checks the request and canonicalizes genre spelling.
    pub fn validate(&mut self) -> Result<(), String> {
        if self.concept.trim().is_empty() {
            return Err("story concept cannot be empty".to_string());
        }
        if self.genres.is_empty() {
            return Err("at least one genre is required".to_string());
        }
        let mut canonical = Vec::with_capacity(self.genres.len());
        for genre in &self.genres {
            let name = canonical_genre(genre).ok_or_else(|| format!("unknown genre '{}'", genre))?;
            if !canonical.iter().any(|g: &String| g == name) {
                canonical.push(name.to_string());
            }
        }
        self.genres = canonical;
        if self.chapter_count == 0 {
            return Err("chapter count must be at least 1".to_string());
        }
        if self.main_character_count == 0 {
            return Err("at least one main character is required".to_string());
        }
        Ok(())
    }

    pub fn genres_joined(&self) -> String {
        self.genres.join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub reason: String,
}

impl Suggestion {
    fn new(name: &str, reason: &str) -> Self {
        Self {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Model-suggested genres, tones and pacing for a concept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSuggestions {
    #[serde(default)]
    pub suggested_genres: Vec<Suggestion>,
    #[serde(default)]
    pub suggested_tones: Vec<Suggestion>,
    #[serde(default)]
    pub suggested_pacing: Vec<Suggestion>,
}

const FALLBACK_REASON: &str = "Good match for your story concept.";

impl ElementSuggestions {
    /// Suggestions used when the concept is too short to analyse.
    pub fn defaults() -> Self {
        Self {
            suggested_genres: vec![
                Suggestion::new("Drama", "A versatile genre that works well for most stories."),
                Suggestion::new("Family Saga", "Explores relationships and dynamics within families."),
                Suggestion::new("Social Commentary", "Examines societal issues and human experiences."),
            ],
            suggested_tones: vec![
                Suggestion::new("Dramatic", "Creates emotional impact and depth."),
                Suggestion::new("Emotional", "Connects with audiences through feelings and experiences."),
                Suggestion::new("Philosophical", "Explores deeper meanings and questions."),
            ],
            suggested_pacing: vec![
                Suggestion::new("Slow-burning", "Allows for character development and building tension."),
                Suggestion::new("Episodic", "Presents story in distinct segments or chapters."),
                Suggestion::new("Continuous", "Maintains a steady flow of narrative events."),
            ],
        }
    }

    /// Keep only known option names (canonically spelled); an emptied list falls back
    /// to the first option of its kind.
    pub fn filtered(self) -> Self {
        fn keep<F>(items: Vec<Suggestion>, canonical: F, fallback: &str) -> Vec<Suggestion>
        where
            F: Fn(&str) -> Option<&'static str>,
        {
            let mut kept: Vec<Suggestion> = Vec::new();
            for item in items {
                if let Some(name) = canonical(&item.name) {
                    if kept.iter().any(|k| k.name == name) {
                        continue;
                    }
                    let reason = if item.reason.trim().is_empty() {
                        FALLBACK_REASON.to_string()
                    } else {
                        item.reason
                    };
                    kept.push(Suggestion {
                        name: name.to_string(),
                        reason,
                    });
                }
            }
            if kept.is_empty() {
                kept.push(Suggestion::new(fallback, "Default option."));
            }
            kept
        }

        Self {
            suggested_genres: keep(self.suggested_genres, canonical_genre, AVAILABLE_GENRES[0]),
            suggested_tones: keep(
                self.suggested_tones,
                |n| NarrativeTone::from_name(n).map(|t| t.name()),
                NarrativeTone::ALL[0].name(),
            ),
            suggested_pacing: keep(
                self.suggested_pacing,
                |n| NarrativePacing::from_name(n).map(|p| p.name()),
                NarrativePacing::ALL[0].name(),
            ),
        }
    }

    pub fn genre_names(&self) -> Vec<String> {
        self.suggested_genres.iter().map(|s| s.name.clone()).collect()
    }
}

impl StructuredOutput for ElementSuggestions {
    const SCHEMA: OutputSchema = OutputSchema {
        name: "element_suggestions",
        fields: &[
            SchemaField {
                name: "suggested_genres",
                description: "Array of objects with name and reason, names taken from the genre list",
            },
            SchemaField {
                name: "suggested_tones",
                description: "Array of objects with name and reason, names taken from the tone list",
            },
            SchemaField {
                name: "suggested_pacing",
                description: "Array of objects with name and reason, names taken from the pacing list",
            },
        ],
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_options_round_trip_names() {
        assert_eq!(Region::Central.to_string(), "Central India");
        assert_eq!(NarrativePacing::from_name("non-linear"), Some(NarrativePacing::NonLinear));
        assert_eq!(NarrativeTone::from_name("Cheerful"), None);
        assert_eq!(NarrativeTone::ALL.len(), 8);
        assert_eq!(NarrativePacing::ALL.len(), 6);
        assert_eq!(Region::ALL.len(), 5);
    }

    #[test]
    fn test_validate_canonicalizes_genres() {
        let mut request = StoryRequest::new(
            "A postman in Shimla reads the letters he delivers",
            vec!["drama".to_string(), "MYSTERY".to_string(), "Drama".to_string()],
        );
        request.validate().unwrap();
        assert_eq!(request.genres, vec!["Drama", "Mystery"]);
        assert_eq!(request.chapter_count, 10);
        assert_eq!(request.genres_joined(), "Drama, Mystery");
    }

    #[test]
    fn test_validate_rejects_bad_requests() {
        let mut request = StoryRequest::new("concept", vec!["Space Opera".to_string()]);
        assert!(request.validate().unwrap_err().contains("Space Opera"));

        let mut request = StoryRequest::new("  ", vec!["Drama".to_string()]);
        assert!(request.validate().is_err());

        let mut request = StoryRequest::new("concept", vec!["Drama".to_string()]);
        request.chapter_count = 0;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_filtered_suggestions() {
        let raw = ElementSuggestions {
            suggested_genres: vec![
                Suggestion::new("thriller", ""),
                Suggestion::new("Space Opera", "nope"),
            ],
            suggested_tones: vec![Suggestion::new("Cheerful", "nope")],
            suggested_pacing: vec![Suggestion::new("Fast-paced", "keeps pages turning")],
        };
        let filtered = raw.filtered();
        assert_eq!(filtered.genre_names(), vec!["Thriller"]);
        assert_eq!(filtered.suggested_genres[0].reason, FALLBACK_REASON);
        assert_eq!(filtered.suggested_tones[0].name, "Dramatic");
        assert_eq!(filtered.suggested_tones[0].reason, "Default option.");
        assert_eq!(filtered.suggested_pacing[0].reason, "keeps pages turning");
    }

    #[test]
    fn test_defaults_are_valid_options() {
        let defaults = ElementSuggestions::defaults();
        assert_eq!(defaults.clone().filtered(), defaults);
    }
}

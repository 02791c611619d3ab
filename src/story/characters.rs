//! Character profiles.

use crate::generation::schema::{require_text, OutputSchema, SchemaField, StructuredOutput};
use crate::story::lenient_text;
use serde::{Deserialize, Serialize};

/// Full profile of a main character.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterProfile {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub age: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub gender: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub background: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub appearance: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub personality: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub motivations: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub goals: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub conflicts: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub character_arc: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub cultural_traits: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub speech_pattern: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub relationships: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub genre_archetypes: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub genre_traits: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub socio_economic_context: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub professional_background: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub narrative_role: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub emotional_landscape: String,
}

/// Minor character with a defined purpose in the plot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportingCharacter {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub role: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub relationship_to_main_characters: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub brief_description: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub cultural_background: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub genre_role: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub genre_purpose: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub narrative_role: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub emotional_landscape: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterList {
    #[serde(default)]
    pub characters: Vec<CharacterProfile>,
}

impl StructuredOutput for CharacterList {
    const SCHEMA: OutputSchema = OutputSchema {
        name: "main_characters",
        fields: &[SchemaField {
            name: "characters",
            description: "Array of character profiles, each an object with name, age, gender, background, appearance, personality, motivations, goals, conflicts, character_arc, cultural_traits, speech_pattern, relationships, genre_archetypes, genre_traits, socio_economic_context, professional_background, narrative_role, emotional_landscape",
        }],
    };

    fn validate(&self) -> Result<(), String> {
        if self.characters.is_empty() {
            return Err("field 'characters' is empty".to_string());
        }
        self.characters
            .iter()
            .try_for_each(|c| require_text("characters[].name", &c.name))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportingCharacterList {
    #[serde(default)]
    pub supporting_characters: Vec<SupportingCharacter>,
}

impl StructuredOutput for SupportingCharacterList {
    const SCHEMA: OutputSchema = OutputSchema {
        name: "supporting_characters",
        fields: &[SchemaField {
            name: "supporting_characters",
            description: "Array of supporting character profiles, each an object with name, role, relationship_to_main_characters, brief_description, cultural_background, genre_role, genre_purpose",
        }],
    };

    fn validate(&self) -> Result<(), String> {
        self.supporting_characters
            .iter()
            .try_for_each(|c| require_text("supporting_characters[].name", &c.name))
    }
}

/// Everything persisted to `characters.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterCast {
    pub main_characters: Vec<CharacterProfile>,
    pub supporting_characters: Vec<SupportingCharacter>,
}

impl CharacterCast {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.main_characters
            .iter()
            .map(|c| c.name.as_str())
            .chain(self.supporting_characters.iter().map(|c| c.name.as_str()))
    }
}

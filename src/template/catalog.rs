//! Built-in prompt templates, optionally overridden from a directory of `<name>.txt` files.

use crate::error::{ApiError, StorageError, TemplateError};
use crate::template::PromptTemplate;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateName {
    StoryFoundation,
    ChapterOutline,
    MainCharacters,
    SupportingCharacters,
    ChapterGeneration,
    DecisionPoints,
    BranchGeneration,
    ElementSuggestions,
}

impl TemplateName {
    pub const ALL: [TemplateName; 8] = [
        TemplateName::StoryFoundation,
        TemplateName::ChapterOutline,
        TemplateName::MainCharacters,
        TemplateName::SupportingCharacters,
        TemplateName::ChapterGeneration,
        TemplateName::DecisionPoints,
        TemplateName::BranchGeneration,
        TemplateName::ElementSuggestions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateName::StoryFoundation => "story_foundation",
            TemplateName::ChapterOutline => "chapter_outline",
            TemplateName::MainCharacters => "main_characters",
            TemplateName::SupportingCharacters => "supporting_characters",
            TemplateName::ChapterGeneration => "chapter_generation",
            TemplateName::DecisionPoints => "decision_points",
            TemplateName::BranchGeneration => "branch_generation",
            TemplateName::ElementSuggestions => "element_suggestions",
        }
    }

    /// Override file name inside the prompts directory.
    pub fn file_name(&self) -> String {
        format!("{}.txt", self.as_str())
    }

    fn builtin_source(&self) -> &'static str {
        match self {
            TemplateName::StoryFoundation => STORY_FOUNDATION,
            TemplateName::ChapterOutline => CHAPTER_OUTLINE,
            TemplateName::MainCharacters => MAIN_CHARACTERS,
            TemplateName::SupportingCharacters => SUPPORTING_CHARACTERS,
            TemplateName::ChapterGeneration => CHAPTER_GENERATION,
            TemplateName::DecisionPoints => DECISION_POINTS,
            TemplateName::BranchGeneration => BRANCH_GENERATION,
            TemplateName::ElementSuggestions => ELEMENT_SUGGESTIONS,
        }
    }
}

impl fmt::Display for TemplateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Templates for every pipeline stage.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    templates: HashMap<TemplateName, PromptTemplate>,
}

impl TemplateCatalog {
    pub fn builtin() -> Result<Self, TemplateError> {
        let mut templates = HashMap::new();
        for name in TemplateName::ALL {
            templates.insert(name, PromptTemplate::parse(name.as_str(), name.builtin_source())?);
        }
        Ok(Self { templates })
    }

    /// Built-ins, with any `<name>.txt` found in `directory` replacing its template.
    pub fn load(directory: Option<&Path>) -> Result<Self, ApiError> {
        let mut catalog = Self::builtin()?;
        if let Some(directory) = directory {
            catalog.apply_overrides(directory)?;
        }
        Ok(catalog)
    }

    /// Returns how many templates were replaced.
    pub fn apply_overrides(&mut self, directory: &Path) -> Result<usize, ApiError> {
        if !directory.is_dir() {
            return Err(StorageError::NotFound(directory.to_path_buf()).into());
        }
        let mut replaced = 0;
        for name in TemplateName::ALL {
            let path = directory.join(name.file_name());
            if !path.is_file() {
                continue;
            }
            let source = std::fs::read_to_string(&path).map_err(|e| StorageError::io(&path, e))?;
            let template = PromptTemplate::parse(name.as_str(), &source)?;
            debug!(template = %name, path = %path.display(), "Loaded prompt override");
            self.templates.insert(name, template);
            replaced += 1;
        }
        if replaced > 0 {
            info!(count = replaced, directory = %directory.display(), "Applied prompt overrides");
        }
        Ok(replaced)
    }

    pub fn get(&self, name: TemplateName) -> &PromptTemplate {
        // Every name is inserted by `builtin`.
        &self.templates[&name]
    }
}

const STORY_FOUNDATION: &str = r#"You are a master storyteller who writes narratives rich in authentic Indian cultural detail and fluent in genre craft.

Goal:
Produce a complete story outline for this concept:
"{plot_concept}"

The story is set in {region}.
Tone: {narrative_tone}. Pacing: {narrative_pacing}.
Blend these genres: {genres}
Every chapter should hold 15-20 minutes of reading (roughly 2,500-3,500 words).

Consider:
- Regional customs, traditions and festivals of {region}
- Family and social structures and the values that drive characters
- Local expressions and ways of speaking
- Mythology, folklore or religious traditions where they fit
- Authentic settings, food, clothing and daily life
- Conventions and structures of {genres}, and how to blend them with the cultural setting

Return Format:
{format_instructions}

Language:
Write every narrative field in {language}. Keep the JSON keys in English.

Warnings:
Avoid stereotypes. Balance genre elements with cultural authenticity.
"#;

const CHAPTER_OUTLINE: &str = r#"You are a master storyteller who writes narratives rich in authentic Indian cultural detail and fluent in genre craft.

Goal:
Write a chapter-by-chapter outline with exactly {num_chapters} chapters for a story set in {region}.
Tone: {narrative_tone}. Pacing: {narrative_pacing}.
Blend these genres: {genres}

Story outline:
```
{story_outline}
```

For each chapter give a title in keeping with the {narrative_tone} tone, a summary that follows {narrative_pacing} progression, 5-7 key plot points, the characters involved, setting details, cultural elements to include, genre elements from {genres}, and how the chapter moves the story forward.

Build a coherent arc with rising action, climax and resolution, and plan where each genre gets its milestones.

Return Format:
{format_instructions}

Language:
Write every narrative field in {language}. Keep the JSON keys in English.

Warnings:
Stay consistent with the story outline.
"#;

const MAIN_CHARACTERS: &str = r#"You are a master storyteller who creates deep, culturally authentic Indian characters suited to specific genres.

Goal:
Create {num_characters} main characters for a story set in {region}.
Tone: {narrative_tone}. Pacing: {narrative_pacing}.
Genres: {genres}

Story outline:
```
{story_outline}
```

Give each character a name fitting their region and background, an age, gender, detailed background, appearance, personality, motivations, goals, internal and external conflicts, an arc across the story, cultural traits, a distinctive speech pattern, relationships with the others, the genre archetypes they embody, genre traits, socio-economic context, profession, narrative role and emotional landscape.

Return Format:
{format_instructions}

Language:
Write every narrative field in {language}. Keep the JSON keys in English.

Warnings:
Avoid stereotypical characterizations.
"#;

const SUPPORTING_CHARACTERS: &str = r#"You are a master storyteller who creates deep, culturally authentic Indian characters suited to specific genres.

Goal:
Create {num_characters} supporting characters for a story set in {region}.
Tone: {narrative_tone}. Pacing: {narrative_pacing}.
Genres: {genres}

Story outline:
```
{story_outline}
```

Main characters:
```
{main_characters}
```

Supporting characters should complement the main cast: family, friends, rivals, mentors, community members, authority figures or genre-specific roles. For each give a name, role, relationship to the main characters, a brief description, cultural background in {region}, the genre role they play and the purpose they serve in the plot.

Return Format:
{format_instructions}

Language:
Write every narrative field in {language}. Keep the JSON keys in English.

Warnings:
Every supporting character needs a meaningful role.
"#;

const CHAPTER_GENERATION: &str = r#"You are a master storyteller who writes narratives rich in authentic Indian cultural detail and fluent in genre craft.

Goal:
Write chapter {chapter_num} of {total_chapters}, around 3,500-4,500 words.

Setting: {region}
Tone: {narrative_tone}
Pacing: {narrative_pacing}
Genres: {genres}

Chapter outline:
```
{chapter_outline}
```

Story outline:
```
{story_outline}
```

Main characters:
```
{main_characters}
```

Supporting characters:
```
{supporting_characters}
```

What happened so far:
```
{previous_context}
```

Genre guidance for this chapter:
```
{genre_guidance}
```

Follow the outlined plot points, develop characters through dialogue and action, include 5-7 substantial scenes and at least 3 meaningful dialogue exchanges, weave in 2-3 cultural references authentically, and engage all five senses. Keep continuity with earlier chapters.

Return Format:
{format_instructions}

Language:
Write every narrative field in {language}. Keep the JSON keys in English.

Warnings:
Do not contradict earlier chapters.
"#;

const DECISION_POINTS: &str = r#"You are a master storyteller designing interactive narratives with authentic Indian cultural detail.

Goal:
Create {num_decisions} meaningful decision points for chapter {chapter_num}.

Chapter:
```
{chapter_content}
```

Story outline:
```
{story_outline}
```

Main characters:
```
{main_characters}
```

Setting: {region}
Tone: {narrative_tone}
Pacing: {narrative_pacing}
Genres: {genres}

For each decision point describe the moment and its context, then give 2-3 distinct choices with their immediate outcome and the genre each choice advances. Root every choice in the social and cultural realities of {region}, and make each substantial enough to carry a 15-20 minute branch.

Return Format:
{format_instructions}

Language:
Write every narrative field in {language}. Keep the JSON keys in English.
"#;

const BRANCH_GENERATION: &str = r#"You are a master storyteller writing narrative branches with cultural authenticity.

Goal:
Continue the story from a decision point along the selected choice, around 3,500-4,500 words.

Chapter:
```
{chapter_content}
```

Decision point:
```
{decision_point}
```

Selected choice:
```
{selected_choice}
```

Story outline:
```
{story_outline}
```

Main characters:
```
{main_characters}
```

Setting: {region}
Tone: {narrative_tone}
Pacing: {narrative_pacing}
Genres: {genres}

Show realistic cultural consequences, the effect on relationships, and hooks to continue from. Include 4-6 substantial scenes and at least 3 meaningful dialogue exchanges. Note any shift in genre emphasis.

Return Format:
{format_instructions}

Language:
Write every narrative field in {language}. Keep the JSON keys in English.
"#;

const ELEMENT_SUGGESTIONS: &str = r#"Based on the following plot concept for an Indian story, suggest:
1. The 5 most suitable genres from this list: {available_genres}
2. The 3 most suitable narrative tones from this list: {available_tones}
3. The 3 most suitable pacing styles from this list: {available_pacing}

Give a brief reason (1-2 sentences) for each suggestion.

Plot concept: "{plot_concept}"

Return Format:
{format_instructions}

Every name must match one of the listed options exactly.
"#;

//! Local genre enrichment of validated model output.
//!
//! Models often leave the genre-facing fields of characters, decision points and
//! branches blank. These helpers fill them from the story's genres, tone and the
//! artifact's own text, so saved artifacts never carry empty genre fields. All of
//! them are pure functions of their inputs.

use crate::story::{Branch, CharacterProfile, Choice, DecisionPointList, SupportingCharacter};

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

fn has_any(haystacks: &[&str], keywords: &[&str]) -> bool {
    keywords.iter().any(|k| haystacks.iter().any(|h| h.contains(k)))
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

const ROLE_MAP: [(&str, &[(&str, &str)], &str); 4] = [
    (
        "romance",
        &[("passionate", "Romantic Lead"), ("reserved", "Love Interest")],
        "Romantic Catalyst",
    ),
    (
        "mystery",
        &[("curious", "Detective/Investigator"), ("secretive", "Key Suspect")],
        "Mystery Participant",
    ),
    (
        "adventure",
        &[("brave", "Hero/Protagonist"), ("wise", "Mentor/Guide")],
        "Journey Companion",
    ),
    (
        "drama",
        &[("emotional", "Emotional Anchor"), ("conflicted", "Internal Conflict Driver")],
        "Story Catalyst",
    ),
];

const FALLBACK_ROLES: [&str; 5] = [
    "Primary Narrative Driver",
    "Supporting Narrative Element",
    "Contextual Character",
    "Thematic Representation",
    "Narrative Catalyst",
];

/// Structural role from the primary genre and personality keywords.
pub fn narrative_role(personality: &str, genres: &[String], index: usize) -> String {
    let Some(primary) = genres.first() else {
        return "Undefined narrative role".to_string();
    };
    let primary = primary.to_lowercase();
    let personality = personality.to_lowercase();
    for (genre, traits, default) in ROLE_MAP {
        if primary.contains(genre) {
            return traits
                .iter()
                .find(|(trait_word, _)| personality.contains(trait_word))
                .map_or(default, |(_, role)| *role)
                .to_string();
        }
    }
    FALLBACK_ROLES[index % FALLBACK_ROLES.len()].to_string()
}

const EMOTIONAL_INDICATORS: [(&str, &str); 4] = [
    ("passionate", "Intense emotional experiences"),
    ("reserved", "Subtle, restrained emotional expression"),
    ("conflicted", "Internal emotional turmoil"),
    ("resilient", "Emotionally strong and adaptive"),
];

/// Emotional depth from the narrative tone, sharpened by the first matching
/// personality or conflict indicator.
pub fn emotional_landscape(tone: &str, personality: &str, conflicts: &str) -> String {
    let mut description = match tone {
        "Dramatic" => "Deeply layered emotional landscape with intense internal conflicts",
        "Humorous" => "Emotionally lighthearted with comedic undertones",
        "Suspenseful" => "Emotionally tense with underlying anxiety and anticipation",
        "Inspirational" => "Emotionally resilient with hope and personal growth",
        "Mysterious" => "Emotionally guarded with hidden depths",
        "Emotional" => "Rich, nuanced emotional experiences",
        "Philosophical" => "Emotionally contemplative with intellectual depth",
        "Introspective" => "Deeply self-aware with complex inner world",
        _ => "Balanced emotional landscape",
    }
    .to_string();

    let personality = personality.to_lowercase();
    let conflicts = conflicts.to_lowercase();
    if let Some((_, indicator)) = EMOTIONAL_INDICATORS
        .iter()
        .find(|(word, _)| personality.contains(word) || conflicts.contains(word))
    {
        description.push_str(" with ");
        description.push_str(indicator);
    }
    description
}

/// Genre archetypes a main character embodies.
pub fn genre_archetypes(character: &CharacterProfile, genres: &[String]) -> String {
    let Some(primary) = genres.first() else {
        return "Standard character archetype".to_string();
    };
    let personality = character.personality.to_lowercase();
    let motivations = character.motivations.to_lowercase();
    let conflicts = character.conflicts.to_lowercase();

    let mut archetypes = Vec::new();
    for genre in genres {
        let genre = genre.to_lowercase();
        let found = if genre.contains("romance") {
            if personality.contains("passionate") || motivations.contains("love") {
                Some("Romantic Lead")
            } else if personality.contains("jealous") || conflicts.contains("rival") {
                Some("Romantic Rival")
            } else {
                None
            }
        } else if genre.contains("adventure") {
            if personality.contains("brave") || motivations.contains("explore") {
                Some("Hero/Adventurer")
            } else if personality.contains("wise") || motivations.contains("guide") {
                Some("Mentor")
            } else {
                None
            }
        } else if genre.contains("mystery") {
            if personality.contains("curious") || motivations.contains("truth") {
                Some("Detective/Truth Seeker")
            } else if personality.contains("secretive") || motivations.contains("hidden") {
                Some("Mysterious Figure")
            } else {
                None
            }
        } else {
            None
        };
        archetypes.extend(found);
    }

    if archetypes.is_empty() {
        let primary = primary.to_lowercase();
        archetypes.push(if primary.contains("romance") {
            "Romantic Character"
        } else if primary.contains("adventure") {
            "Adventurous Soul"
        } else if primary.contains("mystery") {
            "Enigmatic Individual"
        } else if primary.contains("historical") {
            "Historical Figure"
        } else if primary.contains("fantasy") {
            "Magical Character"
        } else {
            "Cultural Archetype"
        });
    }
    archetypes.join(", ")
}

/// One trait per recognised genre.
pub fn genre_traits(genres: &[String]) -> String {
    if genres.is_empty() {
        return "Standard character traits".to_string();
    }
    let traits: Vec<&str> = genres
        .iter()
        .filter_map(|genre| {
            let genre = genre.to_lowercase();
            [
                ("romance", "Emotionally complex"),
                ("adventure", "Resourceful and brave"),
                ("mystery", "Observant and analytical"),
                ("historical", "Connected to cultural traditions"),
                ("fantasy", "Believes in the supernatural"),
                ("comedy", "Has a keen sense of humor"),
                ("thriller", "Alert to danger"),
                ("drama", "Emotionally expressive"),
            ]
            .into_iter()
            .find(|(key, _)| genre.contains(key))
            .map(|(_, value)| value)
        })
        .collect();
    if traits.is_empty() {
        "Culturally authentic traits".to_string()
    } else {
        traits.join(", ")
    }
}

/// Genre role of a supporting character, read from its role and description first.
pub fn supporting_genre_role(character: &SupportingCharacter, genres: &[String]) -> String {
    let Some(primary) = genres.first() else {
        return "Standard supporting role".to_string();
    };
    let role = character.role.to_lowercase();
    let description = character.brief_description.to_lowercase();

    if has_any(&[role.as_str()], &["mentor", "guide"]) || description.contains("teach") {
        return "Mentor/Guide".to_string();
    }
    if has_any(&[role.as_str()], &["friend", "ally"]) || description.contains("help") {
        return "Ally/Helper".to_string();
    }
    if has_any(&[role.as_str()], &["oppos", "enemy", "antagonist"]) {
        return "Antagonist/Obstacle".to_string();
    }
    if has_any(&[role.as_str()], &["family", "relative"]) || description.contains("parent") {
        return "Family Member".to_string();
    }

    let lowered = primary.to_lowercase();
    if lowered.contains("romance") {
        "Romantic Facilitator or Obstacle".to_string()
    } else if lowered.contains("mystery") {
        "Information Provider or Red Herring".to_string()
    } else if lowered.contains("adventure") {
        "Quest Companion or Challenger".to_string()
    } else {
        format!("{} Supporting Character", title_case(primary))
    }
}

/// Why a supporting character is in the story, falling back to the story theme.
pub fn supporting_genre_purpose(character: &SupportingCharacter, genres: &[String], theme: &str) -> String {
    if genres.is_empty() {
        return "Standard narrative purpose".to_string();
    }
    let role = character.role.to_lowercase();
    let relationship = character.relationship_to_main_characters.to_lowercase();

    let mut purposes = Vec::new();
    for genre in genres {
        let genre = genre.to_lowercase();
        let found = if genre.contains("romance") {
            if role.contains("friend") || relationship.contains("confidant") {
                Some("Provides emotional support or romantic advice")
            } else if role.contains("rival") || relationship.contains("compet") {
                Some("Creates romantic tension or obstacles")
            } else {
                None
            }
        } else if genre.contains("mystery") {
            if role.contains("witness") || relationship.contains("inform") {
                Some("Provides clues or information")
            } else if role.contains("suspect") {
                Some("Misdirects the investigation")
            } else {
                None
            }
        } else if genre.contains("adventure") {
            if role.contains("ally") || relationship.contains("companion") {
                Some("Assists in the quest or journey")
            } else if role.contains("expert") || relationship.contains("know") {
                Some("Provides specialized knowledge")
            } else {
                None
            }
        } else {
            None
        };
        purposes.extend(found);
    }

    if purposes.is_empty() {
        let theme = theme.to_lowercase();
        purposes.push(if theme.contains("family") {
            "Strengthens family themes"
        } else if theme.contains("tradition") {
            "Represents cultural traditions"
        } else if theme.contains("change") {
            "Highlights societal changes"
        } else {
            "Enhances cultural authenticity"
        });
    }
    purposes.join("; ")
}

fn story_position(chapter_number: u32, total_chapters: u32) -> f64 {
    if total_chapters == 0 {
        return 0.5;
    }
    f64::from(chapter_number) / f64::from(total_chapters)
}

/// How a decision point in `chapter_number` may affect each genre, at most three.
pub fn genre_impacts(genres: &[String], chapter_number: u32, total_chapters: u32) -> String {
    if genres.is_empty() {
        return "This decision point will impact the story's direction.".to_string();
    }
    let position = story_position(chapter_number, total_chapters);
    genres
        .iter()
        .take(3)
        .map(|genre| {
            let lowered = genre.to_lowercase();
            let kind = if lowered.contains("romance") {
                0
            } else if lowered.contains("mystery") {
                1
            } else if lowered.contains("adventure") {
                2
            } else {
                3
            };
            if position < 0.3 {
                [
                    "establish the romantic dynamics",
                    "introduce key mystery elements",
                    "set the journey's direction",
                ]
                .get(kind)
                .map(|s| format!("This decision could {}", s))
                .unwrap_or_else(|| format!("This decision impacts {} elements", genre))
            } else if position < 0.7 {
                [
                    "complicate or deepen relationships",
                    "reveal important clues or create misdirection",
                    "present a significant challenge or discovery",
                ]
                .get(kind)
                .map(|s| format!("This decision could {}", s))
                .unwrap_or_else(|| format!("This decision advances {} elements", genre))
            } else {
                [
                    "lead toward romantic resolution",
                    "lead toward solving the mystery",
                    "lead toward the journey's conclusion",
                ]
                .get(kind)
                .map(|s| format!("This decision could {}", s))
                .unwrap_or_else(|| format!("This decision resolves {} elements", genre))
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

const EMPHASIS_KEYWORDS: [(&str, &[&str]); 5] = [
    ("romance", &["love", "relationship", "emotion", "heart", "feeling", "together", "romantic"]),
    (
        "mystery",
        &["secret", "clue", "investigate", "discover", "reveal", "solve", "truth", "suspicion"],
    ),
    (
        "adventure",
        &["journey", "quest", "challenge", "danger", "explore", "risk", "brave", "venture"],
    ),
    ("historical", &["tradition", "heritage", "past", "ancestry", "legacy", "history", "era"]),
    ("drama", &["conflict", "emotion", "tense", "family", "struggle", "pain", "overcome"]),
];

/// Genres a choice leans toward, at most two. Detected from keywords in its
/// description and outcome; otherwise rotated by chapter and choice number.
pub fn genre_emphasis(choice: &Choice, genres: &[String], chapter_number: u32) -> String {
    if genres.is_empty() {
        return "No specific genre emphasis".to_string();
    }
    let description = choice.description.to_lowercase();
    let outcome = choice.immediate_outcome.to_lowercase();

    let emphasized: Vec<&str> = genres
        .iter()
        .filter(|genre| {
            let lowered = genre.to_lowercase();
            EMPHASIS_KEYWORDS
                .iter()
                .find(|(key, _)| lowered.contains(key))
                .is_some_and(|(_, keywords)| has_any(&[description.as_str(), outcome.as_str()], keywords))
        })
        .map(String::as_str)
        .take(2)
        .collect();
    if !emphasized.is_empty() {
        return emphasized.join(", ");
    }

    let choice_number = choice
        .choice_id
        .rsplit('_')
        .next()
        .and_then(|n| n.parse::<usize>().ok())
        .unwrap_or(0);
    genres[(chapter_number as usize + choice_number) % genres.len()].clone()
}

/// Elements a branch foregrounds, one per genre its choice emphasises.
pub fn branch_genre_elements(choice_emphasis: &str, genres: &[String]) -> Vec<String> {
    let Some(primary) = genres.first() else {
        return vec!["Generic story elements".to_string()];
    };
    let emphasis = if is_blank(choice_emphasis) {
        primary.as_str()
    } else {
        choice_emphasis
    };
    emphasis
        .split(',')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(|genre| {
            let lowered = genre.to_lowercase();
            if lowered.contains("romance") {
                format!("Romantic development between characters ({})", genre)
            } else if lowered.contains("mystery") {
                format!("Mystery progression with new revelations ({})", genre)
            } else if lowered.contains("adventure") {
                format!("Adventure elements with challenges and exploration ({})", genre)
            } else if lowered.contains("historical") {
                format!("Historical elements highlighting period authenticity ({})", genre)
            } else if lowered.contains("drama") {
                format!("Dramatic elements focusing on emotional conflicts ({})", genre)
            } else {
                format!("{} elements appropriate to the story", genre)
            }
        })
        .collect()
}

/// Where a branch moves the genre balance.
pub fn genre_shift(choice_emphasis: &str, genres: &[String]) -> String {
    if genres.len() <= 1 {
        return "No significant genre shift".to_string();
    }
    let primary = choice_emphasis
        .split(',')
        .map(str::trim)
        .find(|g| !g.is_empty())
        .unwrap_or(genres[0].as_str());
    match genres.iter().find(|g| !g.eq_ignore_ascii_case(primary)) {
        Some(secondary) => format!(
            "This choice shifts the narrative toward {} with elements of {}",
            primary, secondary
        ),
        None => format!("This choice maintains focus on {} elements", primary),
    }
}

/// Derive role and emotional landscape, and fill blank genre fields.
pub fn enrich_main_characters(characters: &mut [CharacterProfile], genres: &[String], tone: &str) {
    for character in characters {
        if is_blank(&character.genre_archetypes) {
            character.genre_archetypes = genre_archetypes(character, genres);
        }
        if is_blank(&character.genre_traits) {
            character.genre_traits = genre_traits(genres);
        }
        character.narrative_role = narrative_role(&character.personality, genres, 0);
        character.emotional_landscape =
            emotional_landscape(tone, &character.personality, &character.conflicts);
    }
}

pub fn enrich_supporting_characters(
    characters: &mut [SupportingCharacter],
    genres: &[String],
    tone: &str,
    theme: &str,
) {
    for character in characters {
        if is_blank(&character.genre_role) {
            character.genre_role = supporting_genre_role(character, genres);
        }
        if is_blank(&character.genre_purpose) {
            character.genre_purpose = supporting_genre_purpose(character, genres, theme);
        }
        character.narrative_role = narrative_role(&character.brief_description, genres, 1);
        character.emotional_landscape = emotional_landscape(tone, &character.brief_description, "");
    }
}

/// Fill blank genre impacts and choice emphasis. Expects ids to be assigned.
pub fn enrich_decision_points(
    list: &mut DecisionPointList,
    genres: &[String],
    chapter_number: u32,
    total_chapters: u32,
) {
    for point in &mut list.decision_points {
        if is_blank(&point.genre_impacts) {
            point.genre_impacts = genre_impacts(genres, chapter_number, total_chapters);
        }
        for choice in &mut point.choices {
            if is_blank(&choice.genre_emphasis) {
                choice.genre_emphasis = genre_emphasis(choice, genres, chapter_number);
            }
        }
    }
}

pub fn enrich_branch(branch: &mut Branch, choice: &Choice, genres: &[String]) {
    if branch.genre_elements.is_empty() {
        branch.genre_elements = branch_genre_elements(&choice.genre_emphasis, genres);
    }
    if is_blank(&branch.genre_shift) {
        branch.genre_shift = genre_shift(&choice.genre_emphasis, genres);
    }
}

//! Genre emphasis derived from a chapter's position in the story.
//!
//! Everything here is a pure function of the genre list, the chapter number and
//! the chapter count, so regenerating a chapter yields the same guidance.

use serde::{Deserialize, Serialize};
use std::fmt;

const ROMANCE_STAGES: [&str; 5] = ["Initial meeting", "Attraction", "Obstacles", "Growth", "Resolution"];
const MYSTERY_STAGES: [&str; 5] = ["Initial problem", "Clues", "Red herrings", "Revelations", "Solution"];
const ADVENTURE_STAGES: [&str; 5] = [
    "Call to adventure",
    "Challenges",
    "Trials",
    "Climactic challenge",
    "Return",
];
const HISTORICAL_STAGES: [&str; 5] = [
    "Setting establishment",
    "Period tensions",
    "Historical events",
    "Character adaptation",
    "Resolution",
];
const FANTASY_STAGES: [&str; 5] = [
    "World rules",
    "Magic introduction",
    "Powers development",
    "Magical conflict",
    "Magical resolution",
];
const GENERIC_STAGES: [&str; 5] = ["Introduction", "Development", "Complication", "Climax", "Resolution"];

/// Arc stages tracked for a genre, matched on its name.
pub fn arc_stages(genre: &str) -> &'static [&'static str] {
    let lowered = genre.to_lowercase();
    if lowered.contains("romance") {
        &ROMANCE_STAGES
    } else if lowered.contains("mystery") {
        &MYSTERY_STAGES
    } else if lowered.contains("adventure") {
        &ADVENTURE_STAGES
    } else if lowered.contains("historical") || lowered.contains("period") {
        &HISTORICAL_STAGES
    } else if lowered.contains("fantasy") || lowered.contains("mytholog") {
        &FANTASY_STAGES
    } else {
        &GENERIC_STAGES
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NarrativePhase {
    Introduction,
    Complication,
    Resolution,
}

impl NarrativePhase {
    /// First quarter introduces, middle half complicates, last quarter resolves.
    pub fn from_position(chapter_number: u32, total_chapters: u32) -> Self {
        let position = position(chapter_number, total_chapters);
        if position <= 0.25 {
            NarrativePhase::Introduction
        } else if position <= 0.75 {
            NarrativePhase::Complication
        } else {
            NarrativePhase::Resolution
        }
    }

    pub fn focus(&self) -> &'static str {
        match self {
            NarrativePhase::Introduction => "establishing",
            NarrativePhase::Complication => "developing",
            NarrativePhase::Resolution => "resolving",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NarrativePhase::Introduction => "introduction",
            NarrativePhase::Complication => "complication",
            NarrativePhase::Resolution => "resolution",
        }
    }
}

impl fmt::Display for NarrativePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenreEmphasis {
    Primary,
    Secondary,
    Background,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreStage {
    pub genre: String,
    pub current_stage: String,
    pub emphasis: GenreEmphasis,
}

/// Guidance placed into a chapter prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreGuidance {
    pub chapter_position: String,
    pub narrative_phase: NarrativePhase,
    pub focus: String,
    pub primary_genre: String,
    pub secondary_genre: String,
    pub genre_stages: Vec<GenreStage>,
    pub blend_recommendation: String,
}

fn position(chapter_number: u32, total_chapters: u32) -> f64 {
    if total_chapters == 0 {
        return 1.0;
    }
    f64::from(chapter_number) / f64::from(total_chapters)
}

fn stage_index(chapter_number: u32, total_chapters: u32, stage_count: usize) -> usize {
    let raw = (position(chapter_number, total_chapters) * stage_count as f64) as usize;
    raw.min(stage_count.saturating_sub(1))
}

fn primary_index(chapter_number: u32, genre_count: usize) -> usize {
    (chapter_number.saturating_sub(1) as usize) % genre_count
}

/// Which genres to foreground in `chapter_number`; `None` without genres.
pub fn guidance_for(genres: &[String], chapter_number: u32, total_chapters: u32) -> Option<GenreGuidance> {
    if genres.is_empty() {
        return None;
    }
    let phase = NarrativePhase::from_position(chapter_number, total_chapters);
    let primary = primary_index(chapter_number, genres.len());
    let secondary = (primary + 1) % genres.len();
    let primary_genre = genres[primary].clone();
    let secondary_genre = genres[secondary].clone();

    let genre_stages = genres
        .iter()
        .enumerate()
        .map(|(index, genre)| {
            let stages = arc_stages(genre);
            let emphasis = if index == primary {
                GenreEmphasis::Primary
            } else if index == secondary {
                GenreEmphasis::Secondary
            } else {
                GenreEmphasis::Background
            };
            GenreStage {
                genre: genre.clone(),
                current_stage: stages[stage_index(chapter_number, total_chapters, stages.len())].to_string(),
                emphasis,
            }
        })
        .collect();

    Some(GenreGuidance {
        chapter_position: format!("{}/{}", chapter_number, total_chapters),
        narrative_phase: phase,
        focus: phase.focus().to_string(),
        blend_recommendation: format!(
            "This chapter should primarily emphasize {} elements while incorporating supporting elements from {}.",
            primary_genre, secondary_genre
        ),
        primary_genre,
        secondary_genre,
        genre_stages,
    })
}

/// Direction for the chapter after `chapter_number`.
pub fn trajectory_hint(genres: &[String], chapter_number: u32, total_chapters: u32) -> Option<String> {
    if genres.is_empty() {
        return None;
    }
    let next = chapter_number + 1;
    if next > total_chapters {
        return Some("This is the conclusion - all genre elements should be resolved.".to_string());
    }
    let primary_genre = &genres[primary_index(next, genres.len())];
    let stages = arc_stages(primary_genre);
    let current = stage_index(chapter_number, total_chapters, stages.len());
    let next_stage = stages[(current + 1).min(stages.len() - 1)];
    Some(format!(
        "Next chapter should advance the {} elements toward {}.",
        primary_genre, next_stage
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genres(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_phase_boundaries() {
        assert_eq!(NarrativePhase::from_position(1, 4), NarrativePhase::Introduction);
        assert_eq!(NarrativePhase::from_position(2, 4), NarrativePhase::Complication);
        assert_eq!(NarrativePhase::from_position(3, 4), NarrativePhase::Complication);
        assert_eq!(NarrativePhase::from_position(4, 4), NarrativePhase::Resolution);
        assert_eq!(NarrativePhase::from_position(1, 1).focus(), "resolving");
    }

    #[test]
    fn test_primary_genre_rotates() {
        let list = genres(&["Romance", "Mystery", "Drama"]);
        let first = guidance_for(&list, 1, 10).unwrap();
        assert_eq!(first.primary_genre, "Romance");
        assert_eq!(first.secondary_genre, "Mystery");
        assert_eq!(first.chapter_position, "1/10");

        let fourth = guidance_for(&list, 4, 10).unwrap();
        assert_eq!(fourth.primary_genre, "Romance");
        let third = guidance_for(&list, 3, 10).unwrap();
        assert_eq!(third.primary_genre, "Drama");
        assert_eq!(third.secondary_genre, "Romance");
        assert_eq!(third.genre_stages[1].emphasis, GenreEmphasis::Background);
    }

    #[test]
    fn test_single_genre_is_its_own_secondary() {
        let guidance = guidance_for(&genres(&["Epic"]), 2, 3).unwrap();
        assert_eq!(guidance.primary_genre, "Epic");
        assert_eq!(guidance.secondary_genre, "Epic");
        assert_eq!(guidance.genre_stages.len(), 1);
    }

    #[test]
    fn test_stages_follow_position() {
        let guidance = guidance_for(&genres(&["Romance"]), 5, 5).unwrap();
        assert_eq!(guidance.genre_stages[0].current_stage, "Resolution");
        let guidance = guidance_for(&genres(&["Historical Fiction"]), 1, 10).unwrap();
        assert_eq!(guidance.genre_stages[0].current_stage, "Setting establishment");
        assert_eq!(arc_stages("Mythology")[0], "World rules");
    }

    #[test]
    fn test_trajectory_hint() {
        let list = genres(&["Mystery", "Drama"]);
        assert_eq!(
            trajectory_hint(&list, 1, 10).unwrap(),
            "Next chapter should advance the Drama elements toward Development."
        );
        assert_eq!(
            trajectory_hint(&list, 10, 10).unwrap(),
            "This is the conclusion - all genre elements should be resolved."
        );
        assert!(trajectory_hint(&[], 1, 10).is_none());
        assert!(guidance_for(&[], 1, 10).is_none());
    }
}

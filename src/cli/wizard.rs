//! Interactive 3-step wizard collecting a `StoryRequest`.
//!
//! Step 1 takes the concept and asks the model for suggestions, step 2 picks
//! genres, region, tone and pacing (pre-selected from the suggestions), step 3
//! sets chapters, language and decision points and confirms.

use crate::cli::parse::NewArgs;
use crate::cli::presentation::{format_request_summary, format_suggestions};
use crate::error::ApiError;
use crate::options::{
    ElementSuggestions, Language, NamedOption, NarrativePacing, NarrativeTone, Region, StoryRequest,
    AVAILABLE_GENRES, DEFAULT_CHAPTERS, MIN_CONCEPT_LEN,
};
use crate::pipeline::StoryPipeline;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, MultiSelect, Select};
use owo_colors::OwoColorize;
use tracing::warn;

fn input_error(e: dialoguer::Error) -> ApiError {
    ApiError::InvalidInput(format!("Failed to get user input: {}", e))
}

/// Initial selections derived from the model's suggestions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardDefaults {
    /// One flag per entry of `AVAILABLE_GENRES`.
    pub genre_checks: Vec<bool>,
    pub tone_index: usize,
    pub pacing_index: usize,
}

impl WizardDefaults {
    pub fn from_suggestions(suggestions: &ElementSuggestions) -> Self {
        let suggested = suggestions.genre_names();
        let genre_checks = AVAILABLE_GENRES
            .iter()
            .map(|g| suggested.iter().any(|s| s == g))
            .collect();
        Self {
            genre_checks,
            tone_index: first_index::<NarrativeTone>(suggestions.suggested_tones.first().map(|s| s.name.as_str())),
            pacing_index: first_index::<NarrativePacing>(
                suggestions.suggested_pacing.first().map(|s| s.name.as_str()),
            ),
        }
    }
}

fn first_index<T: NamedOption + PartialEq>(name: Option<&str>) -> usize {
    name.and_then(T::from_name)
        .and_then(|option| T::ALL.iter().position(|o| *o == option))
        .unwrap_or(0)
}

fn index_of<T: NamedOption + PartialEq>(value: Option<T>, fallback: usize) -> usize {
    value
        .and_then(|v| T::ALL.iter().position(|o| *o == v))
        .unwrap_or(fallback)
}

fn option_names<T: NamedOption>() -> Vec<&'static str> {
    T::ALL.iter().map(|o| o.name()).collect()
}

fn step_header(step: u32, title: &str) {
    eprintln!("\n{}", format!("Step {} of 3: {}", step, title).bold());
}

/// Run the wizard. Flags given on the command line pre-fill the answers.
/// Returns `None` when the user declines at the confirmation step.
pub async fn run_wizard(pipeline: &StoryPipeline, args: &NewArgs) -> Result<Option<StoryRequest>, ApiError> {
    let theme = ColorfulTheme::default();

    step_header(1, "Story concept");
    let mut concept_input = Input::<String>::with_theme(&theme).with_prompt("Describe your story concept");
    if let Some(concept) = &args.concept {
        concept_input = concept_input.with_initial_text(concept.clone());
    }
    let concept = concept_input
        .validate_with(|text: &String| -> Result<(), String> {
            if text.trim().is_empty() {
                Err("The concept cannot be empty".to_string())
            } else {
                Ok(())
            }
        })
        .interact_text()
        .map_err(input_error)?;

    if concept.trim().chars().count() < MIN_CONCEPT_LEN {
        eprintln!("Concept is short; using default suggestions.");
    } else {
        eprintln!("Analysing your concept...");
    }
    let suggestions = match pipeline.suggest_elements(&concept).await {
        Ok(suggestions) => suggestions,
        Err(e) => {
            warn!(error = %e, "Suggestion request failed");
            eprintln!("Could not get suggestions ({}); using defaults.", e);
            ElementSuggestions::defaults()
        }
    };
    eprintln!("{}", format_suggestions(&suggestions));
    let defaults = WizardDefaults::from_suggestions(&suggestions);

    step_header(2, "Genres and style");
    let mut genre_checks = defaults.genre_checks.clone();
    if !args.genres.is_empty() {
        genre_checks = AVAILABLE_GENRES
            .iter()
            .map(|g| args.genres.iter().any(|a| a.trim().eq_ignore_ascii_case(g)))
            .collect();
    }
    let genres = loop {
        let picked = MultiSelect::with_theme(&theme)
            .with_prompt("Genres (space to toggle, enter to confirm)")
            .items(&AVAILABLE_GENRES)
            .defaults(&genre_checks)
            .interact()
            .map_err(input_error)?;
        if picked.is_empty() {
            eprintln!("Select at least one genre.");
            continue;
        }
        break picked
            .into_iter()
            .map(|i| AVAILABLE_GENRES[i].to_string())
            .collect::<Vec<_>>();
    };

    let region = Select::with_theme(&theme)
        .with_prompt("Region")
        .items(&option_names::<Region>())
        .default(index_of(args.region, 0))
        .interact()
        .map_err(input_error)?;
    let tone = Select::with_theme(&theme)
        .with_prompt("Narrative tone")
        .items(&option_names::<NarrativeTone>())
        .default(index_of(args.tone, defaults.tone_index))
        .interact()
        .map_err(input_error)?;
    let pacing = Select::with_theme(&theme)
        .with_prompt("Narrative pacing")
        .items(&option_names::<NarrativePacing>())
        .default(index_of(args.pacing, defaults.pacing_index))
        .interact()
        .map_err(input_error)?;

    step_header(3, "Length and branching");
    let chapter_count: u32 = Input::with_theme(&theme)
        .with_prompt("Number of chapters")
        .default(args.chapters.unwrap_or(DEFAULT_CHAPTERS))
        .validate_with(|n: &u32| -> Result<(), &str> {
            if *n == 0 {
                Err("At least one chapter is required")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .map_err(input_error)?;
    let language = Select::with_theme(&theme)
        .with_prompt("Language")
        .items(&option_names::<Language>())
        .default(index_of(args.language, 0))
        .interact()
        .map_err(input_error)?;
    let decision_points: u32 = Input::with_theme(&theme)
        .with_prompt("Decision points per chapter (0 for none)")
        .default(args.decisions.unwrap_or(0))
        .interact_text()
        .map_err(input_error)?;

    let mut request = StoryRequest::new(concept.trim(), genres);
    request.region = Region::ALL[region];
    request.tone = NarrativeTone::ALL[tone];
    request.pacing = NarrativePacing::ALL[pacing];
    request.chapter_count = chapter_count;
    request.language = Language::ALL[language];
    request.decision_points_per_chapter = decision_points;
    if let Some(n) = args.main_characters {
        request.main_character_count = n;
    }
    if let Some(n) = args.supporting_characters {
        request.supporting_character_count = n;
    }

    eprintln!("\n{}", format_request_summary(&request));
    let confirmed = Confirm::with_theme(&theme)
        .with_prompt("Generate this story?")
        .default(true)
        .interact()
        .map_err(input_error)?;

    Ok(confirmed.then_some(request))
}

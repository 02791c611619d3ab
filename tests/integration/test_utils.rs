//! Shared test utilities for integration tests
//!
//! A scripted model provider for driving the pipeline without a network, and
//! isolation for the XDG/`STORYLOOM_*` environment the config loader reads.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use storyloom::config::ContextSettings;
use storyloom::error::ProviderError;
use storyloom::generation::GenerationCaller;
use storyloom::pipeline::StoryPipeline;
use storyloom::provider::{ChatMessage, CompletionOptions, CompletionResponse, ModelProviderClient, TokenUsage};
use storyloom::template::catalog::TemplateCatalog;
use tempfile::TempDir;

/// Global mutex to serialize environment variable access across all tests
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Replays scripted replies in order; once exhausted, repeats the last one.
pub struct ScriptedProvider {
    replies: Vec<Result<String, ProviderError>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new<I, S>(texts: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_results(texts.into_iter().map(|t| Ok(t.into())).collect())
    }

    pub fn with_results(replies: Vec<Result<String, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            replies,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// User prompts in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelProviderClient for ScriptedProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        _options: CompletionOptions,
    ) -> Result<CompletionResponse, ProviderError> {
        let prompt = messages.last().map(|m| m.content.clone()).unwrap_or_default();
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(prompt);
            calls.len() - 1
        };
        let reply = self
            .replies
            .get(index)
            .or_else(|| self.replies.last())
            .cloned()
            .unwrap_or_else(|| Err(ProviderError::RequestFailed("no scripted reply".to_string())))?;
        Ok(CompletionResponse {
            content: reply,
            model: "scripted".to_string(),
            usage: TokenUsage::default(),
            finish_reason: Some("stop".to_string()),
        })
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}

pub fn pipeline_with(provider: Arc<ScriptedProvider>, max_attempts: u32) -> StoryPipeline {
    let caller = GenerationCaller::new(provider, CompletionOptions::default(), max_attempts);
    StoryPipeline::new(
        caller,
        TemplateCatalog::builtin().unwrap(),
        ContextSettings::default(),
    )
}

pub mod replies {
    pub const FOUNDATION: &str = r#"{"title": "The Letters of Shimla", "theme": "Secrets and duty",
        "setting": "Shimla, 1962", "synopsis": "A postman reads the letters he delivers.",
        "narrative_arc": "Curiosity turns to guilt", "genre_elements": "A mystery inside a family drama",
        "narrative_tone": "Mysterious", "social_context": "A hill town after independence"}"#;
    pub const OUTLINES: &str = r#"{"chapters": [
        {"chapter_number": 1, "title": "The First Letter", "summary": "Ravi opens a letter"},
        {"chapter_number": 2, "title": "The Reply", "summary": "Meera answers"}]}"#;
    pub const MAIN: &str = r#"{"characters": [{"name": "Ravi", "age": 34, "occupation": "postman"},
        {"name": "Meera", "age": "29"}]}"#;
    pub const SUPPORTING: &str = r#"{"supporting_characters": [{"name": "Mr. Sood", "role": "postmaster"}]}"#;
    pub const CHAPTER_ONE: &str = r#"Here is the chapter:
```json
{"title": "The First Letter", "content": "Ravi broke the seal.\n\n\"Who sent this?\" he asked.",
 "summary": "Ravi reads a letter.", "key_events": ["A critical letter names Meera"],
 "character_development": ["Ravi grows bold"], "cultural_elements_used": ["Monsoon fair"],
 "genre_elements_used": ["A hidden clue"], "next_chapter_hooks": ["Who wrote it?"]}
```"#;
    pub const CHAPTER_TWO: &str = r#"{"title": "The Reply", "content": "Meera answered at dawn.",
        "summary": "Meera replies.", "key_events": ["Meera replies"], "next_chapter_hooks": []}"#;
    pub const DECISIONS: &str = r#"{"decision_points": [{"description": "Return the letter?",
        "choices": [{"description": "Return it"}, {"description": "Keep it", "genre_emphasis": "Mystery"}]}]}"#;
    pub const BRANCH: &str = r#"{"title": "The Kept Letter", "content": "Ravi hid the letter in his satchel.",
        "consequences": "Meera never learns the truth", "follow_up_hooks": "Mr. Sood notices",
        "genre_shift": "Leans further into mystery"}"#;
    pub const SUGGESTIONS: &str = r#"{"suggested_genres": [{"name": "mystery", "reason": "Hidden letters"},
        {"name": "Space Opera", "reason": "not offered"}],
        "suggested_tones": [{"name": "Suspenseful", "reason": "Secrets"}],
        "suggested_pacing": [{"name": "Slow-burning"}]}"#;
}

struct EnvState {
    saved: Vec<(&'static str, Option<String>)>,
}

impl EnvState {
    fn capture(keys: &[&'static str]) -> Self {
        Self {
            saved: keys.iter().map(|k| (*k, std::env::var(k).ok())).collect(),
        }
    }

    fn restore(self) {
        for (key, value) in self.saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

const ISOLATED_VARS: &[&str] = &[
    "HOME",
    "XDG_CONFIG_HOME",
    "STORYLOOM_ENV",
    "STORYLOOM__PROVIDER__MODEL",
    "STORYLOOM__GENERATION__MAX_ATTEMPTS",
    "STORYLOOM__OUTPUT__DIRECTORY",
    "OPENAI_API_KEY",
    "ANTHROPIC_API_KEY",
];

/// Run `f` with `XDG_CONFIG_HOME` and `HOME` inside `test_dir` and the
/// `STORYLOOM_*` overrides used by tests cleared. The environment is restored afterwards.
pub fn with_isolated_env<F, R>(test_dir: &TempDir, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let env_state = EnvState::capture(ISOLATED_VARS);

    let config_home = test_dir.path().join("xdg");
    let home = test_dir.path().join("home");
    std::fs::create_dir_all(&config_home).unwrap();
    std::fs::create_dir_all(&home).unwrap();

    for key in ISOLATED_VARS {
        std::env::remove_var(key);
    }
    std::env::set_var("HOME", &home);
    std::env::set_var("XDG_CONFIG_HOME", &config_home);

    let result = f();

    env_state.restore();

    result
}

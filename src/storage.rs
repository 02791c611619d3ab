//! Story persistence
//!
//! One directory per story under the configured output directory:
//!
//! ```text
//! <Title>/
//!   story_outline.json  characters.json  metadata.json
//!   chapters/chapter_<n>.json  chapters/chapter_<n>.md
//!   decisions/chapter_<n>.json
//!   branches/<point_id>/<choice_id>.json  branches/<point_id>/<choice_id>.md
//! ```
//!
//! Files are written to a `.tmp` sibling and renamed into place.

use crate::error::StorageError;
use crate::pipeline::{ArtifactSink, StoryMetadata};
use crate::story::{Branch, Chapter, CharacterCast, DecisionPointList, StoryOutline};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use unicode_normalization::UnicodeNormalization;

const OUTLINE_FILE: &str = "story_outline.json";
const CHARACTERS_FILE: &str = "characters.json";
const METADATA_FILE: &str = "metadata.json";
const CHAPTERS_DIR: &str = "chapters";
const DECISIONS_DIR: &str = "decisions";
const BRANCHES_DIR: &str = "branches";

/// Directory name for a story title: NFC-normalized, alphanumerics kept,
/// whitespace runs become `_`, everything else becomes `_`.
pub fn sanitize_title(title: &str) -> String {
    let normalized: String = title.trim().nfc().collect();
    let mut out = String::with_capacity(normalized.len());
    let mut last_space = false;
    for c in normalized.chars() {
        if c.is_alphanumeric() {
            out.push(c);
            last_space = false;
        } else if c.is_whitespace() {
            if !last_space {
                out.push('_');
            }
            last_space = true;
        } else {
            out.push('_');
            last_space = false;
        }
    }
    if out.trim_matches('_').is_empty() {
        "Untitled_Story".to_string()
    } else {
        out
    }
}

fn write_atomic(path: &Path, contents: &str) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
    }
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, contents).map_err(|e| StorageError::io(&temp_path, e))?;
    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        StorageError::io(path, e)
    })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StorageError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| StorageError::Serialization {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    write_atomic(path, &json)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    if !path.is_file() {
        return Err(StorageError::NotFound(path.to_path_buf()));
    }
    let raw = fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
    serde_json::from_str(&raw).map_err(|e| StorageError::Serialization {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Number `n` of a `chapter_<n>.json` file name.
fn chapter_number(file_name: &str) -> Option<u32> {
    file_name
        .strip_prefix("chapter_")?
        .strip_suffix(".json")?
        .parse()
        .ok()
}

/// One story directory.
#[derive(Debug, Clone)]
pub struct StoryStorage {
    dir: PathBuf,
}

impl StoryStorage {
    /// Create (or reuse) `dir` and its chapter directory.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        let chapters = dir.join(CHAPTERS_DIR);
        fs::create_dir_all(&chapters).map_err(|e| StorageError::io(&chapters, e))?;
        Ok(Self { dir })
    }

    /// Open an existing story directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        if !dir.join(OUTLINE_FILE).is_file() {
            return Err(StorageError::NotFound(dir.join(OUTLINE_FILE)));
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn chapter_path(&self, chapter_number: u32) -> PathBuf {
        self.dir
            .join(CHAPTERS_DIR)
            .join(format!("chapter_{}.json", chapter_number))
    }

    pub fn decisions_path(&self, chapter_number: u32) -> PathBuf {
        self.dir
            .join(DECISIONS_DIR)
            .join(format!("chapter_{}.json", chapter_number))
    }

    pub fn branch_path(&self, point_id: &str, choice_id: &str) -> PathBuf {
        self.dir
            .join(BRANCHES_DIR)
            .join(sanitize_title(point_id))
            .join(format!("{}.json", sanitize_title(choice_id)))
    }

    pub fn save_outline(&self, outline: &StoryOutline) -> Result<(), StorageError> {
        write_json(&self.dir.join(OUTLINE_FILE), outline)
    }

    pub fn save_characters(&self, cast: &CharacterCast) -> Result<(), StorageError> {
        write_json(&self.dir.join(CHARACTERS_FILE), cast)
    }

    pub fn save_metadata(&self, metadata: &StoryMetadata) -> Result<(), StorageError> {
        write_json(&self.dir.join(METADATA_FILE), metadata)
    }

    /// Writes `chapter_<n>.json` and `chapter_<n>.md`.
    pub fn save_chapter(&self, chapter: &Chapter) -> Result<PathBuf, StorageError> {
        let path = self.chapter_path(chapter.chapter_number);
        write_json(&path, chapter)?;
        write_atomic(&path.with_extension("md"), &chapter.to_markdown())?;
        debug!(chapter = chapter.chapter_number, path = %path.display(), "Saved chapter");
        Ok(path)
    }

    pub fn save_decisions(&self, chapter_number: u32, decisions: &DecisionPointList) -> Result<(), StorageError> {
        write_json(&self.decisions_path(chapter_number), decisions)
    }

    /// Writes the branch JSON and Markdown under its decision point directory.
    pub fn save_branch(&self, branch: &Branch) -> Result<PathBuf, StorageError> {
        let path = self.branch_path(&branch.decision_point_id, &branch.choice_id);
        write_json(&path, branch)?;
        write_atomic(&path.with_extension("md"), &branch.to_markdown())?;
        Ok(path)
    }

    pub fn load_outline(&self) -> Result<StoryOutline, StorageError> {
        read_json(&self.dir.join(OUTLINE_FILE))
    }

    pub fn load_characters(&self) -> Result<CharacterCast, StorageError> {
        read_json(&self.dir.join(CHARACTERS_FILE))
    }

    pub fn load_metadata(&self) -> Result<StoryMetadata, StorageError> {
        read_json(&self.dir.join(METADATA_FILE))
    }

    pub fn load_chapter(&self, chapter_number: u32) -> Result<Chapter, StorageError> {
        read_json(&self.chapter_path(chapter_number))
    }

    pub fn load_decisions(&self, chapter_number: u32) -> Result<DecisionPointList, StorageError> {
        read_json(&self.decisions_path(chapter_number))
    }

    pub fn load_branch(&self, point_id: &str, choice_id: &str) -> Result<Branch, StorageError> {
        read_json(&self.branch_path(point_id, choice_id))
    }

    /// Saved chapter numbers, ascending numerically.
    pub fn chapter_numbers(&self) -> Result<Vec<u32>, StorageError> {
        let dir = self.dir.join(CHAPTERS_DIR);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut numbers = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|e| StorageError::io(&dir, e))? {
            let entry = entry.map_err(|e| StorageError::io(&dir, e))?;
            if let Some(n) = entry.file_name().to_str().and_then(chapter_number) {
                numbers.push(n);
            }
        }
        numbers.sort_unstable();
        Ok(numbers)
    }

    /// All saved chapters in chapter order.
    pub fn load_chapters(&self) -> Result<Vec<Chapter>, StorageError> {
        self.chapter_numbers()?
            .into_iter()
            .map(|n| self.load_chapter(n))
            .collect()
    }
}

/// Listing entry for a saved story.
#[derive(Debug, Clone, PartialEq)]
pub struct StorySummary {
    pub directory: PathBuf,
    pub title: String,
    pub chapters_saved: usize,
    pub metadata: Option<StoryMetadata>,
}

/// The output directory holding every story.
#[derive(Debug, Clone)]
pub struct StoryLibrary {
    root: PathBuf,
}

impl StoryLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// New directory for `title`. An existing directory is never reused: a numeric
    /// suffix is appended instead.
    pub fn create(&self, title: &str) -> Result<StoryStorage, StorageError> {
        let base = sanitize_title(title);
        let mut dir = self.root.join(&base);
        let mut suffix = 2;
        while dir.exists() {
            dir = self.root.join(format!("{}_{}", base, suffix));
            suffix += 1;
        }
        info!(directory = %dir.display(), "Creating story directory");
        StoryStorage::create(dir)
    }

    /// Open a story by directory path, or by directory name under the library root.
    pub fn open(&self, story: &Path) -> Result<StoryStorage, StorageError> {
        if story.join(OUTLINE_FILE).is_file() {
            return StoryStorage::open(story);
        }
        StoryStorage::open(self.root.join(story))
    }

    /// Saved stories, sorted by directory name. Directories whose outline cannot
    /// be read are logged and left out.
    pub fn list(&self) -> Result<Vec<StorySummary>, StorageError> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let mut stories = Vec::new();
        let entries = fs::read_dir(&self.root).map_err(|e| StorageError::io(&self.root, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::io(&self.root, e))?;
            let Ok(storage) = StoryStorage::open(entry.path()) else {
                continue;
            };
            let outline = match storage.load_outline() {
                Ok(outline) => outline,
                Err(e) => {
                    warn!(directory = %storage.dir().display(), error = %e, "Skipping unreadable story");
                    continue;
                }
            };
            stories.push(StorySummary {
                directory: storage.dir().to_path_buf(),
                title: outline.title,
                chapters_saved: storage.chapter_numbers().map(|n| n.len()).unwrap_or_default(),
                metadata: storage.load_metadata().ok(),
            });
        }
        stories.sort_by(|a, b| a.directory.cmp(&b.directory));
        Ok(stories)
    }
}

/// `ArtifactSink` that writes a run into a fresh library directory, created
/// once the story title is known.
#[derive(Debug)]
pub struct LibrarySink {
    library: StoryLibrary,
    storage: Option<StoryStorage>,
}

impl LibrarySink {
    pub fn new(library: StoryLibrary) -> Self {
        Self {
            library,
            storage: None,
        }
    }

    /// Story directory, once the outline has been saved.
    pub fn storage(&self) -> Option<&StoryStorage> {
        self.storage.as_ref()
    }

    fn require(&self) -> Result<&StoryStorage, StorageError> {
        self.storage
            .as_ref()
            .ok_or_else(|| StorageError::NotFound(self.library.root().join(OUTLINE_FILE)))
    }
}

impl ArtifactSink for LibrarySink {
    fn save_outline(&mut self, outline: &StoryOutline, metadata: &StoryMetadata) -> Result<(), StorageError> {
        let storage = match self.storage.take() {
            Some(storage) => storage,
            None => self.library.create(&outline.title)?,
        };
        storage.save_outline(outline)?;
        storage.save_metadata(metadata)?;
        self.storage = Some(storage);
        Ok(())
    }

    fn save_characters(&mut self, cast: &CharacterCast) -> Result<(), StorageError> {
        self.require()?.save_characters(cast)
    }

    fn save_chapter(&mut self, chapter: &Chapter) -> Result<(), StorageError> {
        self.require()?.save_chapter(chapter).map(|_| ())
    }

    fn save_decisions(&mut self, chapter_number: u32, decisions: &DecisionPointList) -> Result<(), StorageError> {
        self.require()?.save_decisions(chapter_number, decisions)
    }
}

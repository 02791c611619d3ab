//! Story directories, the library listing and exports

use storyloom::error::StorageError;
use storyloom::export::{export_story, ExportFormat};
use storyloom::options::StoryRequest;
use storyloom::pipeline::{ArtifactSink, StoryMetadata};
use storyloom::storage::{LibrarySink, StoryLibrary};
use storyloom::story::{Chapter, CharacterCast, CharacterProfile, StoryOutline};
use tempfile::TempDir;

fn outline(title: &str) -> StoryOutline {
    StoryOutline {
        title: title.to_string(),
        synopsis: "A postman reads the letters he delivers.".to_string(),
        setting: "Shimla, 1962".to_string(),
        genres: vec!["Mystery".to_string()],
        ..StoryOutline::default()
    }
}

fn metadata(title: &str, chapters: u32) -> StoryMetadata {
    let mut request = StoryRequest::new("A postman reads letters", vec!["Mystery".to_string()]);
    request.chapter_count = chapters;
    let mut metadata = StoryMetadata::from_request(&request, "test-model");
    metadata.title = title.to_string();
    metadata
}

fn chapter(number: u32, content: &str) -> Chapter {
    Chapter {
        chapter_number: number,
        title: format!("Part {}", number),
        content: content.to_string(),
        ..Chapter::default()
    }
}

/// Write a story with `chapters` chapters through the library sink.
fn saved_story(library: &StoryLibrary, title: &str, chapters: u32) -> LibrarySink {
    let mut sink = LibrarySink::new(library.clone());
    sink.save_outline(&outline(title), &metadata(title, chapters)).unwrap();
    sink.save_characters(&CharacterCast {
        main_characters: vec![CharacterProfile {
            name: "Ravi".to_string(),
            ..CharacterProfile::default()
        }],
        supporting_characters: Vec::new(),
    })
    .unwrap();
    for n in 1..=chapters {
        sink.save_chapter(&chapter(n, &format!("Paragraph of chapter {}.", n))).unwrap();
    }
    sink
}

#[test]
fn test_sink_requires_outline_first() {
    let temp = TempDir::new().unwrap();
    let mut sink = LibrarySink::new(StoryLibrary::new(temp.path()));
    let err = sink.save_chapter(&chapter(1, "Too early.")).unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
}

#[test]
fn test_same_title_gets_new_directory() {
    let temp = TempDir::new().unwrap();
    let library = StoryLibrary::new(temp.path());
    let first = saved_story(&library, "Monsoon Letters", 1);
    let second = saved_story(&library, "Monsoon Letters", 1);

    let first_dir = first.storage().unwrap().dir().to_path_buf();
    let second_dir = second.storage().unwrap().dir().to_path_buf();
    assert_eq!(first_dir, temp.path().join("Monsoon_Letters"));
    assert_eq!(second_dir, temp.path().join("Monsoon_Letters_2"));
}

#[test]
fn test_chapters_load_in_numeric_order() {
    let temp = TempDir::new().unwrap();
    let library = StoryLibrary::new(temp.path());
    let sink = saved_story(&library, "Eleven Nights", 11);
    let storage = sink.storage().unwrap();

    let numbers: Vec<u32> = storage.load_chapters().unwrap().iter().map(|c| c.chapter_number).collect();
    assert_eq!(numbers, (1..=11).collect::<Vec<_>>());
}

#[test]
fn test_library_listing() {
    let temp = TempDir::new().unwrap();
    let library = StoryLibrary::new(temp.path());
    saved_story(&library, "Beta Story", 2);
    saved_story(&library, "Alpha Story", 1);
    std::fs::create_dir_all(temp.path().join("not_a_story")).unwrap();

    let stories = library.list().unwrap();
    let titles: Vec<&str> = stories.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Alpha Story", "Beta Story"]);
    assert_eq!(stories[1].chapters_saved, 2);
    assert_eq!(stories[1].metadata.as_ref().unwrap().chapter_count, 2);
}

#[test]
fn test_export_both_formats_into_story_directory() {
    let temp = TempDir::new().unwrap();
    let library = StoryLibrary::new(temp.path());
    let sink = saved_story(&library, "The Letters of Shimla", 2);
    let storage = sink.storage().unwrap();

    let markdown_path = export_story(storage, ExportFormat::Markdown).unwrap();
    assert_eq!(markdown_path, storage.dir().join("The_Letters_of_Shimla_full.md"));
    let markdown = std::fs::read_to_string(&markdown_path).unwrap();
    let first = markdown.find("## Chapter 1: Part 1").unwrap();
    let second = markdown.find("## Chapter 2: Part 2").unwrap();
    assert!(first < second);

    let audio_path = export_story(storage, ExportFormat::Audiobook).unwrap();
    let script = std::fs::read_to_string(&audio_path).unwrap();
    assert!(script.starts_with("AUDIOBOOK SCRIPT: The Letters of Shimla"));
    assert!(script.contains("- Set in North India"));
    assert!(script.contains("[NARRATOR] Paragraph of chapter 2."));
}

#[test]
fn test_open_missing_story_fails() {
    let temp = TempDir::new().unwrap();
    let library = StoryLibrary::new(temp.path());
    let err = library.open(temp.path().join("Missing").as_path()).unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));
}

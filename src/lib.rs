//! Storyloom: chapter-by-chapter story generation
//!
//! Drives a language model through outline, characters, chapters and optional
//! decision points, keeping a bounded store of narrative context between
//! chapters and persisting every artifact to a story directory.

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod export;
pub mod generation;
pub mod logging;
pub mod options;
pub mod pipeline;
pub mod provider;
pub mod storage;
pub mod story;
pub mod template;

//! Bounded, deterministically ranked store of narrative context points.
//!
//! Ranking is a total order: weight descending, then origin chapter descending,
//! then insertion order ascending. Pruning removes the lowest-ranked points
//! until the store fits its cap, taking non-critical points before critical ones.

use crate::config::ContextSettings;
use crate::context::point::{ContextCategory, ContextPoint, Importance};
use crate::story::Chapter;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    seq: u64,
    point: ContextPoint,
}

/// Highest-ranked entries sort first.
fn rank_order(a: &Entry, b: &Entry) -> Ordering {
    b.point
        .weight()
        .cmp(&a.point.weight())
        .then_with(|| b.point.origin_chapter().cmp(&a.point.origin_chapter()))
        .then_with(|| a.seq.cmp(&b.seq))
}

/// Per-chapter recap kept alongside the ranked points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterSummary {
    pub chapter_number: u32,
    pub title: String,
    pub summary: String,
    pub key_events: Vec<String>,
}

/// Context handed to the prompt for one chapter, grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterContext {
    pub previous_chapters: Vec<ChapterSummary>,
    pub plot_threads: Vec<String>,
    pub character_developments: Vec<String>,
    pub setting_details: Vec<String>,
    pub themes: Vec<String>,
}

impl ChapterContext {
    pub fn is_empty(&self) -> bool {
        self.previous_chapters.is_empty()
            && self.plot_threads.is_empty()
            && self.character_developments.is_empty()
            && self.setting_details.is_empty()
            && self.themes.is_empty()
    }
}

/// Size-bounded context store owned by a single story run.
#[derive(Debug, Clone)]
pub struct ContextStore {
    entries: Vec<Entry>,
    next_seq: u64,
    max_points: usize,
    critical_weight: u32,
    summaries: BTreeMap<u32, ChapterSummary>,
}

impl ContextStore {
    pub fn new(max_points: usize, critical_weight: u32) -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
            max_points,
            critical_weight,
            summaries: BTreeMap::new(),
        }
    }

    pub fn from_settings(settings: &ContextSettings) -> Self {
        Self::new(settings.max_points, settings.critical_weight)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_points(&self) -> usize {
        self.max_points
    }

    pub fn critical_weight(&self) -> u32 {
        self.critical_weight
    }

    pub fn is_critical(&self, point: &ContextPoint) -> bool {
        point.weight() >= self.critical_weight
    }

    /// Points in insertion order.
    pub fn points(&self) -> impl Iterator<Item = &ContextPoint> {
        self.entries.iter().map(|e| &e.point)
    }

    /// Append a point, pruning if the cap is exceeded.
    pub fn add_point(&mut self, point: ContextPoint) {
        self.entries.push(Entry {
            seq: self.next_seq,
            point,
        });
        self.next_seq += 1;
        if self.entries.len() > self.max_points {
            self.prune();
        }
    }

    /// Up to `limit` points introduced before `chapter_index`, best first.
    pub fn get_context_for_chapter(&self, chapter_index: u32, limit: usize) -> Vec<&ContextPoint> {
        let mut eligible: Vec<&Entry> = self
            .entries
            .iter()
            .filter(|e| e.point.origin_chapter() < chapter_index)
            .collect();
        eligible.sort_by(|a, b| rank_order(a, b));
        eligible.into_iter().take(limit).map(|e| &e.point).collect()
    }

    /// Evict lowest-ranked points until the store fits its cap.
    pub fn prune(&mut self) {
        while self.entries.len() > self.max_points {
            let critical_weight = self.critical_weight;
            let victim = self
                .lowest_ranked(|e| e.point.weight() < critical_weight)
                .or_else(|| self.lowest_ranked(|_| true));
            let Some(index) = victim else { break };
            let removed = self.entries.remove(index);
            debug!(
                weight = removed.point.weight(),
                origin_chapter = removed.point.origin_chapter(),
                category = %removed.point.category(),
                "Evicted context point"
            );
        }
    }

    fn lowest_ranked<F>(&self, filter: F) -> Option<usize>
    where
        F: Fn(&Entry) -> bool,
    {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| filter(e))
            .max_by(|(_, a), (_, b)| rank_order(a, b))
            .map(|(index, _)| index)
    }

    /// Store a generated chapter's recap and the facts extracted from it.
    pub fn record_chapter(&mut self, chapter: &Chapter, chapter_number: u32) {
        self.summaries.insert(
            chapter_number,
            ChapterSummary {
                chapter_number,
                title: chapter.title.clone(),
                summary: chapter.summary.clone(),
                key_events: chapter.key_events.clone(),
            },
        );

        let critical = self.critical_weight;
        for event in &chapter.key_events {
            let lowered = event.to_lowercase();
            let importance = if lowered.contains("critical") || lowered.contains("important") {
                Importance::High
            } else {
                Importance::Medium
            };
            self.add_fact(event, ContextCategory::Plot, importance.weight(critical), chapter_number);
        }
        for development in &chapter.character_development {
            self.add_fact(
                development,
                ContextCategory::Character,
                Importance::High.weight(critical),
                chapter_number,
            );
        }
        for hook in &chapter.next_chapter_hooks {
            self.add_fact(hook, ContextCategory::Plot, Importance::High.weight(critical), chapter_number);
        }
        for element in &chapter.genre_elements_used {
            self.add_fact(
                element,
                ContextCategory::Theme,
                Importance::Medium.weight(critical),
                chapter_number,
            );
        }
        for element in &chapter.cultural_elements_used {
            self.add_fact(
                element,
                ContextCategory::Setting,
                Importance::Low.weight(critical),
                chapter_number,
            );
        }
    }

    fn add_fact(&mut self, text: &str, category: ContextCategory, weight: u32, chapter: u32) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        self.add_point(ContextPoint::new(text, category, weight, chapter));
    }

    /// Grouped context for the prompt of `chapter_index`; empty for the first chapter.
    pub fn chapter_context(&self, chapter_index: u32, limit: usize) -> ChapterContext {
        let mut context = ChapterContext {
            previous_chapters: self
                .summaries
                .range(..chapter_index)
                .map(|(_, s)| s.clone())
                .collect(),
            ..ChapterContext::default()
        };

        for point in self.get_context_for_chapter(chapter_index, limit) {
            let bucket = match point.category() {
                ContextCategory::Plot => &mut context.plot_threads,
                ContextCategory::Character => &mut context.character_developments,
                ContextCategory::Setting => &mut context.setting_details,
                ContextCategory::Theme => &mut context.themes,
            };
            bucket.push(point.text().to_string());
        }
        context
    }

    pub fn summaries(&self) -> impl Iterator<Item = &ChapterSummary> {
        self.summaries.values()
    }
}

use std::fmt;

use chrono::NaiveDateTime;
use nb_core::{NewsItem, SourceTag};
use serde::Serialize;

/// Lifecycle of a single run. Every transition is logged at debug level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunState {
    Idle,
    Scraping,
    Filtering,
    Summarizing,
    Persisting,
    Composing,
    Pushed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SourceOutcome {
    Scraped { tag: SourceTag, count: usize },
    Unavailable { tag: SourceTag, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// Link already in the store before this run
    AlreadySeen,
    /// An earlier candidate of this run had the same link
    DuplicateInRun,
    Vendor(String),
    /// The store's unique constraint rejected the insert
    DuplicateLink,
    Persistence(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AlreadySeen => f.write_str("already seen"),
            SkipReason::DuplicateInRun => f.write_str("duplicate in run"),
            SkipReason::Vendor(e) => write!(f, "vendor: {}", e),
            SkipReason::DuplicateLink => f.write_str("duplicate link"),
            SkipReason::Persistence(e) => write!(f, "persistence: {}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkipRecord {
    pub tag: SourceTag,
    pub title: String,
    pub link: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: NaiveDateTime,
    pub date: String,
    pub sources: Vec<SourceOutcome>,
    pub skipped: Vec<SkipRecord>,
    pub persisted: Vec<NewsItem>,
    pub state: RunState,
    pub push_error: Option<String>,
}

impl RunReport {
    pub fn new(started_at: NaiveDateTime) -> Self {
        Self {
            started_at,
            date: started_at.format("%Y-%m-%d").to_string(),
            sources: Vec::new(),
            skipped: Vec::new(),
            persisted: Vec::new(),
            state: RunState::Idle,
            push_error: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.state == RunState::Pushed
    }

    pub fn skipped_for(&self, reason: &SkipReason) -> usize {
        self.skipped.iter().filter(|s| &s.reason == reason).count()
    }

    pub fn vendor_failures(&self) -> usize {
        self.skipped
            .iter()
            .filter(|s| matches!(s.reason, SkipReason::Vendor(_)))
            .count()
    }

    pub fn unavailable_sources(&self) -> Vec<SourceTag> {
        self.sources
            .iter()
            .filter_map(|s| match s {
                SourceOutcome::Unavailable { tag, .. } => Some(*tag),
                SourceOutcome::Scraped { .. } => None,
            })
            .collect()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scraped: usize = self
            .sources
            .iter()
            .map(|s| match s {
                SourceOutcome::Scraped { count, .. } => *count,
                SourceOutcome::Unavailable { .. } => 0,
            })
            .sum();
        write!(
            f,
            "run {} {:?}: {} scraped, {} persisted, {} skipped, {} source(s) unavailable",
            self.date,
            self.state,
            scraped,
            self.persisted.len(),
            self.skipped.len(),
            self.unavailable_sources().len()
        )?;
        if let Some(error) = &self.push_error {
            write!(f, ", push failed: {}", error)?;
        }
        Ok(())
    }
}

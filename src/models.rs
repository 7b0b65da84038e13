//! Data models shared by the crawl, extraction and output stages.
//!
//! - [`TitleRecord`]: a discovered title and the detail page it maps to
//! - [`GameRecord`]: the structured record extracted from a detail page
//! - [`CatalogStore`]: the title → record mapping written at the end of a run
//!
//! Field names of [`GameRecord`] are part of the persisted JSON contract
//! consumed by the downstream ranking tool, so they must not be renamed.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A title discovered on a listing page.
///
/// `cleaned_title` is unique within one crawl run and doubles as the key
/// of the [`CatalogStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleRecord {
    /// Title with any listing index prefix removed.
    pub cleaned_title: String,
    /// Absolute URL of the title's detail page.
    pub detail_location: String,
}

/// Structured record extracted from one detail page.
///
/// Every scalar is optional and serializes as `null` when absent; list fields
/// serialize as `[]` when nothing matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct GameRecord {
    /// Hero title. A record without one is never stored.
    pub title: Option<String>,
    pub platform: Option<String>,
    pub release_date: Option<String>,
    /// Metascore as displayed (may be `"tbd"`).
    pub critic_score: Option<String>,
    pub critic_sentiment: Option<String>,
    pub critic_reviews: Option<String>,
    pub user_score: Option<String>,
    pub user_sentiment: Option<String>,
    pub user_reviews: Option<String>,
    pub summary: Option<String>,
    pub esrb_rating: Option<String>,
    pub esrb_reason: Option<String>,
    #[serde(default)]
    pub platforms: Vec<String>,
    pub initial_release_date: Option<String>,
    pub developer: Option<String>,
    pub publisher: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
}

/// Insertion-ordered mapping from cleaned title to [`GameRecord`].
///
/// Order reflects the order in which detail pages were successfully
/// extracted. Only the batch orchestrator inserts into it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct CatalogStore {
    records: IndexMap<String, GameRecord>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, keeping the position of an existing key.
    pub fn insert(&mut self, title: String, record: GameRecord) {
        self.records.insert(title, record);
    }

    pub fn get(&self, title: &str) -> Option<&GameRecord> {
        self.records.get(title)
    }

    pub fn contains(&self, title: &str) -> bool {
        self.records.contains_key(title)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Titles in insertion order.
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GameRecord)> {
        self.records.iter().map(|(k, v)| (k.as_str(), v))
    }
}

//! Title discovery on listing pages.
//!
//! Every `<h3>` on a listing page is a candidate title. Site chrome that also
//! uses `<h3>` (cookie and preference banners) is filtered by prefix, listing
//! numbering like `"1,234. "` is stripped, and titles already emitted earlier
//! in the run are dropped. The [`TitleNormalizer`] owns the seen-sets, so one
//! normalizer must be reused across all pages of a run.

use super::slug;
use crate::models::TitleRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::trace;

/// Heading prefixes that belong to site chrome rather than the catalog.
pub const DEFAULT_CHROME_MARKERS: &[&str] = &["cookie", "manage"];

static TITLE_HEADING: Lazy<Selector> = Lazy::new(|| Selector::parse("h3").expect("valid selector"));

static ORDINAL_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:[\d.,]+\s+)+").expect("valid regex"));

/// Remove leading listing numbering such as `"7. "` or `"1,234. "`.
///
/// Stacked prefixes (`"3. 12. Title"`) are removed together, so the result
/// is a fixed point: cleaning it again changes nothing. A number that is the
/// whole heading, or is not followed by whitespace (`"1942"`, `"2064: Read
/// Only Memories"`), is part of the title and kept.
pub fn clean_title(raw: &str) -> String {
    ORDINAL_PREFIX.replace(raw.trim(), "").trim().to_string()
}

/// Run-scoped title extractor and deduplicator.
#[derive(Debug, Clone)]
pub struct TitleNormalizer {
    detail_base: String,
    chrome_markers: Vec<String>,
    seen_raw: HashSet<String>,
    seen_clean: HashSet<String>,
}

impl TitleNormalizer {
    pub fn new(detail_base: impl Into<String>, chrome_markers: &[String]) -> Self {
        Self {
            detail_base: detail_base.into(),
            chrome_markers: chrome_markers.iter().map(|m| m.to_lowercase()).collect(),
            seen_raw: HashSet::new(),
            seen_clean: HashSet::new(),
        }
    }

    /// Number of distinct titles emitted so far in this run.
    pub fn seen(&self) -> usize {
        self.seen_clean.len()
    }

    fn is_chrome(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.chrome_markers.iter().any(|m| lowered.starts_with(m.as_str()))
    }

    /// Decide whether a raw heading yields a new title, recording it if so.
    pub fn admit(&mut self, raw: &str) -> Option<TitleRecord> {
        let text = raw.trim();
        if text.is_empty() || self.is_chrome(text) || self.seen_raw.contains(text) {
            return None;
        }
        self.seen_raw.insert(text.to_string());

        // Never empty: the prefix needs trailing whitespace and `text` is trimmed.
        let cleaned = clean_title(text);
        if !self.seen_clean.insert(cleaned.clone()) {
            trace!(title = %cleaned, "Duplicate title");
            return None;
        }

        let detail_location = slug::synthesize(&self.detail_base, &cleaned);
        Some(TitleRecord {
            cleaned_title: cleaned,
            detail_location,
        })
    }

    /// New titles on a listing page, in document order.
    pub fn normalize(&mut self, listing_html: &str) -> Vec<TitleRecord> {
        let document = Html::parse_document(listing_html);
        let headings: Vec<String> = document
            .select(&TITLE_HEADING)
            .map(|h| h.text().collect::<String>())
            .collect();

        headings.iter().filter_map(|raw| self.admit(raw)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.metacritic.com/game/";

    fn normalizer() -> TitleNormalizer {
        let markers: Vec<String> = DEFAULT_CHROME_MARKERS.iter().map(|m| m.to_string()).collect();
        TitleNormalizer::new(BASE, &markers)
    }

    fn listing(headings: &[&str]) -> String {
        let body: String = headings
            .iter()
            .map(|h| format!("<div class=\"card\"><h3>{h}</h3></div>"))
            .collect();
        format!("<html><body>{body}</body></html>")
    }

    #[test]
    fn test_clean_title_strips_ordinal_prefix() {
        assert_eq!(
            clean_title("1,234. The Legend of Zelda: Ocarina of Time"),
            "The Legend of Zelda: Ocarina of Time"
        );
        assert_eq!(clean_title("  7.  Tetris "), "Tetris");
        assert_eq!(clean_title("3. 12. Doom"), "Doom");
    }

    #[test]
    fn test_clean_title_keeps_numeric_titles() {
        assert_eq!(clean_title("1942"), "1942");
        assert_eq!(clean_title("12. 1942"), "1942");
        assert_eq!(clean_title("2064: Read Only Memories"), "2064: Read Only Memories");
    }

    #[test]
    fn test_leading_number_of_title_is_lost_behind_listing_index() {
        // Stacked prefixes are indistinguishable from a numbered title.
        assert_eq!(clean_title("5. 7 Days to Die"), "Days to Die");
        assert_eq!(clean_title("7. 2 Fast"), "Fast");
        assert_eq!(clean_title("7 Days to Die"), "Days to Die");
    }

    #[test]
    fn test_number_only_headings_are_kept_as_titles() {
        let mut n = normalizer();
        let out = n.normalize(&listing(&["1942", "7.", "12. 99"]));
        let titles: Vec<&str> = out.iter().map(|t| t.cleaned_title.as_str()).collect();
        assert_eq!(titles, vec!["1942", "7.", "99"]);
    }

    #[test]
    fn test_clean_title_is_idempotent() {
        for raw in ["1,234. Zelda", "3. 12. Doom", "99.   1942", "Halo 3", "  5, Portal 2"] {
            let once = clean_title(raw);
            assert_eq!(clean_title(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_ocarina_scenario() {
        let mut n = normalizer();
        let out = n.normalize(&listing(&["1,234. The Legend of Zelda: Ocarina of Time"]));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].cleaned_title, "The Legend of Zelda: Ocarina of Time");
        assert_eq!(
            out[0].detail_location,
            "https://www.metacritic.com/game/the-legend-of-zelda-ocarina-of-time/"
        );
    }

    #[test]
    fn test_chrome_headings_are_discarded() {
        let mut n = normalizer();
        let out = n.normalize(&listing(&[
            "Manage Cookie Preferences",
            "  COOKIE List ",
            "manage consent",
            "1. Portal",
        ]));
        let titles: Vec<&str> = out.iter().map(|t| t.cleaned_title.as_str()).collect();
        assert_eq!(titles, vec!["Portal"]);
    }

    #[test]
    fn test_empty_headings_are_discarded() {
        let mut n = normalizer();
        assert!(n.normalize(&listing(&["", "   "])).is_empty());
    }

    #[test]
    fn test_dedup_across_pages_and_prefixes() {
        let mut n = normalizer();
        let page1 = n.normalize(&listing(&["1. Celeste", "2. Hades", "1. Celeste"]));
        let page2 = n.normalize(&listing(&["25. Hades", "26. Inside", "Celeste"]));

        let all: Vec<String> = page1
            .into_iter()
            .chain(page2)
            .map(|t| t.cleaned_title)
            .collect();
        assert_eq!(all, vec!["Celeste", "Hades", "Inside"]);
        assert_eq!(n.seen(), 3);
    }

    #[test]
    fn test_first_seen_order_within_page() {
        let mut n = normalizer();
        let out = n.normalize(&listing(&["3. Braid", "1. Fez", "2. Limbo"]));
        let titles: Vec<&str> = out.iter().map(|t| t.cleaned_title.as_str()).collect();
        assert_eq!(titles, vec!["Braid", "Fez", "Limbo"]);
    }

    #[test]
    fn test_only_h3_headings_are_candidates() {
        let mut n = normalizer();
        let html = "<body><h2>Featured</h2><h3>1. Outer Wilds</h3><h4>Footer</h4></body>";
        let out = n.normalize(html);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].cleaned_title, "Outer Wilds");
    }
}

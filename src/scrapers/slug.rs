//! Detail-page location synthesis.
//!
//! The catalog site names detail pages after the title, so this transform has
//! to reproduce the site's own slug scheme exactly:
//!
//! 1. lower-case the title
//! 2. delete apostrophes
//! 3. collapse every run of non-word characters into one hyphen
//! 4. trim hyphens at both ends
//! 5. append `/` and prefix the detail base location
//!
//! A title with no word characters yields an empty slug, i.e. `<base>/`.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_WORD_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w']+").expect("valid regex"));

/// Path segment for `cleaned_title`, without base or trailing slash.
pub fn slug(cleaned_title: &str) -> String {
    let lowered = cleaned_title.to_lowercase().replace('\'', "");
    NON_WORD_RUN
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Absolute detail-page location for `cleaned_title` under `detail_base`.
pub fn synthesize(detail_base: &str, cleaned_title: &str) -> String {
    format!("{}{}/", detail_base, slug(cleaned_title))
}

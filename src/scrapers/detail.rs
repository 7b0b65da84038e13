//! Structured extraction from a game detail page.
//!
//! Fields are read with two primitives from [`crate::document`]: an optional
//! single-value lookup and a possibly-empty multi-value lookup. A selector
//! that matches nothing is an expected outcome, never an error.
//!
//! # Page Layout
//!
//! | Section | Scope | Fields |
//! |---------|-------|--------|
//! | Hero / score panels | document root | title, platform, release date, critic and user score, sentiment, review count |
//! | `[data-testid="details-game"]` | details block | summary, ESRB rating and reason, platforms, initial release, developer, publisher, genres |
//!
//! When the details block is missing every field scoped to it stays
//! `None`/empty without further lookups.

use crate::document::{scope, select_all, select_one};
use crate::models::GameRecord;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

struct DetailSelectors {
    title: Selector,
    platform: Selector,
    release_date: Selector,
    critic_score: Selector,
    critic_sentiment: Selector,
    critic_reviews: Selector,
    user_score: Selector,
    user_sentiment: Selector,
    user_reviews: Selector,
    details: Selector,
    summary: Selector,
    esrb_rating: Selector,
    // Sibling span without the rating's `u-block` marker.
    esrb_reason: Selector,
    platforms: Selector,
    initial_release_date: Selector,
    developer: Selector,
    publisher: Selector,
    genres: Selector,
}

fn css(selector: &str) -> Selector {
    Selector::parse(selector).expect("valid selector")
}

static SELECTORS: Lazy<DetailSelectors> = Lazy::new(|| DetailSelectors {
    title: css(r#"[data-testid="hero-title"] h1"#),
    platform: css(".c-gamePlatformLogo_icon title"),
    release_date: css(".g-text-xsmall span.u-text-uppercase"),
    critic_score: css(r#"[data-testid="critic-score-info"] .c-siteReviewScore span"#),
    critic_sentiment: css(r#"[data-testid="critic-score-info"] .c-productScoreInfo_scoreSentiment"#),
    critic_reviews: css(r#"[data-testid="critic-score-info"] .c-productScoreInfo_reviewsTotal span"#),
    user_score: css(r#"[data-testid="user-score-info"] .c-siteReviewScore span"#),
    user_sentiment: css(r#"[data-testid="user-score-info"] .c-productScoreInfo_scoreSentiment"#),
    user_reviews: css(r#"[data-testid="user-score-info"] .c-productScoreInfo_reviewsTotal span"#),
    details: css(r#"[data-testid="details-game"]"#),
    summary: css(".c-productionDetailsGame_description"),
    esrb_rating: css(".c-productionDetailsGame_esrb_title span.u-block"),
    esrb_reason: css(".c-productionDetailsGame_esrb_title span:not(.u-block)"),
    platforms: css(".c-gameDetails_Platforms li"),
    initial_release_date: css(".c-gameDetails_ReleaseDate span.g-color-gray70"),
    developer: css(".c-gameDetails_Developer li"),
    publisher: css(".c-gameDetails_Distributor span.g-color-gray70"),
    genres: css(".c-genreList_item span.c-globalButton_label"),
});

/// Extract a [`GameRecord`] from a rendered detail page.
///
/// Total over any input: malformed or unrelated HTML yields a record whose
/// fields are all absent.
pub fn extract(detail_html: &str) -> GameRecord {
    let document = Html::parse_document(detail_html);
    extract_from(document.root_element())
}

fn extract_from(root: ElementRef<'_>) -> GameRecord {
    let s = &*SELECTORS;
    let mut record = GameRecord {
        title: select_one(root, &s.title),
        platform: select_one(root, &s.platform),
        release_date: select_one(root, &s.release_date),
        critic_score: select_one(root, &s.critic_score),
        critic_sentiment: select_one(root, &s.critic_sentiment),
        critic_reviews: select_one(root, &s.critic_reviews),
        user_score: select_one(root, &s.user_score),
        user_sentiment: select_one(root, &s.user_sentiment),
        user_reviews: select_one(root, &s.user_reviews),
        ..GameRecord::default()
    };

    if let Some(details) = scope(root, &s.details) {
        record.summary = select_one(details, &s.summary);
        record.esrb_rating = select_one(details, &s.esrb_rating);
        record.esrb_reason = select_one(details, &s.esrb_reason);
        record.platforms = select_all(details, &s.platforms);
        record.initial_release_date = select_one(details, &s.initial_release_date);
        record.developer = select_one(details, &s.developer);
        record.publisher = select_one(details, &s.publisher);
        record.genres = select_all(details, &s.genres);
    }

    record
}

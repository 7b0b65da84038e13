//! Catalog scraping: discovery on listing pages, extraction on detail pages.
//!
//! The scrape follows a two-phase pattern:
//!
//! 1. **Discovery**: walk the paginated listing and collect unique titles
//! 2. **Extraction**: turn each title's detail page into a structured record
//!
//! # Modules
//!
//! | Module | Role |
//! |--------|------|
//! | [`slug`] | Title → detail-page location |
//! | [`listing`] | Heading extraction, chrome filtering, ordinal stripping, dedup |
//! | [`pagination`] | Listing crawl state machine (consent, next page, limits) |
//! | [`detail`] | Detail page → [`crate::models::GameRecord`] |

pub mod detail;
pub mod listing;
pub mod pagination;
pub mod slug;

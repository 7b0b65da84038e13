//! Document query capability over rendered HTML.
//!
//! Lookups never fail because nothing matched: a missing node is `None`
//! for single-value lookups and an empty list for multi-value lookups.
//! Text is whitespace-stripped per text node and joined without a separator,
//! so `<span> Rated </span><b>M</b>` reads as `"RatedM"` just as it renders
//! inline on the source site.

use crate::error::FetchError;
use scraper::{ElementRef, Html, Selector};

/// Parse a selector supplied at runtime.
pub fn parse_selector(selector: &str) -> Result<Selector, FetchError> {
    Selector::parse(selector).map_err(|e| FetchError::InvalidSelector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// Stripped text content of an element.
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .concat()
}

/// Text of the first element under `root` matching `selector`, if any.
pub fn select_one(root: ElementRef<'_>, selector: &Selector) -> Option<String> {
    root.select(selector).next().map(element_text)
}

/// Text of every element under `root` matching `selector`, in document order.
pub fn select_all(root: ElementRef<'_>, selector: &Selector) -> Vec<String> {
    root.select(selector).map(element_text).collect()
}

/// First element under `root` matching `selector`, used to scope further lookups.
pub fn scope<'a>(root: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    root.select(selector).next()
}

/// Whether `html` contains at least one element matching `selector`.
pub fn contains(html: &str, selector: &str) -> Result<bool, FetchError> {
    let selector = parse_selector(selector)?;
    let document = Html::parse_document(html);
    Ok(document.select(&selector).next().is_some())
}

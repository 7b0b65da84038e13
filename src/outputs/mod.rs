//! Output generation for the harvested catalog.
//!
//! # Submodules
//!
//! - [`json`]: Writes the [`crate::models::CatalogStore`] as a single JSON
//!   object for the downstream ranking tool
//!
//! # Output Structure
//!
//! ```text
//! game_data.json       # title → record, pretty-printed
//! ```

pub mod json;

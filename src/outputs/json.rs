//! JSON persistence of the catalog.
//!
//! The catalog is written as one pretty-printed object keyed by title, in
//! store order, with non-ASCII text kept as-is:
//!
//! ```text
//! {
//!   "The Legend of Zelda: Ocarina of Time": {
//!     "title": "The Legend of Zelda: Ocarina of Time",
//!     "platform": "Nintendo 64",
//!     ...
//!     "genres": ["Open-World Action"]
//!   }
//! }
//! ```
//!
//! # Atomicity
//!
//! The JSON is written to a sibling `*.tmp` file and renamed over the target,
//! so readers never observe a half-written catalog.

use crate::error::OutputError;
use crate::models::CatalogStore;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Serialize the store as pretty JSON.
pub fn to_pretty_json(store: &CatalogStore) -> Result<String, OutputError> {
    Ok(serde_json::to_string_pretty(store)?)
}

/// Write `store` to `path` in a single atomic replace.
///
/// Missing parent directories are created.
#[instrument(level = "info", skip_all, fields(path = %path.display(), entries = store.len()))]
pub async fn write_catalog(store: &CatalogStore, path: &Path) -> Result<(), OutputError> {
    let json = to_pretty_json(store)?;
    let io_err = |source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(io_err)?;
    }

    let tmp = temp_path(path);
    fs::write(&tmp, json).await.map_err(io_err)?;
    if let Err(e) = fs::rename(&tmp, path).await {
        error!(tmp = %tmp.display(), error = %e, "Failed to move catalog into place");
        let _ = fs::remove_file(&tmp).await;
        return Err(io_err(e));
    }

    info!("Wrote catalog JSON");
    Ok(())
}

/// Read a catalog previously written by [`write_catalog`].
pub async fn read_catalog(path: &Path) -> Result<CatalogStore, OutputError> {
    let raw = fs::read_to_string(path).await.map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}

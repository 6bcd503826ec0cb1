//! Workspace stores.
//!
//! A workspace is one SQLite file `<data_dir>/<name>.grid` holding four
//! system tables (`_grid_docs`, `_grid_views`, `_grid_vars`, `_grid_tokens`)
//! and one table per user document.

mod connection;
mod model;
mod store;
mod system_tables;

pub use store::WorkspaceStore;

pub(crate) use connection::sqlite_error;

use std::fs;
use std::io;
use std::path::PathBuf;

use tracing::debug;

use grid_common::constants::STORE_EXTENSION;
use grid_common::{GridError, GridResult, StoreConfig};

use crate::validate::validate_name;

/// Returns the store file path for a workspace name.
pub fn store_path(config: &StoreConfig, name: &str) -> GridResult<PathBuf> {
    let name = validate_name(name)?;
    Ok(config
        .data_dir
        .join(format!("{name}.{STORE_EXTENSION}")))
}

/// Lists workspace names, sorted.
///
/// Only regular files with the store extension and a valid name count. A
/// missing data directory lists as empty.
pub fn list_workspaces(config: &StoreConfig) -> GridResult<Vec<String>> {
    let entries = match fs::read_dir(&config.data_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(GridError::store("failed to list workspaces", e)),
    };

    let mut names = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| GridError::store("failed to list workspaces", e))?
            .path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(STORE_EXTENSION) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if validate_name(stem).is_err() {
            debug!(path = %path.display(), "skipping store file with invalid name");
            continue;
        }
        names.push(stem.to_string());
    }

    names.sort();
    Ok(names)
}

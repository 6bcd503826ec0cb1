//! Per-operation SQLite handles.

use std::ops::{Deref, DerefMut};
use std::path::Path;

use rusqlite::{Connection, ErrorCode, OpenFlags};
use tracing::debug;

use grid_common::{EntityKind, GridError, GridResult, StoreConfig};

/// An open connection to one workspace file.
///
/// Handles are opened at the start of a public operation and dropped before
/// it returns; nothing caches them.
pub(crate) struct StoreHandle {
    conn: Connection,
    workspace: String,
}

impl StoreHandle {
    /// Opens an existing store file and applies the configured pragmas.
    pub(crate) fn open(path: &Path, workspace: &str, config: &StoreConfig) -> GridResult<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
        let conn = Connection::open_with_flags(path, flags)
            .map_err(|e| sqlite_error(format!("failed to open workspace '{workspace}'"), e))?;
        apply_pragmas(&conn, config)?;

        debug!(workspace, path = %path.display(), "opened store handle");
        Ok(Self {
            conn,
            workspace: workspace.to_string(),
        })
    }
}

impl Deref for StoreHandle {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl DerefMut for StoreHandle {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.conn
    }
}

impl Drop for StoreHandle {
    fn drop(&mut self) {
        debug!(workspace = %self.workspace, "released store handle");
    }
}

fn apply_pragmas(conn: &Connection, config: &StoreConfig) -> GridResult<()> {
    conn.busy_timeout(config.busy_timeout())
        .map_err(|e| sqlite_error("failed to set busy timeout", e))?;
    conn.execute_batch(&format!(
        "PRAGMA journal_mode = {};",
        config.journal_mode.pragma_value()
    ))
    .map_err(|e| sqlite_error("failed to set journal mode", e))?;
    conn.execute_batch(&format!(
        "PRAGMA synchronous = {};",
        config.synchronous.pragma_value()
    ))
    .map_err(|e| sqlite_error("failed to set synchronous mode", e))?;
    Ok(())
}

/// Wraps a low-level failure as a store error.
pub(crate) fn sqlite_error(message: impl Into<String>, e: rusqlite::Error) -> GridError {
    GridError::store(message, e)
}

/// Returns true for unique and primary key violations.
pub(crate) fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation
    )
}

/// Maps a write failure on a named entity: collisions become
/// `AlreadyExists`, everything else a store error.
pub(crate) fn write_error(kind: EntityKind, name: &str, e: rusqlite::Error) -> GridError {
    if is_constraint_violation(&e) {
        GridError::already_exists(kind, name)
    } else {
        sqlite_error(format!("failed to write {kind} '{name}'"), e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_violation_maps_to_already_exists() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (name TEXT PRIMARY KEY); INSERT INTO t VALUES ('a');")
            .unwrap();
        let err = conn.execute("INSERT INTO t VALUES ('a')", []).unwrap_err();
        assert!(is_constraint_violation(&err));
        assert!(matches!(
            write_error(EntityKind::View, "a", err),
            GridError::AlreadyExists { kind: EntityKind::View, .. }
        ));

        let err = conn.execute("INSERT INTO missing VALUES (1)", []).unwrap_err();
        assert!(!is_constraint_violation(&err));
        assert!(matches!(
            write_error(EntityKind::View, "a", err),
            GridError::Store { .. }
        ));
    }

    #[test]
    fn test_open_applies_pragmas() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ws.grid");
        std::fs::File::create(&path).unwrap();

        let mut config = StoreConfig::with_data_dir(dir.path());
        config.journal_mode = grid_common::config::JournalMode::Wal;
        let handle = StoreHandle::open(&path, "ws", &config).unwrap();
        let mode: String = handle
            .query_row("PRAGMA journal_mode", [], |r| r.get(0))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[test]
    fn test_open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::with_data_dir(dir.path());
        let result = StoreHandle::open(&dir.path().join("nope.grid"), "nope", &config);
        assert!(matches!(result, Err(GridError::Store { .. })));
    }
}

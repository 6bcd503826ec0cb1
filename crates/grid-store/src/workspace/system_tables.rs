//! Fixed tables present in every workspace.

use rusqlite::{Connection, OptionalExtension};

use grid_common::constants::{DOCUMENTS_TABLE, TOKENS_TABLE, VARIABLES_TABLE, VIEWS_TABLE};
use grid_common::GridResult;

use super::connection::sqlite_error;

/// Epoch seconds, as an engine expression.
pub(crate) const NOW_EXPR: &str = "CAST(strftime('%s', 'now') AS INTEGER)";

/// Shared shape of document and view metadata tables.
///
/// Document names collate like table names in the engine, case-insensitively.
fn metadata_table(name: &str, collation: &str) -> String {
    format!(
        "CREATE TABLE {name} (\
         name TEXT(128) PRIMARY KEY{collation}, \
         read_token TEXT(256), \
         write_token TEXT(256), \
         create_ts INTEGER DEFAULT (strftime('%s', 'now')), \
         update_ts INTEGER DEFAULT (strftime('%s', 'now')), \
         data_model BLOB)"
    )
}

fn variables_table() -> String {
    format!(
        "CREATE TABLE {VARIABLES_TABLE} (\
         name TEXT(128) PRIMARY KEY, \
         create_ts INTEGER DEFAULT (strftime('%s', 'now')), \
         update_ts INTEGER DEFAULT (strftime('%s', 'now')), \
         type TEXT(32) DEFAULT ('str'), \
         value TEXT(2048))"
    )
}

/// Reserved for access tokens. Nothing reads it yet.
fn tokens_table() -> String {
    format!(
        "CREATE TABLE {TOKENS_TABLE} (\
         has TEXT(128) PRIMARY KEY, \
         gets TEXT(128), \
         expires INTEGER)"
    )
}

/// Returns the DDL for every system table, in creation order.
pub(crate) fn ddl() -> [String; 4] {
    [
        metadata_table(DOCUMENTS_TABLE, " COLLATE NOCASE"),
        metadata_table(VIEWS_TABLE, ""),
        variables_table(),
        tokens_table(),
    ]
}

/// Creates every system table. The caller owns the transaction.
pub(crate) fn create_all(conn: &Connection) -> GridResult<()> {
    for statement in ddl() {
        conn.execute_batch(&statement)
            .map_err(|e| sqlite_error("failed to create system table", e))?;
    }
    Ok(())
}

/// Returns true when every system table is present.
pub(crate) fn is_initialized(conn: &Connection) -> GridResult<bool> {
    let mut stmt = conn
        .prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")
        .map_err(|e| sqlite_error("failed to inspect workspace", e))?;
    for table in [DOCUMENTS_TABLE, VIEWS_TABLE, VARIABLES_TABLE, TOKENS_TABLE] {
        let found: Option<i64> = stmt
            .query_row([table], |row| row.get(0))
            .optional()
            .map_err(|e| sqlite_error("failed to inspect workspace", e))?;
        if found.is_none() {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_all() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(!is_initialized(&conn).unwrap());
        create_all(&conn).unwrap();
        assert!(is_initialized(&conn).unwrap());
    }

    #[test]
    fn test_variable_type_defaults_to_str() {
        let conn = Connection::open_in_memory().unwrap();
        create_all(&conn).unwrap();
        conn.execute("INSERT INTO _grid_vars (name) VALUES ('v')", []).unwrap();
        let (var_type, ts): (String, i64) = conn
            .query_row("SELECT type, update_ts FROM _grid_vars", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(var_type, "str");
        assert!(ts > 0);
    }

    #[test]
    fn test_ddl_names_every_table() {
        let ddl = ddl();
        assert!(ddl[0].starts_with("CREATE TABLE _grid_docs ("));
        assert!(ddl[0].contains("name TEXT(128) PRIMARY KEY COLLATE NOCASE,"));
        assert!(ddl[1].starts_with("CREATE TABLE _grid_views ("));
        assert!(ddl[1].contains("name TEXT(128) PRIMARY KEY,"));
        assert!(ddl[2].contains("value TEXT(2048)"));
        assert!(ddl[3].starts_with("CREATE TABLE _grid_tokens ("));
    }
}

//! One workspace: its system tables and its document tables.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rusqlite::types::Value as SqlValue;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use grid_common::constants::{
    DOCUMENTS_TABLE, VARIABLES_TABLE, VIEWS_TABLE, WILDCARD_TOKEN,
};
use grid_common::{EntityKind, GridError, GridResult, StoreConfig};

use super::connection::{sqlite_error, write_error, StoreHandle};
use super::system_tables::{self, NOW_EXPR};
use super::{model, store_path};
use crate::definition::{VariableDefinition, VariableType, ViewDefinition};
use crate::feed::{Page, Row};
use crate::instruction::{Instruction, InstructionExecutor};
use crate::schema::DocumentSchema;
use crate::validate::{
    validate_document_name, validate_name, validate_optional_name,
    validate_optional_variable_name, validate_variable_name,
};
use crate::value::from_sql;

/// Extension of a workspace file still being built.
const STAGING_SUFFIX: &str = ".staging";

/// A workspace backed by one store file.
///
/// This is a descriptor, not a connection: every method opens its own
/// handle and releases it before returning.
#[derive(Debug, Clone)]
pub struct WorkspaceStore {
    name: String,
    path: PathBuf,
    config: Arc<StoreConfig>,
}

impl WorkspaceStore {
    /// Creates a new workspace with its system tables.
    ///
    /// Fails with `AlreadyExists` if the store file is already there. A
    /// failed creation leaves no file behind.
    pub fn create(config: Arc<StoreConfig>, name: &str) -> GridResult<Self> {
        Self::create_with(config, name, |_| Ok(()))
    }

    /// Creates a new workspace and lets `seed` populate it before any other
    /// caller can open it.
    ///
    /// The store is built in a staging file inside the data directory and
    /// moved to its final path without overwriting, so openers only ever see
    /// a complete workspace. If `seed` fails the staging file is removed and
    /// nothing is published.
    pub fn create_with<F>(config: Arc<StoreConfig>, name: &str, seed: F) -> GridResult<Self>
    where
        F: FnOnce(&Self) -> GridResult<()>,
    {
        let path = store_path(&config, name)?;
        if path.exists() {
            return Err(GridError::already_exists(EntityKind::Workspace, name));
        }

        let prefix = format!(".{name}.");
        let staging = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(STAGING_SUFFIX)
            .tempfile_in(&config.data_dir)
            .map_err(|e| GridError::store(format!("failed to stage workspace '{name}'"), e))?
            .into_temp_path();

        let staged = Self {
            name: name.to_string(),
            path: staging.to_path_buf(),
            config: Arc::clone(&config),
        };
        staged.initialize()?;
        seed(&staged)?;
        debug!(workspace = name, staging = %staged.path.display(), "staged workspace");

        staging.persist_noclobber(&path).map_err(|e| {
            if e.error.kind() == io::ErrorKind::AlreadyExists {
                GridError::already_exists(EntityKind::Workspace, name)
            } else {
                GridError::store(format!("failed to publish workspace '{name}'"), e.error)
            }
        })?;

        info!(workspace = name, path = %path.display(), "created workspace");
        Ok(Self {
            name: name.to_string(),
            path,
            config,
        })
    }

    /// Opens an existing workspace.
    pub fn open(config: Arc<StoreConfig>, name: &str) -> GridResult<Self> {
        let path = store_path(&config, name)?;
        if !path.is_file() {
            return Err(GridError::not_found(EntityKind::Workspace, name));
        }

        let store = Self {
            name: name.to_string(),
            path,
            config,
        };
        let handle = store.handle()?;
        if !system_tables::is_initialized(&handle)? {
            return Err(GridError::store_msg(format!(
                "'{}' is not a workspace store",
                store.path.display()
            )));
        }
        Ok(store)
    }

    /// Returns true if a store file exists for `name`.
    pub fn exists(config: &StoreConfig, name: &str) -> GridResult<bool> {
        Ok(store_path(config, name)?.is_file())
    }

    /// Returns the workspace name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the store file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn handle(&self) -> GridResult<StoreHandle> {
        StoreHandle::open(&self.path, &self.name, &self.config)
    }

    fn initialize(&self) -> GridResult<()> {
        let mut handle = self.handle()?;
        let tx = handle
            .transaction()
            .map_err(|e| sqlite_error("failed to begin workspace creation", e))?;
        system_tables::create_all(&tx)?;
        tx.commit()
            .map_err(|e| sqlite_error("failed to commit workspace creation", e))
    }

    // =========================================================================
    // Documents
    // =========================================================================

    /// Records a document and creates its table, atomically.
    pub fn create_document(&self, schema: &DocumentSchema) -> GridResult<()> {
        let name = validate_document_name(schema.name())?;
        let ddl = schema.render();
        let blob = model::encode(schema)?;

        let mut handle = self.handle()?;
        let tx = handle
            .transaction()
            .map_err(|e| sqlite_error("failed to begin document creation", e))?;
        tx.execute(
            &format!(
                "INSERT INTO {DOCUMENTS_TABLE} (name, read_token, write_token, data_model) \
                 VALUES (?1, ?2, ?2, ?3)"
            ),
            params![name, WILDCARD_TOKEN, blob],
        )
        .map_err(|e| write_error(EntityKind::Document, name, e))?;

        debug!(sql = %ddl, "creating document table");
        tx.execute_batch(&ddl)
            .map_err(|e| sqlite_error(format!("failed to create table for document '{name}'"), e))?;
        tx.commit()
            .map_err(|e| sqlite_error("failed to commit document creation", e))?;

        info!(workspace = %self.name, document = name, columns = schema.columns().len(), "created document");
        Ok(())
    }

    /// Returns a document schema.
    pub fn get_document(&self, name: &str) -> GridResult<DocumentSchema> {
        let name = validate_name(name)?;
        let handle = self.handle()?;
        fetch_models(&handle, DOCUMENTS_TABLE, Some(name))?
            .pop()
            .ok_or_else(|| GridError::not_found(EntityKind::Document, name))
    }

    /// Returns every document schema in creation order.
    pub fn get_documents(&self) -> GridResult<Vec<DocumentSchema>> {
        let handle = self.handle()?;
        fetch_models(&handle, DOCUMENTS_TABLE, None)
    }

    /// Returns every document name in creation order.
    pub fn document_names(&self) -> GridResult<Vec<String>> {
        let handle = self.handle()?;
        let mut stmt = handle
            .prepare(&format!("SELECT name FROM {DOCUMENTS_TABLE} ORDER BY rowid"))
            .map_err(|e| sqlite_error("failed to list documents", e))?;
        let names = stmt
            .query_map([], |row| row.get(0))
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(|e| sqlite_error("failed to list documents", e))?;
        Ok(names)
    }

    /// Drops a document's table and its metadata, atomically.
    pub fn delete_document(&self, name: &str) -> GridResult<()> {
        let name = validate_document_name(name)?;

        let mut handle = self.handle()?;
        let tx = handle
            .transaction()
            .map_err(|e| sqlite_error("failed to begin document deletion", e))?;
        let deleted = tx
            .execute(&format!("DELETE FROM {DOCUMENTS_TABLE} WHERE name = ?1"), [name])
            .map_err(|e| sqlite_error(format!("failed to delete document '{name}'"), e))?;
        if deleted == 0 {
            return Err(GridError::not_found(EntityKind::Document, name));
        }
        tx.execute_batch(&format!("DROP TABLE {name}"))
            .map_err(|e| sqlite_error(format!("failed to drop table for document '{name}'"), e))?;
        tx.commit()
            .map_err(|e| sqlite_error("failed to commit document deletion", e))?;

        info!(workspace = %self.name, document = name, "deleted document");
        Ok(())
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Stores a new view.
    pub fn create_view(&self, view: &ViewDefinition) -> GridResult<()> {
        let name = validate_name(view.name())?;
        let blob = model::encode(view)?;

        let handle = self.handle()?;
        handle
            .execute(
                &format!(
                    "INSERT INTO {VIEWS_TABLE} (name, read_token, write_token, data_model) \
                     VALUES (?1, ?2, ?2, ?3)"
                ),
                params![name, WILDCARD_TOKEN, blob],
            )
            .map_err(|e| write_error(EntityKind::View, name, e))?;

        debug!(workspace = %self.name, view = name, "created view");
        Ok(())
    }

    /// Replaces the view stored as `old_name`, possibly renaming it.
    pub fn edit_view(&self, old_name: &str, view: &ViewDefinition) -> GridResult<()> {
        let old_name = validate_name(old_name)?;
        let new_name = validate_name(view.name())?;
        let blob = model::encode(view)?;

        let handle = self.handle()?;
        let updated = handle
            .execute(
                &format!(
                    "UPDATE {VIEWS_TABLE} SET name = ?1, data_model = ?2, \
                     update_ts = MAX({NOW_EXPR}, update_ts + 1) WHERE name = ?3"
                ),
                params![new_name, blob, old_name],
            )
            .map_err(|e| write_error(EntityKind::View, new_name, e))?;
        if updated == 0 {
            return Err(GridError::not_found(EntityKind::View, old_name));
        }

        debug!(workspace = %self.name, view = new_name, previous = old_name, "edited view");
        Ok(())
    }

    /// Returns a view.
    pub fn get_view(&self, name: &str) -> GridResult<ViewDefinition> {
        let name = validate_name(name)?;
        let handle = self.handle()?;
        fetch_models(&handle, VIEWS_TABLE, Some(name))?
            .pop()
            .ok_or_else(|| GridError::not_found(EntityKind::View, name))
    }

    /// Returns every view in creation order.
    pub fn get_views(&self) -> GridResult<Vec<ViewDefinition>> {
        let handle = self.handle()?;
        fetch_models(&handle, VIEWS_TABLE, None)
    }

    // =========================================================================
    // Variables
    // =========================================================================

    /// Stores a new variable.
    pub fn create_variable(&self, variable: &VariableDefinition) -> GridResult<()> {
        let name = validate_variable_name(variable.name())?;
        let handle = self.handle()?;
        handle
            .execute(
                &format!("INSERT INTO {VARIABLES_TABLE} (name, type, value) VALUES (?1, ?2, ?3)"),
                params![name, variable.var_type.as_str(), variable.value],
            )
            .map_err(|e| write_error(EntityKind::Variable, name, e))?;

        debug!(workspace = %self.name, variable = name, "created variable");
        Ok(())
    }

    /// Renames and updates the variable stored as `old_name`.
    pub fn edit_variable(&self, old_name: &str, variable: &VariableDefinition) -> GridResult<()> {
        let old_name = validate_variable_name(old_name)?;
        let new_name = validate_variable_name(variable.name())?;

        let handle = self.handle()?;
        let updated = handle
            .execute(
                &format!(
                    "UPDATE {VARIABLES_TABLE} SET name = ?1, type = ?2, value = ?3, \
                     update_ts = MAX({NOW_EXPR}, update_ts + 1) WHERE name = ?4"
                ),
                params![new_name, variable.var_type.as_str(), variable.value, old_name],
            )
            .map_err(|e| write_error(EntityKind::Variable, new_name, e))?;
        if updated == 0 {
            return Err(GridError::not_found(EntityKind::Variable, old_name));
        }

        debug!(workspace = %self.name, variable = new_name, previous = old_name, "edited variable");
        Ok(())
    }

    /// Returns a variable.
    pub fn get_variable(&self, name: &str) -> GridResult<VariableDefinition> {
        let name = validate_variable_name(name)?;
        let handle = self.handle()?;
        fetch_variables(&handle, Some(name))?
            .pop()
            .ok_or_else(|| GridError::not_found(EntityKind::Variable, name))
    }

    /// Returns every variable in creation order.
    pub fn get_variables(&self) -> GridResult<Vec<VariableDefinition>> {
        let handle = self.handle()?;
        fetch_variables(&handle, None)
    }

    // =========================================================================
    // Rows
    // =========================================================================

    /// Reads one page of a document's rows, keyed in column order.
    pub fn get_rows(&self, document: &str, page: Page) -> GridResult<Vec<Row>> {
        let document = validate_document_name(document)?;
        let (limit, offset) = page.bounds()?;

        let handle = self.handle()?;
        ensure_document(&handle, document)?;

        let sql = format!("SELECT * FROM {document} LIMIT ?1 OFFSET ?2");
        debug!(%sql, limit, offset, "reading rows");
        let mut stmt = handle
            .prepare(&sql)
            .map_err(|e| sqlite_error(format!("failed to read document '{document}'"), e))?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let rows = stmt
            .query_map(params![limit, offset], |row| {
                let mut out = Row::new();
                for (i, column) in columns.iter().enumerate() {
                    out.insert(column.clone(), from_sql(row.get::<_, SqlValue>(i)?));
                }
                Ok(out)
            })
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .map_err(|e| sqlite_error(format!("failed to read document '{document}'"), e))?;
        Ok(rows)
    }

    /// Executes one instruction against a document.
    ///
    /// The outcome is recorded on the instruction even when an error is
    /// returned.
    pub fn execute(&self, document: &str, instruction: &mut Instruction) -> GridResult<()> {
        self.execute_batch(document, std::slice::from_mut(instruction))
    }

    /// Executes instructions in order over one handle, stopping at the first
    /// failure. Instructions before the failure stay committed.
    pub fn execute_batch(&self, document: &str, instructions: &mut [Instruction]) -> GridResult<()> {
        let document = validate_document_name(document)?;

        let mut handle = self.handle()?;
        ensure_document(&handle, document)?;

        let mut executor =
            InstructionExecutor::new(&mut handle, document, self.config.allow_unfiltered_mutations);
        executor.execute_all(instructions)
    }
}

fn ensure_document(conn: &Connection, name: &str) -> GridResult<()> {
    let found: Option<i64> = conn
        .query_row(
            &format!("SELECT 1 FROM {DOCUMENTS_TABLE} WHERE name = ?1"),
            [name],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| sqlite_error("failed to look up document", e))?;
    match found {
        Some(_) => Ok(()),
        None => Err(GridError::not_found(EntityKind::Document, name)),
    }
}

/// Reads metadata blobs, all of them when `name` is absent or empty.
fn fetch_models<T: serde::de::DeserializeOwned>(
    conn: &Connection,
    table: &str,
    name: Option<&str>,
) -> GridResult<Vec<T>> {
    let read_error = |e| sqlite_error(format!("failed to read {table}"), e);
    let blobs: Vec<Vec<u8>> = match validate_optional_name(name)? {
        Some(name) => conn
            .prepare(&format!("SELECT data_model FROM {table} WHERE name = ?1"))
            .and_then(|mut stmt| {
                let rows = stmt.query_map([name], |row| row.get(0))?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
            }),
        None => conn
            .prepare(&format!("SELECT data_model FROM {table} ORDER BY rowid"))
            .and_then(|mut stmt| {
                let rows = stmt.query_map([], |row| row.get(0))?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
            }),
    }
    .map_err(read_error)?;
    blobs.iter().map(|b| model::decode(b)).collect()
}

/// Reads variables, all of them when `name` is absent or empty.
fn fetch_variables(conn: &Connection, name: Option<&str>) -> GridResult<Vec<VariableDefinition>> {
    type VariableRow = (String, String, Option<i64>, Option<String>);

    let columns = "name, type, update_ts, value";
    let read = |row: &rusqlite::Row<'_>| -> rusqlite::Result<VariableRow> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
    };
    let rows: Vec<VariableRow> = match validate_optional_variable_name(name)? {
        Some(name) => conn
            .prepare(&format!("SELECT {columns} FROM {VARIABLES_TABLE} WHERE name = ?1"))
            .and_then(|mut stmt| {
                let rows = stmt.query_map([name], read)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
            }),
        None => conn
            .prepare(&format!("SELECT {columns} FROM {VARIABLES_TABLE} ORDER BY rowid"))
            .and_then(|mut stmt| {
                let rows = stmt.query_map([], read)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
            }),
    }
    .map_err(|e| sqlite_error("failed to read variables", e))?;

    rows.into_iter()
        .map(|(name, tag, update_ts, value)| {
            let var_type = VariableType::parse(&tag).map_err(|_| {
                GridError::store_msg(format!("variable '{name}' has unknown type '{tag}'"))
            })?;
            let mut variable = VariableDefinition::new(name, var_type, value)?;
            variable.update_ts = update_ts;
            Ok(variable)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::from_value;
    use crate::schema::{ColumnDescriptor, ColumnSpec};
    use serde_json::{json, Map, Value};
    use tempfile::TempDir;

    fn setup() -> (TempDir, WorkspaceStore) {
        let dir = tempfile::tempdir().unwrap();
        let config = Arc::new(StoreConfig::with_data_dir(dir.path()));
        let store = WorkspaceStore::create(config, "ws").unwrap();
        (dir, store)
    }

    fn people() -> DocumentSchema {
        from_value(json!({
            "data-type": "grid/document/entry",
            "name": "people",
            "columns": [
                {"name": "id", "type-name": "INTEGER", "primary-key": true},
                {"name": "label", "type-name": "TEXT"}
            ]
        }))
        .unwrap()
    }

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_create_and_open() {
        let (dir, store) = setup();
        assert!(store.path().is_file());

        let config = Arc::new(StoreConfig::with_data_dir(dir.path()));
        assert_eq!(WorkspaceStore::open(config.clone(), "ws").unwrap().name(), "ws");
        assert!(matches!(
            WorkspaceStore::create(config.clone(), "ws"),
            Err(GridError::AlreadyExists { kind: EntityKind::Workspace, .. })
        ));
        assert!(matches!(
            WorkspaceStore::open(config, "other"),
            Err(GridError::NotFound { kind: EntityKind::Workspace, .. })
        ));
    }

    #[test]
    fn test_open_rejects_foreign_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("plain.grid"), b"").unwrap();
        let config = Arc::new(StoreConfig::with_data_dir(dir.path()));
        assert!(matches!(
            WorkspaceStore::open(config, "plain"),
            Err(GridError::Store { .. })
        ));
    }

    #[test]
    fn test_seed_runs_before_publish() {
        let dir = tempfile::tempdir().unwrap();
        let config = Arc::new(StoreConfig::with_data_dir(dir.path()));
        let store = WorkspaceStore::create_with(config, "ws", |staged| {
            assert!(!dir.path().join("ws.grid").exists());
            staged.create_view(&ViewDefinition::new("main", vec![]).unwrap())
        })
        .unwrap();
        assert_eq!(store.get_view("main").unwrap().name(), "main");

        let files: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(files, vec!["ws.grid"]);
    }

    #[test]
    fn test_failed_seed_publishes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = Arc::new(StoreConfig::with_data_dir(dir.path()));
        let result = WorkspaceStore::create_with(config.clone(), "ws", |_| {
            Err(GridError::validation("seed failed"))
        });
        assert!(matches!(result, Err(GridError::Validation { .. })));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        assert!(matches!(
            WorkspaceStore::open(config, "ws"),
            Err(GridError::NotFound { .. })
        ));
    }

    #[test]
    fn test_document_names_ignore_case() {
        let (_dir, store) = setup();
        store.create_document(&people()).unwrap();

        let upper = DocumentSchema::new(
            "PEOPLE",
            vec![ColumnDescriptor::from_spec(ColumnSpec::new("x", "REAL")).unwrap()],
        )
        .unwrap();
        assert!(matches!(
            store.create_document(&upper),
            Err(GridError::AlreadyExists { kind: EntityKind::Document, .. })
        ));
        assert_eq!(store.get_document("People").unwrap(), people());
        assert!(store.get_rows("PEOPLE", Page::new(0, 10).unwrap()).unwrap().is_empty());

        store.delete_document("PEOPLE").unwrap();
        assert!(store.document_names().unwrap().is_empty());
        assert!(matches!(store.get_document("people"), Err(GridError::NotFound { .. })));
    }

    #[test]
    fn test_document_round_trip() {
        let (_dir, store) = setup();
        store.create_document(&people()).unwrap();
        assert_eq!(store.get_document("people").unwrap(), people());
        assert_eq!(store.document_names().unwrap(), vec!["people"]);
        assert_eq!(store.get_documents().unwrap(), vec![people()]);
    }

    #[test]
    fn test_duplicate_document_leaves_first_intact() {
        let (_dir, store) = setup();
        store.create_document(&people()).unwrap();

        let other = DocumentSchema::new(
            "people",
            vec![ColumnDescriptor::from_spec(ColumnSpec::new("x", "REAL")).unwrap()],
        )
        .unwrap();
        assert!(matches!(
            store.create_document(&other),
            Err(GridError::AlreadyExists { kind: EntityKind::Document, .. })
        ));
        assert_eq!(store.get_document("people").unwrap(), people());
    }

    #[test]
    fn test_failed_table_creation_rolls_back_metadata() {
        let (_dir, store) = setup();
        store
            .handle()
            .unwrap()
            .execute_batch("CREATE TABLE orphan (x INTEGER)")
            .unwrap();
        let schema = DocumentSchema::new(
            "orphan",
            vec![ColumnDescriptor::from_spec(ColumnSpec::new("x", "INTEGER")).unwrap()],
        )
        .unwrap();
        assert!(matches!(store.create_document(&schema), Err(GridError::Store { .. })));
        assert!(store.document_names().unwrap().is_empty());
    }

    #[test]
    fn test_delete_document() {
        let (_dir, store) = setup();
        store.create_document(&people()).unwrap();
        store.delete_document("people").unwrap();
        assert!(store.document_names().unwrap().is_empty());
        assert!(matches!(
            store.get_rows("people", Page::new(0, 10).unwrap()),
            Err(GridError::NotFound { .. })
        ));
        assert!(matches!(
            store.delete_document("people"),
            Err(GridError::NotFound { .. })
        ));
    }

    #[test]
    fn test_reserved_names() {
        let (_dir, store) = setup();
        let page = Page::new(0, 10).unwrap();
        assert!(matches!(store.get_rows("_grid_docs", page), Err(GridError::ReservedName { .. })));
        assert!(matches!(store.delete_document("_grid_vars"), Err(GridError::ReservedName { .. })));
        let mut ins = Instruction::delete(Map::new());
        assert!(matches!(
            store.execute("_grid_views", &mut ins),
            Err(GridError::ReservedName { .. })
        ));
        assert_eq!(ins.status, None);
    }

    #[test]
    fn test_views() {
        let (_dir, store) = setup();
        let main = ViewDefinition::new("main", vec![]).unwrap();
        store.create_view(&main).unwrap();
        assert!(matches!(
            store.create_view(&main),
            Err(GridError::AlreadyExists { kind: EntityKind::View, .. })
        ));

        let other = ViewDefinition::new("other", vec![]).unwrap();
        store.create_view(&other).unwrap();
        assert!(matches!(
            store.edit_view("other", &main),
            Err(GridError::AlreadyExists { .. })
        ));

        store.edit_view("other", &other.renamed("renamed").unwrap()).unwrap();
        assert_eq!(store.get_view("renamed").unwrap().name(), "renamed");
        assert!(matches!(store.get_view("other"), Err(GridError::NotFound { .. })));
        assert!(matches!(store.edit_view("missing", &main), Err(GridError::NotFound { .. })));

        let names: Vec<_> = store.get_views().unwrap().iter().map(|v| v.name().to_string()).collect();
        assert_eq!(names, vec!["main", "renamed"]);
    }

    #[test]
    fn test_variables() {
        let (_dir, store) = setup();
        let var = VariableDefinition::new("main.title", VariableType::Str, Some("Hi".into())).unwrap();
        store.create_variable(&var).unwrap();
        assert!(matches!(
            store.create_variable(&var),
            Err(GridError::AlreadyExists { kind: EntityKind::Variable, .. })
        ));

        let before = store.get_variable("main.title").unwrap();
        assert_eq!(before.value.as_deref(), Some("Hi"));
        let before_ts = before.update_ts.unwrap();

        let edited = VariableDefinition::new("main.count", VariableType::Int, Some("3".into())).unwrap();
        store.edit_variable("main.title", &edited).unwrap();
        let after = store.get_variable("main.count").unwrap();
        assert_eq!(after.var_type, VariableType::Int);
        assert_eq!(after.value.as_deref(), Some("3"));
        assert!(after.update_ts.unwrap() > before_ts);
        assert!(matches!(store.get_variable("main.title"), Err(GridError::NotFound { .. })));
        assert_eq!(store.get_variables().unwrap().len(), 1);
    }

    #[test]
    fn test_rows_keep_column_order() {
        let (_dir, store) = setup();
        store.create_document(&people()).unwrap();
        let mut batch: Vec<_> = (1..=3)
            .map(|i| Instruction::insert(map(json!({"label": format!("row{i}"), "id": i}))))
            .collect();
        store.execute_batch("people", &mut batch).unwrap();

        let rows = store.get_rows("people", Page::new(1, 10).unwrap()).unwrap();
        assert_eq!(rows.len(), 2);
        let keys: Vec<_> = rows[0].keys().cloned().collect();
        assert_eq!(keys, vec!["id", "label"]);
        assert_eq!(rows[0]["label"], "row2");

        assert!(store.get_rows("people", Page::new(5, 10).unwrap()).unwrap().is_empty());
    }

    #[test]
    fn test_unfiltered_mutations_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = StoreConfig::with_data_dir(dir.path());
        config.allow_unfiltered_mutations = false;
        let store = WorkspaceStore::create(Arc::new(config), "ws").unwrap();
        store.create_document(&people()).unwrap();
        store
            .execute("people", &mut Instruction::insert(map(json!({"id": 1}))))
            .unwrap();

        let mut ins = Instruction::delete(Map::new());
        assert!(matches!(store.execute("people", &mut ins), Err(GridError::Validation { .. })));
        assert_eq!(ins.status, Some(false));

        let mut ins = Instruction::delete(Map::new()).for_all_rows();
        store.execute("people", &mut ins).unwrap();
        assert_eq!(ins.affected_rows, 1);
    }
}

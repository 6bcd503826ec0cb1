//! The workspace facade.
//!
//! [`Backend`] is the single surface collaborators talk to: workspace
//! lifecycle, view/variable/document CRUD, row paging and instruction
//! execution. Every call resolves the workspace afresh; nothing is cached
//! between calls.

use std::fs;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use grid_common::constants::MAIN_VIEW;
use grid_common::{GridError, GridResult, StoreConfig};
use grid_store::feed::{Feed, Page, Row};
use grid_store::instruction::{Instruction, InstructionFeed};
use grid_store::{
    list_workspaces, DocumentSchema, ItemDefinition, VariableDefinition, ViewDefinition,
    WorkspaceStore,
};

use crate::session::Session;

/// Names of every workspace under the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "data-type", rename = "grid/workspace/enum")]
pub struct WorkspaceList {
    /// Sorted workspace names.
    #[serde(rename = "workspace-names")]
    pub workspace_names: Vec<String>,
}

/// Summary of one workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "data-type", rename = "grid/workspace/entry")]
pub struct WorkspaceInfo {
    /// Workspace name.
    pub name: String,
    /// Documents in creation order.
    #[serde(rename = "document-names")]
    pub document_names: Vec<String>,
}

/// Entry point to every workspace under one data directory.
#[derive(Debug, Clone)]
pub struct Backend {
    config: Arc<StoreConfig>,
}

impl Backend {
    /// Opens a backend, creating the data directory if needed.
    pub fn open(config: StoreConfig) -> GridResult<Self> {
        config.validate().map_err(GridError::validation)?;
        fs::create_dir_all(&config.data_dir)?;
        info!(data_dir = %config.data_dir.display(), "opened backend");
        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// Returns the store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Binds a session to `workspace`, creating the workspace if needed.
    pub fn session(&self, workspace: &str) -> GridResult<Session> {
        Session::new(self.clone(), workspace)
    }

    fn workspace(&self, name: &str) -> GridResult<WorkspaceStore> {
        WorkspaceStore::open(Arc::clone(&self.config), name)
    }

    // =========================================================================
    // Workspaces
    // =========================================================================

    /// Lists every workspace.
    pub fn list_workspaces(&self) -> GridResult<WorkspaceList> {
        Ok(WorkspaceList {
            workspace_names: list_workspaces(&self.config)?,
        })
    }

    /// Creates an empty workspace.
    pub fn create_workspace(&self, name: &str) -> GridResult<()> {
        WorkspaceStore::create(Arc::clone(&self.config), name)?;
        Ok(())
    }

    /// Describes a workspace.
    pub fn get_workspace(&self, name: &str) -> GridResult<WorkspaceInfo> {
        let store = self.workspace(name)?;
        Ok(WorkspaceInfo {
            name: store.name().to_string(),
            document_names: store.document_names()?,
        })
    }

    /// Opens a workspace, or creates it with a starter `main` view.
    ///
    /// The view is written before the workspace becomes visible, so
    /// concurrent callers racing on a new name all see it seeded.
    pub fn open_or_create_workspace(&self, name: &str) -> GridResult<()> {
        if WorkspaceStore::exists(&self.config, name)? {
            self.workspace(name)?;
            return Ok(());
        }

        let seed = |store: &WorkspaceStore| store.create_view(&starter_view()?);
        match WorkspaceStore::create_with(Arc::clone(&self.config), name, seed) {
            Ok(_) => {
                info!(workspace = name, "seeded new workspace");
                Ok(())
            }
            Err(GridError::AlreadyExists { .. }) => {
                debug!(workspace = name, "workspace created concurrently");
                self.workspace(name).map(|_| ())
            }
            Err(e) => Err(e),
        }
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Stores a new view.
    pub fn create_view(&self, workspace: &str, view: &ViewDefinition) -> GridResult<()> {
        self.workspace(workspace)?.create_view(view)
    }

    /// Replaces or renames a view.
    pub fn edit_view(&self, workspace: &str, old_name: &str, view: &ViewDefinition) -> GridResult<()> {
        self.workspace(workspace)?.edit_view(old_name, view)
    }

    /// Returns one view.
    pub fn get_view(&self, workspace: &str, name: &str) -> GridResult<ViewDefinition> {
        self.workspace(workspace)?.get_view(name)
    }

    /// Returns every view.
    pub fn get_views(&self, workspace: &str) -> GridResult<Feed<ViewDefinition>> {
        let views = self.workspace(workspace)?.get_views()?;
        Ok(Feed::new(workspace, views))
    }

    // =========================================================================
    // Variables
    // =========================================================================

    /// Stores a new variable.
    pub fn create_variable(&self, workspace: &str, variable: &VariableDefinition) -> GridResult<()> {
        self.workspace(workspace)?.create_variable(variable)
    }

    /// Renames and updates a variable.
    pub fn edit_variable(
        &self,
        workspace: &str,
        old_name: &str,
        variable: &VariableDefinition,
    ) -> GridResult<()> {
        self.workspace(workspace)?.edit_variable(old_name, variable)
    }

    /// Returns one variable.
    pub fn get_variable(&self, workspace: &str, name: &str) -> GridResult<VariableDefinition> {
        self.workspace(workspace)?.get_variable(name)
    }

    /// Returns every variable.
    pub fn get_variables(&self, workspace: &str) -> GridResult<Feed<VariableDefinition>> {
        let variables = self.workspace(workspace)?.get_variables()?;
        Ok(Feed::new(workspace, variables))
    }

    // =========================================================================
    // Documents
    // =========================================================================

    /// Creates a document and its table.
    pub fn create_document(&self, workspace: &str, schema: &DocumentSchema) -> GridResult<()> {
        self.workspace(workspace)?.create_document(schema)
    }

    /// Returns one document schema.
    pub fn get_document(&self, workspace: &str, name: &str) -> GridResult<DocumentSchema> {
        self.workspace(workspace)?.get_document(name)
    }

    /// Returns every document schema.
    pub fn get_documents(&self, workspace: &str) -> GridResult<Feed<DocumentSchema>> {
        let documents = self.workspace(workspace)?.get_documents()?;
        Ok(Feed::new(workspace, documents))
    }

    /// Drops a document and its table.
    pub fn delete_document(&self, workspace: &str, name: &str) -> GridResult<()> {
        self.workspace(workspace)?.delete_document(name)
    }

    // =========================================================================
    // Rows
    // =========================================================================

    /// Reads `count` rows of a document starting at offset `start`.
    pub fn get_rows(&self, workspace: &str, document: &str, start: i64, count: i64) -> GridResult<Feed<Row>> {
        self.get_page(workspace, document, Page::new(start, count)?)
    }

    /// Reads one page of a document's rows.
    pub fn get_page(&self, workspace: &str, document: &str, page: Page) -> GridResult<Feed<Row>> {
        let rows = self.workspace(workspace)?.get_rows(document, page)?;
        debug!(workspace, document, start = page.start, returned = rows.len(), "read rows");
        Ok(Feed::page(workspace, page, rows))
    }

    /// Executes one instruction. Its `status` is set even on error.
    pub fn edit_row(&self, workspace: &str, document: &str, instruction: &mut Instruction) -> GridResult<()> {
        self.workspace(workspace)?.execute(document, instruction)
    }

    /// Executes a batch in order, stopping at the first failure.
    ///
    /// Instructions before the failure stay committed; each one's `status`
    /// tells the caller what happened to it.
    pub fn edit_rows(&self, workspace: &str, document: &str, feed: &mut InstructionFeed) -> GridResult<()> {
        let store = self.workspace(workspace)?;
        let result = store.execute_batch(document, &mut feed.instructions);
        let applied = feed.instructions.iter().filter(|i| i.status == Some(true)).count();
        debug!(workspace, document, applied, total = feed.instructions.len(), "applied instructions");
        result
    }
}

/// The view every new workspace starts with.
fn starter_view() -> GridResult<ViewDefinition> {
    let title = ItemDefinition::new("Label", "title")
        .at(10, 10)
        .with_property("font", json!(["Helvetica", 16]))
        .with_property("color", "#aaa")
        .with_property("show_title", false)
        .with_property("editable", true)
        .with_property("variable", "main.title");
    ViewDefinition::new(MAIN_VIEW, vec![title])
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_common::constants::data_types;
    use grid_store::definition::from_value;
    use tempfile::TempDir;

    fn backend() -> (TempDir, Backend) {
        let dir = TempDir::new().unwrap();
        let backend = Backend::open(StoreConfig::with_data_dir(dir.path().join("data"))).unwrap();
        (dir, backend)
    }

    #[test]
    fn test_open_creates_data_dir() {
        let (dir, backend) = backend();
        assert!(dir.path().join("data").is_dir());
        assert!(backend.list_workspaces().unwrap().workspace_names.is_empty());
    }

    #[test]
    fn test_open_rejects_invalid_config() {
        let mut config = StoreConfig::default();
        config.busy_timeout_ms = 0;
        assert!(matches!(Backend::open(config), Err(GridError::Validation { .. })));
    }

    #[test]
    fn test_open_or_create_seeds_main_view() {
        let (_dir, backend) = backend();
        backend.open_or_create_workspace("demo").unwrap();

        let main = backend.get_view("demo", "main").unwrap();
        let title = main.item("title").unwrap();
        assert_eq!(title.item_type, "Label");
        assert_eq!(title.position, Some([10, 10]));
        assert_eq!(title.properties["font"], json!(["Helvetica", 16]));
        assert_eq!(title.properties["variable"], "main.title");

        backend.open_or_create_workspace("demo").unwrap();
        assert_eq!(backend.get_views("demo").unwrap().count(), 1);
    }

    #[test]
    fn test_workspace_payloads() {
        let (_dir, backend) = backend();
        backend.create_workspace("b").unwrap();
        backend.create_workspace("a").unwrap();

        let list = serde_json::to_value(backend.list_workspaces().unwrap()).unwrap();
        assert_eq!(
            list,
            json!({"data-type": data_types::WORKSPACE_ENUM, "workspace-names": ["a", "b"]})
        );

        let info = serde_json::to_value(backend.get_workspace("a").unwrap()).unwrap();
        assert_eq!(
            info,
            json!({"data-type": data_types::WORKSPACE_ENTRY, "name": "a", "document-names": []})
        );
        assert!(matches!(
            backend.get_workspace("zzz"),
            Err(GridError::NotFound { .. })
        ));
    }

    #[test]
    fn test_row_feed_shape() {
        let (_dir, backend) = backend();
        backend.create_workspace("ws").unwrap();
        let schema: DocumentSchema = from_value(json!({
            "data-type": "grid/document/entry",
            "name": "notes",
            "columns": [{"name": "body", "type-name": "TEXT"}]
        }))
        .unwrap();
        backend.create_document("ws", &schema).unwrap();

        let mut ins: Instruction = from_value(json!({
            "data-type": "grid/instruction/entry",
            "mode": "insert",
            "values": {"body": "hello"}
        }))
        .unwrap();
        backend.edit_row("ws", "notes", &mut ins).unwrap();

        let feed = serde_json::to_value(backend.get_rows("ws", "notes", 0, 5).unwrap()).unwrap();
        assert_eq!(
            feed,
            json!({
                "data-type": "grid/data/feed",
                "workspace": "ws",
                "start": 0,
                "count": 1,
                "page-size": 5,
                "rows": [{"body": "hello"}]
            })
        );
        assert!(matches!(
            backend.get_rows("ws", "notes", -1, 5),
            Err(GridError::Validation { .. })
        ));
    }
}

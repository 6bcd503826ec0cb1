//! Workspace-bound sessions.
//!
//! A [`Session`] remembers one current workspace so callers such as an
//! editor can drop the workspace argument from every call.

use tracing::debug;

use grid_common::GridResult;
use grid_store::feed::{Feed, Row};
use grid_store::instruction::{Instruction, InstructionFeed};
use grid_store::{DocumentSchema, VariableDefinition, ViewDefinition};

use crate::backend::{Backend, WorkspaceInfo};

/// A [`Backend`] bound to a current workspace.
#[derive(Debug, Clone)]
pub struct Session {
    backend: Backend,
    workspace: String,
}

impl Session {
    /// Binds to `workspace`, creating and seeding it if it does not exist.
    pub fn new(backend: Backend, workspace: &str) -> GridResult<Self> {
        backend.open_or_create_workspace(workspace)?;
        debug!(workspace, "session bound");
        Ok(Self {
            backend,
            workspace: workspace.to_string(),
        })
    }

    /// Returns the current workspace name.
    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    /// Returns the underlying backend.
    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Switches to an existing workspace. On error the session is unchanged.
    pub fn open_workspace(&mut self, workspace: &str) -> GridResult<()> {
        self.backend.get_workspace(workspace)?;
        self.workspace = workspace.to_string();
        debug!(workspace, "session switched workspace");
        Ok(())
    }

    /// Creates a workspace and switches to it.
    pub fn create_workspace(&mut self, workspace: &str) -> GridResult<()> {
        self.backend.create_workspace(workspace)?;
        self.workspace = workspace.to_string();
        Ok(())
    }

    /// Describes the current workspace.
    pub fn describe(&self) -> GridResult<WorkspaceInfo> {
        self.backend.get_workspace(&self.workspace)
    }

    /// See [`Backend::create_view`].
    pub fn create_view(&self, view: &ViewDefinition) -> GridResult<()> {
        self.backend.create_view(&self.workspace, view)
    }

    /// See [`Backend::edit_view`].
    pub fn edit_view(&self, old_name: &str, view: &ViewDefinition) -> GridResult<()> {
        self.backend.edit_view(&self.workspace, old_name, view)
    }

    /// See [`Backend::get_view`].
    pub fn get_view(&self, name: &str) -> GridResult<ViewDefinition> {
        self.backend.get_view(&self.workspace, name)
    }

    /// See [`Backend::get_views`].
    pub fn get_views(&self) -> GridResult<Feed<ViewDefinition>> {
        self.backend.get_views(&self.workspace)
    }

    /// See [`Backend::create_variable`].
    pub fn create_variable(&self, variable: &VariableDefinition) -> GridResult<()> {
        self.backend.create_variable(&self.workspace, variable)
    }

    /// See [`Backend::edit_variable`].
    pub fn edit_variable(&self, old_name: &str, variable: &VariableDefinition) -> GridResult<()> {
        self.backend.edit_variable(&self.workspace, old_name, variable)
    }

    /// See [`Backend::get_variable`].
    pub fn get_variable(&self, name: &str) -> GridResult<VariableDefinition> {
        self.backend.get_variable(&self.workspace, name)
    }

    /// See [`Backend::get_variables`].
    pub fn get_variables(&self) -> GridResult<Feed<VariableDefinition>> {
        self.backend.get_variables(&self.workspace)
    }

    /// See [`Backend::create_document`].
    pub fn create_document(&self, schema: &DocumentSchema) -> GridResult<()> {
        self.backend.create_document(&self.workspace, schema)
    }

    /// See [`Backend::get_document`].
    pub fn get_document(&self, name: &str) -> GridResult<DocumentSchema> {
        self.backend.get_document(&self.workspace, name)
    }

    /// See [`Backend::get_documents`].
    pub fn get_documents(&self) -> GridResult<Feed<DocumentSchema>> {
        self.backend.get_documents(&self.workspace)
    }

    /// See [`Backend::delete_document`].
    pub fn delete_document(&self, name: &str) -> GridResult<()> {
        self.backend.delete_document(&self.workspace, name)
    }

    /// See [`Backend::get_rows`].
    pub fn get_rows(&self, document: &str, start: i64, count: i64) -> GridResult<Feed<Row>> {
        self.backend.get_rows(&self.workspace, document, start, count)
    }

    /// See [`Backend::edit_row`].
    pub fn edit_row(&self, document: &str, instruction: &mut Instruction) -> GridResult<()> {
        self.backend.edit_row(&self.workspace, document, instruction)
    }

    /// See [`Backend::edit_rows`].
    pub fn edit_rows(&self, document: &str, feed: &mut InstructionFeed) -> GridResult<()> {
        self.backend.edit_rows(&self.workspace, document, feed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_common::{GridError, StoreConfig};
    use tempfile::TempDir;

    fn session() -> (TempDir, Session) {
        let dir = TempDir::new().unwrap();
        let backend = Backend::open(StoreConfig::with_data_dir(dir.path())).unwrap();
        let session = backend.session("first").unwrap();
        (dir, session)
    }

    #[test]
    fn test_new_creates_workspace() {
        let (_dir, session) = session();
        assert_eq!(session.workspace(), "first");
        assert_eq!(session.get_view("main").unwrap().name(), "main");
        assert_eq!(session.describe().unwrap().name, "first");
    }

    #[test]
    fn test_switching() {
        let (_dir, mut session) = session();
        assert!(matches!(
            session.open_workspace("second"),
            Err(GridError::NotFound { .. })
        ));
        assert_eq!(session.workspace(), "first");

        session.create_workspace("second").unwrap();
        assert_eq!(session.workspace(), "second");
        // Created without the starter view.
        assert!(session.get_views().unwrap().is_empty());

        session.open_workspace("first").unwrap();
        assert_eq!(session.get_views().unwrap().count(), 1);
    }

    #[test]
    fn test_invalid_workspace_name() {
        let dir = TempDir::new().unwrap();
        let backend = Backend::open(StoreConfig::with_data_dir(dir.path())).unwrap();
        assert!(matches!(
            backend.session("bad name"),
            Err(GridError::Validation { .. })
        ));
    }
}

//! Document schemas.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use grid_common::constants::data_types;
use grid_common::{GridError, GridResult};

use super::column::ColumnDescriptor;
use crate::definition::{expect_tag, Entry};
use crate::validate::validate_name;

/// A user document: a table name plus its ordered columns.
///
/// The physical table is named after the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DocumentWire", into = "DocumentWire")]
pub struct DocumentSchema {
    name: String,
    columns: Vec<ColumnDescriptor>,
}

#[derive(Serialize, Deserialize)]
struct DocumentWire {
    #[serde(rename = "data-type")]
    data_type: String,
    name: String,
    #[serde(default)]
    columns: Vec<ColumnDescriptor>,
}

impl DocumentSchema {
    /// Creates a schema from validated columns.
    ///
    /// The column list must be non-empty and free of duplicate names.
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDescriptor>) -> GridResult<Self> {
        let name = name.into();
        validate_name(&name)?;

        if columns.is_empty() {
            return Err(GridError::validation(format!(
                "document '{name}' needs at least one column"
            )));
        }

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name().to_ascii_lowercase()) {
                return Err(GridError::validation(format!(
                    "document '{name}' has duplicate column '{}'",
                    column.name()
                )));
            }
        }

        Ok(Self { name, columns })
    }

    /// Returns the document name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the columns in declaration order.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Returns the primary key column, if any.
    pub fn primary_key(&self) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.is_primary_key())
    }

    /// Renders the `CREATE TABLE` statement.
    pub fn render(&self) -> String {
        let columns: Vec<String> = self.columns.iter().map(ColumnDescriptor::render).collect();
        format!("CREATE TABLE {} ({})", self.name, columns.join(", "))
    }
}

impl Entry for DocumentSchema {
    const DATA_TYPE: &'static str = data_types::DOCUMENT_ENTRY;
    const FEED_TYPE: &'static str = data_types::DOCUMENT_FEED;
}

impl TryFrom<DocumentWire> for DocumentSchema {
    type Error = GridError;

    fn try_from(wire: DocumentWire) -> Result<Self, Self::Error> {
        expect_tag(&wire.data_type, Self::DATA_TYPE)?;
        Self::new(wire.name, wire.columns)
    }
}

impl From<DocumentSchema> for DocumentWire {
    fn from(schema: DocumentSchema) -> Self {
        Self {
            data_type: DocumentSchema::DATA_TYPE.to_string(),
            name: schema.name,
            columns: schema.columns,
        }
    }
}

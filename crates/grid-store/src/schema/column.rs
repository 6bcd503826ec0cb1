//! Column descriptors.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use grid_common::constants::{data_types, NOW_DEFAULT};
use grid_common::{GridError, GridResult};

use crate::definition::expect_optional_tag;
use crate::validate::validate_name;

/// Storage class of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Signed integer.
    Integer,
    /// UTF-8 text.
    Text,
    /// Floating point.
    Real,
    /// Raw bytes.
    Blob,
}

impl ColumnType {
    /// Parses a type name, case-insensitively.
    pub fn parse(type_name: &str) -> GridResult<Self> {
        match type_name.to_ascii_uppercase().as_str() {
            "INTEGER" => Ok(Self::Integer),
            "TEXT" => Ok(Self::Text),
            "REAL" => Ok(Self::Real),
            "BLOB" => Ok(Self::Blob),
            _ => Err(GridError::validation(format!(
                "type-name must be one of INTEGER, TEXT, REAL, BLOB, got '{type_name}'"
            ))),
        }
    }

    /// Returns the normalized type name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Text => "TEXT",
            Self::Real => "REAL",
            Self::Blob => "BLOB",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default value of a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnDefault {
    /// Current epoch seconds at insert time.
    Now,
    /// A literal, rendered quoted.
    Literal(String),
}

/// Raw column specification as supplied by a caller.
///
/// This is the `grid/column/entry` wire shape. It carries no guarantees;
/// [`ColumnDescriptor::from_spec`] turns it into a validated descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Optional discriminator; must be `grid/column/entry` when present.
    #[serde(rename = "data-type", default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    /// Column name.
    pub name: String,
    /// One of INTEGER, TEXT, REAL, BLOB (any case).
    #[serde(rename = "type-name")]
    pub type_name: String,
    /// Optional parenthesized size.
    #[serde(rename = "type-size", default)]
    pub type_size: Option<u32>,
    /// Whether the column is the primary key.
    #[serde(rename = "primary-key", default)]
    pub primary_key: bool,
    /// Default value: `"NOW"`, a string literal, or a number.
    #[serde(default)]
    pub default: Option<Value>,
    /// Whether the primary key auto-increments.
    #[serde(rename = "auto-increment", alias = "auto_increment", default)]
    pub auto_increment: bool,
    /// Whether values must be unique.
    #[serde(default)]
    pub unique: bool,
    /// Explicit nullability; `None` leaves the engine default.
    #[serde(default)]
    pub null: Option<bool>,
}

impl ColumnSpec {
    /// Creates a plain column spec.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            data_type: None,
            name: name.into(),
            type_name: type_name.into(),
            type_size: None,
            primary_key: false,
            default: None,
            auto_increment: false,
            unique: false,
            null: None,
        }
    }
}

/// A validated column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ColumnSpec", into = "ColumnSpec")]
pub struct ColumnDescriptor {
    name: String,
    column_type: ColumnType,
    type_size: Option<u32>,
    primary_key: bool,
    default: Option<ColumnDefault>,
    auto_increment: bool,
    unique: bool,
    nullable: Option<bool>,
}

impl ColumnDescriptor {
    /// Validates a column specification.
    ///
    /// Rejects: a primary key with a default, a primary key that is also
    /// unique, a unique column with a literal default, and a primary key or
    /// unique column that is explicitly nullable.
    pub fn from_spec(spec: ColumnSpec) -> GridResult<Self> {
        expect_optional_tag(spec.data_type.as_deref(), data_types::COLUMN_ENTRY)?;
        let name = validate_name(&spec.name)?.to_string();
        let column_type = ColumnType::parse(&spec.type_name)?;
        let default = parse_default(&name, spec.default)?;

        let fail = |reason: &str| Err(GridError::validation(format!("column '{name}': {reason}")));

        if spec.type_size == Some(0) {
            return fail("type-size must be positive");
        }
        if spec.primary_key && default.is_some() {
            return fail("a primary key cannot have a default");
        }
        if spec.primary_key && spec.unique {
            return fail("a primary key is already unique");
        }
        if spec.unique && matches!(default, Some(ColumnDefault::Literal(_))) {
            return fail("a unique column cannot have a literal default");
        }
        if (spec.primary_key || spec.unique) && spec.null == Some(true) {
            return fail("primary key and unique columns cannot be nullable");
        }
        if spec.auto_increment
            && !(spec.primary_key && column_type == ColumnType::Integer && spec.type_size.is_none())
        {
            return fail("auto-increment requires an INTEGER primary key without a size");
        }

        Ok(Self {
            name,
            column_type,
            type_size: spec.type_size,
            primary_key: spec.primary_key,
            default,
            auto_increment: spec.auto_increment,
            unique: spec.unique,
            nullable: spec.null,
        })
    }

    /// Returns the column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the storage class.
    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    /// Returns the optional type size.
    pub fn type_size(&self) -> Option<u32> {
        self.type_size
    }

    /// Returns true for the primary key column.
    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    /// Returns true for unique columns.
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Returns true if the primary key auto-increments.
    pub fn is_auto_increment(&self) -> bool {
        self.auto_increment
    }

    /// Returns the explicit nullability, if any.
    pub fn nullable(&self) -> Option<bool> {
        self.nullable
    }

    /// Returns the default, if any.
    pub fn default(&self) -> Option<&ColumnDefault> {
        self.default.as_ref()
    }

    /// Renders the column clause of a `CREATE TABLE` statement.
    pub fn render(&self) -> String {
        let mut parts = vec![self.name.clone()];

        match self.type_size {
            Some(size) => parts.push(format!("{}({size})", self.column_type)),
            None => parts.push(self.column_type.to_string()),
        }

        if self.primary_key {
            parts.push("PRIMARY KEY".to_string());
        }
        if self.auto_increment {
            parts.push("AUTOINCREMENT".to_string());
        }
        if self.unique {
            parts.push("UNIQUE".to_string());
        }

        match self.nullable {
            Some(true) => parts.push("NULL".to_string()),
            Some(false) => parts.push("NOT NULL".to_string()),
            None => {}
        }

        match &self.default {
            Some(ColumnDefault::Now) => parts.push("DEFAULT (strftime('%s', 'now'))".to_string()),
            Some(ColumnDefault::Literal(literal)) => {
                parts.push(format!("DEFAULT '{}'", literal.replace('\'', "''")));
            }
            None => {}
        }

        parts.join(" ")
    }
}

impl TryFrom<ColumnSpec> for ColumnDescriptor {
    type Error = GridError;

    fn try_from(spec: ColumnSpec) -> Result<Self, Self::Error> {
        Self::from_spec(spec)
    }
}

impl From<ColumnDescriptor> for ColumnSpec {
    fn from(column: ColumnDescriptor) -> Self {
        let default = column.default.map(|d| match d {
            ColumnDefault::Now => Value::String(NOW_DEFAULT.to_string()),
            ColumnDefault::Literal(literal) => Value::String(literal),
        });

        Self {
            data_type: Some(data_types::COLUMN_ENTRY.to_string()),
            name: column.name,
            type_name: column.column_type.as_str().to_string(),
            type_size: column.type_size,
            primary_key: column.primary_key,
            default,
            auto_increment: column.auto_increment,
            unique: column.unique,
            null: column.nullable,
        }
    }
}

fn parse_default(column: &str, default: Option<Value>) -> GridResult<Option<ColumnDefault>> {
    match default {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s == NOW_DEFAULT => Ok(Some(ColumnDefault::Now)),
        Some(Value::String(s)) => Ok(Some(ColumnDefault::Literal(s))),
        Some(Value::Number(n)) => Ok(Some(ColumnDefault::Literal(n.to_string()))),
        Some(other) => Err(GridError::validation(format!(
            "column '{column}': default must be a string or number, got {other}"
        ))),
    }
}

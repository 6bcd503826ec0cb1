//! Declarative row mutations.
//!
//! An [`Instruction`] is built from caller input, executed exactly once
//! against one document table, and handed back with `status` and
//! `affected_rows` filled in. Each instruction runs in its own transaction,
//! so a batch is best-effort: a failure on instruction *k* leaves the
//! effects of instructions `1..k-1` committed and `k+1..` unrun.

use std::fmt;

use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use grid_common::constants::data_types;
use grid_common::{GridError, GridResult};

use crate::definition::{expect_tag, Entry};
use crate::validate::validate_name;
use crate::value::to_sql;
use crate::workspace::sqlite_error;

/// Kind of mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstructionMode {
    /// Insert one row.
    #[default]
    Insert,
    /// Update matching rows.
    Update,
    /// Delete matching rows.
    Delete,
}

impl fmt::Display for InstructionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        f.write_str(mode)
    }
}

/// A single insert, update, or delete against one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "InstructionWire", into = "InstructionWire")]
pub struct Instruction {
    /// Kind of mutation.
    pub mode: InstructionMode,
    /// Column to literal, in column order.
    pub values: Map<String, Value>,
    /// Equality filter, joined with AND. Empty means every row.
    pub filter: Map<String, Value>,
    /// Explicitly targets every row.
    pub all_rows: bool,
    /// `None` until executed, then whether it succeeded.
    pub status: Option<bool>,
    /// Rows touched by the last successful statement.
    pub affected_rows: u64,
}

#[derive(Serialize, Deserialize)]
struct InstructionWire {
    #[serde(rename = "data-type")]
    data_type: String,
    #[serde(default)]
    mode: InstructionMode,
    #[serde(default)]
    values: Map<String, Value>,
    #[serde(rename = "where", default)]
    filter: Map<String, Value>,
    #[serde(rename = "all-rows", default, skip_serializing_if = "std::ops::Not::not")]
    all_rows: bool,
    #[serde(default)]
    status: Option<bool>,
    #[serde(rename = "affected-rows", default)]
    affected_rows: u64,
}

impl Instruction {
    /// Creates an insert of `values`.
    pub fn insert(values: Map<String, Value>) -> Self {
        Self::with_mode(InstructionMode::Insert, values, Map::new())
    }

    /// Creates an update of `values` on rows matching `filter`.
    pub fn update(values: Map<String, Value>, filter: Map<String, Value>) -> Self {
        Self::with_mode(InstructionMode::Update, values, filter)
    }

    /// Creates a delete of rows matching `filter`.
    pub fn delete(filter: Map<String, Value>) -> Self {
        Self::with_mode(InstructionMode::Delete, Map::new(), filter)
    }

    fn with_mode(mode: InstructionMode, values: Map<String, Value>, filter: Map<String, Value>) -> Self {
        Self {
            mode,
            values,
            filter,
            all_rows: false,
            status: None,
            affected_rows: 0,
        }
    }

    /// Marks an update or delete as intentionally unfiltered.
    #[must_use]
    pub fn for_all_rows(mut self) -> Self {
        self.all_rows = true;
        self
    }

    /// Returns true once the instruction has run, successfully or not.
    pub fn is_executed(&self) -> bool {
        self.status.is_some()
    }
}

impl Entry for Instruction {
    const DATA_TYPE: &'static str = data_types::INSTRUCTION_ENTRY;
    const FEED_TYPE: &'static str = data_types::INSTRUCTION_FEED;
    const FEED_FIELD: &'static str = "instructions";
}

impl TryFrom<InstructionWire> for Instruction {
    type Error = GridError;

    fn try_from(wire: InstructionWire) -> Result<Self, Self::Error> {
        expect_tag(&wire.data_type, Self::DATA_TYPE)?;
        Ok(Self {
            mode: wire.mode,
            values: wire.values,
            filter: wire.filter,
            all_rows: wire.all_rows,
            status: wire.status,
            affected_rows: wire.affected_rows,
        })
    }
}

impl From<Instruction> for InstructionWire {
    fn from(instruction: Instruction) -> Self {
        Self {
            data_type: Instruction::DATA_TYPE.to_string(),
            mode: instruction.mode,
            values: instruction.values,
            filter: instruction.filter,
            all_rows: instruction.all_rows,
            status: instruction.status,
            affected_rows: instruction.affected_rows,
        }
    }
}

/// An ordered batch of instructions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "InstructionFeedWire", into = "InstructionFeedWire")]
pub struct InstructionFeed {
    /// Instructions in execution order.
    pub instructions: Vec<Instruction>,
}

#[derive(Serialize, Deserialize)]
struct InstructionFeedWire {
    #[serde(rename = "data-type")]
    data_type: String,
    #[serde(default)]
    instructions: Vec<Instruction>,
}

impl InstructionFeed {
    /// Creates a batch.
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }
}

impl TryFrom<InstructionFeedWire> for InstructionFeed {
    type Error = GridError;

    fn try_from(wire: InstructionFeedWire) -> Result<Self, Self::Error> {
        expect_tag(&wire.data_type, Instruction::FEED_TYPE)?;
        Ok(Self::new(wire.instructions))
    }
}

impl From<InstructionFeed> for InstructionFeedWire {
    fn from(feed: InstructionFeed) -> Self {
        Self {
            data_type: Instruction::FEED_TYPE.to_string(),
            instructions: feed.instructions,
        }
    }
}

/// A generated statement with its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// SQL text with `?` placeholders.
    pub sql: String,
    /// Parameters in placeholder order.
    pub params: Vec<SqlValue>,
}

/// Builds the statement for an instruction against `document`.
///
/// Column names are validated because they are interpolated; values are
/// always bound.
pub fn build_statement(
    document: &str,
    instruction: &Instruction,
    allow_unfiltered: bool,
) -> GridResult<Statement> {
    let document = validate_name(document)?;
    let mut params = Vec::with_capacity(instruction.values.len() + instruction.filter.len());

    let sql = match instruction.mode {
        InstructionMode::Insert => {
            if instruction.values.is_empty() {
                format!("INSERT INTO {document} DEFAULT VALUES")
            } else {
                let columns = bind_all(&instruction.values, &mut params)?;
                let placeholders = vec!["?"; columns.len()].join(", ");
                format!(
                    "INSERT INTO {document} ({}) VALUES ({placeholders})",
                    columns.join(", ")
                )
            }
        }
        InstructionMode::Update => {
            if instruction.values.is_empty() {
                return Err(GridError::validation("update needs at least one value"));
            }
            let assignments: Vec<String> = bind_all(&instruction.values, &mut params)?
                .into_iter()
                .map(|c| format!("{c}=?"))
                .collect();
            let filter = where_clause(instruction, &mut params, allow_unfiltered)?;
            format!("UPDATE {document} SET {}{filter}", assignments.join(", "))
        }
        InstructionMode::Delete => {
            let filter = where_clause(instruction, &mut params, allow_unfiltered)?;
            format!("DELETE FROM {document}{filter}")
        }
    };

    Ok(Statement { sql, params })
}

fn bind_all<'a>(map: &'a Map<String, Value>, params: &mut Vec<SqlValue>) -> GridResult<Vec<&'a str>> {
    map.iter()
        .map(|(column, value)| {
            let column = validate_name(column)?;
            params.push(to_sql(column, value)?);
            Ok(column)
        })
        .collect()
}

fn where_clause(
    instruction: &Instruction,
    params: &mut Vec<SqlValue>,
    allow_unfiltered: bool,
) -> GridResult<String> {
    if instruction.filter.is_empty() {
        if !allow_unfiltered && !instruction.all_rows {
            return Err(GridError::validation(format!(
                "{} without a where clause needs the all-rows flag",
                instruction.mode
            )));
        }
        return Ok(String::new());
    }

    let conditions: Vec<String> = bind_all(&instruction.filter, params)?
        .into_iter()
        .map(|c| format!("{c}=?"))
        .collect();
    Ok(format!(" WHERE {}", conditions.join(" AND ")))
}

/// Runs instructions against one document over one open connection.
pub struct InstructionExecutor<'c> {
    conn: &'c mut Connection,
    document: &'c str,
    allow_unfiltered: bool,
}

impl<'c> InstructionExecutor<'c> {
    /// Creates an executor for `document`.
    pub fn new(conn: &'c mut Connection, document: &'c str, allow_unfiltered: bool) -> Self {
        Self {
            conn,
            document,
            allow_unfiltered,
        }
    }

    /// Executes one instruction and records the outcome on it.
    ///
    /// On failure `status` is `Some(false)`, `affected_rows` keeps its last
    /// value, and the error is returned.
    pub fn execute(&mut self, instruction: &mut Instruction) -> GridResult<()> {
        if instruction.is_executed() {
            return Err(GridError::validation("instruction has already been executed"));
        }

        match self.run(instruction) {
            Ok(()) => {
                instruction.status = Some(true);
                Ok(())
            }
            Err(e) => {
                instruction.status = Some(false);
                warn!(document = self.document, mode = %instruction.mode, error = %e, "instruction failed");
                Err(e)
            }
        }
    }

    /// Executes a batch in order, stopping at the first failure.
    pub fn execute_all(&mut self, instructions: &mut [Instruction]) -> GridResult<()> {
        instructions.iter_mut().try_for_each(|i| self.execute(i))
    }

    fn run(&mut self, instruction: &mut Instruction) -> GridResult<()> {
        let statement = build_statement(self.document, instruction, self.allow_unfiltered)?;
        debug!(sql = %statement.sql, params = statement.params.len(), "executing instruction");

        let tx = self
            .conn
            .transaction()
            .map_err(|e| sqlite_error("failed to begin instruction", e))?;
        let affected = tx
            .execute(&statement.sql, params_from_iter(statement.params.iter()))
            .map_err(|e| sqlite_error(format!("{} on '{}' failed", instruction.mode, self.document), e))?;
        instruction.affected_rows = affected as u64;
        tx.commit()
            .map_err(|e| sqlite_error("failed to commit instruction", e))?;
        Ok(())
    }
}

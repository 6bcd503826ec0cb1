//! Conversion between JSON literals and SQLite values.

use rusqlite::types::Value as SqlValue;
use serde_json::{Number, Value};

use grid_common::{GridError, GridResult};

/// Converts a JSON literal bound to `column` into a SQLite value.
///
/// Scalars map directly, booleans become 0/1, and an array of byte values
/// becomes a BLOB. Objects are rejected.
pub fn to_sql(column: &str, value: &Value) -> GridResult<SqlValue> {
    let converted = match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => number_to_sql(column, n)?,
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Array(items) => SqlValue::Blob(bytes(column, items)?),
        Value::Object(_) => {
            return Err(GridError::validation(format!(
                "column '{column}': objects cannot be stored"
            )))
        }
    };
    Ok(converted)
}

/// Converts a SQLite value read from a row into JSON.
pub fn from_sql(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(i) => Value::from(i),
        SqlValue::Real(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        SqlValue::Text(s) => Value::String(s),
        SqlValue::Blob(b) => Value::Array(b.into_iter().map(Value::from).collect()),
    }
}

fn number_to_sql(column: &str, n: &Number) -> GridResult<SqlValue> {
    if let Some(i) = n.as_i64() {
        return Ok(SqlValue::Integer(i));
    }
    if n.is_u64() {
        return Err(GridError::validation(format!(
            "column '{column}': integer {n} is out of range"
        )));
    }
    n.as_f64()
        .map(SqlValue::Real)
        .ok_or_else(|| GridError::validation(format!("column '{column}': invalid number {n}")))
}

fn bytes(column: &str, items: &[Value]) -> GridResult<Vec<u8>> {
    items
        .iter()
        .map(|item| {
            item.as_u64()
                .and_then(|b| u8::try_from(b).ok())
                .ok_or_else(|| {
                    GridError::validation(format!(
                        "column '{column}': arrays must hold byte values 0-255"
                    ))
                })
        })
        .collect()
}

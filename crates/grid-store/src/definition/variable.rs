//! Variable definitions.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use grid_common::constants::data_types;
use grid_common::{GridError, GridResult};

use super::{expect_tag, Entry};
use crate::validate::validate_variable_name;

/// Type tag persisted alongside a variable's textual value.
///
/// Converting the text to and from the tagged type is the caller's job;
/// the store treats the value as opaque text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    /// Text.
    #[default]
    Str,
    /// Integer.
    Int,
    /// Floating point.
    Float,
    /// Boolean.
    Bool,
}

impl VariableType {
    /// Returns the persisted tag.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
        }
    }

    /// Parses a persisted tag.
    pub fn parse(tag: &str) -> GridResult<Self> {
        match tag {
            "str" => Ok(Self::Str),
            "int" => Ok(Self::Int),
            "float" => Ok(Self::Float),
            "bool" => Ok(Self::Bool),
            _ => Err(GridError::validation(format!("unknown variable type '{tag}'"))),
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, typed scalar scoped to a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "VariableWire", into = "VariableWire")]
pub struct VariableDefinition {
    name: String,
    /// Type tag.
    pub var_type: VariableType,
    /// Textual value.
    pub value: Option<String>,
    /// Last update, epoch seconds. Only set on definitions read from a store.
    pub update_ts: Option<i64>,
}

#[derive(Serialize, Deserialize)]
struct VariableWire {
    #[serde(rename = "data-type")]
    data_type: String,
    name: String,
    #[serde(rename = "type", default)]
    var_type: VariableType,
    #[serde(default)]
    value: Option<Value>,
    #[serde(rename = "update-ts", default, skip_serializing_if = "Option::is_none")]
    update_ts: Option<i64>,
}

impl VariableDefinition {
    /// Creates a variable.
    pub fn new(
        name: impl Into<String>,
        var_type: VariableType,
        value: Option<String>,
    ) -> GridResult<Self> {
        let name = name.into();
        validate_variable_name(&name)?;
        Ok(Self {
            name,
            var_type,
            value,
            update_ts: None,
        })
    }

    /// Returns the variable name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Entry for VariableDefinition {
    const DATA_TYPE: &'static str = data_types::VARIABLE_ENTRY;
    const FEED_TYPE: &'static str = data_types::VARIABLE_FEED;
}

impl TryFrom<VariableWire> for VariableDefinition {
    type Error = GridError;

    fn try_from(wire: VariableWire) -> Result<Self, Self::Error> {
        expect_tag(&wire.data_type, Self::DATA_TYPE)?;
        let value = match wire.value {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(v @ (Value::Number(_) | Value::Bool(_))) => Some(v.to_string()),
            Some(other) => {
                return Err(GridError::validation(format!(
                    "variable '{}': value must be a scalar, got {other}",
                    wire.name
                )))
            }
        };
        let mut variable = Self::new(wire.name, wire.var_type, value)?;
        variable.update_ts = wire.update_ts;
        Ok(variable)
    }
}

impl From<VariableDefinition> for VariableWire {
    fn from(variable: VariableDefinition) -> Self {
        Self {
            data_type: VariableDefinition::DATA_TYPE.to_string(),
            name: variable.name,
            var_type: variable.var_type,
            value: variable.value.map(Value::String),
            update_ts: variable.update_ts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::from_value;
    use serde_json::json;

    #[test]
    fn test_defaults_to_str() {
        let var: VariableDefinition =
            from_value(json!({"data-type": "grid/variable/entry", "name": "main.title"})).unwrap();
        assert_eq!(var.var_type, VariableType::Str);
        assert_eq!(var.value, None);
    }

    #[test]
    fn test_scalar_values_become_text() {
        let var: VariableDefinition = from_value(json!({
            "data-type": "grid/variable/entry", "name": "n", "type": "int", "value": 42
        }))
        .unwrap();
        assert_eq!(var.var_type, VariableType::Int);
        assert_eq!(var.value.as_deref(), Some("42"));

        let value = serde_json::to_value(&var).unwrap();
        assert_eq!(value["type"], "int");
        assert_eq!(value["value"], "42");
        assert!(value.get("update-ts").is_none());
    }

    #[test]
    fn test_rejects_invalid() {
        let cases = [
            json!({"data-type": "grid/variable/entry", "name": "a b"}),
            json!({"data-type": "grid/variable/entry", "name": "a", "type": "list"}),
            json!({"data-type": "grid/variable/entry", "name": "a", "value": [1]}),
            json!({"data-type": "grid/view/entry", "name": "a"}),
        ];
        for case in cases {
            assert!(from_value::<VariableDefinition>(case.clone()).is_err(), "accepted {case}");
        }
    }

    #[test]
    fn test_parse_tag() {
        assert_eq!(VariableType::parse("bool").unwrap(), VariableType::Bool);
        assert!(VariableType::parse("BOOL").is_err());
    }
}

//! Structured mirrors of the JSON payloads exchanged with collaborators.
//!
//! Every payload carries a `data-type` discriminator. Definitions are
//! (de)serialized through private wire structs so the discriminator is
//! checked on every deserialize, nested entries included.

mod variable;
mod view;

pub use variable::{VariableDefinition, VariableType};
pub use view::{ItemDefinition, ViewDefinition};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use grid_common::{GridError, GridResult};

/// A payload kind with a `data-type` discriminator.
pub trait Entry {
    /// Discriminator of a single entry.
    const DATA_TYPE: &'static str;
    /// Discriminator of a feed of entries.
    const FEED_TYPE: &'static str;
    /// Field holding the entries inside a feed.
    const FEED_FIELD: &'static str = "entries";
}

/// Checks a required discriminator.
pub(crate) fn expect_tag(found: &str, expected: &'static str) -> GridResult<()> {
    if found != expected {
        return Err(GridError::validation(format!(
            "expected data-type '{expected}', got '{found}'"
        )));
    }
    Ok(())
}

/// Checks a discriminator that nested entries may omit.
pub(crate) fn expect_optional_tag(found: Option<&str>, expected: &'static str) -> GridResult<()> {
    match found {
        Some(found) => expect_tag(found, expected),
        None => Ok(()),
    }
}

/// Deserializes a caller payload. Any shape error is a validation error.
pub fn from_value<T: DeserializeOwned>(value: Value) -> GridResult<T> {
    serde_json::from_value(value).map_err(|e| GridError::validation(e.to_string()))
}

/// Parses a caller payload from JSON text.
pub fn from_str<T: DeserializeOwned>(text: &str) -> GridResult<T> {
    serde_json::from_str(text).map_err(|e| GridError::validation(e.to_string()))
}

/// Serializes a payload.
pub fn to_value<T: Serialize>(entry: &T) -> GridResult<Value> {
    serde_json::to_value(entry).map_err(|e| GridError::store("failed to serialize payload", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expect_tag() {
        assert!(expect_tag("grid/view/entry", "grid/view/entry").is_ok());
        assert!(matches!(
            expect_tag("grid/view/feed", "grid/view/entry"),
            Err(GridError::Validation { .. })
        ));
        assert!(expect_optional_tag(None, "grid/item/entry").is_ok());
        assert!(expect_optional_tag(Some("grid/view/entry"), "grid/item/entry").is_err());
    }

    #[test]
    fn test_entries_check_their_own_tag() {
        let view = serde_json::json!({"data-type": ViewDefinition::DATA_TYPE, "name": "main", "items": []});
        assert!(from_value::<ViewDefinition>(view).is_ok());

        let wrong = serde_json::json!({"data-type": ViewDefinition::FEED_TYPE, "name": "main", "items": []});
        let err = from_value::<ViewDefinition>(wrong).unwrap_err();
        assert!(matches!(err, GridError::Validation { .. }));
        assert!(err.to_string().contains(ViewDefinition::DATA_TYPE));

        let variable = serde_json::json!({
            "data-type": VariableDefinition::DATA_TYPE,
            "name": "main.title",
            "type": "str",
            "value": "Hi"
        });
        assert!(from_value::<VariableDefinition>(variable).is_ok());
    }
}

//! Versioned metadata blobs.
//!
//! Definitions are stored in the `data_model` column as JSON tagged with a
//! `model-version`. Blobs written before versioning carry no tag and read as
//! version 0, which has the same shape as version 1.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use grid_common::constants::{MODEL_VERSION, MODEL_VERSION_FIELD};
use grid_common::{GridError, GridResult};

/// Serializes a definition into a versioned blob.
pub(crate) fn encode<T: Serialize>(entry: &T) -> GridResult<Vec<u8>> {
    let mut value = serde_json::to_value(entry)
        .map_err(|e| GridError::store("failed to encode metadata", e))?;
    match value.as_object_mut() {
        Some(map) => {
            map.insert(MODEL_VERSION_FIELD.to_string(), Value::from(MODEL_VERSION));
        }
        None => return Err(GridError::store_msg("metadata must encode to an object")),
    }
    serde_json::to_vec(&value).map_err(|e| GridError::store("failed to encode metadata", e))
}

/// Deserializes a blob, migrating older versions.
pub(crate) fn decode<T: DeserializeOwned>(blob: &[u8]) -> GridResult<T> {
    let mut value: Value = serde_json::from_slice(blob)
        .map_err(|e| GridError::store("corrupt metadata blob", e))?;
    let map = value
        .as_object_mut()
        .ok_or_else(|| GridError::store_msg("corrupt metadata blob: not an object"))?;

    let version = match map.remove(MODEL_VERSION_FIELD) {
        None => 0,
        Some(v) => v
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| GridError::store_msg(format!("invalid {MODEL_VERSION_FIELD}: {v}")))?,
    };
    if version > MODEL_VERSION {
        return Err(GridError::store_msg(format!(
            "metadata model version {version} is newer than supported version {MODEL_VERSION}"
        )));
    }
    migrate(version, &mut value)?;

    serde_json::from_value(value).map_err(|e| GridError::store("corrupt metadata blob", e))
}

/// Upgrades a blob in memory to the current shape.
fn migrate(from: u32, _value: &mut Value) -> GridResult<()> {
    const _: () = assert!(MODEL_VERSION == 1, "add a migration arm for the new model version");

    match from {
        // Same shape.
        0 | 1 => Ok(()),
        other => Err(GridError::store_msg(format!(
            "no migration from metadata model version {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{ItemDefinition, ViewDefinition};

    fn view() -> ViewDefinition {
        ViewDefinition::new("main", vec![ItemDefinition::new("Label", "title").at(10, 10)]).unwrap()
    }

    #[test]
    fn test_encode_tags_version() {
        let blob = encode(&view()).unwrap();
        let value: Value = serde_json::from_slice(&blob).unwrap();
        assert_eq!(value[MODEL_VERSION_FIELD], MODEL_VERSION);
        assert_eq!(value["data-type"], "grid/view/entry");
        assert_eq!(decode::<ViewDefinition>(&blob).unwrap(), view());
    }

    #[test]
    fn test_migrate_known_versions_only() {
        let mut value = serde_json::json!({"name": "main"});
        assert!(migrate(0, &mut value).is_ok());
        assert!(migrate(MODEL_VERSION, &mut value).is_ok());
        assert!(matches!(migrate(MODEL_VERSION + 1, &mut value), Err(GridError::Store { .. })));
    }

    #[test]
    fn test_decode_unversioned() {
        let blob = serde_json::to_vec(&view()).unwrap();
        assert_eq!(decode::<ViewDefinition>(&blob).unwrap(), view());
    }

    #[test]
    fn test_decode_rejects_newer_version() {
        let blob = br#"{"data-type": "grid/view/entry", "name": "main", "items": [], "model-version": 99}"#;
        assert!(matches!(
            decode::<ViewDefinition>(blob),
            Err(GridError::Store { .. })
        ));
    }

    #[test]
    fn test_decode_corrupt() {
        assert!(decode::<ViewDefinition>(b"not json").is_err());
        assert!(decode::<ViewDefinition>(b"[1, 2]").is_err());
        assert!(decode::<ViewDefinition>(br#"{"data-type": "grid/document/entry"}"#).is_err());
    }
}

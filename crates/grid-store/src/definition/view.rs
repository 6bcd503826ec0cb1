//! View and item definitions.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use grid_common::constants::data_types;
use grid_common::{GridError, GridResult};

use super::{expect_optional_tag, expect_tag, Entry};
use crate::validate::validate_name;

/// A persisted view layout: a name plus its presentation items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ViewWire", into = "ViewWire")]
pub struct ViewDefinition {
    name: String,
    items: Vec<ItemDefinition>,
}

/// A presentation item placed on a view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ItemWire", into = "ItemWire")]
pub struct ItemDefinition {
    /// Widget kind, e.g. `Label` or `Table`.
    pub item_type: String,
    /// Item name, unique within its view.
    pub name: String,
    /// Widget properties, opaque to the store.
    pub properties: Map<String, Value>,
    /// Canvas position `[x, y]`.
    pub position: Option<[i64; 2]>,
}

#[derive(Serialize, Deserialize)]
struct ViewWire {
    #[serde(rename = "data-type")]
    data_type: String,
    name: String,
    #[serde(default)]
    items: Vec<ItemDefinition>,
}

#[derive(Serialize, Deserialize)]
struct ItemWire {
    #[serde(rename = "data-type", default, skip_serializing_if = "Option::is_none")]
    data_type: Option<String>,
    #[serde(rename = "item-type")]
    item_type: String,
    name: String,
    #[serde(default)]
    properties: Map<String, Value>,
    #[serde(default)]
    position: Option<[i64; 2]>,
}

impl ViewDefinition {
    /// Creates a view. Item names must be unique.
    pub fn new(name: impl Into<String>, items: Vec<ItemDefinition>) -> GridResult<Self> {
        let name = name.into();
        validate_name(&name)?;

        let mut seen = HashSet::new();
        for item in &items {
            if !seen.insert(item.name.as_str()) {
                return Err(GridError::validation(format!(
                    "view '{name}' has duplicate item '{}'",
                    item.name
                )));
            }
        }

        Ok(Self { name, items })
    }

    /// Returns the view name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the items in placement order.
    pub fn items(&self) -> &[ItemDefinition] {
        &self.items
    }

    /// Looks up an item by name.
    pub fn item(&self, name: &str) -> Option<&ItemDefinition> {
        self.items.iter().find(|i| i.name == name)
    }

    /// Returns a copy of this view under a new name.
    pub fn renamed(&self, name: impl Into<String>) -> GridResult<Self> {
        Self::new(name, self.items.clone())
    }
}

impl ItemDefinition {
    /// Creates an item without properties or position.
    pub fn new(item_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            item_type: item_type.into(),
            name: name.into(),
            properties: Map::new(),
            position: None,
        }
    }

    /// Sets a property.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Sets the canvas position.
    #[must_use]
    pub fn at(mut self, x: i64, y: i64) -> Self {
        self.position = Some([x, y]);
        self
    }
}

impl Entry for ViewDefinition {
    const DATA_TYPE: &'static str = data_types::VIEW_ENTRY;
    const FEED_TYPE: &'static str = data_types::VIEW_FEED;
}

impl TryFrom<ViewWire> for ViewDefinition {
    type Error = GridError;

    fn try_from(wire: ViewWire) -> Result<Self, Self::Error> {
        expect_tag(&wire.data_type, Self::DATA_TYPE)?;
        Self::new(wire.name, wire.items)
    }
}

impl From<ViewDefinition> for ViewWire {
    fn from(view: ViewDefinition) -> Self {
        Self {
            data_type: ViewDefinition::DATA_TYPE.to_string(),
            name: view.name,
            items: view.items,
        }
    }
}

impl TryFrom<ItemWire> for ItemDefinition {
    type Error = GridError;

    fn try_from(wire: ItemWire) -> Result<Self, Self::Error> {
        expect_optional_tag(wire.data_type.as_deref(), data_types::ITEM_ENTRY)?;
        if wire.name.is_empty() {
            return Err(GridError::validation("item name must not be empty"));
        }
        Ok(Self {
            item_type: wire.item_type,
            name: wire.name,
            properties: wire.properties,
            position: wire.position,
        })
    }
}

impl From<ItemDefinition> for ItemWire {
    fn from(item: ItemDefinition) -> Self {
        Self {
            data_type: Some(data_types::ITEM_ENTRY.to_string()),
            item_type: item.item_type,
            name: item.name,
            properties: item.properties,
            position: item.position,
        }
    }
}

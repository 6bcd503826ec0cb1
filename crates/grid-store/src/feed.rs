//! Paged result containers.
//!
//! A [`Feed`] wraps entries read from a store with their paging
//! coordinates. Feeds are pure projections: built after a read, never
//! persisted.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use grid_common::constants::{data_types, DATA_TYPE_FIELD};
use grid_common::{GridError, GridResult};

use crate::definition::Entry;

/// A row of a document, keyed by column in table order.
pub type Row = Map<String, Value>;

impl Entry for Row {
    const DATA_TYPE: &'static str = data_types::DATA_ENTRY;
    const FEED_TYPE: &'static str = data_types::DATA_FEED;
    const FEED_FIELD: &'static str = "rows";
}

/// Offset-based page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Zero-based offset of the first row.
    pub start: u64,
    /// Maximum number of rows.
    pub count: u64,
}

impl Page {
    /// Creates a page. Negative coordinates are rejected.
    pub fn new(start: i64, count: i64) -> GridResult<Self> {
        let start = u64::try_from(start)
            .map_err(|_| GridError::validation(format!("start must not be negative, got {start}")))?;
        let count = u64::try_from(count)
            .map_err(|_| GridError::validation(format!("count must not be negative, got {count}")))?;
        Ok(Self { start, count })
    }

    /// Parses textual page coordinates.
    pub fn parse(start: &str, count: &str) -> GridResult<Self> {
        let parse = |field: &str, text: &str| {
            text.trim().parse::<i64>().map_err(|_| {
                GridError::validation(format!("{field} must be an integer, got '{text}'"))
            })
        };
        Self::new(parse("start", start)?, parse("count", count)?)
    }

    /// Returns `(limit, offset)` ready to bind.
    pub(crate) fn bounds(self) -> GridResult<(i64, i64)> {
        let limit = i64::try_from(self.count)
            .map_err(|_| GridError::validation("count is out of range"))?;
        let offset = i64::try_from(self.start)
            .map_err(|_| GridError::validation("start is out of range"))?;
        Ok((limit, offset))
    }
}

/// A typed, paged collection of entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Feed<T> {
    /// Workspace the entries were read from.
    pub workspace: Option<String>,
    /// Offset of the first entry.
    pub start: u64,
    /// Requested page size, when the read was bounded.
    pub page_size: Option<u64>,
    /// The entries.
    pub entries: Vec<T>,
}

impl<T: Entry> Feed<T> {
    /// Wraps an unbounded listing.
    pub fn new(workspace: impl Into<String>, entries: Vec<T>) -> Self {
        Self {
            workspace: Some(workspace.into()),
            start: 0,
            page_size: None,
            entries,
        }
    }

    /// Wraps one page of a bounded read.
    pub fn page(workspace: impl Into<String>, page: Page, entries: Vec<T>) -> Self {
        Self {
            workspace: Some(workspace.into()),
            start: page.start,
            page_size: Some(page.count),
            entries,
        }
    }

    /// Number of entries returned, at most the page size.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no entries were returned.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the feed discriminator.
    pub fn data_type(&self) -> &'static str {
        T::FEED_TYPE
    }
}

impl<T: Entry + Serialize> Serialize for Feed<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(DATA_TYPE_FIELD, T::FEED_TYPE)?;
        if let Some(workspace) = &self.workspace {
            map.serialize_entry("workspace", workspace)?;
        }
        map.serialize_entry("start", &self.start)?;
        map.serialize_entry("count", &self.count())?;
        if let Some(page_size) = self.page_size {
            map.serialize_entry("page-size", &page_size)?;
        }
        map.serialize_entry(T::FEED_FIELD, &self.entries)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::ViewDefinition;
    use serde_json::json;

    #[test]
    fn test_page_validation() {
        assert_eq!(Page::new(0, 10).unwrap(), Page { start: 0, count: 10 });
        assert!(matches!(Page::new(-1, 10), Err(GridError::Validation { .. })));
        assert!(Page::new(0, -5).is_err());
        assert_eq!(Page::parse(" 5 ", "20").unwrap(), Page { start: 5, count: 20 });
        assert!(Page::parse("five", "20").is_err());
        assert!(Page::parse("0", "-1").is_err());
    }

    #[test]
    fn test_row_feed_shape() {
        let mut row = Row::new();
        row.insert("id".into(), json!(1));
        let feed = Feed::page("demo", Page::new(0, 10).unwrap(), vec![row]);

        let value = serde_json::to_value(&feed).unwrap();
        assert_eq!(
            value,
            json!({
                "data-type": "grid/data/feed",
                "workspace": "demo",
                "start": 0,
                "count": 1,
                "page-size": 10,
                "rows": [{"id": 1}]
            })
        );
    }

    #[test]
    fn test_definition_feed_shape() {
        let view = ViewDefinition::new("main", vec![]).unwrap();
        let feed = Feed::new("demo", vec![view]);
        assert_eq!(feed.count(), 1);

        let value = serde_json::to_value(&feed).unwrap();
        assert_eq!(value["data-type"], "grid/view/feed");
        assert_eq!(value["entries"][0]["name"], "main");
        assert!(value.get("page-size").is_none());
    }
}

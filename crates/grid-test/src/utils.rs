//! Fixtures shared by the integration tests.

use std::ops::Deref;
use std::path::Path;

use serde_json::{json, Map, Value};
use tempfile::TempDir;

use grid_common::StoreConfig;
use grid_server::Backend;
use grid_store::definition::from_value;
use grid_store::{DocumentSchema, Instruction};

/// A backend rooted in a temporary directory that is removed on drop.
pub struct TestBackend {
    backend: Backend,
    dir: TempDir,
}

impl TestBackend {
    /// Creates a backend with the default store settings.
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Creates a backend after letting `configure` adjust the settings.
    pub fn with_config(configure: impl FnOnce(&mut StoreConfig)) -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let mut config = StoreConfig::with_data_dir(dir.path());
        configure(&mut config);
        let backend = Backend::open(config).expect("failed to open backend");
        Self { backend, dir }
    }

    /// Creates a backend holding workspace `ws` with the `people` document.
    pub fn with_people() -> Self {
        let fixture = Self::new();
        fixture.create_workspace("ws").expect("failed to create workspace");
        fixture
            .create_document("ws", &people_schema())
            .expect("failed to create document");
        fixture
    }

    /// Returns the data directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Inserts one row per value set into `ws.people`, panicking on failure.
    pub fn seed_people(&self, rows: &[(i64, &str)]) {
        for (id, label) in rows {
            let mut insert = Instruction::insert(object(json!({"id": id, "label": label})));
            self.edit_row("ws", "people", &mut insert)
                .expect("failed to seed row");
        }
    }
}

impl Default for TestBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for TestBackend {
    type Target = Backend;

    fn deref(&self) -> &Self::Target {
        &self.backend
    }
}

/// The two-column schema `people(id INTEGER PRIMARY KEY, label TEXT)`.
pub fn people_schema() -> DocumentSchema {
    from_value(json!({
        "data-type": "grid/document/entry",
        "name": "people",
        "columns": [
            {"name": "id", "type-name": "INTEGER", "primary-key": true},
            {"name": "label", "type-name": "TEXT"}
        ]
    }))
    .expect("valid schema")
}

/// Unwraps a JSON object literal.
pub fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

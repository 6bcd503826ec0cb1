//! # grid-store
//!
//! Persistence engine for grid workspaces.
//!
//! Each workspace is an isolated SQLite store holding metadata (views,
//! variables, document schemas) next to user-defined document tables whose
//! columns come from declarative specs.
//!
//! - [`validate`]: identifier whitelist applied to every interpolated name
//! - [`schema`]: column descriptors and `CREATE TABLE` rendering
//! - [`definition`]: typed view and variable payloads
//! - [`instruction`]: declarative insert/update/delete
//! - [`feed`]: paged result containers
//! - [`workspace`]: the store itself
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use grid_common::StoreConfig;
//! use grid_store::feed::Page;
//! use grid_store::WorkspaceStore;
//!
//! # fn main() -> grid_common::GridResult<()> {
//! let config = Arc::new(StoreConfig::with_data_dir("./data"));
//! let store = WorkspaceStore::open(config, "demo")?;
//! for row in store.get_rows("people", Page::new(0, 10)?)? {
//!     println!("{row:?}");
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod definition;
pub mod feed;
pub mod instruction;
pub mod schema;
pub mod validate;
pub mod value;
pub mod workspace;

pub use definition::{ItemDefinition, VariableDefinition, VariableType, ViewDefinition};
pub use feed::{Feed, Page, Row};
pub use instruction::{Instruction, InstructionFeed, InstructionMode};
pub use schema::{ColumnDescriptor, ColumnSpec, ColumnType, DocumentSchema};
pub use workspace::{list_workspaces, WorkspaceStore};

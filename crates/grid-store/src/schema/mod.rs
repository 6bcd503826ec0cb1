//! Declarative document schemas.
//!
//! A document schema is an ordered list of validated column descriptors.
//! Validation happens entirely at construction time, so rendering the
//! `CREATE TABLE` statement can never fail and never runs half-validated.
//!
//! # Example
//!
//! ```rust
//! use grid_store::schema::{ColumnDescriptor, ColumnSpec, DocumentSchema};
//!
//! let id = ColumnDescriptor::from_spec(ColumnSpec {
//!     primary_key: true,
//!     ..ColumnSpec::new("id", "integer")
//! })?;
//! let label = ColumnDescriptor::from_spec(ColumnSpec::new("label", "TEXT"))?;
//!
//! let schema = DocumentSchema::new("people", vec![id, label])?;
//! assert_eq!(
//!     schema.render(),
//!     "CREATE TABLE people (id INTEGER PRIMARY KEY, label TEXT)"
//! );
//! # Ok::<(), grid_common::GridError>(())
//! ```

mod column;
mod document;

pub use column::{ColumnDefault, ColumnDescriptor, ColumnSpec, ColumnType};
pub use document::DocumentSchema;

//! # grid-server
//!
//! Workspace facade for the grid engine.
//!
//! This crate provides:
//!
//! - **Backend**: the single API surface used by editors and tools. It
//!   resolves a workspace on every call and forwards to its store.
//!
//! - **Session**: a backend bound to one current workspace.
//!
//! - **Configuration**: TOML-backed settings for the `gridctl` tool.
//!
//! # Quick Start
//!
//! ```no_run
//! use grid_common::StoreConfig;
//! use grid_server::Backend;
//!
//! # fn main() -> grid_common::GridResult<()> {
//! let backend = Backend::open(StoreConfig::with_data_dir("./data"))?;
//! let session = backend.session("demo")?;
//!
//! let views = session.get_views()?;
//! println!("{} views in {}", views.count(), session.workspace());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Workspace facade.
pub mod backend;

/// Workspace-bound sessions.
pub mod session;

/// Tool configuration.
pub mod config;

pub use backend::{Backend, WorkspaceInfo, WorkspaceList};
pub use config::{GridConfig, GridConfigBuilder};
pub use session::Session;

//! # grid-common
//!
//! Common errors, constants, and configuration for the grid workspace engine.
//!
//! This crate provides the foundational pieces shared by every grid crate:
//!
//! - **Errors**: Unified error handling with `GridError`
//! - **Config**: Store configuration structures
//! - **Constants**: Table names, payload discriminators, and defaults
//!
//! ## Example
//!
//! ```rust
//! use grid_common::error::{EntityKind, GridError, GridResult};
//!
//! fn example(exists: bool) -> GridResult<()> {
//!     if exists {
//!         return Err(GridError::already_exists(EntityKind::Workspace, "demo"));
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod constants;
pub mod error;

// Re-export commonly used items at the crate root
pub use config::StoreConfig;
pub use error::{EntityKind, ErrorCode, GridError, GridResult};

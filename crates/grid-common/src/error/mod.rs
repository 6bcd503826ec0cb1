//! Error handling for the grid workspace engine.
//!
//! This module provides a unified error type and result alias used
//! across all grid components.

mod grid;

pub use grid::{EntityKind, ErrorCode, GridError};

/// Result type alias for grid operations.
pub type GridResult<T> = std::result::Result<T, GridError>;

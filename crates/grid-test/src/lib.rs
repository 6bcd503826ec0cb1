//! # grid-test
//!
//! Integration tests for the grid workspace engine.
//!
//! This crate contains:
//! - Fixtures that run a backend over a throw-away data directory
//! - End-to-end tests under `tests/`

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Test utilities and helpers
pub mod utils;

pub use utils::TestBackend;

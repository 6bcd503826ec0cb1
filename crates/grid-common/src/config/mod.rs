//! Configuration for the grid workspace engine.

mod store;

pub use store::{JournalMode, StoreConfig, SyncMode};

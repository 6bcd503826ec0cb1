//! System-wide constants for the grid workspace engine.

// =============================================================================
// Store Layout
// =============================================================================

/// File extension of a workspace store.
///
/// Every workspace is one SQLite file named `<workspace>.grid` inside the
/// configured data directory.
pub const STORE_EXTENSION: &str = "grid";

/// Prefix reserved for the system tables.
pub const RESERVED_PREFIX: &str = "_";

/// Prefix the SQLite engine refuses for user tables (case-insensitive).
pub const ENGINE_RESERVED_PREFIX: &str = "sqlite_";

/// Document metadata table.
pub const DOCUMENTS_TABLE: &str = "_grid_docs";

/// View metadata table.
pub const VIEWS_TABLE: &str = "_grid_views";

/// Variable metadata table.
pub const VARIABLES_TABLE: &str = "_grid_vars";

/// Token table, reserved for future authorization.
pub const TOKENS_TABLE: &str = "_grid_tokens";

/// Token written to `read_token`/`write_token` until authorization exists.
pub const WILDCARD_TOKEN: &str = "*";

/// Sentinel column default meaning "current epoch seconds".
pub const NOW_DEFAULT: &str = "NOW";

// =============================================================================
// Metadata Model
// =============================================================================

/// Version written into every `data_model` blob.
pub const MODEL_VERSION: u32 = 1;

/// Field holding the blob version.
pub const MODEL_VERSION_FIELD: &str = "model-version";

/// Field holding the payload discriminator.
pub const DATA_TYPE_FIELD: &str = "data-type";

// =============================================================================
// Payload Discriminators
// =============================================================================

/// Discriminators carried in the `data-type` field of every payload.
pub mod data_types {
    /// Workspace name listing.
    pub const WORKSPACE_ENUM: &str = "grid/workspace/enum";
    /// Single workspace summary.
    pub const WORKSPACE_ENTRY: &str = "grid/workspace/entry";
    /// View definition.
    pub const VIEW_ENTRY: &str = "grid/view/entry";
    /// Feed of view definitions.
    pub const VIEW_FEED: &str = "grid/view/feed";
    /// Item inside a view.
    pub const ITEM_ENTRY: &str = "grid/item/entry";
    /// Document definition.
    pub const DOCUMENT_ENTRY: &str = "grid/document/entry";
    /// Feed of document definitions.
    pub const DOCUMENT_FEED: &str = "grid/document/feed";
    /// Column inside a document.
    pub const COLUMN_ENTRY: &str = "grid/column/entry";
    /// Variable definition.
    pub const VARIABLE_ENTRY: &str = "grid/variable/entry";
    /// Feed of variables.
    pub const VARIABLE_FEED: &str = "grid/variable/feed";
    /// Single row.
    pub const DATA_ENTRY: &str = "grid/data/entry";
    /// Page of rows.
    pub const DATA_FEED: &str = "grid/data/feed";
    /// Single instruction.
    pub const INSTRUCTION_ENTRY: &str = "grid/instruction/entry";
    /// Batch of instructions.
    pub const INSTRUCTION_FEED: &str = "grid/instruction/feed";
}

// =============================================================================
// Defaults
// =============================================================================

/// Default busy timeout for store connections, in milliseconds.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: u64 = 50;

/// Name of the view seeded into new workspaces.
pub const MAIN_VIEW: &str = "main";

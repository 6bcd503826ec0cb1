//! Grid error types.
//!
//! Every failure surfaced by the engine is one of five kinds: malformed
//! input, a name collision, a missing entity, a reserved name, or a failure
//! of the underlying store.

use std::backtrace::Backtrace;
use std::fmt;
use thiserror::Error;

/// Boxed error used as the source of store failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error codes for categorizing errors.
///
/// These codes can be used for programmatic error handling and
/// are stable across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // Input errors (0x0100 - 0x01FF)
    /// Malformed identifier, column spec, payload, or pagination input.
    Validation = 0x0100,
    /// Name reserved for internal tables.
    ReservedName = 0x0101,

    // Entity errors (0x0200 - 0x02FF)
    /// Entity with the same name already exists.
    AlreadyExists = 0x0200,
    /// Referenced entity does not exist.
    NotFound = 0x0201,

    // Store errors (0x0300 - 0x03FF)
    /// Underlying engine or I/O failure.
    Store = 0x0300,
}

impl ErrorCode {
    /// Returns the numeric code.
    #[inline]
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match (*self as u16) >> 8 {
            0x01 => "Input",
            0x02 => "Entity",
            0x03 => "Store",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The kind of entity an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A workspace store.
    Workspace,
    /// A user document (table plus metadata row).
    Document,
    /// A view definition.
    View,
    /// A workspace variable.
    Variable,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Workspace => "workspace",
            Self::Document => "document",
            Self::View => "view",
            Self::Variable => "variable",
        };
        f.write_str(name)
    }
}

/// The main error type for the grid engine.
///
/// # Example
///
/// ```rust
/// use grid_common::error::{EntityKind, GridError, GridResult};
///
/// fn lookup(name: &str) -> GridResult<()> {
///     Err(GridError::not_found(EntityKind::View, name))
/// }
///
/// assert!(lookup("main").unwrap_err().is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum GridError {
    /// Input failed validation before any I/O happened.
    #[error("validation error: {message}")]
    Validation {
        /// Error message.
        message: String,
    },

    /// Name collision on create or rename.
    #[error("{kind} '{name}' already exists")]
    AlreadyExists {
        /// The colliding entity kind.
        kind: EntityKind,
        /// The colliding name.
        name: String,
    },

    /// Referenced entity does not exist.
    #[error("{kind} '{name}' not found")]
    NotFound {
        /// The missing entity kind.
        kind: EntityKind,
        /// The missing name.
        name: String,
    },

    /// Operation targeted a name reserved for internal tables.
    #[error("name '{name}' is reserved for internal tables")]
    ReservedName {
        /// The reserved name.
        name: String,
    },

    /// Underlying store failure. The transaction has been rolled back.
    #[error("store error: {message}")]
    Store {
        /// What the engine was doing when it failed.
        message: String,
        /// The original low-level error.
        #[source]
        source: Option<BoxError>,
        /// Backtrace captured where the error was converted.
        trace: String,
    },
}

impl GridError {
    /// Returns the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { .. } => ErrorCode::Validation,
            Self::ReservedName { .. } => ErrorCode::ReservedName,
            Self::AlreadyExists { .. } => ErrorCode::AlreadyExists,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::Store { .. } => ErrorCode::Store,
        }
    }

    /// Returns true if the caller can fix its input and retry.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Store { .. })
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates an already-exists error.
    #[must_use]
    pub fn already_exists(kind: EntityKind, name: impl Into<String>) -> Self {
        Self::AlreadyExists {
            kind,
            name: name.into(),
        }
    }

    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(kind: EntityKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Creates a reserved-name error.
    #[must_use]
    pub fn reserved(name: impl Into<String>) -> Self {
        Self::ReservedName { name: name.into() }
    }

    /// Creates a store error wrapping a low-level failure.
    #[must_use]
    pub fn store<E>(message: impl Into<String>, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Store {
            message: message.into(),
            source: Some(source.into()),
            trace: Backtrace::capture().to_string(),
        }
    }

    /// Creates a store error without an underlying cause.
    #[must_use]
    pub fn store_msg(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
            source: None,
            trace: Backtrace::capture().to_string(),
        }
    }
}

impl From<std::io::Error> for GridError {
    fn from(e: std::io::Error) -> Self {
        GridError::store("I/O failure", e)
    }
}

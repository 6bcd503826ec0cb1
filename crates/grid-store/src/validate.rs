//! Identifier validation.
//!
//! Table, column, and workspace names are interpolated directly into
//! generated statements because SQLite has no placeholder syntax for
//! identifiers. Every such name passes through this module first.

use grid_common::constants::{ENGINE_RESERVED_PREFIX, RESERVED_PREFIX};
use grid_common::{GridError, GridResult};

/// Validates a table, column, or workspace name: `[A-Za-z0-9_]+`.
///
/// Returns the input unchanged on success.
pub fn validate_name(name: &str) -> GridResult<&str> {
    check(name, false)
}

/// Validates a variable name: `[A-Za-z0-9_.]+`.
pub fn validate_variable_name(name: &str) -> GridResult<&str> {
    check(name, true)
}

/// Validates an optional name. `None` and the empty string mean "absent".
pub fn validate_optional_name(name: Option<&str>) -> GridResult<Option<&str>> {
    match name {
        None | Some("") => Ok(None),
        Some(name) => validate_name(name).map(Some),
    }
}

/// Validates an optional variable name. `None` and the empty string mean "absent".
pub fn validate_optional_variable_name(name: Option<&str>) -> GridResult<Option<&str>> {
    match name {
        None | Some("") => Ok(None),
        Some(name) => validate_variable_name(name).map(Some),
    }
}

/// Returns true if user documents may not use this name.
pub fn is_reserved(name: &str) -> bool {
    name.starts_with(RESERVED_PREFIX)
        || name
            .get(..ENGINE_RESERVED_PREFIX.len())
            .is_some_and(|p| p.eq_ignore_ascii_case(ENGINE_RESERVED_PREFIX))
}

/// Validates a user document name and rejects reserved names.
pub fn validate_document_name(name: &str) -> GridResult<&str> {
    let name = validate_name(name)?;
    if is_reserved(name) {
        return Err(GridError::reserved(name));
    }
    Ok(name)
}

fn check(name: &str, allow_dot: bool) -> GridResult<&str> {
    if name.is_empty() {
        return Err(GridError::validation("name must not be empty"));
    }

    let valid = name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || (allow_dot && b == b'.'));

    if !valid {
        let allowed = if allow_dot { "[A-Za-z0-9_.]" } else { "[A-Za-z0-9_]" };
        return Err(GridError::validation(format!(
            "only {allowed} allowed in names, got '{name}'"
        )));
    }

    Ok(name)
}

//! Validation helper functions for configuration types.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::core::errors::{PkgMoveError, Result};

/// Validate that a usize value is greater than zero.
pub fn validate_positive_usize(value: usize, field: &str) -> Result<()> {
    if value == 0 {
        return Err(PkgMoveError::validation_field(
            format!("{} must be greater than 0", field),
            field,
        ));
    }
    Ok(())
}

/// Validate that a string setting is not blank.
pub fn validate_non_empty(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PkgMoveError::validation_field(
            format!("{} must not be empty", field),
            field,
        ));
    }
    Ok(())
}

/// Compile glob patterns into a set; `None` when no usable pattern is given.
pub fn compile_globset(patterns: &[String]) -> Result<Option<GlobSet>> {
    let mut builder = GlobSetBuilder::new();
    let mut added = false;

    for pattern in patterns {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            continue;
        }

        let glob = GlobBuilder::new(pattern)
            .literal_separator(false)
            .build()
            .map_err(|err| {
                PkgMoveError::config(format!("Invalid glob pattern '{pattern}': {err}"))
            })?;
        builder.add(glob);
        added = true;
    }

    if added {
        builder
            .build()
            .map(Some)
            .map_err(|err| PkgMoveError::config(format!("Failed to build glob set: {err}")))
    } else {
        Ok(None)
    }
}

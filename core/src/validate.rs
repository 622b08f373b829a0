//! Structural checks applied when a schema is built.
//!
//! Values are never rejected by the core (validity is a boolean signal
//! computed by edit-controls). Only the shape of a schema can be wrong:
//! empty or duplicate field identifiers and broken select option lists.
//!
//! # Examples
//!
//! ```
//! use control_schema_core::*;
//!
//! let result = ObjectControl::builder()
//!     .field("name", "Name", TextControl::new(false))
//!     .field("name", "Full name", TextControl::new(true))
//!     .build();
//!
//! assert_eq!(result.unwrap_err(), SchemaError::DuplicateField("name".into()));
//! ```

use std::collections::HashSet;

use thiserror::Error;

/// Schema construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A field identifier is empty or whitespace-only.
    #[error("field identifier cannot be empty")]
    EmptyFieldId,
    /// Two fields of the same object share an identifier.
    #[error("duplicate field in object: {0}")]
    DuplicateField(String),
    /// A field identifier contains the `.` path separator.
    #[error("field identifier contains '.': {0}")]
    DottedFieldId(String),
    /// A select control was declared without options.
    #[error("select control has no options")]
    EmptyOptions,
    /// A select control lists the same option twice.
    #[error("duplicate select option: {0}")]
    DuplicateOption(String),
}

/// Checks that field identifiers are non-empty, free of the `.` path
/// separator and unique.
///
/// Returns the first problem found.
pub fn validate_field_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Result<(), SchemaError> {
    let mut seen: HashSet<&str> = HashSet::new();

    for id in ids {
        if id.trim().is_empty() {
            return Err(SchemaError::EmptyFieldId);
        }
        if id.contains('.') {
            return Err(SchemaError::DottedFieldId(id.to_string()));
        }
        if !seen.insert(id) {
            return Err(SchemaError::DuplicateField(id.to_string()));
        }
    }

    Ok(())
}

/// Checks that a select option list is non-empty and free of duplicates.
pub fn validate_options(options: &[String]) -> Result<(), SchemaError> {
    if options.is_empty() {
        return Err(SchemaError::EmptyOptions);
    }

    let mut seen = HashSet::new();
    for option in options {
        if !seen.insert(option.as_str()) {
            return Err(SchemaError::DuplicateOption(option.clone()));
        }
    }

    Ok(())
}

//! Error types for schema loading.
//!
//! Covers reading description files, parsing them, building control trees
//! from them, and resolving references between documents.

use control_schema_core::SchemaError;
use thiserror::Error;

/// Errors that can occur while loading or building schemas.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A description parsed, but does not form a valid control tree.
    #[error("invalid schema `{schema}`: {source}")]
    InvalidSchema {
        schema: String,
        #[source]
        source: SchemaError,
    },

    /// A `ref` control or a lookup names a schema the registry does not hold.
    #[error("unknown schema: {0}")]
    UnknownSchema(String),

    /// Schemas reference each other in a loop.
    #[error("schema reference cycle: {0}")]
    SchemaCycle(String),

    /// The file extension is not one of `json`, `yaml`, `yml`.
    #[error("unsupported schema file format: {0}")]
    UnsupportedFormat(String),

    /// A description file holds an empty document list.
    #[error("schema file holds no documents: {0}")]
    EmptyFile(String),

    /// All configured loader sources failed.
    #[error("no schema sources available")]
    NoSourcesAvailable,
}

/// Convenience alias for results with [`LoaderError`].
pub type Result<T> = std::result::Result<T, LoaderError>;

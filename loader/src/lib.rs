//! Declarative schema descriptions and a registry to build them from.
//!
//! Schemas for `control-schema-core` can be written as YAML or JSON
//! [`SchemaDocument`]s instead of Rust code. A [`SchemaRegistry`] collects
//! documents from a directory or a file, resolves references between them,
//! and builds [`ObjectControl`](control_schema_core::ObjectControl) trees.
//!
//! # Quick start
//!
//! ```no_run
//! use control_schema_core::Control;
//! use control_schema_loader::SchemaRegistry;
//! use serde_json::json;
//!
//! let registry = SchemaRegistry::from_dir("schemas/").unwrap();
//! let customer = registry.build("customer").unwrap();
//! let values = customer.construct(&json!({ "name": "Ada" }));
//! ```

mod document;
mod error;
mod registry;

pub use document::{ControlSpec, FieldSpec, SchemaDocument};
pub use error::{LoaderError, Result};
pub use registry::{RegistryBuilder, RegistrySource, SchemaRegistry};

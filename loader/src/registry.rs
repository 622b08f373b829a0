//! Named schema lookup with builder pattern and fallback chains.
//!
//! [`SchemaRegistry`] holds [`SchemaDocument`]s by name and builds control
//! trees from them, resolving `ref` controls against its own contents.
//! [`RegistryBuilder`] tries several sources in order.
//!
//! ```no_run
//! use control_schema_loader::SchemaRegistry;
//!
//! let registry = SchemaRegistry::builder()
//!     .from_dir("schemas/")
//!     .from_file("schemas.yaml")
//!     .build()
//!     .unwrap();
//! let customer = registry.build("customer").unwrap();
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use control_schema_core::ObjectControl;
use tracing::{debug, warn};

use crate::document::{DocumentFile, SchemaDocument, build_document};
use crate::error::{LoaderError, Result};

/// Describes where a [`SchemaRegistry`] was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrySource {
    /// A directory of `.json`, `.yaml` and `.yml` description files.
    Directory(PathBuf),
    /// A single file holding one document or a list of documents.
    File(PathBuf),
    /// Assembled in memory.
    Inline,
    /// Loaded via a fallback chain of sources.
    Multiple(Vec<RegistrySource>),
}

/// Schema documents keyed by name.
///
/// # Examples
///
/// ```
/// use control_schema_core::Control;
/// use control_schema_loader::{SchemaDocument, SchemaRegistry};
/// use serde_json::json;
///
/// let address = SchemaDocument::from_yaml_str(r#"
/// name: address
/// fields:
///   - field: street
///     control: { type: text }
/// "#).unwrap();
/// let person = SchemaDocument::from_yaml_str(r#"
/// name: person
/// fields:
///   - field: name
///     control: { type: text }
///   - field: address
///     control: { type: ref, schema: address }
/// "#).unwrap();
///
/// let registry = SchemaRegistry::from_documents([address, person]);
/// let control = registry.build("person").unwrap();
/// assert_eq!(
///     control.default_value(),
///     json!({ "name": "", "address": { "street": "" } }),
/// );
/// ```
#[derive(Debug)]
pub struct SchemaRegistry {
    documents: HashMap<String, SchemaDocument>,
    source: RegistrySource,
}

impl SchemaRegistry {
    /// Returns a new [`RegistryBuilder`] for configuring a fallback chain.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Collects in-memory documents. A later document replaces an earlier
    /// one with the same name.
    pub fn from_documents(documents: impl IntoIterator<Item = SchemaDocument>) -> Self {
        let mut registry = Self {
            documents: HashMap::new(),
            source: RegistrySource::Inline,
        };
        for document in documents {
            registry.insert(document);
        }
        registry
    }

    /// Loads every `.json`, `.yaml` and `.yml` file in a directory.
    ///
    /// Files are read in path order; other files are skipped. Each file may
    /// hold one document or a list of documents.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::IoError`] if the directory or a file cannot be
    /// read, or a parse error if any description file is malformed.
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut files = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let file_path = entry?.path();
            let supported = matches!(
                file_path.extension().and_then(|e| e.to_str()),
                Some("json" | "yaml" | "yml")
            );
            if supported && file_path.is_file() {
                files.push(file_path);
            }
        }
        files.sort();

        let mut registry = Self::from_documents([]);
        for file in &files {
            for document in DocumentFile::load(file)?.into_documents() {
                registry.insert(document);
            }
        }
        debug!(
            path = %path.display(),
            files = files.len(),
            schemas = registry.len(),
            "loaded schema directory"
        );

        registry.source = RegistrySource::Directory(path.to_path_buf());
        Ok(registry)
    }

    /// Loads a single description file holding one document or a list.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::UnsupportedFormat`] for an unknown extension,
    /// [`LoaderError::IoError`] if the file cannot be read, or a parse error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut registry = Self::from_documents(DocumentFile::load(path)?.into_documents());
        registry.source = RegistrySource::File(path.to_path_buf());
        Ok(registry)
    }

    /// Looks up a document by name.
    pub fn get(&self, name: &str) -> Option<&SchemaDocument> {
        self.documents.get(name)
    }

    /// Inserts a document, replacing any existing one with the same name.
    pub fn insert(&mut self, document: SchemaDocument) {
        if self.documents.contains_key(&document.name) {
            warn!(schema = %document.name, "replacing previously loaded schema");
        }
        self.documents.insert(document.name.clone(), document);
    }

    /// Returns `true` if the registry holds a document named `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.documents.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Document names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.documents.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns a reference to the source metadata.
    pub fn source(&self) -> &RegistrySource {
        &self.source
    }

    /// Builds the control tree for `name`, resolving references against
    /// this registry.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::UnknownSchema`] if `name` or a referenced
    /// document is missing, [`LoaderError::SchemaCycle`] if references loop
    /// back onto a document already being built, and
    /// [`LoaderError::InvalidSchema`] for malformed objects or selects.
    pub fn build(&self, name: &str) -> Result<ObjectControl> {
        let document = self
            .get(name)
            .ok_or_else(|| LoaderError::UnknownSchema(name.to_string()))?;
        let lookup = |target: &str| self.documents.get(target);
        build_document(document, None, &lookup, &mut Vec::new())
    }

    /// Builds every document and returns the failures, keyed by name in
    /// sorted order.
    pub fn check(&self) -> Vec<(String, LoaderError)> {
        self.names()
            .into_iter()
            .filter_map(|name| self.build(name).err().map(|err| (name.to_string(), err)))
            .collect()
    }
}

/// Builder for constructing a [`SchemaRegistry`] with a fallback chain.
///
/// Sources are tried in the order they are added. The first successful load
/// wins; if all fail, [`LoaderError::NoSourcesAvailable`] is returned.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    sources: Vec<RegistrySource>,
}

impl RegistryBuilder {
    /// Creates a new builder with no sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a directory of description files as a source.
    pub fn from_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(RegistrySource::Directory(path.into()));
        self
    }

    /// Adds a single description file as a source.
    pub fn from_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(RegistrySource::File(path.into()));
        self
    }

    /// Attempts to load from configured sources in order.
    pub fn build(self) -> Result<SchemaRegistry> {
        for source in &self.sources {
            let result = match source {
                RegistrySource::Directory(path) => SchemaRegistry::from_dir(path),
                RegistrySource::File(path) => SchemaRegistry::from_file(path),
                RegistrySource::Inline | RegistrySource::Multiple(_) => continue,
            };

            match result {
                Ok(mut registry) => {
                    registry.source = RegistrySource::Multiple(self.sources.clone());
                    return Ok(registry);
                }
                Err(err) => debug!(?source, error = %err, "schema source failed, trying next"),
            }
        }

        Err(LoaderError::NoSourcesAvailable)
    }
}

#[cfg(test)]
mod tests {
    use control_schema_core::Control;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::document::{ControlSpec, FieldSpec};

    fn text_field(field: &str) -> FieldSpec {
        FieldSpec {
            field: field.to_string(),
            title: None,
            control: ControlSpec::Text { optional: false },
        }
    }

    fn ref_field(field: &str, schema: &str) -> FieldSpec {
        FieldSpec {
            field: field.to_string(),
            title: None,
            control: ControlSpec::Ref {
                schema: schema.to_string(),
                optional: None,
            },
        }
    }

    fn document(name: &str, fields: Vec<FieldSpec>) -> SchemaDocument {
        SchemaDocument {
            name: name.to_string(),
            title: None,
            optional: false,
            fields,
        }
    }

    #[test]
    fn test_lookup_operations() {
        let mut registry = SchemaRegistry::from_documents([document("a", vec![text_field("x")])]);
        assert_eq!(registry.len(), 1);
        assert!(!registry.is_empty());
        assert!(registry.contains("a"));
        assert!(registry.get("b").is_none());

        registry.insert(document("b", vec![]));
        assert_eq!(registry.names(), vec!["a", "b"]);
        assert_eq!(registry.source(), &RegistrySource::Inline);
    }

    #[test]
    fn test_later_document_replaces_earlier() {
        let registry = SchemaRegistry::from_documents([
            document("a", vec![text_field("x")]),
            document("a", vec![text_field("y")]),
        ]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("a").unwrap().fields[0].field, "y");
    }

    #[test]
    fn test_build_resolves_refs() {
        let registry = SchemaRegistry::from_documents([
            document("address", vec![text_field("street")]),
            document("person", vec![text_field("name"), ref_field("home", "address")]),
        ]);
        let person = registry.build("person").unwrap();
        assert_eq!(
            person.default_value(),
            json!({ "name": "", "home": { "street": "" } })
        );
    }

    #[test]
    fn test_ref_optional_override() {
        let mut person = document("person", vec![ref_field("home", "address")]);
        person.fields[0].control = ControlSpec::Ref {
            schema: "address".to_string(),
            optional: Some(true),
        };
        let registry =
            SchemaRegistry::from_documents([document("address", vec![text_field("street")]), person]);

        let control = registry.build("person").unwrap();
        assert!(control.field("home").unwrap().control.optional());
    }

    #[test]
    fn test_same_ref_twice_is_not_a_cycle() {
        let registry = SchemaRegistry::from_documents([
            document("address", vec![text_field("street")]),
            document(
                "person",
                vec![ref_field("home", "address"), ref_field("work", "address")],
            ),
        ]);
        assert!(registry.build("person").is_ok());
    }

    #[test]
    fn test_cycle_detected() {
        let registry = SchemaRegistry::from_documents([
            document("a", vec![ref_field("b", "b")]),
            document("b", vec![ref_field("a", "a")]),
        ]);
        match registry.build("a") {
            Err(LoaderError::SchemaCycle(cycle)) => assert_eq!(cycle, "a -> b -> a"),
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_self_reference_is_cycle() {
        let registry = SchemaRegistry::from_documents([document("node", vec![ref_field("next", "node")])]);
        assert!(matches!(registry.build("node"), Err(LoaderError::SchemaCycle(_))));
    }

    #[test]
    fn test_unknown_names() {
        let registry = SchemaRegistry::from_documents([document("a", vec![ref_field("b", "missing")])]);
        assert!(matches!(registry.build("nope"), Err(LoaderError::UnknownSchema(n)) if n == "nope"));
        assert!(matches!(registry.build("a"), Err(LoaderError::UnknownSchema(n)) if n == "missing"));
    }

    #[test]
    fn test_check_reports_each_failure() {
        let registry = SchemaRegistry::from_documents([
            document("ok", vec![text_field("x")]),
            document("dup", vec![text_field("x"), text_field("x")]),
            document("dangling", vec![ref_field("r", "missing")]),
        ]);
        let failures: Vec<String> = registry.check().into_iter().map(|(name, _)| name).collect();
        assert_eq!(failures, vec!["dangling", "dup"]);
    }

    #[test]
    fn test_builder_without_sources_fails() {
        assert!(matches!(
            SchemaRegistry::builder().build(),
            Err(LoaderError::NoSourcesAvailable)
        ));
    }
}

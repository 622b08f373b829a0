//! Declarative schema descriptions.
//!
//! A [`SchemaDocument`] describes one object schema as data. It is the
//! form in which schemas are authored and stored; [`SchemaDocument::build`]
//! (or [`SchemaRegistry::build`](crate::SchemaRegistry::build) when
//! documents reference each other) turns it into a control tree.
//!
//! # Example YAML
//!
//! ```yaml
//! name: customer
//! title: Customer
//! fields:
//!   - field: name
//!     title: Name
//!     control: { type: text }
//!   - field: age
//!     title: Age
//!     control: { type: number, optional: true }
//!   - field: plan
//!     control: { type: select, options: [free, pro] }
//!   - field: address
//!     title: Address
//!     control: { type: ref, schema: address }
//!   - field: tags
//!     control:
//!       type: list
//!       optional: true
//!       item: { type: text }
//! ```
//!
//! A field without `title` uses its identifier as title.

use std::path::Path;

use control_schema_core::{
    BooleanControl, Control, DurationControl, ListControl, NumberControl, ObjectControl,
    SchemaError, SelectControl, TextControl,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LoaderError, Result};

/// One named object schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    /// Registry key, also used by `ref` controls.
    pub name: String,
    /// Optional display title for the whole schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Whether the object as a whole may be absent.
    #[serde(default)]
    pub optional: bool,
    /// Fields in display order.
    pub fields: Vec<FieldSpec>,
}

/// One field of an object description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub control: ControlSpec,
}

impl FieldSpec {
    /// The title, falling back to the field identifier.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.field)
    }
}

/// Description of one control, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlSpec {
    Text {
        #[serde(default)]
        optional: bool,
    },
    Number {
        #[serde(default)]
        optional: bool,
    },
    Boolean {
        #[serde(default)]
        optional: bool,
    },
    Select {
        options: Vec<String>,
        #[serde(default)]
        optional: bool,
    },
    Duration {
        #[serde(default)]
        optional: bool,
    },
    List {
        item: Box<ControlSpec>,
        #[serde(default)]
        optional: bool,
    },
    /// Inline nested object.
    Object {
        fields: Vec<FieldSpec>,
        #[serde(default)]
        optional: bool,
    },
    /// Another document of the same registry, optionally overriding its
    /// `optional` flag.
    Ref {
        schema: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        optional: Option<bool>,
    },
}

/// Contents of a description file: a single document or a list of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum DocumentFile {
    One(SchemaDocument),
    Many(Vec<SchemaDocument>),
}

impl DocumentFile {
    pub(crate) fn into_documents(self) -> Vec<SchemaDocument> {
        match self {
            DocumentFile::One(document) => vec![document],
            DocumentFile::Many(documents) => documents,
        }
    }

    /// Reads a `.json`, `.yaml` or `.yml` file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);

        let contents = match format.as_str() {
            "json" => serde_json::from_reader(reader)?,
            "yaml" | "yml" => serde_yaml::from_reader(reader)?,
            _ => return Err(LoaderError::UnsupportedFormat(path.display().to_string())),
        };
        debug!(path = %path.display(), "loaded schema description file");
        Ok(contents)
    }
}

impl SchemaDocument {
    /// Parses a document from YAML text.
    ///
    /// # Examples
    ///
    /// ```
    /// use control_schema_loader::SchemaDocument;
    ///
    /// let doc = SchemaDocument::from_yaml_str(
    ///     "name: person\nfields:\n  - field: name\n    control: { type: text }\n",
    /// ).unwrap();
    /// assert_eq!(doc.name, "person");
    /// assert_eq!(doc.fields[0].display_title(), "name");
    /// ```
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parses a document from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Loads a single document from a `.json`, `.yaml` or `.yml` file.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::UnsupportedFormat`] for other extensions and
    /// [`LoaderError::EmptyFile`] if the file holds an empty list.
    /// A file holding several documents yields the first one.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        DocumentFile::load(path)?
            .into_documents()
            .into_iter()
            .next()
            .ok_or_else(|| LoaderError::EmptyFile(path.display().to_string()))
    }

    /// Builds the control tree for a self-contained document.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::InvalidSchema`] for duplicate fields or broken
    /// select options, and [`LoaderError::UnknownSchema`] for any `ref`
    /// control (references need a [`SchemaRegistry`](crate::SchemaRegistry)).
    ///
    /// # Examples
    ///
    /// ```
    /// use control_schema_core::Control;
    /// use control_schema_loader::SchemaDocument;
    /// use serde_json::json;
    ///
    /// let doc = SchemaDocument::from_yaml_str(r#"
    /// name: person
    /// fields:
    ///   - field: name
    ///     control: { type: text }
    ///   - field: age
    ///     control: { type: number, optional: true }
    /// "#).unwrap();
    ///
    /// let person = doc.build().unwrap();
    /// assert_eq!(person.default_value(), json!({ "name": "", "age": null }));
    /// ```
    pub fn build(&self) -> Result<ObjectControl> {
        build_document(self, None, &|_: &str| None, &mut Vec::new())
    }
}

/// Looks up documents by name while building.
pub(crate) type Lookup<'a> = &'a dyn Fn(&str) -> Option<&'a SchemaDocument>;

/// Builds `document`, tracking the chain of documents being built in
/// `stack` to reject reference cycles.
pub(crate) fn build_document(
    document: &SchemaDocument,
    optional: Option<bool>,
    lookup: Lookup<'_>,
    stack: &mut Vec<String>,
) -> Result<ObjectControl> {
    if stack.iter().any(|name| *name == document.name) {
        let cycle = stack
            .iter()
            .cloned()
            .chain(std::iter::once(document.name.clone()))
            .collect::<Vec<_>>()
            .join(" -> ");
        return Err(LoaderError::SchemaCycle(cycle));
    }

    debug!(schema = %document.name, depth = stack.len(), "building schema");
    stack.push(document.name.clone());
    let control = build_object(
        &document.name,
        &document.fields,
        optional.unwrap_or(document.optional),
        lookup,
        stack,
    );
    stack.pop();
    control
}

fn invalid(schema: &str) -> impl Fn(SchemaError) -> LoaderError + '_ {
    move |source| LoaderError::InvalidSchema {
        schema: schema.to_string(),
        source,
    }
}

fn build_object(
    schema: &str,
    fields: &[FieldSpec],
    optional: bool,
    lookup: Lookup<'_>,
    stack: &mut Vec<String>,
) -> Result<ObjectControl> {
    let mut builder = ObjectControl::builder().optional(optional);
    for field in fields {
        let control = build_control(schema, &field.control, lookup, stack)?;
        builder = builder.boxed_field(&field.field, field.display_title(), control);
    }
    builder.build().map_err(invalid(schema))
}

fn build_control(
    schema: &str,
    spec: &ControlSpec,
    lookup: Lookup<'_>,
    stack: &mut Vec<String>,
) -> Result<Box<dyn Control>> {
    let control: Box<dyn Control> = match spec {
        ControlSpec::Text { optional } => Box::new(TextControl::new(*optional)),
        ControlSpec::Number { optional } => Box::new(NumberControl::new(*optional)),
        ControlSpec::Boolean { optional } => Box::new(BooleanControl::new(*optional)),
        ControlSpec::Duration { optional } => Box::new(DurationControl::new(*optional)),
        ControlSpec::Select { options, optional } => {
            Box::new(SelectControl::new(options.clone(), *optional).map_err(invalid(schema))?)
        }
        ControlSpec::List { item, optional } => Box::new(ListControl::boxed(
            build_control(schema, item, lookup, stack)?,
            *optional,
        )),
        ControlSpec::Object { fields, optional } => {
            Box::new(build_object(schema, fields, *optional, lookup, stack)?)
        }
        ControlSpec::Ref {
            schema: target,
            optional,
        } => {
            let document =
                lookup(target).ok_or_else(|| LoaderError::UnknownSchema(target.clone()))?;
            Box::new(build_document(document, *optional, lookup, stack)?)
        }
    };
    Ok(control)
}

//! Change propagation from rendered leaves back to the root value.
//!
//! Rendering never hands out mutable access to a value. Instead every
//! composite wraps the update function it received in a per-field
//! [`OnChange`] link before rendering a child. When a leaf emits a new value
//! the link merges it into the snapshot of its own level (a copy of that
//! level with exactly one key replaced) and forwards the result to its
//! parent, one level at a time, until the root sink returns the new root
//! value.
//!
//! # Example
//!
//! ```
//! use control_schema_core::OnChange;
//! use serde_json::json;
//!
//! let person = json!({ "name": "Ada", "address": { "street": "", "city": "London" } });
//! let address = &person["address"];
//!
//! let root = OnChange::root();
//! let to_address = root.field("address", &person);
//! let to_street = to_address.field("street", address);
//!
//! let updated = to_street.emit(json!("Main St"));
//! assert_eq!(updated["address"]["street"], "Main St");
//! assert_eq!(updated["address"]["city"], "London");
//! assert_eq!(person["address"]["street"], "");
//! assert_eq!(to_street.path().to_string(), "address.street");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Location of a nested field or list item, as segments from the root.
///
/// List items use their decimal index as segment.
///
/// # Examples
///
/// ```
/// use control_schema_core::FieldPath;
///
/// let path = FieldPath::parse("address.street");
/// assert_eq!(path.segments(), ["address", "street"]);
/// assert_eq!(path.to_string(), "address.street");
/// assert!(FieldPath::parse("").is_root());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// The empty path, addressing the root value itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses a dot separated path. Empty segments are skipped.
    pub fn parse(path: &str) -> Self {
        Self(
            path.split('.')
                .filter(|segment| !segment.is_empty())
                .map(String::from)
                .collect(),
        )
    }

    /// Returns a new path extended by one segment.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// Patch message replacing one key of an object snapshot.
///
/// # Examples
///
/// ```
/// use control_schema_core::FieldUpdate;
/// use serde_json::json;
///
/// let values = json!({ "name": "Ada", "age": null });
/// let updated = FieldUpdate::new("age", json!(30)).apply(&values);
///
/// assert_eq!(updated, json!({ "name": "Ada", "age": 30 }));
/// assert_eq!(values, json!({ "name": "Ada", "age": null }));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldUpdate {
    /// Identifier of the replaced field.
    pub field: String,
    /// Replacement value for that field.
    pub value: Value,
}

impl FieldUpdate {
    pub fn new(field: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            value,
        }
    }

    /// Returns a copy of `values` with this field replaced.
    ///
    /// A snapshot that is not an object is treated as an empty object.
    pub fn apply(self, values: &Value) -> Value {
        let mut map = match values {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        map.insert(self.field, self.value);
        Value::Object(map)
    }
}

/// Returns a copy of `items` with the item at `index` replaced.
///
/// `index == len` appends. Any other out of range index leaves the list as
/// it was.
pub(crate) fn replace_item(items: &Value, index: usize, value: Value) -> Value {
    let mut items = match items {
        Value::Array(items) => items.clone(),
        _ => Vec::new(),
    };
    if index < items.len() {
        items[index] = value;
    } else if index == items.len() {
        items.push(value);
    } else {
        tracing::warn!(index, len = items.len(), "list update index out of range");
    }
    Value::Array(items)
}

/// The update function handed to `render`.
///
/// [`OnChange::Root`] returns whatever it receives. The other variants hold
/// the snapshot of one composite level and a reference to the update
/// function of the level above.
#[derive(Debug, Clone, Copy)]
pub enum OnChange<'a> {
    /// Sink at the top of the tree.
    Root,
    /// Link created by an object control for one of its fields.
    Field {
        field: &'a str,
        values: &'a Value,
        parent: &'a OnChange<'a>,
    },
    /// Link created by a list control for one of its items.
    Item {
        index: usize,
        items: &'a Value,
        parent: &'a OnChange<'a>,
    },
}

impl OnChange<'static> {
    pub fn root() -> Self {
        OnChange::Root
    }
}

impl<'a> OnChange<'a> {
    /// Creates the link for `field` of the object snapshot `values`.
    pub fn field<'b>(&'b self, field: &'b str, values: &'b Value) -> OnChange<'b> {
        OnChange::Field {
            field,
            values,
            parent: self,
        }
    }

    /// Creates the link for item `index` of the list snapshot `items`.
    pub fn item<'b>(&'b self, index: usize, items: &'b Value) -> OnChange<'b> {
        OnChange::Item {
            index,
            items,
            parent: self,
        }
    }

    /// Merges `value` into every snapshot on the way up and returns the new
    /// root value.
    pub fn emit(&self, value: Value) -> Value {
        match self {
            OnChange::Root => value,
            OnChange::Field {
                field,
                values,
                parent,
            } => parent.emit(FieldUpdate::new(*field, value).apply(values)),
            OnChange::Item {
                index,
                items,
                parent,
            } => parent.emit(replace_item(items, *index, value)),
        }
    }

    /// Path from the root to the value this link updates.
    pub fn path(&self) -> FieldPath {
        match self {
            OnChange::Root => FieldPath::root(),
            OnChange::Field { field, parent, .. } => parent.path().child(*field),
            OnChange::Item { index, parent, .. } => parent.path().child(index.to_string()),
        }
    }
}

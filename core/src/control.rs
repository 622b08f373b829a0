//! The control contract shared by leaf and composite controls.
//!
//! A [`Control`] describes the shape and behavior of one value in a schema:
//! how to default it, how to move it across the raw/typed boundary, how to
//! render it read-only and how to derive its editing counterpart. An
//! [`EditControl`] owns the editing session for the same value: validation,
//! finalization and edit-mode rendering.
//!
//! Composites depend on nothing but these two traits from their children,
//! so a child may itself be a composite at any depth.

use std::fmt;

use serde_json::Value;

use crate::{OnChange, View};

/// Stand-in for a field or item that is absent from its container.
pub(crate) static NULL: Value = Value::Null;

/// Returns `values[field]`, or `null` when the field is absent.
pub(crate) fn field_value<'v>(values: &'v Value, field: &str) -> &'v Value {
    values.get(field).unwrap_or(&NULL)
}

/// View-mode behavior of a schema node.
pub trait Control: fmt::Debug + Send + Sync {
    /// Whether the value may be absent or empty.
    fn optional(&self) -> bool;

    /// The value a new, untouched field starts with.
    fn default_value(&self) -> Value;

    /// Canonicalizes raw input into the typed shape.
    ///
    /// `raw` is `null` when the input did not contain this value at all;
    /// implementations fall back to their default instead of failing.
    fn construct(&self, raw: &Value) -> Value;

    /// Converts a typed value back into its raw, storage-shaped form.
    fn serialize(&self, value: &Value) -> Value;

    /// Describes a read-only view of `value`.
    ///
    /// `on_change` is the update function for this value's position in the
    /// tree; composites derive a per-child link from it.
    fn render(&self, value: &Value, on_change: &OnChange<'_>) -> View;

    /// Derives the editing counterpart of this control.
    fn edit_control(&self) -> Box<dyn EditControl>;

    /// Converts a typed value into the shape an edit session starts from.
    fn edit(&self, value: &Value) -> Value;

    /// `true` for scalar leaves, `false` for composites and collections.
    fn is_singular(&self) -> bool;

    /// Replaces the value at `path` below `value` and returns the new value.
    ///
    /// Leaves accept only the empty path.
    fn update(&self, value: &Value, path: &[String], new_value: Value) -> Value {
        update_leaf(value, path, new_value)
    }
}

/// Edit-mode behavior of a schema node.
pub trait EditControl: fmt::Debug + Send + Sync {
    /// Whether the value may be absent or empty.
    fn optional(&self) -> bool;

    /// Pure validity predicate for an edited value.
    fn validate(&self, value: &Value) -> bool;

    /// Finalizes an edited value into its canonical typed form.
    ///
    /// Only meaningful after [`validate`](EditControl::validate) returned
    /// `true`; `save` itself does not re-validate.
    fn save(&self, value: &Value) -> Value;

    /// Describes an editable view of `value`.
    ///
    /// `is_valid` is the validity computed by the caller for this value.
    /// Leaves display it; composites recompute validity per field instead.
    fn render(&self, value: &Value, on_change: &OnChange<'_>, is_valid: bool) -> View;

    /// Replaces the value at `path` below `value` and returns the new value.
    fn update(&self, value: &Value, path: &[String], new_value: Value) -> Value {
        update_leaf(value, path, new_value)
    }
}

fn update_leaf(value: &Value, path: &[String], new_value: Value) -> Value {
    if path.is_empty() {
        return new_value;
    }
    tracing::warn!(path = %path.join("."), "update path continues below a leaf control");
    value.clone()
}

/// A named, titled child of a composite.
#[derive(Debug)]
pub struct Field<C> {
    /// Identifier, unique within the owning composite.
    pub field: String,
    /// Display label.
    pub title: String,
    pub control: C,
}

impl<C> Field<C> {
    pub fn new(field: impl Into<String>, title: impl Into<String>, control: C) -> Self {
        Self {
            field: field.into(),
            title: title.into(),
            control,
        }
    }
}

/// Field of an [`ObjectControl`](crate::ObjectControl).
pub type ControlField = Field<Box<dyn Control>>;

/// Field of an [`ObjectEditControl`](crate::ObjectEditControl).
pub type EditField = Field<Box<dyn EditControl>>;

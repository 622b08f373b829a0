//! Object controls: a value made of named, independently typed fields.
//!
//! [`ObjectControl`] implements every [`Control`] operation by delegating to
//! its children field by field and keying the results by field identifier.
//! [`ObjectEditControl`] does the same for validation, saving and edit-mode
//! rendering. Because both only rely on the child traits, objects nest to
//! any depth.
//!
//! Every produced object has exactly the keys of the field list: extra keys
//! in the input are dropped and missing keys are filled by the child (which
//! sees `null`).
//!
//! # Example
//!
//! ```
//! use control_schema_core::*;
//! use serde_json::json;
//!
//! let person = ObjectControl::builder()
//!     .field("name", "Name", TextControl::new(false))
//!     .field("age", "Age", NumberControl::new(true))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(person.default_value(), json!({ "name": "", "age": null }));
//! assert_eq!(person.construct(&json!({ "name": "Ada" })), json!({ "name": "Ada", "age": null }));
//!
//! let editor = person.edit_control();
//! assert!(!editor.validate(&json!({ "name": "", "age": 30 })));
//! assert!(editor.validate(&json!({ "name": "Ada", "age": 30 })));
//! ```

use serde_json::Value;
use tracing::debug;

use crate::control::field_value;
use crate::{
    Control, ControlField, EditControl, EditField, Field, FieldRow, FieldUpdate, OnChange,
    SchemaError, View, validate_field_ids,
};

/// Composite control over an ordered list of fields.
#[derive(Debug)]
pub struct ObjectControl {
    fields: Vec<ControlField>,
    optional: bool,
}

impl ObjectControl {
    /// Creates an object control.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::EmptyFieldId`],
    /// [`SchemaError::DottedFieldId`] or [`SchemaError::DuplicateField`] if
    /// the identifiers are not non-empty, dot-free and unique.
    pub fn new(fields: Vec<ControlField>, optional: bool) -> Result<Self, SchemaError> {
        validate_field_ids(fields.iter().map(|f| f.field.as_str()))?;
        debug!(fields = fields.len(), optional, "built object control");
        Ok(Self { fields, optional })
    }

    /// Returns a builder that adds fields one at a time.
    pub fn builder() -> ObjectControlBuilder {
        ObjectControlBuilder::default()
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[ControlField] {
        &self.fields
    }

    /// Looks up a field by identifier.
    pub fn field(&self, id: &str) -> Option<&ControlField> {
        self.fields.iter().find(|f| f.field == id)
    }

    /// Field identifiers in declaration order.
    pub fn field_ids(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.field.as_str()).collect()
    }

    /// Derives the concrete [`ObjectEditControl`].
    ///
    /// [`Control::edit_control`] returns the same thing boxed.
    pub fn edit_object(&self) -> ObjectEditControl {
        ObjectEditControl {
            fields: self
                .fields
                .iter()
                .map(|f| Field::new(f.field.clone(), f.title.clone(), f.control.edit_control()))
                .collect(),
            optional: self.optional,
        }
    }

    fn map_fields(&self, values: &Value, op: impl Fn(&dyn Control, &Value) -> Value) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|f| {
                    let value = op(f.control.as_ref(), field_value(values, &f.field));
                    (f.field.clone(), value)
                })
                .collect(),
        )
    }
}

impl Control for ObjectControl {
    fn optional(&self) -> bool {
        self.optional
    }

    fn default_value(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|f| (f.field.clone(), f.control.default_value()))
                .collect(),
        )
    }

    fn construct(&self, raw: &Value) -> Value {
        self.map_fields(raw, |control, value| control.construct(value))
    }

    fn serialize(&self, values: &Value) -> Value {
        self.map_fields(values, |control, value| control.serialize(value))
    }

    fn render(&self, values: &Value, on_change: &OnChange<'_>) -> View {
        let rows = self
            .fields
            .iter()
            .map(|f| {
                let link = on_change.field(&f.field, values);
                FieldRow {
                    field: f.field.clone(),
                    title: f.title.clone(),
                    view: f.control.render(field_value(values, &f.field), &link),
                }
            })
            .collect();
        View::Object { rows }
    }

    fn edit_control(&self) -> Box<dyn EditControl> {
        Box::new(self.edit_object())
    }

    fn edit(&self, values: &Value) -> Value {
        self.map_fields(values, |control, value| control.edit(value))
    }

    fn is_singular(&self) -> bool {
        false
    }

    fn update(&self, values: &Value, path: &[String], new_value: Value) -> Value {
        update_field(values, path, new_value, |id, current, rest, new_value| {
            self.field(id)
                .map(|f| f.control.update(current, rest, new_value))
        })
    }
}

/// Routes `path` into the field it names and patches that field with what
/// `update_child` returns. `update_child` yields `None` for unknown fields.
fn update_field(
    values: &Value,
    path: &[String],
    new_value: Value,
    update_child: impl FnOnce(&str, &Value, &[String], Value) -> Option<Value>,
) -> Value {
    let Some((head, rest)) = path.split_first() else {
        return new_value;
    };
    match update_child(head, field_value(values, head), rest, new_value) {
        Some(child) => FieldUpdate::new(head.clone(), child).apply(values),
        None => {
            tracing::warn!(field = %head, "update targets unknown field");
            values.clone()
        }
    }
}

/// Builder for [`ObjectControl`].
///
/// # Examples
///
/// ```
/// use control_schema_core::*;
///
/// let address = ObjectControl::builder()
///     .field("street", "Street", TextControl::new(false))
///     .field("city", "City", TextControl::new(false))
///     .optional(true)
///     .build()
///     .unwrap();
///
/// assert_eq!(address.field_ids(), vec!["street", "city"]);
/// assert!(address.optional());
/// ```
#[derive(Debug, Default)]
pub struct ObjectControlBuilder {
    fields: Vec<ControlField>,
    optional: bool,
}

impl ObjectControlBuilder {
    /// Appends a field.
    pub fn field(
        mut self,
        field: impl Into<String>,
        title: impl Into<String>,
        control: impl Control + 'static,
    ) -> Self {
        self.fields.push(Field::new(field, title, Box::new(control)));
        self
    }

    /// Appends a field whose control is already boxed.
    pub fn boxed_field(
        mut self,
        field: impl Into<String>,
        title: impl Into<String>,
        control: Box<dyn Control>,
    ) -> Self {
        self.fields.push(Field::new(field, title, control));
        self
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// Builds the control, checking field identifiers.
    pub fn build(self) -> Result<ObjectControl, SchemaError> {
        ObjectControl::new(self.fields, self.optional)
    }
}

/// Editing counterpart of [`ObjectControl`].
///
/// Holds the same field identifiers and titles, each paired with the
/// child's own derived edit-control.
#[derive(Debug)]
pub struct ObjectEditControl {
    fields: Vec<EditField>,
    optional: bool,
}

impl ObjectEditControl {
    /// Fields in declaration order.
    pub fn fields(&self) -> &[EditField] {
        &self.fields
    }

    /// Looks up a field by identifier.
    pub fn field(&self, id: &str) -> Option<&EditField> {
        self.fields.iter().find(|f| f.field == id)
    }

    /// Validity of every field, in declaration order.
    ///
    /// # Examples
    ///
    /// ```
    /// use control_schema_core::*;
    /// use serde_json::json;
    ///
    /// let person = ObjectControl::builder()
    ///     .field("name", "Name", TextControl::new(false))
    ///     .field("age", "Age", NumberControl::new(true))
    ///     .build()
    ///     .unwrap();
    ///
    /// let editor = person.edit_object();
    /// let validity = editor.field_validity(&json!({ "name": "", "age": 30 }));
    /// assert_eq!(validity, vec![("name", false), ("age", true)]);
    /// ```
    pub fn field_validity(&self, values: &Value) -> Vec<(&str, bool)> {
        self.fields
            .iter()
            .map(|f| {
                let valid = f.control.validate(field_value(values, &f.field));
                (f.field.as_str(), valid)
            })
            .collect()
    }
}

impl EditControl for ObjectEditControl {
    fn optional(&self) -> bool {
        self.optional
    }

    fn validate(&self, values: &Value) -> bool {
        self.field_validity(values).iter().all(|(_, valid)| *valid)
    }

    fn save(&self, values: &Value) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|f| (f.field.clone(), f.control.save(field_value(values, &f.field))))
                .collect(),
        )
    }

    /// Renders every field with its own, locally recomputed validity.
    ///
    /// The aggregate `is_valid` of this object is ignored so that a field's
    /// indicator always matches the value it is rendered with.
    fn render(&self, values: &Value, on_change: &OnChange<'_>, _is_valid: bool) -> View {
        let rows = self
            .fields
            .iter()
            .map(|f| {
                let value = field_value(values, &f.field);
                let link = on_change.field(&f.field, values);
                let valid = f.control.validate(value);
                FieldRow {
                    field: f.field.clone(),
                    title: f.title.clone(),
                    view: f.control.render(value, &link, valid),
                }
            })
            .collect();
        View::Object { rows }
    }

    fn update(&self, values: &Value, path: &[String], new_value: Value) -> Value {
        update_field(values, path, new_value, |id, current, rest, new_value| {
            self.field(id)
                .map(|f| f.control.update(current, rest, new_value))
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::{NumberControl, TextControl};

    fn person() -> ObjectControl {
        ObjectControl::builder()
            .field("name", "Name", TextControl::new(false))
            .field("age", "Age", NumberControl::new(true))
            .build()
            .unwrap()
    }

    #[test]
    fn test_construct_drops_unknown_keys() {
        let values = person().construct(&json!({ "name": "Ada", "email": "ada@example.com" }));
        assert_eq!(values, json!({ "name": "Ada", "age": null }));
    }

    #[test]
    fn test_construct_non_object_behaves_like_empty() {
        assert_eq!(person().construct(&json!(42)), person().default_value());
        assert_eq!(person().construct(&Value::Null), person().default_value());
    }

    #[test]
    fn test_empty_object() {
        let empty = ObjectControl::new(Vec::new(), false).unwrap();
        assert_eq!(empty.default_value(), json!({}));
        assert!(empty.edit_control().validate(&json!({})));
        assert_eq!(empty.render(&json!({}), &OnChange::root()), View::Object { rows: vec![] });
    }

    #[test]
    fn test_is_singular_false() {
        assert!(!person().is_singular());
    }

    #[test]
    fn test_update_unknown_field_is_ignored() {
        let values = json!({ "name": "Ada", "age": null });
        let path = ["email".to_string()];
        assert_eq!(person().update(&values, &path, json!("x")), values);
    }

    #[test]
    fn test_update_empty_path_replaces_whole_value() {
        let values = json!({ "name": "Ada", "age": null });
        let replacement = json!({ "name": "Grace", "age": 85 });
        assert_eq!(person().update(&values, &[], replacement.clone()), replacement);
    }

    #[test]
    fn test_control_and_editor_route_updates_alike() {
        let values = json!({ "name": "Ada", "age": null });
        let control = person();
        let editor = control.edit_object();

        let age = ["age".to_string()];
        let expected = json!({ "name": "Ada", "age": 30 });
        assert_eq!(control.update(&values, &age, json!(30)), expected);
        assert_eq!(editor.update(&values, &age, json!(30)), expected);

        let unknown = ["email".to_string()];
        assert_eq!(editor.update(&values, &unknown, json!("x")), values);
    }

    #[test]
    fn test_dotted_field_id_is_rejected() {
        let result = ObjectControl::builder()
            .field("address.city", "City", TextControl::new(false))
            .build();
        assert_eq!(
            result.unwrap_err(),
            SchemaError::DottedFieldId("address.city".to_string())
        );
    }

    #[test]
    fn test_save_fills_missing_fields() {
        let editor = person().edit_object();
        assert_eq!(editor.save(&json!({ "name": "Ada" })), json!({ "name": "Ada", "age": null }));
    }

    #[test]
    fn test_edit_render_ignores_aggregate_validity() {
        let editor = person().edit_object();
        let view = editor.render(&json!({ "name": "Ada", "age": 30 }), &OnChange::root(), false);
        assert!(view.all_valid());
    }
}

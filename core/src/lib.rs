//! Schema-driven, recursively composable controls.
//!
//! A schema is a tree of controls. Each control knows how to produce a
//! default value, canonicalize raw input ([`Control::construct`]), turn a
//! typed value back into raw form ([`Control::serialize`]), render a
//! read-only [`View`], and derive an [`EditControl`] that validates, saves
//! and renders edited values.
//!
//! - [`ObjectControl`] / [`ObjectEditControl`]: composite over named
//!   fields; every operation is delegated field by field.
//! - [`ListControl`]: composite over a list of items of one control.
//! - [`TextControl`], [`NumberControl`], [`BooleanControl`],
//!   [`SelectControl`], [`DurationControl`]: scalar leaves.
//! - [`OnChange`] and [`FieldUpdate`]: change propagation. An edit never
//!   mutates a value, it produces a new value one level at a time.
//!
//! Values, raw or typed, are [`serde_json::Value`]s. Absent fields are seen
//! by children as `null`. Nothing in this crate returns an error for a
//! value; validity is a boolean computed by edit-controls. Only building a
//! malformed schema fails, with a [`SchemaError`].
//!
//! # Example
//!
//! ```
//! use control_schema_core::*;
//! use serde_json::json;
//!
//! let address = ObjectControl::builder()
//!     .field("street", "Street", TextControl::new(false))
//!     .field("city", "City", TextControl::new(false))
//!     .build()
//!     .unwrap();
//! let person = ObjectControl::builder()
//!     .field("name", "Name", TextControl::new(false))
//!     .field("age", "Age", NumberControl::new(true))
//!     .field("address", "Address", address)
//!     .build()
//!     .unwrap();
//!
//! let values = person.construct(&json!({ "name": "Ada" }));
//! assert_eq!(values["address"], json!({ "street": "", "city": "" }));
//!
//! // Route an edit of a rendered leaf back to the root.
//! let view = person.render(&values, &OnChange::root());
//! let street = view.leaves()[2].path().unwrap().clone();
//! let values = person.update(&values, street.segments(), json!("Main St"));
//! assert_eq!(values["address"]["street"], "Main St");
//!
//! let editor = person.edit_control();
//! assert!(!editor.validate(&values)); // city is still empty
//! ```

mod control;
mod duration;
mod leaf;
mod list;
mod object;
mod update;
mod validate;
mod view;

pub use control::{Control, ControlField, EditControl, EditField, Field};
pub use duration::{DurationControl, DurationEditControl, format_duration, parse_duration};
pub use leaf::{
    BooleanControl, BooleanEditControl, NumberControl, NumberEditControl, SelectControl,
    SelectEditControl, TextControl, TextEditControl,
};
pub use list::{ListControl, ListEditControl};
pub use object::{ObjectControl, ObjectControlBuilder, ObjectEditControl};
pub use update::{FieldPath, FieldUpdate, OnChange};
pub use validate::{SchemaError, validate_field_ids, validate_options};
pub use view::{FieldRow, View, Widget, display_text};

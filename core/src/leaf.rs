//! Scalar leaf controls: text, number, boolean and select.
//!
//! Leaves are simple, independent units. Each one normalizes missing or
//! mistyped raw input to its default rather than failing, and its
//! edit-control decides from its `optional` flag whether `null` or empty
//! input is acceptable.

use serde_json::{Number, Value};

use crate::{Control, EditControl, OnChange, SchemaError, View, Widget, display_text, validate_options};

/// Free-form text.
///
/// # Examples
///
/// ```
/// use control_schema_core::*;
/// use serde_json::json;
///
/// let name = TextControl::new(false);
/// assert_eq!(name.default_value(), json!(""));
/// assert_eq!(name.construct(&json!(42)), json!("42"));
/// assert!(!name.edit_control().validate(&json!("")));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TextControl {
    optional: bool,
}

impl TextControl {
    pub fn new(optional: bool) -> Self {
        Self { optional }
    }
}

impl Control for TextControl {
    fn optional(&self) -> bool {
        self.optional
    }

    fn default_value(&self) -> Value {
        Value::String(String::new())
    }

    fn construct(&self, raw: &Value) -> Value {
        match raw {
            Value::String(s) => Value::String(s.clone()),
            Value::Number(n) => Value::String(n.to_string()),
            Value::Bool(b) => Value::String(b.to_string()),
            _ => self.default_value(),
        }
    }

    fn serialize(&self, value: &Value) -> Value {
        value.clone()
    }

    fn render(&self, value: &Value, on_change: &OnChange<'_>) -> View {
        View::Display {
            path: on_change.path(),
            text: display_text(value),
        }
    }

    fn edit_control(&self) -> Box<dyn EditControl> {
        Box::new(TextEditControl {
            optional: self.optional,
        })
    }

    fn edit(&self, value: &Value) -> Value {
        value.clone()
    }

    fn is_singular(&self) -> bool {
        true
    }
}

/// Editing counterpart of [`TextControl`].
#[derive(Debug, Clone, Copy)]
pub struct TextEditControl {
    optional: bool,
}

impl EditControl for TextEditControl {
    fn optional(&self) -> bool {
        self.optional
    }

    fn validate(&self, value: &Value) -> bool {
        match value {
            Value::String(s) => self.optional || !s.is_empty(),
            Value::Null => self.optional,
            _ => false,
        }
    }

    fn save(&self, value: &Value) -> Value {
        match value {
            Value::Null => Value::String(String::new()),
            other => other.clone(),
        }
    }

    fn render(&self, value: &Value, on_change: &OnChange<'_>, is_valid: bool) -> View {
        View::Input {
            path: on_change.path(),
            widget: Widget::Text,
            value: value.clone(),
            valid: is_valid,
        }
    }
}

/// Numeric value. Optional numbers default to `null`, required ones to `0`.
///
/// # Examples
///
/// ```
/// use control_schema_core::*;
/// use serde_json::json;
///
/// let age = NumberControl::new(true);
/// assert_eq!(age.default_value(), json!(null));
/// assert_eq!(age.construct(&json!("30")), json!(30));
/// assert!(age.edit_control().validate(&json!(null)));
/// assert!(!NumberControl::new(false).edit_control().validate(&json!(null)));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberControl {
    optional: bool,
}

impl NumberControl {
    pub fn new(optional: bool) -> Self {
        Self { optional }
    }
}

fn parse_number(s: &str) -> Option<Number> {
    let s = s.trim();
    if let Ok(n) = s.parse::<i64>() {
        return Some(Number::from(n));
    }
    s.parse::<f64>().ok().and_then(Number::from_f64)
}

impl Control for NumberControl {
    fn optional(&self) -> bool {
        self.optional
    }

    fn default_value(&self) -> Value {
        if self.optional {
            Value::Null
        } else {
            Value::from(0)
        }
    }

    fn construct(&self, raw: &Value) -> Value {
        match raw {
            Value::Number(n) => Value::Number(n.clone()),
            Value::String(s) => parse_number(s)
                .map(Value::Number)
                .unwrap_or_else(|| self.default_value()),
            _ => self.default_value(),
        }
    }

    fn serialize(&self, value: &Value) -> Value {
        value.clone()
    }

    fn render(&self, value: &Value, on_change: &OnChange<'_>) -> View {
        View::Display {
            path: on_change.path(),
            text: display_text(value),
        }
    }

    fn edit_control(&self) -> Box<dyn EditControl> {
        Box::new(NumberEditControl {
            optional: self.optional,
        })
    }

    fn edit(&self, value: &Value) -> Value {
        value.clone()
    }

    fn is_singular(&self) -> bool {
        true
    }
}

/// Editing counterpart of [`NumberControl`].
#[derive(Debug, Clone, Copy)]
pub struct NumberEditControl {
    optional: bool,
}

impl EditControl for NumberEditControl {
    fn optional(&self) -> bool {
        self.optional
    }

    fn validate(&self, value: &Value) -> bool {
        match value {
            Value::Number(_) => true,
            Value::Null => self.optional,
            _ => false,
        }
    }

    fn save(&self, value: &Value) -> Value {
        value.clone()
    }

    fn render(&self, value: &Value, on_change: &OnChange<'_>, is_valid: bool) -> View {
        View::Input {
            path: on_change.path(),
            widget: Widget::Number,
            value: value.clone(),
            valid: is_valid,
        }
    }
}

/// On/off flag. Defaults to `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanControl {
    optional: bool,
}

impl BooleanControl {
    pub fn new(optional: bool) -> Self {
        Self { optional }
    }
}

impl Control for BooleanControl {
    fn optional(&self) -> bool {
        self.optional
    }

    fn default_value(&self) -> Value {
        Value::Bool(false)
    }

    fn construct(&self, raw: &Value) -> Value {
        match raw {
            Value::Bool(b) => Value::Bool(*b),
            Value::String(s) => match s.trim() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => self.default_value(),
            },
            _ => self.default_value(),
        }
    }

    fn serialize(&self, value: &Value) -> Value {
        value.clone()
    }

    fn render(&self, value: &Value, on_change: &OnChange<'_>) -> View {
        View::Display {
            path: on_change.path(),
            text: display_text(value),
        }
    }

    fn edit_control(&self) -> Box<dyn EditControl> {
        Box::new(BooleanEditControl {
            optional: self.optional,
        })
    }

    fn edit(&self, value: &Value) -> Value {
        value.clone()
    }

    fn is_singular(&self) -> bool {
        true
    }
}

/// Editing counterpart of [`BooleanControl`].
#[derive(Debug, Clone, Copy)]
pub struct BooleanEditControl {
    optional: bool,
}

impl EditControl for BooleanEditControl {
    fn optional(&self) -> bool {
        self.optional
    }

    fn validate(&self, value: &Value) -> bool {
        match value {
            Value::Bool(_) => true,
            Value::Null => self.optional,
            _ => false,
        }
    }

    fn save(&self, value: &Value) -> Value {
        value.clone()
    }

    fn render(&self, value: &Value, on_change: &OnChange<'_>, is_valid: bool) -> View {
        View::Input {
            path: on_change.path(),
            widget: Widget::Checkbox,
            value: value.clone(),
            valid: is_valid,
        }
    }
}

/// One of a fixed list of string options.
///
/// Required selects default to their first option, optional ones to `null`.
/// Raw input that is not one of the options falls back to the default.
///
/// # Examples
///
/// ```
/// use control_schema_core::*;
/// use serde_json::json;
///
/// let format = SelectControl::new(vec!["json".into(), "yaml".into()], false).unwrap();
/// assert_eq!(format.default_value(), json!("json"));
/// assert_eq!(format.construct(&json!("yaml")), json!("yaml"));
/// assert_eq!(format.construct(&json!("toml")), json!("json"));
/// assert!(!format.edit_control().validate(&json!("toml")));
/// ```
#[derive(Debug, Clone)]
pub struct SelectControl {
    options: Vec<String>,
    optional: bool,
}

impl SelectControl {
    /// # Errors
    ///
    /// Returns [`SchemaError::EmptyOptions`] or
    /// [`SchemaError::DuplicateOption`] for a broken option list.
    pub fn new(options: Vec<String>, optional: bool) -> Result<Self, SchemaError> {
        validate_options(&options)?;
        Ok(Self { options, optional })
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    fn contains(&self, value: &str) -> bool {
        self.options.iter().any(|option| option == value)
    }
}

impl Control for SelectControl {
    fn optional(&self) -> bool {
        self.optional
    }

    fn default_value(&self) -> Value {
        match self.options.first() {
            Some(first) if !self.optional => Value::String(first.clone()),
            _ => Value::Null,
        }
    }

    fn construct(&self, raw: &Value) -> Value {
        match raw {
            Value::String(s) if self.contains(s) => Value::String(s.clone()),
            _ => self.default_value(),
        }
    }

    fn serialize(&self, value: &Value) -> Value {
        value.clone()
    }

    fn render(&self, value: &Value, on_change: &OnChange<'_>) -> View {
        View::Display {
            path: on_change.path(),
            text: display_text(value),
        }
    }

    fn edit_control(&self) -> Box<dyn EditControl> {
        Box::new(SelectEditControl {
            options: self.options.clone(),
            optional: self.optional,
        })
    }

    fn edit(&self, value: &Value) -> Value {
        value.clone()
    }

    fn is_singular(&self) -> bool {
        true
    }
}

/// Editing counterpart of [`SelectControl`].
#[derive(Debug, Clone)]
pub struct SelectEditControl {
    options: Vec<String>,
    optional: bool,
}

impl EditControl for SelectEditControl {
    fn optional(&self) -> bool {
        self.optional
    }

    fn validate(&self, value: &Value) -> bool {
        match value {
            Value::String(s) => self.options.iter().any(|option| option == s),
            Value::Null => self.optional,
            _ => false,
        }
    }

    fn save(&self, value: &Value) -> Value {
        value.clone()
    }

    fn render(&self, value: &Value, on_change: &OnChange<'_>, is_valid: bool) -> View {
        View::Input {
            path: on_change.path(),
            widget: Widget::Select {
                options: self.options.clone(),
            },
            value: value.clone(),
            valid: is_valid,
        }
    }
}

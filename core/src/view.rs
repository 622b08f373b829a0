//! Render output.
//!
//! Controls do not paint anything. `render` returns a [`View`], a plain
//! description of labeled field rows and leaf widgets that the hosting UI
//! toolkit is responsible for drawing. Every leaf view records the
//! [`FieldPath`] it was rendered at so that an edit made by the user can be
//! routed back through the owning control's `update`.

use std::fmt::Write;

use serde::Serialize;
use serde_json::Value;

use crate::FieldPath;

/// Description of a rendered control tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum View {
    /// One row per field, in field-list order.
    Object { rows: Vec<FieldRow> },
    /// One view per list item.
    List { path: FieldPath, items: Vec<View> },
    /// Read-only leaf.
    Display { path: FieldPath, text: String },
    /// Editable leaf with its own validity flag.
    Input {
        path: FieldPath,
        widget: Widget,
        value: Value,
        valid: bool,
    },
}

/// A field title paired with the child's rendered view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldRow {
    pub field: String,
    pub title: String,
    pub view: View,
}

/// Kind of input a leaf edit view asks the host to draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Widget {
    Text,
    Number,
    Checkbox,
    Select { options: Vec<String> },
    Duration,
}

impl View {
    /// Returns the row for `field` if this is an object view.
    pub fn row(&self, field: &str) -> Option<&FieldRow> {
        match self {
            View::Object { rows } => rows.iter().find(|row| row.field == field),
            _ => None,
        }
    }

    /// Leaf views (`Display` and `Input`) in render order.
    pub fn leaves(&self) -> Vec<&View> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a View>) {
        match self {
            View::Object { rows } => rows.iter().for_each(|row| row.view.collect_leaves(out)),
            View::List { items, .. } => items.iter().for_each(|item| item.collect_leaves(out)),
            View::Display { .. } | View::Input { .. } => out.push(self),
        }
    }

    /// Finds the leaf rendered at `path`.
    pub fn find(&self, path: &FieldPath) -> Option<&View> {
        self.leaves().into_iter().find(|leaf| leaf.path() == Some(path))
    }

    /// Path of a leaf or list view. Object views have no path of their own.
    pub fn path(&self) -> Option<&FieldPath> {
        match self {
            View::Object { .. } => None,
            View::List { path, .. } | View::Display { path, .. } | View::Input { path, .. } => {
                Some(path)
            }
        }
    }

    /// `false` if any input leaf is flagged invalid.
    pub fn all_valid(&self) -> bool {
        self.leaves()
            .iter()
            .all(|leaf| !matches!(leaf, View::Input { valid: false, .. }))
    }

    /// Indented plain-text rendering, one leaf per line.
    ///
    /// # Examples
    ///
    /// ```
    /// use control_schema_core::*;
    /// use serde_json::json;
    ///
    /// let person = ObjectControl::builder()
    ///     .field("name", "Name", TextControl::new(false))
    ///     .build()
    ///     .unwrap();
    ///
    /// let view = person.render(&json!({ "name": "Ada" }), &OnChange::root());
    /// assert_eq!(view.render_text(), "Name: Ada\n");
    /// ```
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        self.write_text(&mut out, 0);
        out
    }

    fn write_text(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        match self {
            View::Object { rows } => {
                for row in rows {
                    if row.view.is_leaf() {
                        let _ = writeln!(out, "{indent}{}: {}", row.title, row.view.leaf_text());
                    } else {
                        let _ = writeln!(out, "{indent}{}:", row.title);
                        row.view.write_text(out, depth + 1);
                    }
                }
            }
            View::List { items, .. } => {
                for item in items {
                    if item.is_leaf() {
                        let _ = writeln!(out, "{indent}- {}", item.leaf_text());
                    } else {
                        let _ = writeln!(out, "{indent}-");
                        item.write_text(out, depth + 1);
                    }
                }
            }
            View::Display { .. } | View::Input { .. } => {
                let _ = writeln!(out, "{indent}{}", self.leaf_text());
            }
        }
    }

    fn is_leaf(&self) -> bool {
        matches!(self, View::Display { .. } | View::Input { .. })
    }

    fn leaf_text(&self) -> String {
        match self {
            View::Display { text, .. } => text.clone(),
            View::Input { value, valid, .. } => {
                let marker = if *valid { "" } else { " (invalid)" };
                format!("[{}]{marker}", display_text(value))
            }
            _ => String::new(),
        }
    }
}

/// Human readable text for a leaf value. `null` renders as empty text.
pub fn display_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn input(path: &str, value: Value, valid: bool) -> View {
        View::Input {
            path: FieldPath::parse(path),
            widget: Widget::Text,
            value,
            valid,
        }
    }

    #[test]
    fn test_render_text_nested() {
        let view = View::Object {
            rows: vec![
                FieldRow {
                    field: "name".into(),
                    title: "Name".into(),
                    view: input("name", json!(""), false),
                },
                FieldRow {
                    field: "tags".into(),
                    title: "Tags".into(),
                    view: View::List {
                        path: FieldPath::parse("tags"),
                        items: vec![View::Display {
                            path: FieldPath::parse("tags.0"),
                            text: "rust".into(),
                        }],
                    },
                },
            ],
        };

        assert_eq!(view.render_text(), "Name: [] (invalid)\nTags:\n  - rust\n");
        assert!(!view.all_valid());
    }

    #[test]
    fn test_find_leaf_by_path() {
        let view = View::Object {
            rows: vec![FieldRow {
                field: "age".into(),
                title: "Age".into(),
                view: input("age", json!(30), true),
            }],
        };

        let leaf = view.find(&FieldPath::parse("age")).unwrap();
        assert!(matches!(leaf, View::Input { valid: true, .. }));
        assert!(view.find(&FieldPath::parse("name")).is_none());
        assert!(view.row("age").is_some());
    }

    #[test]
    fn test_display_text() {
        assert_eq!(display_text(&Value::Null), "");
        assert_eq!(display_text(&json!(1.5)), "1.5");
        assert_eq!(display_text(&json!(true)), "true");
        assert_eq!(display_text(&json!("x")), "x");
    }
}

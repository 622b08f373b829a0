//! Homogeneous lists: a collection composite over a single item control.
//!
//! Works like the object control, but item-wise: every operation maps the
//! item control over the list, and rendering gives each item its own
//! [`OnChange`] link keyed by index.

use serde_json::Value;

use crate::update::replace_item;
use crate::{Control, EditControl, OnChange, View};

fn items(value: &Value) -> &[Value] {
    match value {
        Value::Array(items) => items,
        _ => &[],
    }
}

/// List of values sharing one item control. Defaults to an empty list.
///
/// Required lists must hold at least one item to validate.
///
/// # Examples
///
/// ```
/// use control_schema_core::*;
/// use serde_json::json;
///
/// let tags = ListControl::new(TextControl::new(false), true);
/// assert_eq!(tags.default_value(), json!([]));
/// assert_eq!(tags.construct(&json!(["a", 1])), json!(["a", "1"]));
/// assert!(!tags.is_singular());
///
/// let editor = tags.edit_control();
/// assert!(editor.validate(&json!(["a", "b"])));
/// assert!(!editor.validate(&json!(["a", ""])));
/// ```
#[derive(Debug)]
pub struct ListControl {
    item: Box<dyn Control>,
    optional: bool,
}

impl ListControl {
    pub fn new(item: impl Control + 'static, optional: bool) -> Self {
        Self::boxed(Box::new(item), optional)
    }

    pub fn boxed(item: Box<dyn Control>, optional: bool) -> Self {
        Self { item, optional }
    }

    pub fn item(&self) -> &dyn Control {
        self.item.as_ref()
    }

    fn map_items(&self, value: &Value, op: impl Fn(&dyn Control, &Value) -> Value) -> Value {
        Value::Array(
            items(value)
                .iter()
                .map(|item| op(self.item.as_ref(), item))
                .collect(),
        )
    }
}

fn parse_index(segment: &str, len: usize) -> Option<usize> {
    segment.parse::<usize>().ok().filter(|index| *index <= len)
}

/// Routes `path` into the item it names and replaces that item with what
/// `update_child` returns for the rest of the path.
fn update_item(
    value: &Value,
    path: &[String],
    new_value: Value,
    update_child: impl FnOnce(&Value, &[String], Value) -> Value,
) -> Value {
    let Some((head, rest)) = path.split_first() else {
        return new_value;
    };
    let current = items(value);
    let Some(index) = parse_index(head, current.len()) else {
        tracing::warn!(segment = %head, len = current.len(), "update targets missing list item");
        return value.clone();
    };
    let item = current.get(index).unwrap_or(&crate::control::NULL);
    replace_item(value, index, update_child(item, rest, new_value))
}

impl Control for ListControl {
    fn optional(&self) -> bool {
        self.optional
    }

    fn default_value(&self) -> Value {
        Value::Array(Vec::new())
    }

    fn construct(&self, raw: &Value) -> Value {
        self.map_items(raw, |control, item| control.construct(item))
    }

    fn serialize(&self, value: &Value) -> Value {
        self.map_items(value, |control, item| control.serialize(item))
    }

    fn render(&self, value: &Value, on_change: &OnChange<'_>) -> View {
        let views = items(value)
            .iter()
            .enumerate()
            .map(|(index, item)| self.item.render(item, &on_change.item(index, value)))
            .collect();
        View::List {
            path: on_change.path(),
            items: views,
        }
    }

    fn edit_control(&self) -> Box<dyn EditControl> {
        Box::new(ListEditControl {
            item: self.item.edit_control(),
            optional: self.optional,
        })
    }

    fn edit(&self, value: &Value) -> Value {
        self.map_items(value, |control, item| control.edit(item))
    }

    fn is_singular(&self) -> bool {
        false
    }

    /// Index `len` appends a new item.
    fn update(&self, value: &Value, path: &[String], new_value: Value) -> Value {
        update_item(value, path, new_value, |item, rest, new_value| {
            self.item.update(item, rest, new_value)
        })
    }
}

/// Editing counterpart of [`ListControl`].
#[derive(Debug)]
pub struct ListEditControl {
    item: Box<dyn EditControl>,
    optional: bool,
}

impl EditControl for ListEditControl {
    fn optional(&self) -> bool {
        self.optional
    }

    fn validate(&self, value: &Value) -> bool {
        match value {
            Value::Array(items) => {
                let items_valid = items
                    .iter()
                    .fold(true, |valid, item| self.item.validate(item) && valid);
                items_valid && (self.optional || !items.is_empty())
            }
            Value::Null => self.optional,
            _ => false,
        }
    }

    fn save(&self, value: &Value) -> Value {
        Value::Array(items(value).iter().map(|item| self.item.save(item)).collect())
    }

    fn render(&self, value: &Value, on_change: &OnChange<'_>, _is_valid: bool) -> View {
        let views = items(value)
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let valid = self.item.validate(item);
                self.item.render(item, &on_change.item(index, value), valid)
            })
            .collect();
        View::List {
            path: on_change.path(),
            items: views,
        }
    }

    fn update(&self, value: &Value, path: &[String], new_value: Value) -> Value {
        update_item(value, path, new_value, |item, rest, new_value| {
            self.item.update(item, rest, new_value)
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{NumberControl, ObjectControl, TextControl};

    #[test]
    fn test_required_list_rejects_empty() {
        let editor = ListControl::new(TextControl::new(false), false).edit_control();
        assert!(!editor.validate(&json!([])));
        assert!(!editor.validate(&Value::Null));
        assert!(editor.validate(&json!(["x"])));
    }

    #[test]
    fn test_construct_non_array_is_empty() {
        let list = ListControl::new(NumberControl::new(false), true);
        assert_eq!(list.construct(&json!("nope")), json!([]));
    }

    #[test]
    fn test_update_appends_and_replaces() {
        let list = ListControl::new(NumberControl::new(false), true);
        let values = json!([1, 2]);
        assert_eq!(list.update(&values, &["2".into()], json!(3)), json!([1, 2, 3]));
        assert_eq!(list.update(&values, &["0".into()], json!(9)), json!([9, 2]));
        assert_eq!(list.update(&values, &["7".into()], json!(9)), values);
        assert_eq!(values, json!([1, 2]));
    }

    #[test]
    fn test_editor_update_matches_control() {
        let list = ListControl::new(NumberControl::new(false), true);
        let editor = list.edit_control();
        let values = json!([1, 2]);
        for (segment, value) in [("2", json!(3)), ("0", json!(9)), ("7", json!(9)), ("x", json!(0))] {
            let path = [segment.to_string()];
            assert_eq!(
                editor.update(&values, &path, value.clone()),
                list.update(&values, &path, value)
            );
        }
    }

    #[test]
    fn test_list_of_objects_renders_item_paths() {
        let contact = ObjectControl::builder()
            .field("email", "Email", TextControl::new(false))
            .build()
            .unwrap();
        let list = ListControl::new(contact, true);
        let values = json!([{ "email": "a@example.com" }, { "email": "b@example.com" }]);

        let view = list.render(&values, &OnChange::root());
        let paths: Vec<String> = view
            .leaves()
            .iter()
            .filter_map(|leaf| leaf.path().map(ToString::to_string))
            .collect();
        assert_eq!(paths, vec!["0.email", "1.email"]);
    }

    #[test]
    fn test_edit_render_marks_invalid_item() {
        let editor = ListControl::new(TextControl::new(false), true).edit_control();
        let view = editor.render(&json!(["ok", ""]), &OnChange::root(), true);
        assert!(!view.all_valid());
    }
}

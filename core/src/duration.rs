//! Durations, the one leaf whose raw, typed and edited shapes differ.
//!
//! * raw (serialized) form: compact human text such as `"1h30m"`
//! * typed form: whole seconds as a JSON number
//! * edited form: the human text again, so the user edits `"1h30m"` and
//!   [`EditControl::save`] turns it back into seconds
//!
//! Accepted text: unit sequences (`1d2h`, `90m`, `45s`, a bare number is
//! seconds) and clock notation (`mm:ss`, `hh:mm:ss`).

use serde_json::Value;

use crate::{Control, EditControl, OnChange, View, Widget};

/// Parses duration text into whole seconds.
///
/// # Examples
///
/// ```
/// use control_schema_core::parse_duration;
///
/// assert_eq!(parse_duration("1h30m"), Some(5400));
/// assert_eq!(parse_duration("01:02:03"), Some(3723));
/// assert_eq!(parse_duration("45"), Some(45));
/// assert_eq!(parse_duration("1x"), None);
/// ```
pub fn parse_duration(text: &str) -> Option<u64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if text.contains(':') {
        return parse_clock(text);
    }

    let mut total: u64 = 0;
    let mut digits = String::new();

    for c in text.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let unit = match c {
            'd' => 86_400,
            'h' => 3_600,
            'm' => 60,
            's' => 1,
            _ => return None,
        };
        if digits.is_empty() {
            return None;
        }
        let amount: u64 = digits.parse().ok()?;
        total = total.checked_add(amount.checked_mul(unit)?)?;
        digits.clear();
    }

    if !digits.is_empty() {
        let amount: u64 = digits.parse().ok()?;
        total = total.checked_add(amount)?;
    }

    Some(total)
}

fn parse_clock(text: &str) -> Option<u64> {
    let parts = text
        .split(':')
        .map(|part| part.parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;

    match parts.as_slice() {
        [minutes, seconds] if *seconds < 60 => minutes.checked_mul(60)?.checked_add(*seconds),
        [hours, minutes, seconds] if *minutes < 60 && *seconds < 60 => hours
            .checked_mul(3_600)?
            .checked_add(minutes * 60 + seconds),
        _ => None,
    }
}

/// Formats seconds as compact duration text.
///
/// # Examples
///
/// ```
/// use control_schema_core::format_duration;
///
/// assert_eq!(format_duration(5400), "1h30m");
/// assert_eq!(format_duration(90_061), "1d1h1m1s");
/// assert_eq!(format_duration(0), "0s");
/// ```
pub fn format_duration(seconds: u64) -> String {
    if seconds == 0 {
        return "0s".to_string();
    }

    let units = [(86_400, 'd'), (3_600, 'h'), (60, 'm'), (1, 's')];
    let mut rest = seconds;
    let mut out = String::new();

    for (size, suffix) in units {
        let amount = rest / size;
        if amount > 0 {
            out.push_str(&amount.to_string());
            out.push(suffix);
            rest %= size;
        }
    }

    out
}

/// Duration leaf. Optional durations default to `null`, required ones to
/// zero seconds.
///
/// # Examples
///
/// ```
/// use control_schema_core::*;
/// use serde_json::json;
///
/// let timeout = DurationControl::new(false);
/// let typed = timeout.construct(&json!("2m"));
/// assert_eq!(typed, json!(120));
/// assert_eq!(timeout.serialize(&typed), json!("2m"));
///
/// let editor = timeout.edit_control();
/// let edited = timeout.edit(&typed);
/// assert_eq!(edited, json!("2m"));
/// assert!(editor.validate(&json!("2m30s")));
/// assert_eq!(editor.save(&json!("2m30s")), json!(150));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DurationControl {
    optional: bool,
}

impl DurationControl {
    pub fn new(optional: bool) -> Self {
        Self { optional }
    }
}

fn seconds(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => parse_duration(s),
        _ => None,
    }
}

impl Control for DurationControl {
    fn optional(&self) -> bool {
        self.optional
    }

    fn default_value(&self) -> Value {
        if self.optional {
            Value::Null
        } else {
            Value::from(0u64)
        }
    }

    fn construct(&self, raw: &Value) -> Value {
        seconds(raw)
            .map(Value::from)
            .unwrap_or_else(|| self.default_value())
    }

    fn serialize(&self, value: &Value) -> Value {
        match seconds(value) {
            Some(secs) => Value::String(format_duration(secs)),
            None => Value::Null,
        }
    }

    fn render(&self, value: &Value, on_change: &OnChange<'_>) -> View {
        View::Display {
            path: on_change.path(),
            text: seconds(value).map(format_duration).unwrap_or_default(),
        }
    }

    fn edit_control(&self) -> Box<dyn EditControl> {
        Box::new(DurationEditControl {
            optional: self.optional,
        })
    }

    fn edit(&self, value: &Value) -> Value {
        self.serialize(value)
    }

    fn is_singular(&self) -> bool {
        true
    }
}

/// Editing counterpart of [`DurationControl`]. Edited values are text.
#[derive(Debug, Clone, Copy)]
pub struct DurationEditControl {
    optional: bool,
}

impl EditControl for DurationEditControl {
    fn optional(&self) -> bool {
        self.optional
    }

    fn validate(&self, value: &Value) -> bool {
        match value {
            Value::Null => self.optional,
            Value::String(s) if s.trim().is_empty() => self.optional,
            other => seconds(other).is_some(),
        }
    }

    fn save(&self, value: &Value) -> Value {
        seconds(value).map(Value::from).unwrap_or(Value::Null)
    }

    fn render(&self, value: &Value, on_change: &OnChange<'_>, is_valid: bool) -> View {
        View::Input {
            path: on_change.path(),
            widget: Widget::Duration,
            value: value.clone(),
            valid: is_valid,
        }
    }
}

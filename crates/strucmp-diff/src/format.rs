//! Rendering of values for difference messages.
//!
//! Nothing here takes part in comparison; these helpers only build the text
//! carried by [`DifferenceRecord`](crate::DifferenceRecord)s.

use std::borrow::Cow;

use strucmp_types::Value;

/// Maximum characters of a string shown inside a type description.
pub const TYPE_DETAIL_MAX_CHARS: usize = 50;

/// Maximum characters shown for a rendered value.
pub const VALUE_MAX_CHARS: usize = 50;

/// Maximum characters shown in blank-value warnings.
pub const SPECIAL_VALUE_MAX_CHARS: usize = 30;

/// Cut `s` to at most `max_chars` characters, appending `...` when cut.
pub fn truncate(s: &str, max_chars: usize) -> Cow<'_, str> {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => Cow::Owned(format!("{}...", &s[..end])),
        None => Cow::Borrowed(s),
    }
}

/// Render a float the way it reads in source data: integral values keep a
/// trailing `.0`.
pub fn float_repr(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

/// Describe a value's tag, with a preview for scalars and a size for
/// containers: `null`, `bool`, `int(3)`, `float(2.5)`, `str('abc')`,
/// `list[4]`, `map[2]`.
pub fn type_detail(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "bool".to_string(),
        Value::Int(i) => format!("int({i})"),
        Value::Float(f) => format!("float({})", float_repr(*f)),
        Value::Str(s) => format!("str('{}')", truncate(s, TYPE_DETAIL_MAX_CHARS)),
        Value::List(items) => format!("list[{}]", items.len()),
        Value::Map(map) => format!("map[{}]", map.len()),
    }
}

/// Render a value for a value-changed message.
pub fn format_value(value: &Value) -> String {
    format_value_capped(value, VALUE_MAX_CHARS)
}

pub(crate) fn format_value_capped(value: &Value, max_chars: usize) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => float_repr(*f),
        Value::Str(s) => format!("'{}'", truncate(s, max_chars)),
        Value::List(_) | Value::Map(_) => match serde_json::to_string(value) {
            Ok(json) => truncate(&json, max_chars).into_owned(),
            Err(_) => type_detail(value),
        },
    }
}

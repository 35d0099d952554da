//! Display truncation for sampled values

use serde_json::{Map, Value};

/// Shorten long strings and collapse deep containers.
///
/// Strings longer than `max_string_chars` are cut and end with `…` (`0`
/// keeps every string whole). Containers nested deeper than `max_depth`
/// become `"{…N keys}"` or `"[…N items]"`; the value itself is depth `0`.
#[must_use]
pub fn truncate_value(value: &Value, max_string_chars: usize, max_depth: usize) -> Value {
    truncate_at(value, max_string_chars, max_depth, 0)
}

fn truncate_at(value: &Value, max_string_chars: usize, max_depth: usize, depth: usize) -> Value {
    match value {
        Value::String(text) if max_string_chars > 0 && text.chars().count() > max_string_chars => {
            let mut clipped: String = text.chars().take(max_string_chars).collect();
            clipped.push('…');
            Value::String(clipped)
        }
        Value::Object(map) if depth > max_depth => Value::String(format!("{{…{} keys}}", map.len())),
        Value::Array(items) if depth > max_depth => Value::String(format!("[…{} items]", items.len())),
        Value::Object(map) => {
            let truncated: Map<String, Value> = map
                .iter()
                .map(|(key, child)| {
                    (key.clone(), truncate_at(child, max_string_chars, max_depth, depth + 1))
                })
                .collect();
            Value::Object(truncated)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|child| truncate_at(child, max_string_chars, max_depth, depth + 1))
                .collect(),
        ),
        other => other.clone(),
    }
}

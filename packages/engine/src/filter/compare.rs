//! Value comparison used by filter evaluation

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use super::condition::FilterOperator;

/// Apply `operator` to one candidate. `None` means the path matched nothing.
pub(super) fn compare(candidate: Option<&Value>, operator: FilterOperator, literal: &Value) -> bool {
    let Some(value) = candidate else {
        return operator == FilterOperator::NotEqual;
    };
    match operator {
        FilterOperator::Equal => values_equal(value, literal),
        FilterOperator::NotEqual => !values_equal(value, literal),
        FilterOperator::Greater => ordering(value, literal).is_some_and(Ordering::is_gt),
        FilterOperator::Less => ordering(value, literal).is_some_and(Ordering::is_lt),
        FilterOperator::GreaterEq => ordering(value, literal).is_some_and(Ordering::is_ge),
        FilterOperator::LessEq => ordering(value, literal).is_some_and(Ordering::is_le),
        FilterOperator::Contains => contains(value, literal),
        FilterOperator::StartsWith => match (value, literal) {
            (Value::String(s), Value::String(prefix)) => s.starts_with(prefix.as_str()),
            _ => false,
        },
        FilterOperator::EndsWith => match (value, literal) {
            (Value::String(s), Value::String(suffix)) => s.ends_with(suffix.as_str()),
            _ => false,
        },
        FilterOperator::Exists => !value.is_null(),
    }
}

/// Exact, type-sensitive equality; numbers compare by value so `1` equals `1.0`.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => a == b,
    }
}

/// Numeric ordering first, then dates; `None` when neither applies.
pub fn ordering(a: &Value, b: &Value) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
        return x.partial_cmp(&y);
    }
    let (x, y) = (as_timestamp_millis(a)?, as_timestamp_millis(b)?);
    Some(x.cmp(&y))
}

fn contains(value: &Value, literal: &Value) -> bool {
    match value {
        Value::String(s) => match literal {
            Value::String(needle) => s.contains(needle.as_str()),
            Value::Number(n) => s.contains(&n.to_string()),
            Value::Bool(b) => s.contains(&b.to_string()),
            _ => false,
        },
        Value::Array(items) => items.iter().any(|item| values_equal(item, literal)),
        _ => false,
    }
}

/// Finite number, or a string that parses as one.
pub fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// Milliseconds since the Unix epoch for date strings or epoch-millisecond numbers.
fn as_timestamp_millis(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            DateTime::from_timestamp_millis(millis).map(|dt| dt.timestamp_millis())
        }
        Value::String(s) => parse_date(s.trim()),
        _ => None,
    }
}

fn parse_date(text: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc().timestamp_millis());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt.and_utc().timestamp_millis());
    }
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn numbers_compare_numerically_across_representations() {
        assert!(values_equal(&json!(1), &json!(1.0)));
        assert!(!values_equal(&json!(1), &json!("1")));
        assert_eq!(ordering(&json!("12"), &json!(9)), Some(Ordering::Greater));
    }

    #[test]
    fn dates_order_by_instant() {
        assert_eq!(
            ordering(&json!("2024-03-01"), &json!("2024-02-28T23:59:59Z")),
            Some(Ordering::Greater)
        );
        assert_eq!(
            ordering(&json!("2024-01-01T00:00:00.000"), &json!(1_704_067_200_000_i64)),
            Some(Ordering::Equal)
        );
        assert_eq!(ordering(&json!("soon"), &json!("2024-01-01")), None);
    }

    #[test]
    fn missing_candidates_only_satisfy_not_equal() {
        assert!(compare(None, FilterOperator::NotEqual, &json!(1)));
        assert!(!compare(None, FilterOperator::Equal, &Value::Null));
        assert!(!compare(None, FilterOperator::Exists, &Value::Null));
    }

    #[test]
    fn contains_handles_strings_and_arrays() {
        assert!(compare(Some(&json!("Player:12")), FilterOperator::Contains, &json!("yer")));
        assert!(compare(Some(&json!(["a", 2])), FilterOperator::Contains, &json!(2)));
        assert!(!compare(Some(&json!({"a": 1})), FilterOperator::Contains, &json!("a")));
    }

    #[test]
    fn exists_rejects_null() {
        assert!(!compare(Some(&Value::Null), FilterOperator::Exists, &Value::Null));
        assert!(compare(Some(&json!(0)), FilterOperator::Exists, &Value::Null));
    }
}

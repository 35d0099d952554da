//! Filter predicates
//!
//! A filter is a tiny comparison expression such as `payload.level >= 10` or
//! `entityId startsWith Player:`. Its path may select several values through
//! wildcards; the filter holds if ANY of them satisfies the comparison.

mod compare;
mod condition;
mod set;

use serde_json::Value;

pub use compare::{as_number, ordering, values_equal};
pub use condition::{FilterCondition, FilterOperator, FilterSide, parse_literal, split_side};
pub use set::{CONDITION_SEPARATOR, FilterSet, resolve_filter};

/// Does `value` satisfy `condition`?
///
/// The condition's side is ignored; see [`matches_pair`] for two inputs.
#[must_use]
pub fn matches(value: &Value, condition: &FilterCondition) -> bool {
    let candidates = condition.path.evaluate(value);
    if candidates.is_empty() {
        return compare::compare(None, condition.operator, &condition.literal);
    }
    candidates
        .into_iter()
        .any(|candidate| compare::compare(Some(candidate), condition.operator, &condition.literal))
}

/// Evaluate a two-sided condition against the input its side selects.
#[must_use]
pub fn matches_pair(left: &Value, right: &Value, condition: &FilterCondition) -> bool {
    match condition.side {
        FilterSide::Left => matches(left, condition),
        FilterSide::Right => matches(right, condition),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn check(text: &str, value: &Value) -> bool {
        matches(value, &FilterCondition::parse(text).expect("valid filter"))
    }

    #[test]
    fn level_filter_selects_higher_levels() {
        let low = json!({"entityId": "Player:1", "payload": {"level": 10}});
        let high = json!({"entityId": "Player:2", "payload": {"level": 20}});
        assert!(!check("payload.level > 10", &low));
        assert!(check("payload.level > 10", &high));
    }

    #[test]
    fn any_wildcard_match_is_enough() {
        let value = json!({"items": [{"lvl": 1}, {"lvl": 50}]});
        assert!(check("items[*].lvl >= 50", &value));
        assert!(!check("items[*].lvl > 50", &value));
    }

    #[test]
    fn missing_paths_satisfy_only_not_equal() {
        let value = json!({"payload": {}});
        assert!(check("payload.guild != x", &value));
        assert!(!check("payload.guild = x", &value));
        assert!(!check("payload.guild exists", &value));
    }

    #[test]
    fn equality_is_type_sensitive() {
        let value = json!({"code": "10"});
        assert!(!check("code = 10", &value));
        assert!(check("code = '10'", &value));
    }

    #[test]
    fn pair_conditions_read_their_side() {
        let condition = FilterCondition::parse_two_sided("b.payload.class = Knight").expect("valid");
        let left = json!({"payload": {"class": "Mage"}});
        let right = json!({"payload": {"class": "Knight"}});
        assert!(matches_pair(&left, &right, &condition));
        assert!(!matches_pair(&right, &left, &condition));
    }
}

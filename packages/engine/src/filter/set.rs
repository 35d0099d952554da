//! AND-combined filter conditions

use serde_json::Value;

use super::condition::FilterCondition;
use super::{matches, matches_pair};
use crate::error::{Error, Result};

/// Separator for several conditions in a single expression.
pub const CONDITION_SEPARATOR: &str = "&&";

/// Resolve one filter expression.
///
/// Permissive mode logs unparseable text and returns `Ok(None)`, leaving the
/// query unfiltered. Strict mode rejects it.
///
/// # Errors
///
/// Returns [`Error::InvalidFilter`] in strict mode when `text` does not parse.
pub fn resolve_filter(text: &str, strict: bool) -> Result<Option<FilterCondition>> {
    resolve(text, strict, false)
}

fn resolve(text: &str, strict: bool, two_sided: bool) -> Result<Option<FilterCondition>> {
    let parsed = if two_sided {
        FilterCondition::parse_two_sided(text)
    } else {
        FilterCondition::parse(text)
    };
    match parsed {
        Some(condition) => Ok(Some(condition)),
        None if strict => Err(Error::InvalidFilter(text.trim().to_string())),
        None => {
            tracing::warn!(
                target: "entscan::filter",
                expression = %text.trim(),
                "unparseable filter ignored; continuing without it"
            );
            Ok(None)
        }
    }
}

/// Conditions that must all hold for an element to pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    conditions: Vec<FilterCondition>,
    ignored: Vec<String>,
}

impl FilterSet {
    /// A set that accepts everything.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse every expression, splitting each on `&&`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFilter`] in strict mode for the first
    /// expression that does not parse.
    pub fn parse<I, S>(expressions: I, strict: bool) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::build(expressions, strict, false)
    }

    /// Like [`FilterSet::parse`], accepting `a.` / `b.` side prefixes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFilter`] in strict mode.
    pub fn parse_two_sided<I, S>(expressions: I, strict: bool) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::build(expressions, strict, true)
    }

    fn build<I, S>(expressions: I, strict: bool, two_sided: bool) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for expression in expressions {
            for part in expression.as_ref().split(CONDITION_SEPARATOR) {
                if part.trim().is_empty() {
                    continue;
                }
                match resolve(part, strict, two_sided)? {
                    Some(condition) => set.conditions.push(condition),
                    None => set.ignored.push(part.trim().to_string()),
                }
            }
        }
        Ok(set)
    }

    #[inline]
    #[must_use]
    pub fn conditions(&self) -> &[FilterCondition] {
        &self.conditions
    }

    /// Expressions dropped by permissive parsing.
    #[inline]
    #[must_use]
    pub fn ignored(&self) -> &[String] {
        &self.ignored
    }

    /// True if any supplied expression was dropped.
    #[inline]
    #[must_use]
    pub fn filter_ignored(&self) -> bool {
        !self.ignored.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    #[must_use]
    pub fn matches(&self, value: &Value) -> bool {
        self.conditions.iter().all(|condition| matches(value, condition))
    }

    #[must_use]
    pub fn matches_pair(&self, left: &Value, right: &Value) -> bool {
        self.conditions
            .iter()
            .all(|condition| matches_pair(left, right, condition))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn all_conditions_must_hold() {
        let set = FilterSet::parse(["payload.level > 5 && entityId startsWith Player:"], false)
            .expect("permissive");
        assert_eq!(set.conditions().len(), 2);
        assert!(set.matches(&json!({"entityId": "Player:1", "payload": {"level": 6}})));
        assert!(!set.matches(&json!({"entityId": "Guild:1", "payload": {"level": 6}})));
    }

    #[test]
    fn permissive_mode_records_ignored_expressions() {
        let set = FilterSet::parse(["not a filter", "payload.level = 1"], false).expect("permissive");
        assert!(set.filter_ignored());
        assert_eq!(set.ignored(), ["not a filter"]);
        assert_eq!(set.conditions().len(), 1);
    }

    #[test]
    fn strict_mode_rejects_unparseable_expressions() {
        let err = FilterSet::parse(["not a filter"], true).expect_err("strict");
        assert!(matches!(err, Error::InvalidFilter(text) if text == "not a filter"));
        assert!(resolve_filter("nonsense", true).is_err());
        assert!(resolve_filter("nonsense", false).expect("permissive").is_none());
    }

    #[test]
    fn empty_set_accepts_everything() {
        let set = FilterSet::empty();
        assert!(set.matches(&Value::Null));
        assert!(set.matches_pair(&Value::Null, &Value::Null));
    }

    #[test]
    fn two_sided_sets_route_conditions() {
        let set = FilterSet::parse_two_sided(["a.level > 1 && b.kind = knight"], true).expect("strict");
        assert!(set.matches_pair(&json!({"level": 2}), &json!({"kind": "knight"})));
        assert!(!set.matches_pair(&json!({"level": 2}), &json!({"kind": "mage"})));
    }
}

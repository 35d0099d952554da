//! Filter condition grammar: `<path> <op> <literal>`

use std::fmt;

use serde_json::{Number, Value};

use crate::path::PathExpression;

/// Comparison operator of a [`FilterCondition`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    GreaterEq,
    LessEq,
    NotEqual,
    Equal,
    Greater,
    Less,
    Contains,
    StartsWith,
    EndsWith,
    Exists,
}

impl FilterOperator {
    /// Order in which operators are tried. Compound operators come before the
    /// shorter operators they contain.
    pub const PRECEDENCE: [FilterOperator; 10] = [
        FilterOperator::GreaterEq,
        FilterOperator::LessEq,
        FilterOperator::NotEqual,
        FilterOperator::Equal,
        FilterOperator::Greater,
        FilterOperator::Less,
        FilterOperator::Contains,
        FilterOperator::StartsWith,
        FilterOperator::EndsWith,
        FilterOperator::Exists,
    ];

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            FilterOperator::GreaterEq => ">=",
            FilterOperator::LessEq => "<=",
            FilterOperator::NotEqual => "!=",
            FilterOperator::Equal => "=",
            FilterOperator::Greater => ">",
            FilterOperator::Less => "<",
            FilterOperator::Contains => "contains",
            FilterOperator::StartsWith => "startsWith",
            FilterOperator::EndsWith => "endsWith",
            FilterOperator::Exists => "exists",
        }
    }

    #[inline]
    fn is_word(self) -> bool {
        matches!(
            self,
            FilterOperator::Contains
                | FilterOperator::StartsWith
                | FilterOperator::EndsWith
                | FilterOperator::Exists
        )
    }

    /// Split `text` around this operator, locating it in `scan` (see
    /// [`operator_scan`]).
    fn split<'t>(self, text: &'t str, scan: &str) -> Option<(&'t str, &'t str)> {
        let symbol = self.symbol();
        let position = if self.is_word() {
            find_word(scan, symbol)?
        } else {
            scan.find(symbol)?
        };
        Some((&text[..position], &text[position + symbol.len()..]))
    }
}

/// Position of `word` delimited by whitespace on the left and whitespace or
/// end of text on the right.
fn find_word(haystack: &str, word: &str) -> Option<usize> {
    haystack.match_indices(word).map(|(i, _)| i).find(|&i| {
        let before = haystack[..i].chars().next_back();
        let after = haystack[i + word.len()..].chars().next();
        before.is_some_and(char::is_whitespace) && after.is_none_or(char::is_whitespace)
    })
}

/// The part of `text` an operator may appear in, byte-aligned with `text`.
///
/// Scanning stops at the first quote outside brackets, where a quoted literal
/// begins. Bracketed path segments such as `['$type']` are masked with `_`.
fn operator_scan(text: &str) -> String {
    let mut scan = Vec::with_capacity(text.len());
    let mut depth = 0usize;
    let mut quote = None;
    for &byte in text.as_bytes() {
        let inside = depth > 0;
        match (quote, byte) {
            (Some(open), _) if byte == open => quote = None,
            (Some(_), _) => {}
            (None, b'[') => depth += 1,
            (None, b']') => depth = depth.saturating_sub(1),
            (None, b'"' | b'\'') if inside => quote = Some(byte),
            (None, b'"' | b'\'') => break,
            _ => {}
        }
        scan.push(if inside || depth > 0 { b'_' } else { byte });
    }
    String::from_utf8_lossy(&scan).into_owned()
}

/// Which input a two-sided condition reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterSide {
    /// The primary (`a.`) input; also used when no prefix is given
    #[default]
    Left,
    /// The secondary (`b.`) input
    Right,
}

/// Strip an `a.` / `b.` side prefix from a path.
#[must_use]
pub fn split_side(text: &str) -> (FilterSide, &str) {
    if let Some(rest) = text.strip_prefix("a.") {
        (FilterSide::Left, rest)
    } else if let Some(rest) = text.strip_prefix("b.") {
        (FilterSide::Right, rest)
    } else {
        (FilterSide::Left, text)
    }
}

/// A single parsed comparison
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCondition {
    pub side: FilterSide,
    pub path: PathExpression,
    pub operator: FilterOperator,
    /// Coerced literal; `Null` for `exists`
    pub literal: Value,
}

impl FilterCondition {
    /// Parse a single-input condition.
    ///
    /// Returns `None` if no operator is recognized or the path is invalid.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        Self::parse_inner(text, false)
    }

    /// Parse a condition whose path may carry an `a.` or `b.` side prefix.
    #[must_use]
    pub fn parse_two_sided(text: &str) -> Option<Self> {
        Self::parse_inner(text, true)
    }

    fn parse_inner(text: &str, two_sided: bool) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let scan = operator_scan(text);

        for operator in FilterOperator::PRECEDENCE {
            let Some((lhs, rhs)) = operator.split(text, &scan) else {
                continue;
            };
            let lhs = lhs.trim();
            if lhs.is_empty() || lhs.contains(char::is_whitespace) {
                continue;
            }
            let rhs = rhs.trim();
            let literal = if operator == FilterOperator::Exists {
                if !rhs.is_empty() {
                    continue;
                }
                Value::Null
            } else {
                if rhs.is_empty() {
                    continue;
                }
                parse_literal(rhs)
            };
            let (side, path_text) = if two_sided {
                split_side(lhs)
            } else {
                (FilterSide::Left, lhs)
            };
            let path = PathExpression::parse(path_text).ok()?;
            return Some(Self {
                side,
                path,
                operator,
                literal,
            });
        }
        None
    }
}

impl fmt::Display for FilterCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.side {
            FilterSide::Left => "",
            FilterSide::Right => "b.",
        };
        if self.operator == FilterOperator::Exists {
            write!(f, "{prefix}{} exists", self.path)
        } else {
            write!(f, "{prefix}{} {} {}", self.path, self.operator.symbol(), self.literal)
        }
    }
}

/// Coerce literal text: quoted → string, `true`/`false`, `null`, numbers,
/// anything else stays a raw string.
#[must_use]
pub fn parse_literal(raw: &str) -> Value {
    let raw = raw.trim();
    for quote in ['"', '\''] {
        if raw.len() >= 2
            && let Some(inner) = raw.strip_prefix(quote).and_then(|r| r.strip_suffix(quote))
        {
            return Value::String(inner.to_string());
        }
    }
    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "null" => return Value::Null,
        _ => {}
    }
    if let Ok(integer) = raw.parse::<i64>() {
        return Value::Number(integer.into());
    }
    if let Ok(float) = raw.parse::<f64>()
        && let Some(number) = Number::from_f64(float)
    {
        return Value::Number(number);
    }
    Value::String(raw.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parsed(text: &str) -> FilterCondition {
        FilterCondition::parse(text).expect("condition should parse")
    }

    #[test]
    fn compound_operators_win_over_prefixes() {
        assert_eq!(parsed("payload.level >= 10").operator, FilterOperator::GreaterEq);
        assert_eq!(parsed("payload.level <= 10").operator, FilterOperator::LessEq);
        assert_eq!(parsed("payload.level != 10").operator, FilterOperator::NotEqual);
        assert_eq!(parsed("payload.level > 10").operator, FilterOperator::Greater);
        assert_eq!(parsed("payload.level=10").operator, FilterOperator::Equal);
    }

    #[test]
    fn word_operators_need_whitespace() {
        let condition = parsed("payload.tags contains sword");
        assert_eq!(condition.operator, FilterOperator::Contains);
        assert_eq!(condition.literal, json!("sword"));
        assert_eq!(parsed("entityId startsWith Player:").operator, FilterOperator::StartsWith);
        assert_eq!(parsed("payload.guild exists").operator, FilterOperator::Exists);
        assert!(FilterCondition::parse("payload.containsX").is_none());
    }

    #[test]
    fn operators_inside_quoted_literals_are_ignored() {
        let condition = parsed(r#"payload.name = "a>=b""#);
        assert_eq!(condition.operator, FilterOperator::Equal);
        assert_eq!(condition.literal, json!("a>=b"));
    }

    #[test]
    fn quoted_bracket_keys_stay_part_of_the_path() {
        let condition = parsed("payload['$type'] = Game.Player");
        assert_eq!(condition.operator, FilterOperator::Equal);
        assert_eq!(condition.path, PathExpression::parse("payload['$type']").expect("valid"));
        assert_eq!(condition.literal, json!("Game.Player"));

        let condition = parsed(r#"meta["a>=b"] >= 3"#);
        assert_eq!(condition.operator, FilterOperator::GreaterEq);
        assert_eq!(condition.literal, json!(3));
    }

    #[test]
    fn literals_are_coerced() {
        assert_eq!(parse_literal("'10'"), json!("10"));
        assert_eq!(parse_literal("true"), json!(true));
        assert_eq!(parse_literal("null"), Value::Null);
        assert_eq!(parse_literal("-3"), json!(-3));
        assert_eq!(parse_literal("2.5"), json!(2.5));
        assert_eq!(parse_literal("Player:1"), json!("Player:1"));
    }

    #[test]
    fn unparseable_text_yields_no_condition() {
        assert!(FilterCondition::parse("").is_none());
        assert!(FilterCondition::parse("just words here").is_none());
        assert!(FilterCondition::parse("= 5").is_none());
        assert!(FilterCondition::parse("a[ = 5").is_none());
    }

    #[test]
    fn two_sided_prefixes_select_a_side() {
        let right = FilterCondition::parse_two_sided("b.payload.level > 5").expect("parse");
        assert_eq!(right.side, FilterSide::Right);
        assert_eq!(right.path.as_str(), "payload.level");
        let left = FilterCondition::parse_two_sided("payload.level > 5").expect("parse");
        assert_eq!(left.side, FilterSide::Left);
        assert_eq!(left.path.as_str(), "payload.level");
    }
}

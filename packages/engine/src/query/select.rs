//! Filtered, paged and projected element queries

use serde_json::{Map, Value};

use super::options::QueryOptions;
use super::results::QueryResult;
use super::{QueryEngine, QuerySource};
use crate::error::Result;
use crate::path::PathExpression;

const LENGTH_SUFFIX: &str = ".length";

/// One parsed select field
#[derive(Debug, Clone)]
pub(crate) struct Projection {
    name: String,
    path: PathExpression,
    length: bool,
}

impl Projection {
    pub(crate) fn parse(field: &str) -> Result<Self> {
        let field = field.trim();
        let (path, length) = match field.strip_suffix(LENGTH_SUFFIX) {
            Some(base) => (base, true),
            None => (field, false),
        };
        Ok(Self {
            name: field.to_string(),
            path: PathExpression::parse(path)?,
            length,
        })
    }

    /// Resolve this field against `value`.
    ///
    /// Wildcard paths collect every match into an array; other paths take the
    /// first match or `null`.
    pub(crate) fn resolve(&self, value: &Value) -> Value {
        if self.length {
            return match self.path.first(value) {
                Some(Value::Array(items)) => Value::from(items.len()),
                Some(Value::String(s)) => Value::from(s.chars().count()),
                _ => Value::Null,
            };
        }
        if self.path.has_wildcard() {
            return Value::Array(self.path.evaluate(value).into_iter().cloned().collect());
        }
        self.path.first(value).cloned().unwrap_or(Value::Null)
    }
}

/// Project `value` onto `fields`. Empty `fields` returns the value unchanged.
///
/// # Errors
///
/// Returns [`Error::InvalidPath`](crate::Error::InvalidPath) for an unparseable field.
pub fn project(value: &Value, fields: &[String]) -> Result<Value> {
    if fields.is_empty() {
        return Ok(value.clone());
    }
    let projections = fields
        .iter()
        .map(|field| Projection::parse(field))
        .collect::<Result<Vec<_>>>()?;
    Ok(apply(value, &projections))
}

fn apply(value: &Value, projections: &[Projection]) -> Value {
    let mut out = Map::with_capacity(projections.len());
    for projection in projections {
        out.insert(projection.name.clone(), projection.resolve(value));
    }
    Value::Object(out)
}

impl QueryEngine {
    /// Filter, page and project elements in document order.
    ///
    /// `total_matched` counts every passing element even after the page is full.
    ///
    /// # Errors
    ///
    /// Fails on invalid select paths, unreadable or malformed files, and
    /// invalid filters in strict mode.
    pub async fn execute_query(&self, source: &QuerySource, options: &QueryOptions) -> Result<QueryResult> {
        let projections = options
            .select
            .iter()
            .map(|field| Projection::parse(field))
            .collect::<Result<Vec<_>>>()?;
        let filter = self.filter(options.filter.as_deref())?;
        let limit = options.limit.unwrap_or(self.config.query.default_limit);

        let mut stream = self.elements(source).await?;
        let mut result = QueryResult {
            filter_ignored: filter.filter_ignored(),
            ..QueryResult::default()
        };
        let mut skipped = 0;

        while let Some(element) = stream.next_element().await? {
            result.total_scanned += 1;
            if !filter.matches(&element.value) {
                continue;
            }
            result.total_matched += 1;
            if skipped < options.offset {
                skipped += 1;
                continue;
            }
            if result.items.len() < limit {
                let item = if projections.is_empty() {
                    element.value
                } else {
                    apply(&element.value, &projections)
                };
                result.items.push(item);
            }
        }

        tracing::debug!(
            target: "entscan::query",
            path = %source.path.display(),
            scanned = result.total_scanned,
            matched = result.total_matched,
            returned = result.items.len(),
            "query complete"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn projects_selected_fields_and_nulls_for_missing() {
        let element = json!({"entityId": "Player:1", "payload": {"level": 10}});
        let projected = project(&element, &fields(&["entityId", "payload.level", "payload.guild"]))
            .expect("valid fields");
        assert_eq!(
            projected,
            json!({"entityId": "Player:1", "payload.level": 10, "payload.guild": null})
        );
    }

    #[test]
    fn length_suffix_reports_sizes() {
        let element = json!({"payload": {"items": [1, 2, 3], "name": "Zoë", "level": 4}});
        let projected = project(
            &element,
            &fields(&["payload.items.length", "payload.name.length", "payload.level.length"]),
        )
        .expect("valid fields");
        assert_eq!(projected["payload.items.length"], json!(3));
        assert_eq!(projected["payload.name.length"], json!(3));
        assert_eq!(projected["payload.level.length"], Value::Null);
    }

    #[test]
    fn wildcard_fields_collect_every_match() {
        let element = json!({"items": [{"lvl": 1}, {"lvl": 2}]});
        let projected = project(&element, &fields(&["items[*].lvl"])).expect("valid");
        assert_eq!(projected["items[*].lvl"], json!([1, 2]));
    }

    #[test]
    fn empty_select_returns_the_element() {
        let element = json!({"a": 1});
        assert_eq!(project(&element, &[]).expect("identity"), element);
    }
}

//! Counting, grouping and numeric aggregates

use hashbrown::HashMap;
use indexmap::IndexMap;
use serde_json::Value;

use super::accumulator::AggregateAccumulator;
use super::options::AggregateOptions;
use super::results::{
    AggregateGroup, AggregateResult, CountResult, DistributionBucket, DistributionResult,
    GroupByResult, StatsResult,
};
use super::{QueryEngine, QuerySource};
use crate::error::{Error, Result};
use crate::filter::FilterSet;
use crate::path::PathExpression;

/// Key under which a path that selects nothing is grouped.
pub const MISSING_KEY: &str = "undefined";
/// Key for an explicit JSON `null`.
pub const NULL_KEY: &str = "null";

/// Group key text: strings raw, `null` as `"null"`, everything else as JSON.
#[must_use]
pub fn group_key(value: &Value) -> String {
    match value {
        Value::Null => NULL_KEY.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Group keys for one element; a path that selects nothing yields `"undefined"`.
fn group_keys(path: &PathExpression, element: &Value) -> Vec<String> {
    let values = path.evaluate(element);
    if values.is_empty() {
        return vec![MISSING_KEY.to_string()];
    }
    values.into_iter().map(group_key).collect()
}

/// Descending count, then ascending key.
fn sort_groups(counts: HashMap<String, u64>) -> IndexMap<String, u64> {
    let mut entries: Vec<(String, u64)> = counts.into_iter().collect();
    entries.sort_by(|(ka, ca), (kb, cb)| cb.cmp(ca).then_with(|| ka.cmp(kb)));
    entries.into_iter().collect()
}

impl QueryEngine {
    /// Count elements passing `filter`.
    ///
    /// # Errors
    ///
    /// Fails on unreadable or malformed files, and on invalid filters in
    /// strict mode.
    pub async fn count(&self, source: &QuerySource, filter: Option<&str>) -> Result<CountResult> {
        let filter = self.filter(filter)?;
        let mut stream = self.elements(source).await?;
        let mut result = CountResult {
            filter_ignored: filter.filter_ignored(),
            ..CountResult::default()
        };
        while let Some(element) = stream.next_element().await? {
            result.scanned += 1;
            if filter.matches(&element.value) {
                result.total += 1;
            }
        }
        tracing::debug!(
            target: "entscan::query",
            path = %source.path.display(),
            scanned = result.scanned,
            matched = result.total,
            "count complete"
        );
        Ok(result)
    }

    /// Count elements per distinct value at `path`.
    ///
    /// Wildcard paths contribute one key per selected value.
    ///
    /// # Errors
    ///
    /// Fails on invalid paths, unreadable or malformed files, and invalid
    /// filters in strict mode.
    pub async fn group_by(
        &self,
        source: &QuerySource,
        path: &str,
        filter: Option<&str>,
    ) -> Result<GroupByResult> {
        let path = PathExpression::parse(path)?;
        let filter = self.filter(filter)?;
        let mut stream = self.elements(source).await?;
        let mut counts: HashMap<String, u64> = HashMap::new();
        let mut total = 0;
        let mut scanned = 0;

        while let Some(element) = stream.next_element().await? {
            scanned += 1;
            if !filter.matches(&element.value) {
                continue;
            }
            total += 1;
            for key in group_keys(&path, &element.value) {
                *counts.entry(key).or_insert(0) += 1;
            }
        }

        let groups = sort_groups(counts);
        tracing::debug!(
            target: "entscan::query",
            path = %source.path.display(),
            group_path = %path,
            scanned,
            matched = total,
            groups = groups.len(),
            "group complete"
        );
        Ok(GroupByResult {
            unique_values: groups.len(),
            groups,
            total,
            scanned,
            filter_ignored: filter.filter_ignored(),
        })
    }

    /// Count, sum, mean and range of the finite numbers at `path`.
    ///
    /// # Errors
    ///
    /// Fails on invalid paths, unreadable or malformed files, and invalid
    /// filters in strict mode.
    pub async fn stats(&self, source: &QuerySource, path: &str, filter: Option<&str>) -> Result<StatsResult> {
        let path = PathExpression::parse(path)?;
        let filter = self.filter(filter)?;
        let (acc, scanned) = self.accumulate(source, &path, &filter).await?;
        Ok(StatsResult::from_accumulator(&acc, scanned, filter.filter_ignored()))
    }

    async fn accumulate(
        &self,
        source: &QuerySource,
        path: &PathExpression,
        filter: &FilterSet,
    ) -> Result<(AggregateAccumulator, u64)> {
        let mut stream = self.elements(source).await?;
        let mut acc = AggregateAccumulator::new();
        let mut scanned = 0;
        while let Some(element) = stream.next_element().await? {
            scanned += 1;
            if !filter.matches(&element.value) {
                continue;
            }
            for value in path.evaluate(&element.value) {
                acc.update_value(value);
            }
        }
        Ok((acc, scanned))
    }

    /// Histogram of the numbers at `path` over `bucket_count` equal-width buckets.
    ///
    /// The first pass finds the range, the second assigns values to buckets.
    /// `None` uses the configured bucket count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when `bucket_count` is zero, and
    /// fails on invalid paths, unreadable or malformed files, and invalid
    /// filters in strict mode.
    pub async fn distribution(
        &self,
        source: &QuerySource,
        path: &str,
        filter: Option<&str>,
        bucket_count: Option<usize>,
    ) -> Result<DistributionResult> {
        let bucket_count = bucket_count.unwrap_or(self.config.query.distribution_buckets);
        if bucket_count == 0 {
            return Err(Error::invalid_argument("bucket count must be greater than zero"));
        }
        let path = PathExpression::parse(path)?;
        let filter = self.filter(filter)?;

        let (range, scanned) = self.accumulate(source, &path, &filter).await?;
        let mut result = DistributionResult {
            total: range.count,
            min: range.min(),
            max: range.max(),
            scanned,
            filter_ignored: filter.filter_ignored(),
            ..DistributionResult::default()
        };
        if range.is_empty() {
            return Ok(result);
        }

        let (min, max) = (range.min(), range.max());
        let bucket_size = if max > min {
            (max - min) / bucket_count as f64
        } else {
            1.0
        };
        let mut counts = vec![0_u64; bucket_count];

        let mut stream = self.elements(source).await?;
        while let Some(element) = stream.next_element().await? {
            if !filter.matches(&element.value) {
                continue;
            }
            for value in path.evaluate(&element.value) {
                let Some(number) = value.as_f64().filter(|n| n.is_finite()) else {
                    continue;
                };
                let slot = ((number - min) / bucket_size).floor();
                let index = if slot <= 0.0 { 0 } else { (slot as usize).min(bucket_count - 1) };
                counts[index] += 1;
            }
        }

        let total = range.count as f64;
        result.buckets = counts
            .into_iter()
            .enumerate()
            .map(|(index, count)| {
                let start = min + index as f64 * bucket_size;
                DistributionBucket {
                    index,
                    start,
                    end: start + bucket_size,
                    count,
                    percentage: count as f64 / total * 100.0,
                }
            })
            .collect();
        tracing::debug!(
            target: "entscan::query",
            path = %source.path.display(),
            value_path = %path,
            values = range.count,
            buckets = bucket_count,
            "distribution complete"
        );
        Ok(result)
    }

    /// Per-group numeric aggregates of `value_path`, grouped by `group_path`.
    ///
    /// # Errors
    ///
    /// Fails on invalid paths, unreadable or malformed files, and invalid
    /// filters in strict mode.
    pub async fn aggregate(&self, source: &QuerySource, options: &AggregateOptions) -> Result<AggregateResult> {
        let group_path = PathExpression::parse(&options.group_path)?;
        let value_path = PathExpression::parse(&options.value_path)?;
        let filter = self.filter(options.filter.as_deref())?;
        let count_if = self.filter(options.count_if.as_deref())?;

        let mut stream = self.elements(source).await?;
        let mut groups: HashMap<String, (u64, AggregateAccumulator)> = HashMap::new();
        let mut total = 0;
        let mut scanned = 0;

        while let Some(element) = stream.next_element().await? {
            scanned += 1;
            if !filter.matches(&element.value) {
                continue;
            }
            total += 1;
            let mut local = AggregateAccumulator::new();
            for value in value_path.evaluate(&element.value) {
                local.update_value(value);
            }
            if !count_if.is_empty() && count_if.matches(&element.value) {
                local.record_condition();
            }
            for key in group_keys(&group_path, &element.value) {
                let (elements, acc) = groups.entry(key).or_default();
                *elements += 1;
                acc.merge(&local);
            }
        }

        let mut groups: Vec<AggregateGroup> = groups
            .into_iter()
            .map(|(key, (elements, acc))| AggregateGroup {
                key,
                elements,
                count: acc.count,
                sum: acc.sum,
                avg: acc.avg(),
                min: acc.min(),
                max: acc.max(),
                condition_count: acc.condition_count,
            })
            .collect();
        groups.sort_by(|a, b| b.elements.cmp(&a.elements).then_with(|| a.key.cmp(&b.key)));

        Ok(AggregateResult {
            groups,
            total,
            scanned,
            filter_ignored: filter.filter_ignored() || count_if.filter_ignored(),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn group_keys_stringify_values() {
        assert_eq!(group_key(&json!("Player:1")), "Player:1");
        assert_eq!(group_key(&Value::Null), "null");
        assert_eq!(group_key(&json!(10)), "10");
        assert_eq!(group_key(&json!(true)), "true");
        assert_eq!(group_key(&json!([1, 2])), "[1,2]");
    }

    #[test]
    fn missing_paths_group_as_undefined() {
        let path = PathExpression::parse("payload.guild").expect("valid");
        assert_eq!(group_keys(&path, &json!({"payload": {}})), vec!["undefined"]);
        assert_eq!(group_keys(&path, &json!({"payload": {"guild": null}})), vec!["null"]);
    }

    #[test]
    fn groups_sort_by_count_then_key() {
        let counts: HashMap<String, u64> =
            [("b".to_string(), 2), ("a".to_string(), 2), ("c".to_string(), 5)].into_iter().collect();
        let keys: Vec<_> = sort_groups(counts).into_keys().collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }
}

//! Result types returned by the query engine
//!
//! All results serialize with camelCase keys. `filter_ignored` reports that a
//! filter expression was dropped by permissive parsing.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use super::accumulator::{AggregateAccumulator, AggregateFunction};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountResult {
    /// Elements passing the filter
    pub total: u64,
    pub scanned: u64,
    pub filter_ignored: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupByResult {
    /// Distinct key → count, by descending count then key
    pub groups: IndexMap<String, u64>,
    /// Elements passing the filter
    pub total: u64,
    pub unique_values: usize,
    pub scanned: u64,
    pub filter_ignored: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResult {
    pub count: u64,
    pub sum: f64,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub scanned: u64,
    pub filter_ignored: bool,
}

impl StatsResult {
    pub(crate) fn from_accumulator(acc: &AggregateAccumulator, scanned: u64, filter_ignored: bool) -> Self {
        Self {
            count: acc.count,
            sum: acc.sum,
            avg: acc.avg(),
            min: acc.min(),
            max: acc.max(),
            scanned,
            filter_ignored,
        }
    }
}

/// One histogram bucket covering `[start, end)`; the last bucket is closed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionBucket {
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionResult {
    pub buckets: Vec<DistributionBucket>,
    /// Numeric values bucketed; equals the bucket counts' sum
    pub total: u64,
    pub min: f64,
    pub max: f64,
    pub scanned: u64,
    pub filter_ignored: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub items: Vec<Value>,
    pub total_matched: u64,
    pub total_scanned: u64,
    pub filter_ignored: bool,
}

/// Finalized aggregates for one group key
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateGroup {
    pub key: String,
    /// Elements in the group
    pub elements: u64,
    /// Numeric values accumulated
    pub count: u64,
    pub sum: f64,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    /// Elements that also satisfied the `count_if` condition
    pub condition_count: u64,
}

impl AggregateGroup {
    /// The finalized value of one aggregate function.
    #[must_use]
    pub fn value(&self, function: AggregateFunction) -> f64 {
        match function {
            AggregateFunction::Count => self.count as f64,
            AggregateFunction::Sum => self.sum,
            AggregateFunction::Avg => self.avg,
            AggregateFunction::Min => self.min,
            AggregateFunction::Max => self.max,
            AggregateFunction::CountIf => self.condition_count as f64,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    /// Groups by descending element count then key
    pub groups: Vec<AggregateGroup>,
    pub total: u64,
    pub scanned: u64,
    pub filter_ignored: bool,
}

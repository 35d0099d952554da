//! Running numeric aggregate state

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

/// Aggregate function applied when finalizing an [`AggregateAccumulator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Min,
    Max,
    /// Number of updates recorded as satisfying a side condition
    CountIf,
}

impl AggregateFunction {
    pub const ALL: [AggregateFunction; 6] = [
        AggregateFunction::Count,
        AggregateFunction::Sum,
        AggregateFunction::Avg,
        AggregateFunction::Min,
        AggregateFunction::Max,
        AggregateFunction::CountIf,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AggregateFunction::Count => "count",
            AggregateFunction::Sum => "sum",
            AggregateFunction::Avg => "avg",
            AggregateFunction::Min => "min",
            AggregateFunction::Max => "max",
            AggregateFunction::CountIf => "countIf",
        }
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregateFunction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AggregateFunction::ALL
            .into_iter()
            .find(|function| function.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::invalid_argument(format!("unknown aggregate function '{s}'")))
    }
}

/// Count, sum and range of the finite numbers seen so far.
///
/// Accumulators merge associatively, so per-group state can be combined in
/// any order. Finalizing an empty accumulator yields `0` for every function
/// rather than NaN or infinities.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AggregateAccumulator {
    pub count: u64,
    pub sum: f64,
    min: f64,
    max: f64,
    pub condition_count: u64,
}

impl AggregateAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one number. Non-finite inputs are ignored; returns whether it counted.
    pub fn update(&mut self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;
        true
    }

    /// Add a JSON value if it is a finite number.
    pub fn update_value(&mut self, value: &Value) -> bool {
        value.as_f64().is_some_and(|number| self.update(number))
    }

    pub fn record_condition(&mut self) {
        self.condition_count += 1;
    }

    pub fn merge(&mut self, other: &AggregateAccumulator) {
        if other.count > 0 {
            if self.count == 0 {
                self.min = other.min;
                self.max = other.max;
            } else {
                self.min = self.min.min(other.min);
                self.max = self.max.max(other.max);
            }
        }
        self.count += other.count;
        self.sum += other.sum;
        self.condition_count += other.condition_count;
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[must_use]
    pub fn avg(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    /// Smallest value, or `0` when empty.
    #[must_use]
    pub fn min(&self) -> f64 {
        if self.count == 0 { 0.0 } else { self.min }
    }

    /// Largest value, or `0` when empty.
    #[must_use]
    pub fn max(&self) -> f64 {
        if self.count == 0 { 0.0 } else { self.max }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_accumulator_finalizes_to_zero() {
        let acc = AggregateAccumulator::new();
        assert_eq!((acc.sum, acc.avg(), acc.min(), acc.max()), (0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn tracks_count_sum_and_range() {
        let mut acc = AggregateAccumulator::new();
        for value in [10.0, -2.0, 7.0] {
            assert!(acc.update(value));
        }
        assert!(!acc.update(f64::NAN));
        assert!(!acc.update_value(&json!("12")));
        assert_eq!(acc.count, 3);
        assert_eq!(acc.sum, 15.0);
        assert_eq!(acc.avg(), 5.0);
        assert_eq!(acc.min(), -2.0);
        assert_eq!(acc.max(), 10.0);
    }

    #[test]
    fn merge_matches_sequential_updates() {
        let mut left = AggregateAccumulator::new();
        let mut right = AggregateAccumulator::new();
        let mut all = AggregateAccumulator::new();
        for (i, value) in [3.0, 9.0, -1.0, 4.5].into_iter().enumerate() {
            all.update(value);
            if i % 2 == 0 {
                left.update(value);
            } else {
                right.update(value);
            }
        }
        right.record_condition();
        all.record_condition();
        left.merge(&right);
        assert_eq!(left, all);

        let mut empty = AggregateAccumulator::new();
        empty.merge(&AggregateAccumulator::new());
        assert!(empty.is_empty());
    }

    #[test]
    fn functions_parse_case_insensitively() {
        assert_eq!("AVG".parse::<AggregateFunction>().expect("known"), AggregateFunction::Avg);
        assert_eq!("countif".parse::<AggregateFunction>().expect("known"), AggregateFunction::CountIf);
        assert!("median".parse::<AggregateFunction>().is_err());
    }
}

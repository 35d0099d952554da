//! Query and inference configuration

use super::validation::{ConfigResult, ConfigValidator, ConfigurationError, Validator};

/// Query engine defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    /// Page size used when a query or join does not pass a limit
    pub default_limit: usize,
    /// Reject unparseable filter expressions instead of ignoring them
    pub strict_filters: bool,
    /// Bucket count used by `distribution` when none is given
    pub distribution_buckets: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: 100,
            strict_filters: false,
            distribution_buckets: 10,
        }
    }
}

impl QueryConfig {
    #[must_use]
    pub fn with_strict_filters(mut self, strict: bool) -> Self {
        self.strict_filters = strict;
        self
    }

    #[must_use]
    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }
}

impl Validator for QueryConfig {
    fn validate(&self) -> ConfigResult<()> {
        ConfigValidator::validate_positive(self.distribution_buckets, "distribution_buckets")
    }
}

/// Relationship inference thresholds
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceConfig {
    /// Coverage (percent) a relationship needs to be picked as a join key
    pub min_coverage: f64,
    /// Fallback coverage tried when nothing clears `min_coverage`
    pub relaxed_coverage: f64,
    /// Example values kept per identifier field in verbose reports
    pub max_examples: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            min_coverage: 30.0,
            relaxed_coverage: 10.0,
            max_examples: 3,
        }
    }
}

impl Validator for InferenceConfig {
    fn validate(&self) -> ConfigResult<()> {
        ConfigValidator::validate_percentage(self.min_coverage, "min_coverage")?;
        ConfigValidator::validate_percentage(self.relaxed_coverage, "relaxed_coverage")?;
        if self.relaxed_coverage > self.min_coverage {
            return Err(ConfigurationError::Conflict(format!(
                "relaxed_coverage ({}) cannot exceed min_coverage ({})",
                self.relaxed_coverage, self.min_coverage
            )));
        }
        Ok(())
    }
}

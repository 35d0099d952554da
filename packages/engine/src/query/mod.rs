//! Single-pass queries and aggregates over an element stream
//!
//! Every operation opens its own [`ElementStream`], pulls elements one at a
//! time, applies the filter and folds the element into a small running
//! state. Only `distribution` reads the file twice.

mod accumulator;
mod aggregate;
mod options;
mod results;
mod select;

pub use accumulator::{AggregateAccumulator, AggregateFunction};
pub use aggregate::{MISSING_KEY, NULL_KEY, group_key};
pub use options::{AggregateOptions, QueryOptions};
pub use results::{
    AggregateGroup, AggregateResult, CountResult, DistributionBucket, DistributionResult,
    GroupByResult, QueryResult, StatsResult,
};
pub use select::project;
pub(crate) use select::Projection;

use crate::config::{EngineConfig, Validator};
use crate::error::Result;
use crate::filter::FilterSet;
use crate::stream::{ElementStream, Source};

/// File and sub-path a query runs against
pub type QuerySource = Source;

/// Entry point for every analytical operation.
///
/// The engine holds configuration only; it is cheap to clone and owns no
/// open files between calls.
#[derive(Debug, Clone, Default)]
pub struct QueryEngine {
    config: EngineConfig,
}

impl QueryEngine {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Build an engine after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) for invalid settings.
    pub fn with_validated(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Open a fresh element stream over `source`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if the file cannot be opened.
    pub async fn elements(&self, source: &QuerySource) -> Result<ElementStream> {
        ElementStream::open(source, &self.config.stream).await
    }

    /// Parse an optional single-input filter under the configured strictness.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFilter`](crate::Error::InvalidFilter) in strict mode.
    pub fn filter(&self, expression: Option<&str>) -> Result<FilterSet> {
        match expression {
            Some(text) => FilterSet::parse([text], self.config.query.strict_filters),
            None => Ok(FilterSet::empty()),
        }
    }

    /// Parse an optional filter whose paths may carry `a.` / `b.` prefixes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFilter`](crate::Error::InvalidFilter) in strict mode.
    pub fn pair_filter(&self, expression: Option<&str>) -> Result<FilterSet> {
        match expression {
            Some(text) => FilterSet::parse_two_sided([text], self.config.query.strict_filters),
            None => Ok(FilterSet::empty()),
        }
    }
}

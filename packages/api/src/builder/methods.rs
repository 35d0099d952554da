//! Terminal methods
//!
//! Each method builds a query engine from the builder's configuration, runs
//! one single-pass operation over the file and returns its result.

use std::path::PathBuf;

use entscan_engine::join::{JoinOptions, JoinResult};
use entscan_engine::query::{
    AggregateOptions, AggregateResult, CountResult, DistributionResult, GroupByResult, QueryOptions,
    QueryResult, StatsResult,
};
use entscan_engine::relationships::{RelationshipOptions, RelationshipReport};
use entscan_engine::sample::{SampleOptions, SampleResult};
use entscan_engine::schema::{SchemaNode, SchemaOptions};
use entscan_engine::{Result, filter::CONDITION_SEPARATOR};

use crate::builder::core::ScanBuilder;

/// AND `extra` onto the builder's filters
fn combined(builder: &ScanBuilder, extra: Option<&str>) -> Option<String> {
    match (builder.filter_expression(), extra.filter(|e| !e.trim().is_empty())) {
        (Some(base), Some(extra)) => Some(format!("{base} {CONDITION_SEPARATOR} {extra}")),
        (base, extra) => base.or_else(|| extra.map(str::to_string)),
    }
}

impl ScanBuilder {
    fn trace(&self, operation: &str) {
        if self.debug_enabled {
            tracing::debug!(
                target: "entscan::api",
                operation,
                path = %self.source.path.display(),
                sub_path = %self.source.sub_path,
                filters = self.filters.len(),
                "running"
            );
        }
    }

    /// Count elements matching the filters
    ///
    /// # Examples
    /// ```no_run
    /// # async fn run() -> entscan_engine::Result<()> {
    /// let players = entscan::file("live.json")
    ///     .filter("entityId startsWith Player:")
    ///     .count()
    ///     .await?;
    /// println!("{} players", players.total);
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Fails on unreadable or malformed files and, in strict mode, on
    /// filters that do not parse.
    pub async fn count(self) -> Result<CountResult> {
        self.trace("count");
        let filter = self.filter_expression();
        self.engine()?.count(&self.source, filter.as_deref()).await
    }

    /// Count elements per distinct value at `path`
    ///
    /// # Errors
    ///
    /// Fails on invalid paths, unreadable or malformed files and strict-mode
    /// filter errors.
    pub async fn group_by(self, path: &str) -> Result<GroupByResult> {
        self.trace("group");
        let filter = self.filter_expression();
        self.engine()?.group_by(&self.source, path, filter.as_deref()).await
    }

    /// Numeric statistics of the values at `path`
    ///
    /// # Errors
    ///
    /// Fails on invalid paths, unreadable or malformed files and strict-mode
    /// filter errors.
    pub async fn stats(self, path: &str) -> Result<StatsResult> {
        self.trace("stats");
        let filter = self.filter_expression();
        self.engine()?.stats(&self.source, path, filter.as_deref()).await
    }

    /// Histogram of the values at `path`; `None` uses the configured bucket count
    ///
    /// # Errors
    ///
    /// Also fails when `buckets` is zero.
    pub async fn distribution(self, path: &str, buckets: Option<usize>) -> Result<DistributionResult> {
        self.trace("distribution");
        let filter = self.filter_expression();
        self.engine()?
            .distribution(&self.source, path, filter.as_deref(), buckets)
            .await
    }

    /// Per-group aggregates. Builder filters are added to any in `options`.
    ///
    /// # Errors
    ///
    /// Fails on invalid paths, unreadable or malformed files and strict-mode
    /// filter errors.
    pub async fn aggregate(self, mut options: AggregateOptions) -> Result<AggregateResult> {
        self.trace("aggregate");
        options.filter = combined(&self, options.filter.as_deref());
        self.engine()?.aggregate(&self.source, &options).await
    }

    /// Select a page of matching elements
    ///
    /// # Errors
    ///
    /// Fails on invalid select paths, unreadable or malformed files and
    /// strict-mode filter errors.
    pub async fn query(self, mut options: QueryOptions) -> Result<QueryResult> {
        self.trace("query");
        options.filter = combined(&self, options.filter.as_deref());
        self.engine()?.execute_query(&self.source, &options).await
    }

    /// Reservoir sample of matching elements
    ///
    /// # Errors
    ///
    /// Fails on invalid paths, unreadable or malformed files and strict-mode
    /// filter errors.
    pub async fn sample(self, mut options: SampleOptions) -> Result<SampleResult> {
        self.trace("sample");
        options.filter = combined(&self, options.filter.as_deref());
        self.engine()?.sample(&self.source, &options).await
    }

    /// Merged schema of the whole document. Filters and sub-path do not apply.
    ///
    /// # Errors
    ///
    /// Fails on unreadable, malformed or empty files.
    pub async fn schema(self, options: SchemaOptions) -> Result<SchemaNode> {
        self.trace("schema");
        self.engine()?.extract_schema(&self.source.path, &options).await
    }

    /// Relationships from this file's id fields into `right`'s
    ///
    /// # Errors
    ///
    /// Fails on unreadable or malformed files.
    pub async fn relationships(
        self,
        right: impl Into<PathBuf>,
        options: RelationshipOptions,
    ) -> Result<RelationshipReport> {
        self.trace("relationships");
        let right = self.sibling(right);
        self.engine()?.relationships(&self.source, &right, &options).await
    }

    /// Hash join against `right`, streamed at the same sub-path.
    ///
    /// Builder filters apply to the join pairs and may use `a.`/`b.` prefixes.
    ///
    /// # Errors
    ///
    /// Returns a no-relationship error when keys are omitted and none can be
    /// detected; also fails on invalid paths and unreadable or malformed files.
    pub async fn join(self, right: impl Into<PathBuf>, mut options: JoinOptions) -> Result<JoinResult> {
        self.trace("join");
        options.filter = combined(&self, options.filter.as_deref());
        let right = self.sibling(right);
        self.engine()?.execute_join(&self.source, &right, &options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::core::file;

    #[test]
    fn option_filters_extend_builder_filters() {
        let builder = file("live.json").filter("payload.level > 10");
        assert_eq!(
            combined(&builder, Some("entityId exists")).as_deref(),
            Some("payload.level > 10 && entityId exists")
        );
        assert_eq!(combined(&builder, None).as_deref(), Some("payload.level > 10"));
        assert_eq!(combined(&file("live.json"), Some(" ")), None);
        assert_eq!(
            combined(&file("live.json"), Some("entityId exists")).as_deref(),
            Some("entityId exists")
        );
    }
}

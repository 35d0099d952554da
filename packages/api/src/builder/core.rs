//! Core `ScanBuilder` structure and configuration methods
//!
//! A `ScanBuilder` names one entity file plus everything that shapes how it
//! is read: the sub-path of the streamed array, stream and query settings and
//! any number of filter expressions. Terminal methods live in
//! [`methods`](super::methods).

use std::path::PathBuf;

use entscan_engine::config::{EngineConfig, Validator};
use entscan_engine::filter::CONDITION_SEPARATOR;
use entscan_engine::query::{QueryEngine, QuerySource};
use entscan_engine::Result;

/// Fluent builder for queries over one entity file
#[derive(Debug, Clone)]
pub struct ScanBuilder {
    /// File and streamed array
    pub(crate) source: QuerySource,
    /// Engine settings
    pub(crate) config: EngineConfig,
    /// Filter expressions, combined with AND
    pub(crate) filters: Vec<String>,
    /// Debug logging enabled flag
    pub(crate) debug_enabled: bool,
}

impl ScanBuilder {
    /// Start building queries over the `entities` array of `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            source: QuerySource::new(path),
            config: EngineConfig::default(),
            filters: Vec::new(),
            debug_enabled: false,
        }
    }

    /// Stream the array at a dotted sub-path instead of `entities`.
    ///
    /// An empty sub-path streams a root-level array.
    #[must_use]
    pub fn sub_path(mut self, sub_path: impl Into<String>) -> Self {
        self.source = self.source.with_sub_path(sub_path);
        self
    }

    /// Stream the document's root array
    #[must_use]
    pub fn root_array(self) -> Self {
        self.sub_path("")
    }

    /// Replace the whole engine configuration
    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Bytes read from the file per chunk
    #[must_use]
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.config.stream.chunk_size = chunk_size;
        self
    }

    /// Fail on filter expressions that do not parse instead of ignoring them
    #[must_use]
    pub fn strict_filters(mut self, strict: bool) -> Self {
        self.config.query.strict_filters = strict;
        self
    }

    /// Add a filter expression such as `payload.level >= 10`.
    ///
    /// Several calls narrow the result: all filters must match.
    #[must_use]
    pub fn filter(mut self, expression: impl Into<String>) -> Self {
        let expression = expression.into();
        if !expression.trim().is_empty() {
            self.filters.push(expression);
        }
        self
    }

    /// Add several filter expressions at once
    #[must_use]
    pub fn filters<I, S>(mut self, expressions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for expression in expressions {
            self = self.filter(expression);
        }
        self
    }

    /// Log each terminal operation at debug level
    #[must_use]
    pub fn debug(mut self) -> Self {
        self.debug_enabled = true;
        self
    }

    /// The source this builder reads
    #[must_use]
    pub fn source(&self) -> &QuerySource {
        &self.source
    }

    /// A source for another file streamed at the same sub-path
    pub(crate) fn sibling(&self, path: impl Into<PathBuf>) -> QuerySource {
        QuerySource::new(path).with_sub_path(self.source.sub_path.clone())
    }

    /// Filters joined into one expression, if any were given
    pub(crate) fn filter_expression(&self) -> Option<String> {
        if self.filters.is_empty() {
            None
        } else {
            Some(self.filters.join(&format!(" {CONDITION_SEPARATOR} ")))
        }
    }

    /// A query engine for the current configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the settings are invalid.
    pub fn engine(&self) -> Result<QueryEngine> {
        self.config.validate()?;
        Ok(QueryEngine::new(self.config.clone()))
    }
}

/// Main entry point providing static builder methods
pub struct Entscan;

impl Entscan {
    /// Query the `entities` array of `path`
    ///
    /// Shorthand for `ScanBuilder::new(path)`
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> ScanBuilder {
        ScanBuilder::new(path)
    }

    /// Query the root array of `path`
    #[must_use]
    pub fn root_array(path: impl Into<PathBuf>) -> ScanBuilder {
        ScanBuilder::new(path).root_array()
    }
}

/// Query the `entities` array of `path`
///
/// Shorthand for `Entscan::file(path)`
#[must_use]
pub fn file(path: impl Into<PathBuf>) -> ScanBuilder {
    ScanBuilder::new(path)
}

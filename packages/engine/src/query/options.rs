//! Caller-supplied options for paged queries and grouped aggregates

/// Options for [`QueryEngine::execute_query`](super::QueryEngine::execute_query)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Fields to project; empty returns whole elements. A trailing `.length`
    /// reports the length of the array (or string) at the remaining path.
    pub select: Vec<String>,
    pub filter: Option<String>,
    /// Page size; `None` uses the configured default
    pub limit: Option<usize>,
    /// Matching elements to skip before collecting
    pub offset: usize,
}

impl QueryOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

/// Options for [`QueryEngine::aggregate`](super::QueryEngine::aggregate)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateOptions {
    /// Path whose value names each element's group
    pub group_path: String,
    /// Path of the numbers accumulated per group
    pub value_path: String,
    pub filter: Option<String>,
    /// Extra condition counted per group without excluding elements
    pub count_if: Option<String>,
}

impl AggregateOptions {
    pub fn new(group_path: impl Into<String>, value_path: impl Into<String>) -> Self {
        Self {
            group_path: group_path.into(),
            value_path: value_path.into(),
            filter: None,
            count_if: None,
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    #[must_use]
    pub fn with_count_if(mut self, condition: impl Into<String>) -> Self {
        self.count_if = Some(condition.into());
        self
    }
}

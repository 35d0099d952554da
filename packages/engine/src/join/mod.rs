//! Two-file hash join
//!
//! The right file is read completely into a [`RightIndex`]; the left file is
//! then streamed and probed against it. The phases never overlap. When the
//! caller omits a key, the pair is picked by relationship inference.

mod index;

use serde::Serialize;
use serde_json::{Map, Value, json};

pub use index::{RightIndex, join_key};

use crate::error::{Error, Result};
use crate::filter::{FilterSide, split_side};
use crate::path::PathExpression;
use crate::query::{Projection, QueryEngine, QuerySource};
use crate::relationships::{DetectedRelationship, infer_relationships};

/// Options for [`QueryEngine::execute_join`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinOptions {
    pub left_key: Option<String>,
    pub right_key: Option<String>,
    /// Output fields, each optionally prefixed `a.` (left) or `b.` (right)
    pub select: Vec<String>,
    /// Two-sided filter over `a.` / `b.` paths
    pub filter: Option<String>,
    /// Items collected; `None` uses the configured default
    pub limit: Option<usize>,
}

impl JoinOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_keys(mut self, left_key: impl Into<String>, right_key: impl Into<String>) -> Self {
        self.left_key = Some(left_key.into());
        self.right_key = Some(right_key.into());
        self
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
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinResult {
    pub items: Vec<Value>,
    /// Left × right combinations passing the filter, beyond the limit too
    pub total_matched: u64,
    pub left_scanned: u64,
    pub right_scanned: u64,
    /// Distinct keys in the right index
    pub index_keys: usize,
    pub left_key: String,
    pub right_key: String,
    pub auto_detected: bool,
    /// Coverage of the detected relationship
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage: Option<f64>,
    pub filter_ignored: bool,
}

/// A select field bound to one side of the join
#[derive(Debug)]
struct SideProjection {
    name: String,
    side: FilterSide,
    projection: Projection,
}

impl SideProjection {
    fn parse(field: &str) -> Result<Self> {
        let name = field.trim();
        let (side, path) = split_side(name);
        Ok(Self {
            name: name.to_string(),
            side,
            projection: Projection::parse(path)?,
        })
    }
}

fn join_item(left: &Value, right: &Value, select: &[SideProjection]) -> Value {
    if select.is_empty() {
        return json!({ "left": left, "right": right });
    }
    let mut out = Map::with_capacity(select.len());
    for field in select {
        let value = match field.side {
            FilterSide::Left => field.projection.resolve(left),
            FilterSide::Right => field.projection.resolve(right),
        };
        out.insert(field.name.clone(), value);
    }
    Value::Object(out)
}

struct JoinKeys {
    left: String,
    right: String,
    coverage: Option<f64>,
}

impl QueryEngine {
    /// Join `left` against `right` on equal key values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoRelationship`] when a key is omitted and none can be
    /// detected. Also fails on invalid paths, unreadable or malformed files,
    /// and invalid filters in strict mode.
    pub async fn execute_join(
        &self,
        left: &QuerySource,
        right: &QuerySource,
        options: &JoinOptions,
    ) -> Result<JoinResult> {
        let filter = self.pair_filter(options.filter.as_deref())?;
        let select = options
            .select
            .iter()
            .map(|field| SideProjection::parse(field))
            .collect::<Result<Vec<_>>>()?;
        let limit = options.limit.unwrap_or(self.config().query.default_limit);

        let auto_detected = options.left_key.is_none() || options.right_key.is_none();
        let keys = match (&options.left_key, &options.right_key) {
            (Some(left_key), Some(right_key)) => JoinKeys {
                left: left_key.clone(),
                right: right_key.clone(),
                coverage: None,
            },
            (left_key, right_key) => {
                self.detect_keys(left, right, left_key.as_deref(), right_key.as_deref())
                    .await?
            }
        };
        let left_path = PathExpression::parse(&keys.left)?;
        let right_path = PathExpression::parse(&keys.right)?;

        let index = RightIndex::build(self, right, &right_path).await?;

        let mut stream = self.elements(left).await?;
        let mut items = Vec::new();
        let mut total_matched = 0;
        let mut left_scanned = 0;
        while let Some(element) = stream.next_element().await? {
            left_scanned += 1;
            for key in left_path.evaluate(&element.value).into_iter().filter_map(join_key) {
                let Some(candidates) = index.get(&key) else {
                    continue;
                };
                for candidate in candidates {
                    if !filter.matches_pair(&element.value, candidate) {
                        continue;
                    }
                    total_matched += 1;
                    if items.len() < limit {
                        items.push(join_item(&element.value, candidate, &select));
                    }
                }
            }
        }

        tracing::debug!(
            target: "entscan::join",
            left = %left.path.display(),
            right = %right.path.display(),
            left_key = %keys.left,
            right_key = %keys.right,
            left_scanned,
            matched = total_matched,
            "join complete"
        );

        Ok(JoinResult {
            items,
            total_matched,
            left_scanned,
            right_scanned: index.scanned(),
            index_keys: index.len(),
            left_key: keys.left,
            right_key: keys.right,
            auto_detected,
            coverage: keys.coverage,
            filter_ignored: filter.filter_ignored(),
        })
    }

    /// Pick the best-covered key pair consistent with any key already given,
    /// first at the configured coverage and then at the relaxed one.
    async fn detect_keys(
        &self,
        left: &QuerySource,
        right: &QuerySource,
        left_key: Option<&str>,
        right_key: Option<&str>,
    ) -> Result<JoinKeys> {
        let left_fields = self.collect_id_fields(left).await?;
        let right_fields = self.collect_id_fields(right).await?;
        let inference = &self.config().inference;
        let consistent = |candidate: &DetectedRelationship| {
            left_key.is_none_or(|key| candidate.left_path == key)
                && right_key.is_none_or(|key| candidate.right_path == key)
        };

        for (threshold, relaxed) in [(inference.min_coverage, false), (inference.relaxed_coverage, true)] {
            let found = infer_relationships(&left_fields, &right_fields, threshold, left == right);
            if let Some(best) = found.into_iter().find(|candidate| consistent(candidate)) {
                if relaxed {
                    tracing::warn!(
                        target: "entscan::join",
                        left_key = %best.left_path,
                        right_key = %best.right_path,
                        coverage = best.coverage,
                        threshold,
                        "join keys detected only at relaxed coverage"
                    );
                } else {
                    tracing::info!(
                        target: "entscan::join",
                        left_key = %best.left_path,
                        right_key = %best.right_path,
                        coverage = best.coverage,
                        "join keys detected"
                    );
                }
                return Ok(JoinKeys {
                    left: best.left_path,
                    right: best.right_path,
                    coverage: Some(best.coverage),
                });
            }
        }

        Err(Error::no_relationship(&left.path, &right.path))
    }
}

//! Uniform random sampling of stream elements
//!
//! Uses reservoir sampling (Algorithm R), so a single pass selects `count`
//! elements uniformly without knowing the stream length up front. A fixed
//! seed makes the selection reproducible.

mod truncate;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use serde_json::Value;

pub use truncate::truncate_value;

use crate::error::Result;
use crate::path::PathExpression;
use crate::patterns::entity_prefix;
use crate::query::{QueryEngine, QuerySource};

/// Options for [`QueryEngine::sample`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleOptions {
    /// Reservoir size
    pub count: usize,
    /// Sample the value at this path instead of whole elements
    pub path: Option<String>,
    /// Keep only elements of this entity type
    pub entity_type: Option<String>,
    pub filter: Option<String>,
    pub seed: Option<u64>,
    /// Display limit for strings; `0` disables clipping
    pub truncate_strings: usize,
    /// Display depth before containers are summarized
    pub max_depth: usize,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            count: 5,
            path: None,
            entity_type: None,
            filter: None,
            seed: None,
            truncate_strings: 200,
            max_depth: 4,
        }
    }
}

impl SampleOptions {
    #[must_use]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampledElement {
    /// Position of the element in the stream
    pub index: u64,
    pub value: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleResult {
    /// Selected elements in stream order
    pub items: Vec<SampledElement>,
    pub total_scanned: u64,
    /// Elements eligible for sampling
    pub matched_count: u64,
    pub filter_ignored: bool,
}

/// Does `element` have entity type `wanted`?
///
/// Matches the `entityId` prefix before `:` or the `payload.$type` name,
/// either exactly or by its last dotted segment.
#[must_use]
pub fn matches_entity_type(element: &Value, wanted: &str) -> bool {
    if let Some(id) = element.get("entityId").and_then(Value::as_str)
        && entity_prefix(id) == Some(wanted)
    {
        return true;
    }
    let Some(type_name) = element
        .get("payload")
        .and_then(|payload| payload.get("$type"))
        .and_then(Value::as_str)
    else {
        return false;
    };
    let type_name = type_name.split(',').next().unwrap_or(type_name).trim();
    type_name == wanted || type_name.rsplit('.').next() == Some(wanted)
}

/// Upper bound on reservoir slots reserved before any element is read
const RESERVOIR_PREALLOCATION: usize = 1024;

impl QueryEngine {
    /// Pick up to `count` elements uniformly at random in one pass.
    ///
    /// # Errors
    ///
    /// Fails on invalid paths, unreadable or malformed files, and invalid
    /// filters in strict mode.
    pub async fn sample(&self, source: &QuerySource, options: &SampleOptions) -> Result<SampleResult> {
        let path = options.path.as_deref().map(PathExpression::parse).transpose()?;
        let filter = self.filter(options.filter.as_deref())?;
        let mut rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut stream = self.elements(source).await?;
        let mut reservoir: Vec<SampledElement> =
            Vec::with_capacity(options.count.min(RESERVOIR_PREALLOCATION));
        let mut result = SampleResult {
            filter_ignored: filter.filter_ignored(),
            ..SampleResult::default()
        };

        while let Some(element) = stream.next_element().await? {
            result.total_scanned += 1;
            if let Some(wanted) = &options.entity_type
                && !matches_entity_type(&element.value, wanted)
            {
                continue;
            }
            if !filter.matches(&element.value) {
                continue;
            }
            let value = match &path {
                Some(path) => {
                    let selected = path.evaluate(&element.value);
                    if selected.is_empty() {
                        continue;
                    }
                    if path.has_wildcard() {
                        Value::Array(selected.into_iter().cloned().collect())
                    } else {
                        selected[0].clone()
                    }
                }
                None => element.value,
            };

            result.matched_count += 1;
            let candidate = SampledElement {
                index: element.index,
                value,
            };
            if reservoir.len() < options.count {
                reservoir.push(candidate);
            } else {
                let slot = rng.random_range(0..result.matched_count);
                if let Ok(slot) = usize::try_from(slot)
                    && slot < options.count
                {
                    reservoir[slot] = candidate;
                }
            }
        }

        reservoir.sort_by_key(|item| item.index);
        for item in &mut reservoir {
            item.value = truncate_value(&item.value, options.truncate_strings, options.max_depth);
        }
        result.items = reservoir;

        tracing::debug!(
            target: "entscan::sample",
            path = %source.path.display(),
            scanned = result.total_scanned,
            matched = result.matched_count,
            sampled = result.items.len(),
            "sample complete"
        );
        Ok(result)
    }
}

//! Build side of the hash join

use std::sync::Arc;

use hashbrown::HashMap;
use serde_json::Value;

use crate::error::Result;
use crate::path::PathExpression;
use crate::query::{QueryEngine, QuerySource, group_key};

/// Index key for a join value; `null` never joins.
#[must_use]
pub fn join_key(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        other => Some(group_key(other)),
    }
}

/// Every element of the right file, keyed by the values at the join path.
///
/// An element whose key path selects several values is indexed under each
/// of them and shared between the entries.
#[derive(Debug, Default)]
pub struct RightIndex {
    entries: HashMap<String, Vec<Arc<Value>>>,
    scanned: u64,
}

impl RightIndex {
    /// Stream `source` to completion and index it by `key_path`.
    ///
    /// # Errors
    ///
    /// Fails on unreadable or malformed files.
    pub async fn build(engine: &QueryEngine, source: &QuerySource, key_path: &PathExpression) -> Result<Self> {
        let mut stream = engine.elements(source).await?;
        let mut index = Self::default();
        while let Some(element) = stream.next_element().await? {
            index.scanned += 1;
            let keys: Vec<String> = key_path
                .evaluate(&element.value)
                .into_iter()
                .filter_map(join_key)
                .collect();
            if keys.is_empty() {
                continue;
            }
            let shared = Arc::new(element.value);
            for key in keys {
                let bucket = index.entries.entry(key).or_default();
                if !bucket.last().is_some_and(|last| Arc::ptr_eq(last, &shared)) {
                    bucket.push(Arc::clone(&shared));
                }
            }
        }
        tracing::debug!(
            target: "entscan::join",
            path = %source.path.display(),
            key = %key_path,
            scanned = index.scanned,
            keys = index.entries.len(),
            "right index built"
        );
        Ok(index)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[Arc<Value>]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Distinct key values.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Right elements read while building.
    #[inline]
    #[must_use]
    pub fn scanned(&self) -> u64 {
        self.scanned
    }
}

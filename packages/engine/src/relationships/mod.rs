//! Cross-file relationship inference
//!
//! Each file is streamed once to collect identifier-like fields and their
//! distinct values. Pairs of fields are then ranked by how many left values
//! also appear on the right (coverage).

mod id_fields;
mod infer;

use std::path::PathBuf;

use serde::Serialize;

pub use id_fields::{IdField, IdFieldInventory, IdFieldSummary, is_id_key};
pub use infer::{DetectedRelationship, RelationshipType, infer_relationships};

use crate::error::Result;
use crate::query::{QueryEngine, QuerySource};

/// Options for [`QueryEngine::relationships`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationshipOptions {
    /// Minimum coverage percentage; `None` uses the configured value
    pub min_coverage: Option<f64>,
    /// Include both identifier-field inventories in the report
    pub verbose: bool,
}

/// Relationships between two files plus, in verbose mode, their id fields
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipReport {
    pub left: PathBuf,
    pub right: PathBuf,
    pub min_coverage: f64,
    pub relationships: Vec<DetectedRelationship>,
    pub left_scanned: u64,
    pub right_scanned: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_fields: Option<Vec<IdFieldSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_fields: Option<Vec<IdFieldSummary>>,
}

impl QueryEngine {
    /// Stream `source` once and collect its identifier fields.
    ///
    /// # Errors
    ///
    /// Fails on unreadable or malformed files.
    pub async fn collect_id_fields(&self, source: &QuerySource) -> Result<IdFieldInventory> {
        let mut stream = self.elements(source).await?;
        let mut inventory = IdFieldInventory::new();
        while let Some(element) = stream.next_element().await? {
            inventory.observe(&element.value);
        }
        tracing::debug!(
            target: "entscan::relationships",
            path = %source.path.display(),
            scanned = inventory.scanned,
            fields = inventory.len(),
            "id fields collected"
        );
        Ok(inventory)
    }

    /// Detect relationships from `left` id values into `right` id values.
    ///
    /// # Errors
    ///
    /// Fails on unreadable or malformed files.
    pub async fn relationships(
        &self,
        left: &QuerySource,
        right: &QuerySource,
        options: &RelationshipOptions,
    ) -> Result<RelationshipReport> {
        let min_coverage = options
            .min_coverage
            .unwrap_or(self.config().inference.min_coverage);
        let left_fields = self.collect_id_fields(left).await?;
        let right_fields = self.collect_id_fields(right).await?;
        let relationships = infer_relationships(&left_fields, &right_fields, min_coverage, left == right);

        tracing::debug!(
            target: "entscan::relationships",
            left = %left.path.display(),
            right = %right.path.display(),
            min_coverage,
            found = relationships.len(),
            "relationship inference complete"
        );

        let max_examples = self.config().inference.max_examples;
        Ok(RelationshipReport {
            left: left.path.clone(),
            right: right.path.clone(),
            min_coverage,
            relationships,
            left_scanned: left_fields.scanned,
            right_scanned: right_fields.scanned,
            left_fields: options.verbose.then(|| left_fields.summaries(max_examples)),
            right_fields: options.verbose.then(|| right_fields.summaries(max_examples)),
        })
    }
}

//! Schema inference
//!
//! Builds one merged [`SchemaNode`] for a whole document directly from its
//! parse events, so memory stays proportional to the schema rather than the
//! data.

mod builder;
mod node;
mod render;

use std::path::Path;

pub use builder::ShapeBuilder;
pub use node::{NumberShape, SchemaField, SchemaKind, SchemaNode, StringShape};

use crate::error::{Error, Result};
use crate::query::QueryEngine;
use crate::stream::EventReader;

/// Options for [`QueryEngine::extract_schema`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaOptions {
    /// Containers nested deeper than this are recorded by kind only
    pub max_depth: usize,
    /// Literal examples kept per string position
    pub max_samples: usize,
    /// Tag entity ids, ISO dates and GUIDs instead of keeping examples
    pub detect_patterns: bool,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            max_depth: 8,
            max_samples: 3,
            detect_patterns: true,
        }
    }
}

impl QueryEngine {
    /// Infer the schema of the whole document at `path`.
    ///
    /// # Errors
    ///
    /// Fails on unreadable, malformed or empty files.
    pub async fn extract_schema(&self, path: impl AsRef<Path>, options: &SchemaOptions) -> Result<SchemaNode> {
        let path = path.as_ref();
        let mut reader = EventReader::open(path, &self.config().stream).await?;
        let mut builder = ShapeBuilder::new(*options);
        while let Some(event) = reader.next_event().await? {
            builder.push(event);
        }
        let stats = reader.stats();
        tracing::debug!(
            target: "entscan::schema",
            path = %path.display(),
            bytes = stats.bytes_read,
            events = stats.events,
            "schema extracted"
        );
        builder
            .finish()
            .ok_or_else(|| Error::parse(path, stats.bytes_read, "document contains no value"))
    }
}

//! # entscan engine
//!
//! Streaming analytics over large JSON documents that embed a single array
//! of entities (`{"entities": [{"entityId": ..., "payload": {...}}, ...]}`).
//! Documents are never loaded whole: a chunked tokenizer feeds an element
//! stream, and every query folds one element at a time.
//!
//! ## Features
//!
//! - **Streaming reader** with bounded memory and pull-based back-pressure
//! - **Path expressions** such as `payload.items[*].itemLevel`
//! - **Filters** like `payload.level >= 10`, permissive or strict
//! - **Aggregates**: count, group, stats, distribution, grouped aggregates
//! - **Hash joins** between two files with automatic key detection
//! - **Schema and relationship inference**, reservoir sampling
//!
//! ## Usage
//!
//! ```no_run
//! use entscan_engine::prelude::*;
//!
//! # async fn run() -> entscan_engine::Result<()> {
//! let engine = QueryEngine::default();
//! let source = QuerySource::new("live.json");
//!
//! let stats = engine.stats(&source, "payload.level", Some("entityId startsWith Player:")).await?;
//! println!("avg level {:.1} over {} players", stats.avg, stats.count);
//!
//! let page = engine
//!     .execute_query(&source, &QueryOptions::new().with_select(["entityId"]).with_limit(10))
//!     .await?;
//! println!("{} of {} matched", page.items.len(), page.total_matched);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod filter;
pub mod join;
pub mod lookup;
pub mod path;
pub mod patterns;
pub mod query;
pub mod relationships;
pub mod sample;
pub mod schema;
pub mod stream;

pub mod prelude;

pub use error::{Error, ErrorKind, Result};

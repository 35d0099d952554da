//! entscan public API
//!
//! Streaming analytics over very large JSON entity dumps with a fluent
//! builder: pick a file, add filters, finish with one operation.
//!
//! ```no_run
//! # async fn run() -> entscan::Result<()> {
//! let stats = entscan::file("live.json")
//!     .filter("entityId startsWith Player:")
//!     .stats("payload.level")
//!     .await?;
//! println!("{} players, average level {:.1}", stats.count, stats.avg);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

pub mod builder;
pub mod cli;
pub mod render;

pub use builder::{Entscan, ScanBuilder, file};
pub use render::{Format, Render, render};

// Re-export the engine so callers need only this crate
pub use entscan_engine::prelude;
pub use entscan_engine::{Error, ErrorKind, Result};
pub use entscan_engine::{config, filter, join, lookup, path, query, relationships, sample, schema, stream};

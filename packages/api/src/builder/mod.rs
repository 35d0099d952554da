//! Fluent query builder
//!
//! `entscan::file("live.json").filter(...).stats("payload.level")` style
//! access to every engine operation.

pub mod core;
pub mod methods;

pub use self::core::{Entscan, ScanBuilder, file};

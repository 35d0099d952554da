//! Path expressions over in-memory JSON values
//!
//! A path such as `payload.items[*].itemLevel` is parsed once into a
//! [`PathExpression`] and then evaluated against many elements. Evaluation is
//! pure and deterministic, so it is safe to call in per-element hot loops.

mod evaluator;
mod parser;

use serde_json::Value;

pub use parser::{PathExpression, PathSegment};

use crate::error::Result;

/// Every value `path` selects in `value`.
///
/// # Errors
///
/// Returns [`Error::InvalidPath`](crate::Error::InvalidPath) if `path` does not parse.
pub fn get_values_at_path<'a>(value: &'a Value, path: &str) -> Result<Vec<&'a Value>> {
    Ok(PathExpression::parse(path)?.evaluate(value))
}

/// First value `path` selects in `value`, or `None`.
///
/// # Errors
///
/// Returns [`Error::InvalidPath`](crate::Error::InvalidPath) if `path` does not parse.
pub fn get_value_at_path<'a>(value: &'a Value, path: &str) -> Result<Option<&'a Value>> {
    Ok(get_values_at_path(value, path)?.into_iter().next())
}

//! Breadth-first path evaluation

use serde_json::Value;

use super::parser::{PathExpression, PathSegment};

impl PathExpression {
    /// Every value selected by this path, in document order.
    ///
    /// Starts from `[root]` and maps the whole candidate list through one
    /// segment at a time. Missing keys, non-object parents and out-of-range
    /// indices contribute nothing; an empty stage ends evaluation.
    #[must_use]
    pub fn evaluate<'a>(&self, root: &'a Value) -> Vec<&'a Value> {
        let mut current = vec![root];
        for segment in self.segments() {
            let mut next = Vec::with_capacity(current.len());
            for value in current {
                select(segment, value, &mut next);
            }
            if next.is_empty() {
                return next;
            }
            current = next;
        }
        current
    }

    /// First value selected by this path.
    #[inline]
    #[must_use]
    pub fn first<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.evaluate(root).into_iter().next()
    }
}

#[inline]
fn select<'a>(segment: &PathSegment, value: &'a Value, out: &mut Vec<&'a Value>) {
    match segment {
        PathSegment::Key(key) => {
            if let Value::Object(map) = value
                && let Some(child) = map.get(key)
            {
                out.push(child);
            }
        }
        PathSegment::Wildcard => match value {
            Value::Array(items) => out.extend(items.iter()),
            Value::Object(map) => out.extend(map.values()),
            _ => {}
        },
        PathSegment::Index(index) => {
            if let Value::Array(items) = value
                && let Some(child) = items.get(*index)
            {
                out.push(child);
            }
        }
    }
}

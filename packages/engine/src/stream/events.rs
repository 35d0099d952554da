//! Parse events produced by the tokenizer

use serde_json::Value;

/// One JSON grammar event, in document order.
///
/// `Scalar` always carries a string, number, boolean or null value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseEvent {
    ObjectStart,
    ObjectEnd,
    ArrayStart,
    ArrayEnd,
    Key(String),
    Scalar(Value),
}

impl ParseEvent {
    #[inline]
    #[must_use]
    pub fn opens_container(&self) -> bool {
        matches!(self, ParseEvent::ObjectStart | ParseEvent::ArrayStart)
    }

    #[inline]
    #[must_use]
    pub fn closes_container(&self) -> bool {
        matches!(self, ParseEvent::ObjectEnd | ParseEvent::ArrayEnd)
    }
}

/// Streaming statistics for monitoring and debugging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Bytes read from the file so far
    pub bytes_read: u64,
    /// Parse events produced so far
    pub events: u64,
    /// Array elements yielded so far
    pub elements: u64,
}

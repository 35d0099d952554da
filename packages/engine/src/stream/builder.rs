//! Assembles parse events back into `serde_json::Value`s

use serde_json::{Map, Value};

use super::events::ParseEvent;

#[derive(Debug)]
enum Frame {
    Object {
        map: Map<String, Value>,
        key: Option<String>,
    },
    Array(Vec<Value>),
}

/// Materializes one value at a time from a well-formed event sequence.
///
/// The tokenizer guarantees the events are grammatical, so the builder only
/// tracks open containers.
#[derive(Debug, Default)]
pub struct ValueBuilder {
    stack: Vec<Frame>,
}

impl ValueBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// No value is partially assembled.
    #[inline]
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.stack.is_empty()
    }

    /// Feed one event; returns the value it completes, if any.
    pub fn push(&mut self, event: ParseEvent) -> Option<Value> {
        match event {
            ParseEvent::ObjectStart => {
                self.stack.push(Frame::Object {
                    map: Map::new(),
                    key: None,
                });
                None
            }
            ParseEvent::ArrayStart => {
                self.stack.push(Frame::Array(Vec::new()));
                None
            }
            ParseEvent::Key(name) => {
                if let Some(Frame::Object { key, .. }) = self.stack.last_mut() {
                    *key = Some(name);
                }
                None
            }
            ParseEvent::Scalar(value) => self.complete(value),
            ParseEvent::ObjectEnd | ParseEvent::ArrayEnd => {
                let value = match self.stack.pop()? {
                    Frame::Object { map, .. } => Value::Object(map),
                    Frame::Array(items) => Value::Array(items),
                };
                self.complete(value)
            }
        }
    }

    fn complete(&mut self, value: Value) -> Option<Value> {
        match self.stack.last_mut() {
            None => Some(value),
            Some(Frame::Object { map, key }) => {
                map.insert(key.take().unwrap_or_default(), value);
                None
            }
            Some(Frame::Array(items)) => {
                items.push(value);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn rebuilds_nested_values() {
        let mut builder = ValueBuilder::new();
        let events = vec![
            ParseEvent::ObjectStart,
            ParseEvent::Key("ids".into()),
            ParseEvent::ArrayStart,
            ParseEvent::Scalar(json!("a")),
            ParseEvent::ObjectStart,
            ParseEvent::ObjectEnd,
            ParseEvent::ArrayEnd,
            ParseEvent::Key("n".into()),
            ParseEvent::Scalar(json!(3)),
        ];
        for event in events {
            assert_eq!(builder.push(event), None);
        }
        assert!(!builder.is_idle());
        assert_eq!(
            builder.push(ParseEvent::ObjectEnd),
            Some(json!({"ids": ["a", {}], "n": 3}))
        );
        assert!(builder.is_idle());
    }

    #[test]
    fn scalars_complete_immediately_at_top_level() {
        let mut builder = ValueBuilder::new();
        assert_eq!(builder.push(ParseEvent::Scalar(json!(true))), Some(json!(true)));
    }
}

//! Event-driven shape construction

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde_json::Value;

use super::SchemaOptions;
use super::node::{NumberShape, SchemaField, SchemaNode, StringShape};
use crate::patterns::ValuePattern;
use crate::stream::ParseEvent;

#[derive(Debug)]
enum Frame {
    Object {
        fields: IndexMap<String, SchemaField>,
        pending_key: Option<String>,
        truncated: bool,
    },
    Array {
        len: usize,
        items: Option<SchemaNode>,
        truncated: bool,
    },
}

impl Frame {
    fn truncated(&self) -> bool {
        match self {
            Frame::Object { truncated, .. } | Frame::Array { truncated, .. } => *truncated,
        }
    }

    fn into_node(self) -> SchemaNode {
        match self {
            Frame::Object { fields, truncated, .. } => SchemaNode::Object { fields, truncated },
            Frame::Array { len, items, truncated } => SchemaNode::Array {
                min_len: len,
                max_len: len,
                items: items.map(Box::new),
                truncated,
            },
        }
    }
}

/// Folds parse events into a [`SchemaNode`] without materializing values.
///
/// Only one frame per open container is held. Array items are merged as
/// soon as each completes. Containers nested deeper than `max_depth` are
/// recorded by kind; for such arrays only the item count is kept.
#[derive(Debug)]
pub struct ShapeBuilder {
    options: SchemaOptions,
    stack: Vec<Frame>,
    /// Nesting inside a truncated container
    skipping: usize,
    root: Option<SchemaNode>,
}

impl ShapeBuilder {
    #[must_use]
    pub fn new(options: SchemaOptions) -> Self {
        Self {
            options,
            stack: Vec::new(),
            skipping: 0,
            root: None,
        }
    }

    pub fn push(&mut self, event: ParseEvent) {
        if self.skipping > 0 {
            if event.opens_container() {
                self.skipping += 1;
            } else if event.closes_container() {
                self.skipping -= 1;
            }
            return;
        }

        let in_truncated = self.stack.last().is_some_and(Frame::truncated);
        match event {
            ParseEvent::Key(key) => {
                if let Some(Frame::Object { pending_key, .. }) = self.stack.last_mut() {
                    *pending_key = Some(key);
                }
            }
            ParseEvent::ObjectStart | ParseEvent::ArrayStart if in_truncated => {
                self.count_truncated_child();
                self.skipping = 1;
            }
            ParseEvent::ObjectStart => {
                let truncated = self.stack.len() > self.options.max_depth;
                self.stack.push(Frame::Object {
                    fields: IndexMap::new(),
                    pending_key: None,
                    truncated,
                });
            }
            ParseEvent::ArrayStart => {
                let truncated = self.stack.len() > self.options.max_depth;
                self.stack.push(Frame::Array {
                    len: 0,
                    items: None,
                    truncated,
                });
            }
            ParseEvent::ObjectEnd | ParseEvent::ArrayEnd => {
                if let Some(frame) = self.stack.pop() {
                    self.complete(frame.into_node());
                }
            }
            ParseEvent::Scalar(_) if in_truncated => self.count_truncated_child(),
            ParseEvent::Scalar(value) => {
                let node = self.scalar(&value);
                self.complete(node);
            }
        }
    }

    fn count_truncated_child(&mut self) {
        if let Some(Frame::Array { len, .. }) = self.stack.last_mut() {
            *len += 1;
        }
    }

    fn scalar(&self, value: &Value) -> SchemaNode {
        match value {
            Value::Null => SchemaNode::Null,
            Value::Bool(_) => SchemaNode::Boolean,
            Value::Number(number) => {
                let as_float = number.as_f64().unwrap_or_default();
                SchemaNode::Number(NumberShape {
                    min: as_float,
                    max: as_float,
                    integer: number.is_i64() || number.is_u64(),
                })
            }
            Value::String(text) => {
                let mut shape = StringShape::default();
                let pattern = if self.options.detect_patterns {
                    ValuePattern::detect(text)
                } else {
                    None
                };
                match pattern {
                    Some(pattern) => shape.patterns = BTreeSet::from([pattern]),
                    None if self.options.max_samples > 0 => shape.examples.push(text.clone()),
                    None => {}
                }
                SchemaNode::String(shape)
            }
            // Containers arrive as start/end events, never as scalars
            Value::Array(_) | Value::Object(_) => SchemaNode::Null,
        }
    }

    fn complete(&mut self, node: SchemaNode) {
        let max_samples = self.options.max_samples;
        match self.stack.last_mut() {
            None => match &mut self.root {
                Some(root) => root.merge(node, max_samples),
                None => self.root = Some(node),
            },
            Some(Frame::Object {
                fields, pending_key, ..
            }) => {
                let key = pending_key.take().unwrap_or_default();
                match fields.get_mut(&key) {
                    Some(existing) => existing.node.merge(node, max_samples),
                    None => {
                        fields.insert(key, SchemaField::required(node));
                    }
                }
            }
            Some(Frame::Array { len, items, .. }) => {
                *len += 1;
                match items {
                    Some(existing) => existing.merge(node, max_samples),
                    None => *items = Some(node),
                }
            }
        }
    }

    /// True once the root value has closed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.stack.is_empty() && self.root.is_some()
    }

    /// The finished shape, or `None` if no value was observed.
    #[must_use]
    pub fn finish(self) -> Option<SchemaNode> {
        self.root
    }
}

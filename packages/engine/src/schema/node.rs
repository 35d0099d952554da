//! Merged type shapes

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::Serialize;

use crate::patterns::ValuePattern;

/// Inferred shape of one structural position in a document.
///
/// Shapes observed at the same position are merged: objects union their
/// keys (a key missing from any observation becomes optional), arrays widen
/// their length range and merge their items, and differing kinds form a
/// [`SchemaNode::Union`] holding one member per kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum SchemaNode {
    Object {
        fields: IndexMap<String, SchemaField>,
        /// Beyond the depth limit; fields were not inspected
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        truncated: bool,
    },
    Array {
        min_len: usize,
        max_len: usize,
        /// Merged shape of every item; absent when all arrays were empty
        #[serde(skip_serializing_if = "Option::is_none")]
        items: Option<Box<SchemaNode>>,
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        truncated: bool,
    },
    String(StringShape),
    Number(NumberShape),
    Boolean,
    Null,
    Union {
        variants: Vec<SchemaNode>,
    },
}

/// An object key and whether some observation lacked it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaField {
    #[serde(flatten)]
    pub node: SchemaNode,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

impl SchemaField {
    #[must_use]
    pub fn required(node: SchemaNode) -> Self {
        Self { node, optional: false }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StringShape {
    /// Patterns matched by pattern-tagged values
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub patterns: BTreeSet<ValuePattern>,
    /// First distinct values that matched no pattern
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

impl StringShape {
    fn merge(&mut self, other: StringShape, max_samples: usize) {
        self.patterns.extend(other.patterns);
        for example in other.examples {
            if self.examples.len() >= max_samples {
                break;
            }
            if !self.examples.contains(&example) {
                self.examples.push(example);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumberShape {
    pub min: f64,
    pub max: f64,
    /// Every observed value was an integer
    pub integer: bool,
}

impl NumberShape {
    fn merge(&mut self, other: NumberShape) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.integer &= other.integer;
    }
}

/// Kind tag of a [`SchemaNode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SchemaKind {
    Object,
    Array,
    String,
    Number,
    Boolean,
    Null,
    Union,
}

impl SchemaKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SchemaKind::Object => "object",
            SchemaKind::Array => "array",
            SchemaKind::String => "string",
            SchemaKind::Number => "number",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Null => "null",
            SchemaKind::Union => "union",
        }
    }
}

impl SchemaNode {
    #[must_use]
    pub fn kind(&self) -> SchemaKind {
        match self {
            SchemaNode::Object { .. } => SchemaKind::Object,
            SchemaNode::Array { .. } => SchemaKind::Array,
            SchemaNode::String(_) => SchemaKind::String,
            SchemaNode::Number(_) => SchemaKind::Number,
            SchemaNode::Boolean => SchemaKind::Boolean,
            SchemaNode::Null => SchemaKind::Null,
            SchemaNode::Union { .. } => SchemaKind::Union,
        }
    }

    /// Merge another observation of the same position into this one.
    ///
    /// `max_samples` caps retained string examples.
    pub fn merge(&mut self, other: SchemaNode, max_samples: usize) {
        if let SchemaNode::Union { variants } = self {
            merge_variants(variants, other, max_samples);
            return;
        }
        if other.kind() == self.kind() {
            self.merge_same_kind(other, max_samples);
            return;
        }
        let current = std::mem::replace(self, SchemaNode::Null);
        let mut variants = vec![current];
        merge_variants(&mut variants, other, max_samples);
        *self = SchemaNode::Union { variants };
    }

    fn merge_same_kind(&mut self, other: SchemaNode, max_samples: usize) {
        match (self, other) {
            (
                SchemaNode::Object { fields, truncated },
                SchemaNode::Object {
                    fields: other_fields,
                    truncated: other_truncated,
                },
            ) => merge_objects(fields, truncated, other_fields, other_truncated, max_samples),
            (
                SchemaNode::Array {
                    min_len,
                    max_len,
                    items,
                    truncated,
                },
                SchemaNode::Array {
                    min_len: other_min,
                    max_len: other_max,
                    items: other_items,
                    truncated: other_truncated,
                },
            ) => {
                *min_len = (*min_len).min(other_min);
                *max_len = (*max_len).max(other_max);
                *truncated |= other_truncated;
                match (items.as_mut(), other_items) {
                    (Some(current), Some(incoming)) => current.merge(*incoming, max_samples),
                    (None, incoming @ Some(_)) => *items = incoming,
                    (_, None) => {}
                }
            }
            (SchemaNode::String(current), SchemaNode::String(incoming)) => {
                current.merge(incoming, max_samples);
            }
            (SchemaNode::Number(current), SchemaNode::Number(incoming)) => current.merge(incoming),
            (SchemaNode::Union { variants }, SchemaNode::Union { variants: incoming }) => {
                for node in incoming {
                    merge_variants(variants, node, max_samples);
                }
            }
            _ => {}
        }
    }

    /// True for objects and arrays, and unions containing either.
    #[must_use]
    pub fn is_container(&self) -> bool {
        match self {
            SchemaNode::Object { .. } | SchemaNode::Array { .. } => true,
            SchemaNode::Union { variants } => variants.iter().any(SchemaNode::is_container),
            _ => false,
        }
    }
}

fn merge_variants(variants: &mut Vec<SchemaNode>, node: SchemaNode, max_samples: usize) {
    if let SchemaNode::Union { variants: incoming } = node {
        for member in incoming {
            merge_variants(variants, member, max_samples);
        }
        return;
    }
    match variants.iter_mut().find(|existing| existing.kind() == node.kind()) {
        Some(existing) => existing.merge_same_kind(node, max_samples),
        None => {
            variants.push(node);
            variants.sort_by_key(SchemaNode::kind);
        }
    }
}

fn merge_objects(
    fields: &mut IndexMap<String, SchemaField>,
    truncated: &mut bool,
    other_fields: IndexMap<String, SchemaField>,
    other_truncated: bool,
    max_samples: usize,
) {
    if *truncated || other_truncated {
        *truncated = true;
        if fields.is_empty() {
            *fields = other_fields;
        }
        return;
    }
    for (key, field) in fields.iter_mut() {
        if !other_fields.contains_key(key) {
            field.optional = true;
        }
    }
    for (key, incoming) in other_fields {
        match fields.get_mut(&key) {
            Some(field) => {
                field.optional |= incoming.optional;
                field.node.merge(incoming.node, max_samples);
            }
            None => {
                fields.insert(
                    key,
                    SchemaField {
                        node: incoming.node,
                        optional: true,
                    },
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(fields: &[(&str, SchemaNode)]) -> SchemaNode {
        SchemaNode::Object {
            fields: fields
                .iter()
                .map(|(key, node)| ((*key).to_string(), SchemaField::required(node.clone())))
                .collect(),
            truncated: false,
        }
    }

    fn number(value: f64) -> SchemaNode {
        SchemaNode::Number(NumberShape {
            min: value,
            max: value,
            integer: value.fract() == 0.0,
        })
    }

    #[test]
    fn keys_missing_on_either_side_become_optional() {
        let mut merged = object(&[("a", number(1.0)), ("b", SchemaNode::Boolean)]);
        merged.merge(object(&[("a", number(3.5)), ("c", SchemaNode::Null)]), 3);

        let SchemaNode::Object { fields, .. } = merged else {
            panic!("expected object");
        };
        assert!(!fields["a"].optional);
        assert!(fields["b"].optional);
        assert!(fields["c"].optional);
        assert_eq!(
            fields["a"].node,
            SchemaNode::Number(NumberShape {
                min: 1.0,
                max: 3.5,
                integer: false
            })
        );
    }

    #[test]
    fn differing_kinds_form_a_union_with_one_member_per_kind() {
        let mut node = number(1.0);
        node.merge(SchemaNode::Null, 3);
        node.merge(number(5.0), 3);
        node.merge(SchemaNode::Null, 3);
        let SchemaNode::Union { variants } = &node else {
            panic!("expected union");
        };
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].kind(), SchemaKind::Number);
        assert_eq!(variants[1].kind(), SchemaKind::Null);
    }

    #[test]
    fn string_examples_are_capped_and_distinct() {
        let mut shape = StringShape::default();
        for text in ["a", "b", "a", "c", "d"] {
            shape.merge(
                StringShape {
                    patterns: BTreeSet::new(),
                    examples: vec![text.to_string()],
                },
                3,
            );
        }
        assert_eq!(shape.examples, vec!["a", "b", "c"]);
    }

    #[test]
    fn serializes_with_type_tags() {
        let node = object(&[("level", number(10.0))]);
        let json = serde_json::to_value(&node).expect("serializable");
        assert_eq!(json["type"], "object");
        assert_eq!(json["fields"]["level"]["type"], "number");
        assert_eq!(json["fields"]["level"]["integer"], true);
    }
}

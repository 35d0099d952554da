//! Indented YAML-like rendering of a [`SchemaNode`]

use std::fmt::Write as _;

use super::node::{SchemaKind, SchemaNode};

const INDENT: &str = "  ";
const EXAMPLE_CHARS: usize = 40;

impl SchemaNode {
    /// Render as indented YAML-like text, one line per field.
    ///
    /// ```text
    /// object
    ///   entities: array [2]
    ///     - object
    ///       entityId: string <entity-id>
    ///       payload: object
    ///         guild?: string e.g. "Red"
    /// ```
    #[must_use]
    pub fn to_yaml_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.describe());
        out.push('\n');
        write_children(self, 1, &mut out);
        out
    }

    /// One-line summary of this node without its children.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            SchemaNode::Object { truncated, fields } => {
                if *truncated {
                    "object {…}".to_string()
                } else if fields.is_empty() {
                    "object {}".to_string()
                } else {
                    "object".to_string()
                }
            }
            SchemaNode::Array {
                min_len,
                max_len,
                truncated,
                ..
            } => {
                let range = if min_len == max_len {
                    format!("[{min_len}]")
                } else {
                    format!("[{min_len}..{max_len}]")
                };
                if *truncated {
                    format!("array {range} […]")
                } else {
                    format!("array {range}")
                }
            }
            SchemaNode::String(shape) => {
                let mut text = "string".to_string();
                if !shape.patterns.is_empty() {
                    let patterns: Vec<&str> = shape.patterns.iter().map(|p| p.as_str()).collect();
                    let _ = write!(text, " <{}>", patterns.join("|"));
                }
                if !shape.examples.is_empty() {
                    let examples: Vec<String> = shape
                        .examples
                        .iter()
                        .map(|example| format!("{:?}", clip(example)))
                        .collect();
                    let _ = write!(text, " e.g. {}", examples.join(", "));
                }
                text
            }
            SchemaNode::Number(shape) => {
                let label = if shape.integer { "integer" } else { "number" };
                if shape.min == shape.max {
                    format!("{label} ({})", shape.min)
                } else {
                    format!("{label} ({} .. {})", shape.min, shape.max)
                }
            }
            SchemaNode::Boolean => SchemaKind::Boolean.as_str().to_string(),
            SchemaNode::Null => SchemaKind::Null.as_str().to_string(),
            SchemaNode::Union { variants } => variants
                .iter()
                .map(SchemaNode::describe)
                .collect::<Vec<_>>()
                .join(" | "),
        }
    }
}

fn clip(text: &str) -> String {
    if text.chars().count() <= EXAMPLE_CHARS {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(EXAMPLE_CHARS).collect();
    clipped.push('…');
    clipped
}

fn write_children(node: &SchemaNode, depth: usize, out: &mut String) {
    let pad = INDENT.repeat(depth);
    match node {
        SchemaNode::Object { fields, .. } => {
            for (key, field) in fields {
                let marker = if field.optional { "?" } else { "" };
                let _ = writeln!(out, "{pad}{key}{marker}: {}", field.node.describe());
                write_children(&field.node, depth + 1, out);
            }
        }
        SchemaNode::Array {
            items: Some(items), ..
        } => {
            let _ = writeln!(out, "{pad}- {}", items.describe());
            write_children(items, depth + 1, out);
        }
        SchemaNode::Union { variants } => {
            for variant in variants.iter().filter(|variant| variant.is_container()) {
                let _ = writeln!(out, "{pad}| {}", variant.describe());
                write_children(variant, depth + 1, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use indexmap::IndexMap;

    use super::*;
    use crate::patterns::ValuePattern;
    use crate::schema::node::{NumberShape, SchemaField, StringShape};

    #[test]
    fn renders_nested_fields_with_optional_markers() {
        let entity = SchemaNode::Object {
            fields: IndexMap::from([
                (
                    "entityId".to_string(),
                    SchemaField::required(SchemaNode::String(StringShape {
                        patterns: BTreeSet::from([ValuePattern::EntityId]),
                        examples: Vec::new(),
                    })),
                ),
                (
                    "level".to_string(),
                    SchemaField {
                        node: SchemaNode::Number(NumberShape {
                            min: 10.0,
                            max: 20.0,
                            integer: true,
                        }),
                        optional: true,
                    },
                ),
            ]),
            truncated: false,
        };
        let root = SchemaNode::Array {
            min_len: 2,
            max_len: 2,
            items: Some(Box::new(entity)),
            truncated: false,
        };

        assert_eq!(
            root.to_yaml_text(),
            "array [2]\n  - object\n    entityId: string <entity-id>\n    level?: integer (10 .. 20)\n"
        );
    }

    #[test]
    fn unions_join_member_descriptions() {
        let node = SchemaNode::Union {
            variants: vec![
                SchemaNode::String(StringShape {
                    patterns: BTreeSet::new(),
                    examples: vec!["a".to_string()],
                }),
                SchemaNode::Null,
            ],
        };
        assert_eq!(node.describe(), r#"string e.g. "a" | null"#);
    }

    #[test]
    fn long_examples_are_clipped() {
        let long = "x".repeat(60);
        let clipped = clip(&long);
        assert_eq!(clipped.chars().count(), EXAMPLE_CHARS + 1);
        assert!(clipped.ends_with('…'));
    }
}

//! Identifier field collection

use hashbrown::{HashMap, HashSet};
use serde::Serialize;
use serde_json::Value;

use crate::path::{PathExpression, PathSegment};
use crate::patterns::{ValuePattern, is_entity_id};

/// Does `key` name an identifier (`...Id`, `...Ids`, or `id` in any case)?
#[must_use]
pub fn is_id_key(key: &str) -> bool {
    key.ends_with("Id") || key.ends_with("Ids") || key.eq_ignore_ascii_case("id")
}

/// Distinct values observed at one identifier-like path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdField {
    pub path: String,
    pub values: HashSet<String>,
    /// Values recorded, duplicates included
    pub occurrences: u64,
    /// Path passes through an array
    pub wildcard: bool,
    pattern: Option<ValuePattern>,
    mixed: bool,
}

impl IdField {
    fn new(path: String, wildcard: bool) -> Self {
        Self {
            path,
            values: HashSet::new(),
            occurrences: 0,
            wildcard,
            pattern: None,
            mixed: false,
        }
    }

    fn record(&mut self, value: String) {
        let detected = ValuePattern::detect(&value);
        if self.occurrences == 0 {
            self.pattern = detected;
        } else if !self.mixed && self.pattern != detected {
            self.mixed = true;
            self.pattern = None;
        }
        self.occurrences += 1;
        self.values.insert(value);
    }

    /// Pattern shared by every recorded value.
    #[must_use]
    pub fn pattern(&self) -> Option<ValuePattern> {
        if self.mixed { None } else { self.pattern }
    }

    /// Up to `max` example values in sorted order.
    #[must_use]
    pub fn examples(&self, max: usize) -> Vec<String> {
        let mut values: Vec<&String> = self.values.iter().collect();
        values.sort_unstable();
        values.into_iter().take(max).cloned().collect()
    }

    #[must_use]
    pub fn summary(&self, max_examples: usize) -> IdFieldSummary {
        IdFieldSummary {
            path: self.path.clone(),
            distinct_values: self.values.len(),
            occurrences: self.occurrences,
            pattern: self.pattern(),
            examples: self.examples(max_examples),
        }
    }
}

/// Serializable view of an [`IdField`] for reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdFieldSummary {
    pub path: String,
    pub distinct_values: usize,
    pub occurrences: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<ValuePattern>,
    pub examples: Vec<String>,
}

/// Identifier fields of a whole stream, keyed by path
#[derive(Debug, Clone, Default)]
pub struct IdFieldInventory {
    fields: HashMap<String, IdField>,
    /// Elements walked
    pub scanned: u64,
}

impl IdFieldInventory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every identifier-like value inside one element.
    pub fn observe(&mut self, element: &Value) {
        self.scanned += 1;
        let mut path = Vec::new();
        self.walk(element, &mut path, None);
    }

    fn walk(&mut self, value: &Value, path: &mut Vec<PathSegment>, key: Option<&str>) {
        match value {
            Value::Object(map) => {
                for (child_key, child) in map {
                    path.push(PathSegment::Key(child_key.clone()));
                    self.walk(child, path, Some(child_key));
                    path.pop();
                }
            }
            Value::Array(items) => {
                path.push(PathSegment::Wildcard);
                for item in items {
                    self.walk(item, path, key);
                }
                path.pop();
            }
            Value::String(text) => {
                if key.is_some_and(is_id_key) || is_entity_id(text) {
                    self.record(path, text.clone());
                }
            }
            Value::Number(number) => {
                if key.is_some_and(is_id_key) {
                    self.record(path, number.to_string());
                }
            }
            Value::Bool(_) | Value::Null => {}
        }
    }

    fn record(&mut self, path: &[PathSegment], value: String) {
        if path.is_empty() {
            return;
        }
        let rendered = PathExpression::from_segments(path.to_vec()).as_str().to_string();
        let wildcard = path.contains(&PathSegment::Wildcard);
        self.fields
            .entry(rendered.clone())
            .or_insert_with(|| IdField::new(rendered, wildcard))
            .record(value);
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&IdField> {
        self.fields.get(path)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields ordered by path.
    #[must_use]
    pub fn fields(&self) -> Vec<&IdField> {
        let mut fields: Vec<&IdField> = self.fields.values().collect();
        fields.sort_by(|a, b| a.path.cmp(&b.path));
        fields
    }

    #[must_use]
    pub fn summaries(&self, max_examples: usize) -> Vec<IdFieldSummary> {
        self.fields()
            .into_iter()
            .map(|field| field.summary(max_examples))
            .collect()
    }
}

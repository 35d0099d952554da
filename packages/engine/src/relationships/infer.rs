//! Value-overlap relationship detection between two inventories

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use super::id_fields::{IdField, IdFieldInventory};

/// Cardinality label of a [`DetectedRelationship`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipType {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl RelationshipType {
    /// Label from whether each side traverses an array.
    ///
    /// Scalar-to-scalar pairs are one-to-one only when both sides have the
    /// same number of distinct values.
    #[must_use]
    pub fn classify(left: &IdField, right: &IdField) -> Self {
        match (left.wildcard, right.wildcard) {
            (true, true) => RelationshipType::ManyToMany,
            (true, false) => RelationshipType::OneToMany,
            (false, true) => RelationshipType::ManyToOne,
            (false, false) if left.values.len() == right.values.len() => RelationshipType::OneToOne,
            (false, false) => RelationshipType::ManyToOne,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RelationshipType::OneToOne => "one-to-one",
            RelationshipType::OneToMany => "one-to-many",
            RelationshipType::ManyToOne => "many-to-one",
            RelationshipType::ManyToMany => "many-to-many",
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A left path whose values are found among a right path's values
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedRelationship {
    pub left_path: String,
    pub right_path: String,
    pub relationship_type: RelationshipType,
    /// Distinct left values present on the right
    pub matched_count: usize,
    /// Distinct left values
    pub total_count: usize,
    /// `matched_count / total_count` as a percentage
    pub coverage: f64,
}

/// Every left × right path pair whose coverage is at least `min_coverage`.
///
/// Results are ordered by coverage, then matched count (both descending),
/// then by path. With `same_source` set, a path is never paired with itself.
#[must_use]
pub fn infer_relationships(
    left: &IdFieldInventory,
    right: &IdFieldInventory,
    min_coverage: f64,
    same_source: bool,
) -> Vec<DetectedRelationship> {
    let mut found = Vec::new();
    for left_field in left.fields() {
        if left_field.values.is_empty() {
            continue;
        }
        for right_field in right.fields() {
            if same_source && left_field.path == right_field.path {
                continue;
            }
            let matched = left_field
                .values
                .iter()
                .filter(|value| right_field.values.contains(value.as_str()))
                .count();
            if matched == 0 {
                continue;
            }
            let total = left_field.values.len();
            let coverage = matched as f64 / total as f64 * 100.0;
            if coverage < min_coverage {
                continue;
            }
            found.push(DetectedRelationship {
                left_path: left_field.path.clone(),
                right_path: right_field.path.clone(),
                relationship_type: RelationshipType::classify(left_field, right_field),
                matched_count: matched,
                total_count: total,
                coverage,
            });
        }
    }
    found.sort_by(rank);
    found
}

fn rank(a: &DetectedRelationship, b: &DetectedRelationship) -> Ordering {
    b.coverage
        .partial_cmp(&a.coverage)
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.matched_count.cmp(&a.matched_count))
        .then_with(|| a.left_path.cmp(&b.left_path))
        .then_with(|| a.right_path.cmp(&b.right_path))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn inventory(elements: &[serde_json::Value]) -> IdFieldInventory {
        let mut inventory = IdFieldInventory::new();
        for element in elements {
            inventory.observe(element);
        }
        inventory
    }

    #[test]
    fn players_relate_to_characters() {
        let players = inventory(&[
            json!({"entityId": "Player:1"}),
            json!({"entityId": "Player:2"}),
        ]);
        let characters = inventory(&[
            json!({"entityId": "Character:1", "payload": {"playerId": "Player:1"}}),
            json!({"entityId": "Character:2", "payload": {"playerId": "Player:2"}}),
            json!({"entityId": "Character:3", "payload": {"playerId": "Player:2"}}),
        ]);

        let found = infer_relationships(&players, &characters, 30.0, false);
        assert_eq!(found.len(), 1);
        let top = &found[0];
        assert_eq!(top.left_path, "entityId");
        assert_eq!(top.right_path, "payload.playerId");
        assert_eq!(top.coverage, 100.0);
        assert_eq!(top.relationship_type, RelationshipType::OneToOne);
    }

    #[test]
    fn coverage_threshold_filters_pairs() {
        let left = inventory(&[
            json!({"refId": "A:1"}),
            json!({"refId": "A:2"}),
            json!({"refId": "A:3"}),
            json!({"refId": "A:4"}),
        ]);
        let right = inventory(&[json!({"id": "A:1"})]);
        assert!(infer_relationships(&left, &right, 30.0, false).is_empty());
        let relaxed = infer_relationships(&left, &right, 10.0, false);
        assert_eq!(relaxed.len(), 1);
        assert_eq!(relaxed[0].coverage, 25.0);
        assert_eq!(relaxed[0].relationship_type, RelationshipType::ManyToOne);
    }

    #[test]
    fn array_sides_set_cardinality() {
        let guilds = inventory(&[json!({"memberIds": ["P:1", "P:2"]})]);
        let players = inventory(&[json!({"id": "P:1"}), json!({"id": "P:2"})]);
        let found = infer_relationships(&guilds, &players, 30.0, false);
        assert_eq!(found[0].relationship_type, RelationshipType::OneToMany);
        let reverse = infer_relationships(&players, &guilds, 30.0, false);
        assert_eq!(reverse[0].relationship_type, RelationshipType::ManyToOne);
    }

    #[test]
    fn same_source_skips_identical_paths() {
        let items = inventory(&[json!({"id": "X:1", "parentId": "X:1"})]);
        let found = infer_relationships(&items, &items, 30.0, true);
        assert!(found.iter().all(|r| r.left_path != r.right_path));
        assert_eq!(found.len(), 2);
    }
}

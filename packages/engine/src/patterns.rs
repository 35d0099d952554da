//! Value patterns recognized by schema and relationship inference

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static ENTITY_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z][A-Za-z0-9_]*:[A-Za-z0-9_\-]+$").expect("static pattern compiles")
});

static ISO_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}([T ]\d{2}:\d{2}(:\d{2}(\.\d+)?)?(Z|[+-]\d{2}:?\d{2})?)?$")
        .expect("static pattern compiles")
});

static GUID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("static pattern compiles")
});

/// Recognized string shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValuePattern {
    /// `Prefix:suffix`, e.g. `Player:42`
    EntityId,
    IsoDate,
    Guid,
}

impl ValuePattern {
    /// First pattern `text` matches, most specific first.
    #[must_use]
    pub fn detect(text: &str) -> Option<Self> {
        if GUID.is_match(text) {
            Some(ValuePattern::Guid)
        } else if ISO_DATE.is_match(text) {
            Some(ValuePattern::IsoDate)
        } else if ENTITY_ID.is_match(text) {
            Some(ValuePattern::EntityId)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ValuePattern::EntityId => "entity-id",
            ValuePattern::IsoDate => "iso-date",
            ValuePattern::Guid => "guid",
        }
    }
}

impl fmt::Display for ValuePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Does `text` look like an entity reference (`Prefix:suffix`)?
#[inline]
#[must_use]
pub fn is_entity_id(text: &str) -> bool {
    ENTITY_ID.is_match(text)
}

/// Prefix of an entity id, e.g. `Player` for `Player:42`.
#[must_use]
pub fn entity_prefix(text: &str) -> Option<&str> {
    text.split_once(':').map(|(prefix, _)| prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_each_pattern() {
        assert_eq!(ValuePattern::detect("Player:42"), Some(ValuePattern::EntityId));
        assert_eq!(ValuePattern::detect("2024-05-01"), Some(ValuePattern::IsoDate));
        assert_eq!(ValuePattern::detect("2024-05-01T10:00:00.123Z"), Some(ValuePattern::IsoDate));
        assert_eq!(
            ValuePattern::detect("3f2504e0-4f89-11d3-9a0c-0305e82c3301"),
            Some(ValuePattern::Guid)
        );
        assert_eq!(ValuePattern::detect("hello world"), None);
        assert_eq!(ValuePattern::detect("http://x"), None);
    }

    #[test]
    fn entity_prefix_splits_on_first_colon() {
        assert_eq!(entity_prefix("Guild:7:extra"), Some("Guild"));
        assert_eq!(entity_prefix("plain"), None);
    }
}

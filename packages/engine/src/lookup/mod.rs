//! Type-name lookups against an external knowledge base
//!
//! Resolves `$type` names found in entity payloads to symbol metadata. The
//! knowledge base is an external process; [`ProcessTypeLookup`] is an
//! explicitly opened and explicitly closed handle to it.

mod process;

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use process::ProcessTypeLookup;

use crate::error::Result;

/// One member (field, property, method) of a symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolMember {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Metadata describing a type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<SymbolMember>,
    /// Fields this type does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Asynchronous type-name resolution
pub trait TypeLookup {
    /// Metadata for `type_name`, or `None` if the knowledge base has no such type.
    fn lookup(&mut self, type_name: &str) -> impl Future<Output = Result<Option<SymbolInfo>>> + Send;
}

/// Result of resolving one type name
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupOutcome {
    pub type_name: String,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<SymbolInfo>,
}

/// Resolve each name in order, stopping at the first failure.
///
/// # Errors
///
/// Propagates the first lookup error.
pub async fn lookup_all<L, I, S>(lookup: &mut L, type_names: I) -> Result<Vec<LookupOutcome>>
where
    L: TypeLookup,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut outcomes = Vec::new();
    for type_name in type_names {
        let type_name = type_name.as_ref();
        let symbol = lookup.lookup(type_name).await?;
        outcomes.push(LookupOutcome {
            type_name: type_name.to_string(),
            found: symbol.is_some(),
            symbol,
        });
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use hashbrown::HashMap;
    use serde_json::json;

    use super::*;

    struct FixedLookup(HashMap<String, SymbolInfo>);

    impl TypeLookup for FixedLookup {
        async fn lookup(&mut self, type_name: &str) -> Result<Option<SymbolInfo>> {
            Ok(self.0.get(type_name).cloned())
        }
    }

    #[test]
    fn symbols_keep_unmodelled_fields() {
        let symbol: SymbolInfo = serde_json::from_value(json!({
            "name": "Game.Player",
            "kind": "class",
            "members": [{"name": "Level", "type": "int"}],
            "file": "Player.cs"
        }))
        .expect("valid symbol");
        assert_eq!(symbol.members[0].type_name.as_deref(), Some("int"));
        assert_eq!(symbol.extra["file"], json!("Player.cs"));
    }

    #[tokio::test]
    async fn lookup_all_reports_each_name() {
        let player: SymbolInfo = serde_json::from_value(json!({"name": "Game.Player"})).expect("valid");
        let mut lookup = FixedLookup(HashMap::from([("Game.Player".to_string(), player)]));
        let outcomes = lookup_all(&mut lookup, ["Game.Player", "Game.Missing"])
            .await
            .expect("lookups succeed");
        assert!(outcomes[0].found);
        assert!(!outcomes[1].found);
        assert!(outcomes[1].symbol.is_none());
    }
}

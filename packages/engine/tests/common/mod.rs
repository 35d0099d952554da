//! Shared fixtures for engine integration tests

#![allow(dead_code)]

use std::io::Write;

use entscan_engine::prelude::*;
use serde_json::{Value, json};
use tempfile::NamedTempFile;

/// Write `document` to a temporary `.json` file that lives as long as the handle.
pub fn write_json(document: &Value) -> NamedTempFile {
    write_text(&document.to_string())
}

pub fn write_text(text: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .expect("create temp file");
    file.write_all(text.as_bytes()).expect("write fixture");
    file.flush().expect("flush fixture");
    file
}

pub fn source(file: &NamedTempFile) -> QuerySource {
    QuerySource::new(file.path())
}

/// Two players at levels 10 and 20.
pub fn players() -> NamedTempFile {
    write_json(&json!({
        "version": 3,
        "entities": [
            {"entityId": "Player:1", "payload": {"level": 10, "name": "Ayla", "tags": ["new"]}},
            {"entityId": "Player:2", "payload": {"level": 20, "name": "Bram", "guildId": "Guild:1"}}
        ]
    }))
}

/// Players referenced by characters through `payload.playerId`.
pub fn live() -> NamedTempFile {
    write_json(&json!({
        "entities": [
            {"entityId": "Player:1", "payload": {"level": 10}},
            {"entityId": "Player:2", "payload": {"level": 20}},
            {"entityId": "Player:3", "payload": {"level": 30}}
        ]
    }))
}

pub fn chars() -> NamedTempFile {
    write_json(&json!({
        "entities": [
            {"entityId": "Character:1", "payload": {"playerId": "Player:1", "class": "Knight"}},
            {"entityId": "Character:2", "payload": {"playerId": "Player:2", "class": "Mage"}},
            {"entityId": "Character:3", "payload": {"playerId": "Player:2", "class": "Knight"}}
        ]
    }))
}

/// Engine with a tiny read chunk so every test crosses chunk boundaries.
pub fn engine() -> QueryEngine {
    QueryEngine::new(EngineConfig::default().with_stream(StreamConfig::default().with_chunk_size(7)))
}

pub fn strict_engine() -> QueryEngine {
    QueryEngine::new(
        EngineConfig::default()
            .with_stream(StreamConfig::default().with_chunk_size(7))
            .with_query(QueryConfig::default().with_strict_filters(true)),
    )
}

//! Builder and binary tests over temporary entity files

use std::io::Write;
use std::process::{Command, Output};

use serde_json::{Value, json};
use tempfile::NamedTempFile;

fn fixture(document: &Value) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .expect("create temp file");
    file.write_all(document.to_string().as_bytes()).expect("write fixture");
    file
}

fn live() -> NamedTempFile {
    fixture(&json!({
        "entities": [
            {"entityId": "Player:1", "payload": {"level": 10}},
            {"entityId": "Player:2", "payload": {"level": 20}}
        ]
    }))
}

fn chars() -> NamedTempFile {
    fixture(&json!({
        "entities": [
            {"entityId": "Character:1", "payload": {"playerId": "Player:1", "class": "Knight"}},
            {"entityId": "Character:2", "payload": {"playerId": "Player:2", "class": "Mage"}}
        ]
    }))
}

fn entscan(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_entscan"))
        .args(args)
        .env("ENTSCAN_LOG", "off")
        .output()
        .expect("run entscan")
}

fn json_stdout(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "entscan failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("json output")
}

#[tokio::test]
async fn builder_runs_filtered_stats() {
    let file = live();
    let stats = entscan::file(file.path())
        .chunk_size(5)
        .filter("payload.level > 10")
        .stats("payload.level")
        .await
        .expect("stats");
    assert_eq!(stats.count, 1);
    assert_eq!(stats.sum, 20.0);
}

#[tokio::test]
async fn builder_joins_sibling_file() {
    let (players, characters) = (live(), chars());
    let result = entscan::file(characters.path())
        .join(players.path(), entscan::join::JoinOptions::new())
        .await
        .expect("join");
    assert_eq!(result.left_key, "payload.playerId");
    assert_eq!(result.total_matched, 2);
}

#[test]
fn stats_verb_prints_json() {
    let file = live();
    let path = file.path().to_string_lossy().into_owned();
    let output = entscan(&["stats", &path, "payload.level", "--format", "json"]);
    assert_eq!(
        json_stdout(&output),
        json!({"count": 2, "sum": 30.0, "avg": 15.0, "min": 10.0, "max": 20.0, "scanned": 2, "filterIgnored": false})
    );
}

#[test]
fn query_verb_selects_and_filters() {
    let file = live();
    let path = file.path().to_string_lossy().into_owned();
    let output = entscan(&[
        "query",
        &path,
        "--select",
        "entityId",
        "--filter",
        "payload.level > 10",
        "--format",
        "json",
    ]);
    let value = json_stdout(&output);
    assert_eq!(value["items"], json!([{"entityId": "Player:2"}]));
    assert_eq!(value["totalMatched"], json!(1));
}

#[test]
fn group_verb_prints_a_table() {
    let file = chars();
    let path = file.path().to_string_lossy().into_owned();
    let output = entscan(&["group", &path, "payload.class"]);
    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.starts_with("value   count  share\n"), "{text}");
    assert!(text.contains("Knight      1  50.0%"), "{text}");
}

#[test]
fn join_without_relationship_fails_with_hint() {
    let left = fixture(&json!({"entities": [{"entityId": "Ship:1"}]}));
    let right = fixture(&json!({"entities": [{"entityId": "Port:1"}]}));
    let output = entscan(&[
        "join",
        &left.path().to_string_lossy(),
        &right.path().to_string_lossy(),
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("explicit left and right keys"), "{stderr}");
}

#[test]
fn strict_filters_reject_bad_expressions() {
    let file = live();
    let path = file.path().to_string_lossy().into_owned();
    let permissive = entscan(&["count", &path, "--filter", "level", "--format", "json"]);
    assert_eq!(json_stdout(&permissive)["filterIgnored"], json!(true));

    let strict = entscan(&["count", &path, "--filter", "level", "--strict-filters"]);
    assert!(!strict.status.success());
}

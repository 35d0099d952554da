//! Type lookups against a scripted knowledge-base process

#![cfg(unix)]

use std::time::Duration;

use entscan_engine::lookup::lookup_all;
use entscan_engine::prelude::*;

const RESPONDER: &str = r#"
while IFS= read -r line; do
  id=$(printf '%s' "$line" | sed 's/.*"id":\([0-9]*\).*/\1/')
  case "$line" in
    *'"typeName":"Game.Player"'*)
      printf '{"id":%s,"found":true,"symbol":{"name":"Game.Player","kind":"class","members":[{"name":"Level","type":"int"}]}}\n' "$id" ;;
    *'"typeName":"Boom"'*)
      printf '{"id":%s,"error":"index unavailable"}\n' "$id" ;;
    *)
      echo "warming up"
      printf '{"id":999,"found":true,"symbol":{"name":"Stale"}}\n'
      printf '{"id":%s,"found":false}\n' "$id" ;;
  esac
done
"#;

fn shell(script: &str) -> LookupConfig {
    LookupConfig::new("sh")
        .with_args(["-c", script])
        .with_request_timeout(Duration::from_secs(5))
}

#[tokio::test]
async fn resolves_known_and_unknown_types() {
    let mut lookup = ProcessTypeLookup::spawn(&shell(RESPONDER)).expect("spawn");

    let player = lookup.lookup("Game.Player").await.expect("lookup");
    let player = player.expect("known type");
    assert_eq!(player.name, "Game.Player");
    assert_eq!(player.kind.as_deref(), Some("class"));
    assert_eq!(player.members[0].type_name.as_deref(), Some("int"));

    let missing = lookup.lookup("Game.Missing").await.expect("lookup");
    assert!(missing.is_none());

    lookup.close().await.expect("close");
}

#[tokio::test]
async fn lookup_all_preserves_order() {
    let mut lookup = ProcessTypeLookup::spawn(&shell(RESPONDER)).expect("spawn");
    let outcomes = lookup_all(&mut lookup, ["Game.Missing", "Game.Player"])
        .await
        .expect("lookups");

    assert_eq!(outcomes[0].type_name, "Game.Missing");
    assert!(!outcomes[0].found);
    assert!(outcomes[1].found);
    lookup.close().await.expect("close");
}

#[tokio::test]
async fn error_responses_become_lookup_errors() {
    let mut lookup = ProcessTypeLookup::spawn(&shell(RESPONDER)).expect("spawn");
    let err = lookup.lookup("Boom").await.expect_err("error response");

    assert_eq!(err.kind(), ErrorKind::Lookup);
    assert!(err.to_string().contains("index unavailable"));
    lookup.close().await.expect("close");
}

#[tokio::test]
async fn silent_process_times_out() {
    let config = LookupConfig::new("sh")
        .with_args(["-c", "read line; sleep 30"])
        .with_request_timeout(Duration::from_millis(200));
    let mut lookup = ProcessTypeLookup::spawn(&config).expect("spawn");

    let err = lookup.lookup("Game.Player").await.expect_err("timeout");
    assert!(err.is_timeout());

    lookup.close().await.expect("close kills the process");
}

#[tokio::test]
async fn exited_process_is_an_error() {
    let mut lookup = ProcessTypeLookup::spawn(&shell("exit 0")).expect("spawn");
    let err = lookup.lookup("Game.Player").await.expect_err("no process");
    assert_eq!(err.kind(), ErrorKind::Lookup);
}

#[test]
fn missing_program_fails_to_spawn() {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime");
    let _guard = runtime.enter();
    let err = ProcessTypeLookup::spawn(&LookupConfig::new("/nonexistent/entscan-kb")).expect_err("spawn fails");
    assert_eq!(err.kind(), ErrorKind::Lookup);

    let err = ProcessTypeLookup::spawn(&LookupConfig::new("  ")).expect_err("empty program");
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

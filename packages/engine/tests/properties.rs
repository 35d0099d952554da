//! Property tests: streaming equivalence, path evaluation and pagination

mod common;

use common::{source, write_json};
use entscan_engine::prelude::*;
use proptest::prelude::*;
use serde_json::{Map, Value, json};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime")
}

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        (-1.0e6..1.0e6f64).prop_map(Value::from),
        "[a-zA-Z0-9 :_\\-\"\\\\é✓]{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..6)
                .prop_map(|fields| Value::Object(fields.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

async fn collect(engine: &QueryEngine, source: &QuerySource) -> Vec<Value> {
    let mut stream = engine.elements(source).await.expect("open");
    let mut values = Vec::new();
    while let Some(element) = stream.next_element().await.expect("element") {
        assert_eq!(element.index, values.len() as u64);
        values.push(element.value);
    }
    values
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn streamed_elements_equal_whole_document_parse(
        entities in prop::collection::vec(arb_json(), 0..8),
        trailer in arb_json(),
        chunk_size in 1usize..32,
    ) {
        let document = json!({"header": trailer.clone(), "entities": entities, "trailer": trailer});
        let file = write_json(&document);
        let engine = QueryEngine::new(
            EngineConfig::default().with_stream(StreamConfig::default().with_chunk_size(chunk_size)),
        );

        let text = std::fs::read_to_string(file.path()).expect("read back");
        let parsed: Value = serde_json::from_str(&text).expect("valid document");
        let expected = parsed["entities"].as_array().cloned().unwrap_or_default();

        let streamed = runtime().block_on(collect(&engine, &source(&file)));
        prop_assert_eq!(streamed, expected);
    }

    #[test]
    fn first_is_head_of_evaluate(value in arb_json(), keys in prop::collection::vec("[a-z]{1,6}|\\[\\*\\]|\\[[0-3]\\]", 1..4)) {
        let mut text = String::new();
        for key in &keys {
            if !key.starts_with('[') && !text.is_empty() {
                text.push('.');
            }
            text.push_str(key);
        }
        let Ok(path) = PathExpression::parse(&text) else {
            return Ok(());
        };
        prop_assert_eq!(path.first(&value), path.evaluate(&value).first().copied());
    }

    #[test]
    fn pagination_is_a_window_over_matches(total in 0usize..30, offset in 0usize..35, limit in 0usize..12) {
        let entities: Vec<Value> = (0..total).map(|i| json!({"n": i})).collect();
        let file = write_json(&json!({ "entities": entities }));
        let engine = QueryEngine::default();

        let all = runtime()
            .block_on(engine.execute_query(&source(&file), &QueryOptions::new().with_limit(usize::MAX)))
            .expect("query");
        let page = runtime()
            .block_on(engine.execute_query(
                &source(&file),
                &QueryOptions::new().with_offset(offset).with_limit(limit),
            ))
            .expect("query");

        let window: Vec<Value> = all.items.iter().skip(offset).take(limit).cloned().collect();
        prop_assert_eq!(page.items, window);
        prop_assert_eq!(page.total_matched, all.total_matched);
        prop_assert_eq!(page.total_matched, total as u64);
    }
}

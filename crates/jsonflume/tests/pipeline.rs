//! End-to-end pipeline tests over the public API.

mod common;

use common::{ORIGINAL, STREAM};
use jsonflume::{
    path, serialize_documents, stringify_stream, stringify_tokens, Deserializer, FramingOptions,
    ParserOptions, PathDetector, PathPattern, PathSelector, PathStreamSplitter, Serializer,
    SerializerOptions, SourceKey, SourceValue, StreamingParser, Token, Value,
};

fn parse_stream_chunks() -> Vec<Token> {
    let mut parser = StreamingParser::new(ParserOptions::default());
    let mut tokens = Vec::new();
    for chunk in STREAM {
        parser.feed(chunk);
        for token in parser.by_ref() {
            tokens.push(token.expect("stream should parse"));
        }
    }
    for token in parser.finish() {
        tokens.push(token.expect("stream should parse"));
    }
    tokens
}

#[test]
fn chunked_parse_restringifies_byte_exactly() {
    assert_eq!(stringify_tokens(parse_stream_chunks()), ORIGINAL);
}

#[test]
fn deserialized_value_matches_serde_json() {
    let tokens = parse_stream_chunks();
    let values: Vec<_> = Deserializer::new(
        PathDetector::new(tokens.into_iter().map(Ok)),
    )
    .map(|v| v.unwrap())
    .collect();
    assert_eq!(values.len(), 1);

    let mine: serde_json::Value = serde_json::from_str(&values[0].value.to_string()).unwrap();
    let oracle: serde_json::Value = serde_json::from_str(ORIGINAL).unwrap();
    assert_eq!(mine, oracle);
}

#[test]
fn selection_pipeline_finds_each_results_array() {
    let pattern: PathPattern = "batches.*.results".parse().unwrap();
    let selected = PathSelector::new(
        PathDetector::new(parse_stream_chunks().into_iter().map(Ok)),
        pattern,
    );
    let found: Vec<_> = Deserializer::new(selected).map(|v| v.unwrap()).collect();

    assert_eq!(found.len(), 2);
    assert_eq!(found[0].path, path!["batches", 0, "results"]);
    assert_eq!(
        found[0].value,
        Value::Array(vec![Value::from("r1"), Value::from("r2")])
    );
    assert_eq!(found[1].path, path!["batches", 1, "results"]);
    assert_eq!(found[1].value, Value::Array(vec![Value::from("r3")]));
}

#[test]
fn splitting_pipeline_rerootes_each_subtree() {
    let pattern: PathPattern = "batches.*.results".parse().unwrap();
    let selected = PathSelector::new(
        PathDetector::new(parse_stream_chunks().into_iter().map(Ok)),
        pattern,
    );

    let mut roots = Vec::new();
    let mut lengths = Vec::new();
    for sub in PathStreamSplitter::new(selected) {
        let sub = sub.unwrap();
        roots.push(sub.path().clone());
        let values: Vec<_> = Deserializer::new(sub).map(|v| v.unwrap()).collect();
        assert_eq!(values.len(), 1);
        // Re-rooted: the subtree deserializes at its own root.
        assert_eq!(values[0].path, path![]);
        let Value::Array(items) = &values[0].value else {
            panic!("expected array");
        };
        lengths.push(items.len());
    }
    assert_eq!(
        roots,
        vec![path!["batches", 0, "results"], path!["batches", 1, "results"]]
    );
    assert_eq!(lengths, vec![2, 1]);
}

#[test]
fn serializer_output_flows_through_the_whole_diamond() {
    let source = SourceValue::Object(vec![
        (
            SourceKey::from("test"),
            SourceValue::string_stream(["chunk1".to_string(), "chunk2".to_string()]),
        ),
        (
            SourceKey::from("lazy"),
            SourceValue::lazy(|| Ok(SourceValue::Array(vec![SourceValue::Number(1.0)]))),
        ),
    ]);
    let text = stringify_stream(Serializer::new(source)).unwrap();
    insta::assert_snapshot!(text, @r#"{"test":"chunk1chunk2","lazy":[1]}"#);

    // Parse the produced text back and deserialize it.
    let mut parser = StreamingParser::new(ParserOptions::default());
    parser.feed(&text);
    let values: Vec<_> = jsonflume::from_tokens(parser.finish())
        .map(|v| v.unwrap())
        .collect();
    assert_eq!(values.len(), 1);
    assert_eq!(values[0].value.to_string(), text);
}

#[test]
fn json_seq_round_trips_through_parser_and_serializer() {
    let docs = vec![SourceValue::from("a"), SourceValue::from("b")];
    let text = stringify_stream(serialize_documents(
        docs,
        SerializerOptions::default(),
        FramingOptions::json_seq(),
    ))
    .unwrap();
    insta::assert_snapshot!(text.escape_debug().to_string(), @r#"\u{1e}\"a\"\n\u{1e}\"b\"\n"#);

    let mut parser = StreamingParser::new(ParserOptions {
        allow_multiple_json_values: true,
    });
    parser.feed(&text);
    let values: Vec<_> = jsonflume::from_tokens(parser.finish())
        .map(|v| v.unwrap().value)
        .collect();
    assert_eq!(values, vec![Value::from("a"), Value::from("b")]);
}

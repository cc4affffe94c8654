//! Benchmarks for the streaming parser and serializer.
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use jsonflume::{
    stringify_stream, ParserOptions, Serializer, SourceKey, SourceValue, StreamingParser,
};

/// Produce a deterministic JSON document of roughly `target_len` bytes: an
/// array of small objects, so the parser exercises every token kind.
fn make_json_payload(target_len: usize) -> String {
    let mut s = String::with_capacity(target_len + 64);
    s.push('[');
    let mut i = 0u64;
    while s.len() < target_len {
        if i > 0 {
            s.push(',');
        }
        s.push_str(&format!(
            r#"{{"id":{i},"name":"item-{i}","tags":["a","b"],"score":-1.25e2}}"#
        ));
        i += 1;
    }
    s.push(']');
    s
}

fn run_streaming_parser(payload: &str, parts: usize) -> usize {
    // The payload is pure ASCII, so byte chunks are valid feed boundaries.
    let chunk_size = payload.len().div_ceil(parts);
    let mut parser = StreamingParser::new(ParserOptions::default());
    let mut produced = 0usize;
    for chunk in payload.as_bytes().chunks(chunk_size) {
        parser.feed(std::str::from_utf8(chunk).expect("payload is ASCII"));
        for token in parser.by_ref() {
            let _ = token.expect("benchmark payload is valid");
            produced += 1;
        }
    }
    for token in parser.finish() {
        let _ = token.expect("benchmark payload is valid");
        produced += 1;
    }
    produced
}

fn bench_parser(c: &mut Criterion) {
    let payload = make_json_payload(64 * 1024);
    let mut group = c.benchmark_group("streaming_parser");
    for parts in [1usize, 16, 256] {
        group.bench_with_input(BenchmarkId::from_parameter(parts), &parts, |b, &parts| {
            b.iter(|| run_streaming_parser(black_box(&payload), parts));
        });
    }
    group.finish();
}

fn bench_serializer(c: &mut Criterion) {
    c.bench_function("serializer_object_stream", |b| {
        b.iter(|| {
            let entries: Vec<(SourceKey, SourceValue)> = (0..512)
                .map(|i| {
                    (
                        SourceKey::from(format!("key{i}")),
                        SourceValue::Array(vec![
                            SourceValue::Number(f64::from(i)),
                            SourceValue::from("value"),
                        ]),
                    )
                })
                .collect();
            let source = SourceValue::Object(entries);
            stringify_stream(Serializer::new(source)).expect("benchmark source is valid")
        });
    });
}

criterion_group!(benches, bench_parser, bench_serializer);
criterion_main!(benches);

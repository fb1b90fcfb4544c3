//! Benchmarks for cachewire codec operations

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cachewire::options::ClientOptions;
use cachewire::protocol::{build_request, parse_header, Opcode, RequestFrame};
use cachewire::value::{encode, Value};

fn codec_benchmarks(c: &mut Criterion) {
    let frame = RequestFrame::new(Opcode::Set)
        .with_extra(vec![0u8; 8])
        .with_key(&b"benchmark-key"[..])
        .with_value(vec![0x5A; 1024]);

    c.bench_function("build_request_1k", |b| {
        b.iter(|| build_request(black_box(&frame)).unwrap())
    });

    let bytes = build_request(&frame).unwrap();
    c.bench_function("parse_header", |b| {
        b.iter(|| parse_header(black_box(&bytes)).unwrap())
    });

    let options = ClientOptions::new();
    let value = Value::Text("x".repeat(1024));
    c.bench_function("encode_text_1k", |b| {
        b.iter(|| encode(black_box(&value), &options).unwrap())
    });
}

criterion_group!(benches, codec_benchmarks);
criterion_main!(benches);

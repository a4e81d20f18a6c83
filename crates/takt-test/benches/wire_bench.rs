//! Benchmarks for TAKT wire framing

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use takt_wire::{decode, encode_event, encode_subscribe};

fn bench_event_encode(c: &mut Criterion) {
    let payload = vec![0x5A; 256];

    c.bench_function("event_encode", |b| {
        b.iter(|| encode_event(black_box("telemetry/attitude"), black_box(&payload)).unwrap())
    });
}

fn bench_event_decode(c: &mut Criterion) {
    let payload = vec![0x5A; 256];
    let bytes = encode_event("telemetry/attitude", &payload).unwrap();

    c.bench_function("event_decode", |b| {
        b.iter(|| {
            let frame = decode(black_box(&bytes)).unwrap();
            black_box(frame)
        })
    });
}

fn bench_subscribe_roundtrip(c: &mut Criterion) {
    c.bench_function("subscribe_roundtrip", |b| {
        b.iter(|| {
            let bytes = encode_subscribe(black_box("telemetry/attitude")).unwrap();
            let frame = decode(&bytes).unwrap();
            black_box(frame);
        })
    });
}

criterion_group!(
    benches,
    bench_event_encode,
    bench_event_decode,
    bench_subscribe_roundtrip
);
criterion_main!(benches);

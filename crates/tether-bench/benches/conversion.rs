//! Criterion micro-benchmarks for converter resolution and transformers.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use tether_convert::Transformer;
use tether_converters::{default_registry, Clamp, Offset, Round, Scale};
use tether_core::{Value, ValueType};

fn bench_resolve_identity(c: &mut Criterion) {
    let registry = default_registry();
    c.bench_function("resolve_identity", |b| {
        b.iter(|| black_box(registry.resolve(&ValueType::Int, &ValueType::Int)));
    });
}

fn bench_resolve_last_registered(c: &mut Criterion) {
    let registry = default_registry();
    let from = ValueType::Float;
    let to = ValueType::Vector { dims: 3 };
    c.bench_function("resolve_last_registered", |b| {
        b.iter(|| black_box(registry.resolve(&from, &to)));
    });
}

fn bench_convert_float_to_string(c: &mut Criterion) {
    let registry = default_registry();
    let value = Value::Float(1234.5678);
    c.bench_function("convert_float_to_string", |b| {
        b.iter(|| black_box(registry.convert(&value, &ValueType::String)));
    });
}

fn bench_transformer_4_stages(c: &mut Criterion) {
    let t = Transformer::new()
        .then(Scale(0.5))
        .then(Offset(10.0))
        .then(Clamp::new(0.0, 100.0))
        .then(Round { decimals: 2 });
    c.bench_function("transformer_4_stages", |b| {
        b.iter(|| black_box(t.apply(Value::Float(black_box(77.777)))));
    });
}

criterion_group!(
    benches,
    bench_resolve_identity,
    bench_resolve_last_registered,
    bench_convert_float_to_string,
    bench_transformer_4_stages
);
criterion_main!(benches);

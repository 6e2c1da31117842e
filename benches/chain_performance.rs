// benches/chain_performance.rs
//! Benchmarks for building, inspecting and encoding error chains.
//!
//! Run with `cargo bench`; reports land in `target/criterion`.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use opstack_errors::{
    encode_http_error, encode_rpc_error, fail, kinds, ops, unwrap_terminal, wrap, Error, Kind, Op,
    Stack,
};
use std::io;

const DEPTHS: [usize; 4] = [1, 4, 16, 64];

fn chain_of(depth: usize) -> Error {
    let mut err = Error::new("layer_0", io::Error::other("db down"));
    for i in 1..depth {
        err = Error::new(format!("layer_{}", i), err);
    }
    err.with_kind(Kind::INTERNAL)
}

// ============================================================================
// Construction
// ============================================================================

fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("construction");

    group.bench_function("new_explicit_op", |b| {
        b.iter(|| black_box(Error::new("persist.Create", io::Error::other("db down"))))
    });

    group.bench_function("fail_macro", |b| {
        b.iter(|| black_box(fail!("config missing", Kind::NOT_FOUND)))
    });

    group.bench_function("wrap_macro_augmented", |b| {
        b.iter(|| {
            let inner = Error::from_message("repo.Find", "no rows");
            black_box(wrap!(inner, Op::from("svc.Find"), "lookup failed", Kind::NOT_FOUND))
        })
    });

    group.bench_function("wrap_dynamic_message", |b| {
        b.iter(|| {
            let detail = format!("no user {}", black_box(42));
            black_box(wrap!(io::Error::other("no rows"), detail))
        })
    });

    group.finish();
}

// ============================================================================
// Inspection
// ============================================================================

fn bench_inspection(c: &mut Criterion) {
    let mut group = c.benchmark_group("inspection");

    for depth in DEPTHS {
        let err = chain_of(depth);

        group.bench_with_input(BenchmarkId::new("render", depth), &err, |b, err| {
            b.iter(|| black_box(err.to_string()))
        });
        group.bench_with_input(BenchmarkId::new("ops", depth), &err, |b, err| {
            b.iter(|| black_box(ops(err)))
        });
        group.bench_with_input(BenchmarkId::new("kinds", depth), &err, |b, err| {
            b.iter(|| black_box(kinds(err)))
        });
        group.bench_with_input(BenchmarkId::new("unwrap_terminal", depth), &err, |b, err| {
            b.iter(|| black_box(unwrap_terminal(err).to_string()))
        });
        group.bench_with_input(BenchmarkId::new("stack_capture", depth), &err, |b, err| {
            b.iter(|| black_box(Stack::capture(err)))
        });
    }

    group.finish();
}

// ============================================================================
// Egress
// ============================================================================

fn bench_egress(c: &mut Criterion) {
    let mut group = c.benchmark_group("egress");
    let err = chain_of(4);

    group.bench_function("encode_rpc", |b| b.iter(|| black_box(encode_rpc_error(&err))));
    group.bench_function("encode_http", |b| b.iter(|| black_box(encode_http_error(&err))));
    group.bench_function("log_write_to", |b| {
        let mut line = String::with_capacity(256);
        b.iter(|| {
            line.clear();
            err.log_view().write_to(&mut line).unwrap();
            black_box(line.len())
        })
    });
    group.bench_function("stack_to_json", |b| {
        let stack = Stack::capture(&err);
        b.iter(|| black_box(serde_json::to_string(&stack).unwrap()))
    });

    group.finish();
}

criterion_group!(construction_benches, bench_construction);
criterion_group!(inspection_benches, bench_inspection);
criterion_group!(egress_benches, bench_egress);

criterion_main!(construction_benches, inspection_benches, egress_benches);

//! Dispatch benchmarks.
//!
//! Run with: `cargo bench -p trellis-router`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use trellis_builder::RouteBuilder;
use trellis_core::{plain_fn, Request, Response};
use trellis_router::Router;

fn build_router(num_routes: usize) -> Router {
    let b = RouteBuilder::new();

    for i in 0..num_routes / 2 {
        b.get(
            format!("/api/v1/resource{i}"),
            plain_fn(|_req, sink| sink.write_body(b"ok")),
        );
    }
    for i in 0..num_routes / 2 {
        b.get(
            format!("/api/v1/resource{i}/:id"),
            plain_fn(|_req, sink| sink.write_body(b"ok")),
        );
    }

    Router::new(b.route_defs().expect("acyclic")).expect("valid patterns")
}

fn bench_static_match(c: &mut Criterion) {
    let router = build_router(100);

    c.bench_function("static_match", |b| {
        b.iter(|| {
            let mut res = Response::new();
            router.dispatch(black_box(&Request::get("/api/v1/resource25")), &mut res);
            black_box(res);
        });
    });
}

fn bench_param_match(c: &mut Criterion) {
    let router = build_router(100);

    c.bench_function("param_match", |b| {
        b.iter(|| {
            let mut res = Response::new();
            router.dispatch(black_box(&Request::get("/api/v1/resource25/12345")), &mut res);
            black_box(res);
        });
    });
}

fn bench_not_found(c: &mut Criterion) {
    let router = build_router(100);

    c.bench_function("not_found", |b| {
        b.iter(|| {
            let mut res = Response::new();
            router.dispatch(black_box(&Request::get("/definitely/missing")), &mut res);
            black_box(res);
        });
    });
}

criterion_group!(benches, bench_static_match, bench_param_match, bench_not_found);
criterion_main!(benches);

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the platform call gateway: memoized invocation
// against a warm resolution cache versus resolving from scratch on every
// call, both over the in-memory stub host.

use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use jila_bridge::capabilities::Capability;
use jila_bridge::gateway::Gateway;
use jila_bridge::stub::StubHost;
use jila_core::types::ArgValue;

const HOST: &str = "dev/jila/JilaActivity";

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// `getResId` through a gateway whose cache is already warm.
fn bench_memoized_invoke(c: &mut Criterion) {
    let host = Arc::new(StubHost::with_capabilities(HOST));
    let gateway = Gateway::new(host);
    let descriptor = Capability::ResolveResourceId.descriptor(HOST);
    let args = [ArgValue::from("ic_launcher"), ArgValue::from("drawable")];
    // Warm the cache.
    let _ = gateway.invoke(&descriptor, &args);

    c.bench_function("invoke getResId (memoized)", |b| {
        b.iter(|| black_box(gateway.invoke(black_box(&descriptor), black_box(&args))));
    });
}

/// The same call, invalidating the cache first so every iteration resolves
/// class and operation again.
fn bench_cold_invoke(c: &mut Criterion) {
    let host = Arc::new(StubHost::with_capabilities(HOST));
    let gateway = Gateway::new(host);
    let descriptor = Capability::ResolveResourceId.descriptor(HOST);
    let args = [ArgValue::from("ic_launcher"), ArgValue::from("drawable")];

    c.bench_function("invoke getResId (resolve each call)", |b| {
        b.iter(|| {
            gateway.invalidate();
            black_box(gateway.invoke(black_box(&descriptor), black_box(&args)))
        });
    });
}

/// Argument validation alone, which every call pays before resolution.
fn bench_check_args(c: &mut Criterion) {
    let descriptor = Capability::PostNotification.descriptor(HOST);
    let args = [
        ArgValue::from("default"),
        ArgValue::from(1),
        ArgValue::from("Hello"),
        ArgValue::from("World"),
        ArgValue::from(0x7f08_0000),
    ];

    c.bench_function("check_args postNotification", |b| {
        b.iter(|| black_box(descriptor.check_args(black_box(&args))));
    });
}

criterion_group!(
    benches,
    bench_memoized_invoke,
    bench_cold_invoke,
    bench_check_args
);
criterion_main!(benches);

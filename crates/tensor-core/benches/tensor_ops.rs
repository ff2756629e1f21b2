// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for tensor operations.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tensor_core::{matvec, softmax, top_k};

fn logits(n: usize) -> Vec<f32> {
    (0..n).map(|i| ((i * 37) % 101) as f32 * 0.01 - 0.5).collect()
}

fn bench_softmax(c: &mut Criterion) {
    let mut group = c.benchmark_group("softmax");
    for n in [10usize, 1000, 10_000] {
        let x = logits(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &x, |b, x| {
            b.iter(|| softmax(black_box(x)))
        });
    }
    group.finish();
}

fn bench_top_k(c: &mut Criterion) {
    let probs = softmax(&logits(1000));
    c.bench_function("top_k/1000/5", |b| b.iter(|| top_k(black_box(&probs), 5)));
}

fn bench_matvec(c: &mut Criterion) {
    let (rows, cols) = (1000, 4096);
    let matrix = logits(rows * cols);
    let input = logits(cols);
    let bias = vec![0.0; rows];
    let mut output = vec![0.0; rows];
    c.bench_function("matvec/1000x4096", |b| {
        b.iter(|| matvec(black_box(&matrix), black_box(&input), &bias, &mut output))
    });
}

criterion_group!(benches, bench_softmax, bench_top_k, bench_matvec);
criterion_main!(benches);

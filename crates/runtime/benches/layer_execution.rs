// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for convolution algorithms and full forward passes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use layers::{ConvAlgorithm, Layer, TileConfig};
use model_ir::{Activation, LayerDef, ModelGraph};
use rand::rngs::StdRng;
use rand::SeedableRng;
use runtime::{InitMode, Network, RuntimeConfig};
use tensor_core::{Shape, Tensor};

/// conv3-like geometry at reduced channel counts.
fn conv_def() -> LayerDef {
    LayerDef::convolution("conv", 48, 64, 3, 1, 1)
}

fn bench_convolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("convolution");
    let input = Tensor::new(48, 27, 27, 0.25);

    let variants = [
        ("direct", ConvAlgorithm::Direct, TileConfig::default()),
        ("tiled_default", ConvAlgorithm::Tiled, TileConfig::default()),
        ("tiled_small", ConvAlgorithm::Tiled, TileConfig::new(16, 4, 8, 8)),
    ];
    for (label, algorithm, tiles) in variants {
        let mut layer = Layer::from_def(&conv_def(), algorithm, tiles).unwrap();
        layer.initialize_random(&mut StdRng::seed_from_u64(0), 0.01);
        group.bench_with_input(BenchmarkId::from_parameter(label), &input, |b, input| {
            b.iter(|| black_box(layer.forward(input.clone())));
        });
    }
    group.finish();
}

fn bench_small_network(c: &mut Criterion) {
    let graph = ModelGraph::new(
        "bench-net",
        Shape::new(3, 64, 64),
        vec![
            LayerDef::convolution("conv1", 3, 16, 5, 2, 2),
            LayerDef::max_pool("pool1", 3, 2),
            LayerDef::convolution("conv2", 16, 32, 3, 1, 1),
            LayerDef::max_pool("pool2", 3, 2),
            LayerDef::fully_connected("fc", 32 * 7 * 7, 100).with_activation(Activation::Identity),
        ],
    )
    .validate()
    .unwrap();

    let mut config = RuntimeConfig::default();
    config.init.mode = InitMode::Random;
    config.init.seed = Some(0);
    let mut net = Network::from_graph(graph, &config).unwrap();
    let input = Tensor::new(3, 64, 64, 0.1);

    c.bench_function("small_network_forward", |b| {
        b.iter(|| black_box(net.forward(input.clone()).unwrap()));
    });
}

criterion_group!(benches, bench_convolution, bench_small_network);
criterion_main!(benches);

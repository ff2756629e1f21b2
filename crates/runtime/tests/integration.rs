// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: end-to-end inference pipeline.
//!
//! These tests exercise the complete flow from graph construction →
//! layer instantiation → weight loading → forward pass → top-k, proving that
//! the four library crates compose correctly.

use layers::{write_weight_file, ConvAlgorithm, TileConfig};
use model_ir::{graph::Validated, Activation, LayerDef, ModelGraph, METADATA_FILE};
use runtime::{InitMode, Network, RuntimeConfig, RuntimeError};
use std::path::PathBuf;
use tensor_core::{Shape, Tensor};

// ── Helpers ────────────────────────────────────────────────────

/// conv(1→1, k1) → pool(2, 2) → fc(4→2, identity) on a 1×4×4 input.
fn hand_checked_graph() -> ModelGraph<Validated> {
    ModelGraph::new(
        "hand-checked",
        Shape::new(1, 4, 4),
        vec![
            LayerDef::convolution("conv", 1, 1, 1, 1, 0),
            LayerDef::max_pool("pool", 2, 2),
            LayerDef::fully_connected("fc", 4, 2).with_activation(Activation::Identity),
        ],
    )
    .validate()
    .unwrap()
}

/// A scaled-down AlexNet-like chain on a 3×32×32 input.
fn mini_alexnet() -> ModelGraph<Validated> {
    ModelGraph::new(
        "mini-alexnet",
        Shape::new(3, 32, 32),
        vec![
            LayerDef::convolution("conv1", 3, 8, 5, 2, 2),
            LayerDef::max_pool("pool1", 3, 2),
            LayerDef::convolution("conv2", 8, 12, 3, 1, 1),
            LayerDef::convolution("conv3", 12, 12, 3, 1, 1),
            LayerDef::max_pool("pool3", 3, 2),
            LayerDef::fully_connected("fc6", 12 * 3 * 3, 32),
            LayerDef::fully_connected("fc7", 32, 10).with_activation(Activation::Identity),
        ],
    )
    .validate()
    .unwrap()
}

fn config(init: InitMode, convolution: ConvAlgorithm) -> RuntimeConfig {
    let mut config = RuntimeConfig {
        convolution,
        tiles: TileConfig::new(4, 3, 5, 5),
        ..Default::default()
    };
    config.init.mode = init;
    config.init.seed = Some(1234);
    config.init.stddev = 0.2;
    config
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tiled_cnn_integration_{name}"));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn ramp(shape: Shape) -> Tensor {
    let data = (0..shape.num_elements())
        .map(|i| ((i % 17) as f32 - 8.0) / 8.0)
        .collect();
    Tensor::from_vec(shape, data).unwrap()
}

// ── Full Pipeline Tests ────────────────────────────────────────

#[test]
fn test_loaded_weights_hand_checked() {
    let dir = scratch_dir("hand_checked");
    // conv doubles the input; ReLU clears the negatives.
    write_weight_file(&dir.join("conv_combined.bin"), &[2.0], &[0.0]).unwrap();
    // fc: row 0 sums the pooled values, row 1 picks the last one.
    write_weight_file(
        &dir.join("fc_combined.bin"),
        &[1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        &[0.5, -1.0],
    )
    .unwrap();

    let graph = hand_checked_graph();
    let mut net = Network::from_graph(graph, &config(InitMode::Random, ConvAlgorithm::Tiled)).unwrap();
    let report = net.load_weights(&dir);
    assert!(report.is_complete(), "{}", report.summary());

    let input = Tensor::from_vec(
        Shape::new(1, 4, 4),
        vec![
            1.0, -3.0, 0.0, 2.0, //
            0.5, 0.0, 1.5, -1.0, //
            -2.0, -2.0, 4.0, 0.0, //
            -1.0, -0.5, 0.0, 3.0,
        ],
    )
    .unwrap();

    // After conv+ReLU and 2×2 max pool: [2, 4, 0, 8].
    let logits = net.logits(input.clone()).unwrap();
    assert_eq!(logits, vec![14.5, 7.0]);

    let probs = net.forward(input).unwrap();
    let expected_p1 = 1.0 / (1.0 + (7.5f32).exp());
    assert!((probs[1] - expected_p1).abs() < 1e-6);
    assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-6);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_zero_weights_give_uniform_distribution() {
    let mut net = Network::from_graph(mini_alexnet(), &config(InitMode::Zeros, ConvAlgorithm::Tiled)).unwrap();
    let probs = net.forward(ramp(Shape::new(3, 32, 32))).unwrap();
    assert_eq!(probs.len(), 10);
    assert!(probs.iter().all(|&p| (p - 0.1).abs() < 1e-6));
}

#[test]
fn test_direct_and_tiled_agree_end_to_end() {
    let input = ramp(Shape::new(3, 32, 32));
    let mut direct = Network::from_graph(mini_alexnet(), &config(InitMode::Random, ConvAlgorithm::Direct)).unwrap();
    let mut tiled = Network::from_graph(mini_alexnet(), &config(InitMode::Random, ConvAlgorithm::Tiled)).unwrap();

    let a = direct.logits(input.clone()).unwrap();
    let b = tiled.logits(input).unwrap();
    for (x, y) in a.iter().zip(&b) {
        assert!((x - y).abs() <= 1e-3 * x.abs().max(1.0), "{x} vs {y}");
    }
}

#[test]
fn test_partial_load_still_runs() {
    let dir = scratch_dir("partial");
    let graph = mini_alexnet();
    // Only conv2 and fc7 present; fc6 mis-sized.
    write_weight_file(&dir.join("conv2_combined.bin"), &vec![0.01; 12 * 8 * 9], &[0.0; 12]).unwrap();
    write_weight_file(&dir.join("fc6_combined.bin"), &[0.0; 10], &[]).unwrap();
    write_weight_file(&dir.join("fc7_combined.bin"), &vec![0.0; 10 * 32], &[0.0; 10]).unwrap();

    let mut net = Network::from_graph(graph, &config(InitMode::Random, ConvAlgorithm::Tiled)).unwrap();
    let before_conv1 = net.layer("conv1").unwrap().parameters().cloned();
    let report = net.load_weights(&dir);

    assert!(!report.is_complete());
    assert_eq!(report.loaded, vec!["conv2", "fc7"]);
    let failed: Vec<&str> = report.failures.iter().map(|f| f.layer.as_str()).collect();
    assert_eq!(failed, vec!["conv1", "conv3", "fc6"]);
    assert_eq!(report.skipped, vec!["pool1", "pool3"]);
    assert_eq!(net.layer("conv1").unwrap().parameters().cloned(), before_conv1);

    // fc7 is all zeros, so the output is uniform regardless of the rest.
    let out = net.classify(ramp(Shape::new(3, 32, 32)), 3).unwrap();
    assert_eq!(out.predictions.len(), 3);
    assert!(out.probabilities.iter().all(|&p| (p - 0.1).abs() < 1e-6));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_missing_directory_reports_every_layer() {
    let mut net = Network::from_graph(mini_alexnet(), &config(InitMode::Zeros, ConvAlgorithm::Direct)).unwrap();
    let report = net.load_weights("/nonexistent/tiled-cnn-weights");
    assert_eq!(report.failures.len(), 5);
    assert!(report.loaded.is_empty());
    assert!(net.forward(ramp(Shape::new(3, 32, 32))).is_ok());
}

#[test]
fn test_metadata_is_advisory() {
    let dir = scratch_dir("metadata");
    std::fs::write(
        dir.join(METADATA_FILE),
        "# name out in [k]\nconv 1 1 1\nfc 3 4\nnot a valid line\n",
    )
    .unwrap();
    write_weight_file(&dir.join("conv_combined.bin"), &[1.0], &[0.0]).unwrap();
    write_weight_file(&dir.join("fc_combined.bin"), &[0.0; 8], &[0.0; 2]).unwrap();

    let mut net = Network::from_graph(hand_checked_graph(), &config(InitMode::Zeros, ConvAlgorithm::Tiled)).unwrap();
    let report = net.load_weights(&dir);
    assert!(report.is_complete());
    assert_eq!(report.metadata_warnings.len(), 1);
    assert!(report.metadata_warnings[0].contains("'fc'"));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_input_shape_guard() {
    let mut net = Network::from_graph(mini_alexnet(), &config(InitMode::Zeros, ConvAlgorithm::Tiled)).unwrap();
    assert!(matches!(
        net.forward(Tensor::new(3, 224, 224, 0.0)),
        Err(RuntimeError::InputShape { .. })
    ));
}

#[test]
fn test_profiled_forward_records_every_layer() {
    let mut net = Network::from_graph(mini_alexnet(), &config(InitMode::Random, ConvAlgorithm::Tiled)).unwrap();
    let (probs, metrics) = net.forward_profiled(ramp(Shape::new(3, 32, 32))).unwrap();
    assert_eq!(probs.len(), 10);
    let names: Vec<&str> = metrics.layer_metrics.iter().map(|m| m.layer_name.as_str()).collect();
    assert_eq!(names, vec!["conv1", "pool1", "conv2", "conv3", "pool3", "fc6", "fc7"]);
    assert_eq!(metrics.layer_metrics[0].output_shape, Shape::new(8, 16, 16));
    assert!(metrics.total_duration >= metrics.total_compute_duration);
}

#[test]
fn test_config_file_roundtrip() {
    let dir = scratch_dir("config");
    let path = dir.join("tcnn.toml");
    let original = config(InitMode::Random, ConvAlgorithm::Direct);
    std::fs::write(&path, original.to_toml().unwrap()).unwrap();
    let loaded = RuntimeConfig::from_file(&path).unwrap();
    assert_eq!(loaded, original);
    let _ = std::fs::remove_dir_all(&dir);
}

// ── Reference architecture ─────────────────────────────────────

#[test]
fn test_alexnet_network_layout() {
    let net = Network::from_config(&config(InitMode::Zeros, ConvAlgorithm::Tiled)).unwrap();
    assert_eq!(net.num_layers(), 11);
    assert_eq!(net.num_classes(), 1000);
    assert_eq!(net.input_shape(), Shape::new(3, 224, 224));
    assert_eq!(net.layer("fc8").unwrap().activation(), Activation::Identity);
    assert_eq!(net.layer("fc7").unwrap().activation(), Activation::Relu);
}

#[test]
#[ignore = "full AlexNet forward pass; slow in debug builds"]
fn test_alexnet_zero_weights_uniform() {
    let mut net = Network::from_config(&config(InitMode::Zeros, ConvAlgorithm::Tiled)).unwrap();
    let out = net.classify(Tensor::new(3, 224, 224, 0.5), 5).unwrap();
    assert_eq!(out.probabilities.len(), 1000);
    assert!(out.probabilities.iter().all(|&p| (p - 0.001).abs() < 1e-6));
    assert_eq!(out.predictions.len(), 5);
}

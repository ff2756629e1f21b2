// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `tcnn run` command: classify one input tensor.
//!
//! Builds AlexNet, loads whatever weights are available, runs a forward
//! pass and prints the top-k predictions with their labels. Missing weights
//! are reported but never fatal; the affected layers keep their
//! initialization.

use anyhow::Context;
use layers::ConvAlgorithm;
use runtime::{InferenceOutput, Network, RuntimeConfig};
use std::path::{Path, PathBuf};
use tensor_core::{Shape, Tensor};

/// Name of the label file looked up inside the weights directory.
pub const LABELS_FILE: &str = "imagenet_classes.txt";

/// Arguments of `tcnn run` that override the configuration.
pub struct RunArgs {
    pub weights: Option<PathBuf>,
    pub input: Option<PathBuf>,
    pub fill: f32,
    pub labels: Option<PathBuf>,
    pub top_k: Option<usize>,
    pub algorithm: Option<ConvAlgorithm>,
}

pub fn execute(mut config: RuntimeConfig, args: RunArgs) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              tcnn · AlexNet Inference                ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    if let Some(dir) = args.weights {
        config.weights_dir = dir;
    }
    if let Some(k) = args.top_k {
        config.top_k = k;
    }
    if let Some(algorithm) = args.algorithm {
        config.convolution = algorithm;
    }

    println!("  Weights:     {}", config.weights_dir.display());
    println!("  Convolution: {}", config.convolution);
    if config.convolution == ConvAlgorithm::Tiled {
        println!("  Tiles:       {}", config.tiles);
    }
    println!();

    // Step 1: build the network.
    println!("  [1/3] Building network...");
    let mut network = Network::from_config(&config)?;
    println!("        {}", network.graph().summary());
    println!();

    // Step 2: load weights; partial loads are allowed.
    println!("  [2/3] Loading weights...");
    let report = network.load_weights(&config.weights_dir);
    println!("        {}", report.summary());
    for failure in &report.failures {
        println!("        ! {}: {}", failure.layer, failure.error);
    }
    for warning in &report.metadata_warnings {
        println!("        ! metadata: {warning}");
    }
    if !report.is_complete() {
        println!("        Continuing with initialized parameters for failed layers.");
    }
    println!();

    // Step 3: classify.
    println!("  [3/3] Running inference...");
    let input = match &args.input {
        Some(path) => read_input(path, network.input_shape())?,
        None => {
            println!("        No input file; using constant fill {}.", args.fill);
            Tensor::filled(network.input_shape(), args.fill)
        }
    };
    let output = network.classify(input, config.top_k)?;
    println!();

    let labels_path = args
        .labels
        .unwrap_or_else(|| config.weights_dir.join(LABELS_FILE));
    let labels = load_labels(&labels_path, network.num_classes());
    print_results(&output, &labels);

    Ok(())
}

/// Reads a raw native-endian f32 tensor of the given shape.
fn read_input(path: &Path, shape: Shape) -> anyhow::Result<Tensor> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read input '{}'", path.display()))?;
    let expected = shape.size_bytes();
    if bytes.len() != expected {
        anyhow::bail!(
            "input '{}' is {} bytes, expected {expected} for shape {shape}",
            path.display(),
            bytes.len(),
        );
    }
    let data: Vec<f32> = bytemuck::pod_collect_to_vec(&bytes);
    Ok(Tensor::from_vec(shape, data)?)
}

/// Reads one label per line, padding with `Class_<i>` for missing entries.
fn load_labels(path: &Path, num_classes: usize) -> Vec<String> {
    let mut labels: Vec<String> = match std::fs::read_to_string(path) {
        Ok(text) => text.lines().map(|l| l.trim().to_string()).collect(),
        Err(e) => {
            tracing::warn!("no labels at {} ({e}); using class indices", path.display());
            Vec::new()
        }
    };
    labels.truncate(num_classes);
    labels.extend((labels.len()..num_classes).map(|i| format!("Class_{i}")));
    labels
}

fn print_results(output: &InferenceOutput, labels: &[String]) {
    println!("  Top-{} predictions:", output.predictions.len());
    println!("   {:<5} {:<6} {:<40} {:>10}", "Rank", "Class", "Label", "Prob.");
    println!("   {}", "-".repeat(64));
    for (rank, p) in output.predictions.iter().enumerate() {
        let label = labels
            .get(p.class_index)
            .map(String::as_str)
            .unwrap_or("?");
        println!(
            "   {:<5} {:<6} {:<40} {:>9.4}%",
            rank + 1,
            p.class_index,
            super::truncate(label, 40),
            p.probability * 100.0,
        );
    }
    println!();

    if let Some(metrics) = &output.metrics {
        println!("  Metrics:");
        println!("   {}", metrics.summary());
        println!();
    }
}

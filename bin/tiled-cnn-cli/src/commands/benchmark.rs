// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `tcnn benchmark` command: direct against tiled convolution.
//!
//! Runs every AlexNet convolution layer with both algorithms on identical
//! random parameters and a synthetic input, and prints a comparison table
//! of mean latency and the largest element-wise difference.

use layers::{ConvAlgorithm, Layer};
use model_ir::LayerDef;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use runtime::RuntimeConfig;
use std::time::{Duration, Instant};
use tensor_core::{Shape, Tensor};

/// Seed used when the configuration does not pin one.
const DEFAULT_SEED: u64 = 42;

struct BenchResult {
    layer: String,
    output_shape: Shape,
    direct: Duration,
    tiled: Duration,
    max_diff: f32,
}

pub fn execute(
    config: &RuntimeConfig,
    iterations: usize,
    only_layer: Option<String>,
) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║           tcnn · Convolution Benchmark               ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    if iterations == 0 {
        anyhow::bail!("iterations must be at least 1");
    }
    config.tiles.validate()?;

    let graph = model_ir::alexnet().validate()?;
    let targets: Vec<(&LayerDef, Shape)> = graph
        .iter_with_shapes()
        .filter(|(def, _, _)| matches!(def.kind, model_ir::LayerKind::Convolution { .. }))
        .filter(|(def, _, _)| only_layer.as_deref().map_or(true, |n| def.name == n))
        .map(|(def, input, _)| (def, input))
        .collect();
    if targets.is_empty() {
        anyhow::bail!(
            "no convolution layer named '{}'",
            only_layer.unwrap_or_default()
        );
    }

    println!("  Tiles:      {}", config.tiles);
    println!("  Iterations: {iterations}");
    println!();

    // ── Results Table ──────────────────────────────────────────
    println!(
        "  {:<8} {:<16} {:>12} {:>12} {:>8} {:>10}",
        "Layer", "Output", "Direct", "Tiled", "Speedup", "Max diff",
    );
    println!("  {}", "-".repeat(72));

    let mut rng = StdRng::seed_from_u64(config.init.seed.unwrap_or(DEFAULT_SEED));
    let mut results = Vec::new();
    for (def, input_shape) in targets {
        let result = run_single(config, def, input_shape, iterations, &mut rng)?;
        println!(
            "  {:<8} {:<16} {:>10.2}ms {:>10.2}ms {:>7.2}x {:>10.2e}",
            result.layer,
            result.output_shape.to_string(),
            millis(result.direct),
            millis(result.tiled),
            millis(result.direct) / millis(result.tiled).max(f64::EPSILON),
            result.max_diff,
        );
        results.push(result);
    }
    println!();

    // ── Summary ────────────────────────────────────────────────
    let direct_total: Duration = results.iter().map(|r| r.direct).sum();
    let tiled_total: Duration = results.iter().map(|r| r.tiled).sum();
    let worst = results.iter().map(|r| r.max_diff).fold(0.0f32, f32::max);
    println!("  Summary:");
    println!("   Direct total: {:.2}ms", millis(direct_total));
    println!("   Tiled total:  {:.2}ms", millis(tiled_total));
    println!("   Largest difference: {worst:.2e}");
    println!();

    Ok(())
}

fn run_single(
    config: &RuntimeConfig,
    def: &LayerDef,
    input_shape: Shape,
    iterations: usize,
    rng: &mut StdRng,
) -> anyhow::Result<BenchResult> {
    let mut direct = Layer::from_def(def, ConvAlgorithm::Direct, config.tiles)?;
    let mut tiled = Layer::from_def(def, ConvAlgorithm::Tiled, config.tiles)?;
    direct.initialize_random(rng, config.init.stddev);
    if let (Some(src), Some(dst)) = (direct.parameters(), tiled.parameters_mut()) {
        *dst = src.clone();
    }

    let data = (0..input_shape.num_elements())
        .map(|_| rng.gen_range(0.0f32..1.0))
        .collect();
    let input = Tensor::from_vec(input_shape, data)?;

    let (direct_out, direct_time) = time_layer(&mut direct, &input, iterations);
    let (tiled_out, tiled_time) = time_layer(&mut tiled, &input, iterations);
    tracing::debug!("{}: direct {direct_time:?}, tiled {tiled_time:?}", def.name);

    let max_diff = direct_out
        .as_slice()
        .iter()
        .zip(tiled_out.as_slice())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0f32, f32::max);

    Ok(BenchResult {
        layer: def.name.clone(),
        output_shape: direct_out.shape(),
        direct: direct_time,
        tiled: tiled_time,
        max_diff,
    })
}

/// Runs one warm-up pass, then returns the last output and the mean time.
fn time_layer(layer: &mut Layer, input: &Tensor, iterations: usize) -> (Tensor, Duration) {
    let mut output = layer.forward(input.clone());
    let start = Instant::now();
    for _ in 0..iterations {
        output = layer.forward(input.clone());
    }
    (output, mean_duration(start.elapsed(), iterations))
}

fn mean_duration(total: Duration, iterations: usize) -> Duration {
    Duration::from_secs_f64(total.as_secs_f64() / iterations.max(1) as f64)
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

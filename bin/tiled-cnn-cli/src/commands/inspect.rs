// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `tcnn inspect` command: display the network structure.
//!
//! Prints the AlexNet layer chain with per-layer shapes, parameter counts
//! and activation sizes, plus what the configured weights directory holds.

use model_ir::{graph::Validated, ModelGraph};
use runtime::{RuntimeConfig, WeightLoader};
use tensor_core::Shape;

/// One row of the layer table, also the JSON record.
#[derive(Debug, serde::Serialize)]
struct LayerRow<'a> {
    index: usize,
    name: &'a str,
    kind: &'static str,
    activation: &'static str,
    input_shape: Shape,
    output_shape: Shape,
    parameters: usize,
    weight_file_present: bool,
}

#[derive(Debug, serde::Serialize)]
struct GraphReport<'a> {
    name: &'a str,
    input_shape: Shape,
    output_shape: Shape,
    total_parameters: usize,
    total_weight_bytes: usize,
    peak_activation_bytes: usize,
    convolution: String,
    layers: Vec<LayerRow<'a>>,
}

pub fn execute(config: &RuntimeConfig, json: bool) -> anyhow::Result<()> {
    let graph = model_ir::alexnet().validate()?;
    let loader = WeightLoader::new(&config.weights_dir);
    let report = build_report(&graph, config, &loader);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              tcnn · Network Inspector                ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    // ── Summary ────────────────────────────────────────────────
    println!("  Model: {}", report.name);
    println!("  Input: {}  Output: {}", report.input_shape, report.output_shape);
    println!("  Parameters: {}", report.total_parameters);
    println!(
        "  Total weights: {:.2} MB",
        report.total_weight_bytes as f64 / (1024.0 * 1024.0),
    );
    println!(
        "  Peak activation: {:.2} MB",
        report.peak_activation_bytes as f64 / (1024.0 * 1024.0),
    );
    println!("  Convolution: {}", report.convolution);
    println!();

    // ── Per-Layer Detail ───────────────────────────────────────
    println!(
        "  {:<4} {:<10} {:<16} {:<9} {:<14} {:<14} {:>12} {:>5}",
        "Idx", "Name", "Type", "Activ.", "Input", "Output", "#Params", "File",
    );
    println!("  {}", "-".repeat(92));

    for row in &report.layers {
        let file = if row.parameters > 0 {
            if row.weight_file_present { "yes" } else { "no" }
        } else {
            "-"
        };
        println!(
            "  {:<4} {:<10} {:<16} {:<9} {:<14} {:<14} {:>12} {:>5}",
            row.index,
            super::truncate(row.name, 10),
            row.kind,
            row.activation,
            row.input_shape.to_string(),
            row.output_shape.to_string(),
            row.parameters,
            file,
        );
    }
    println!();

    // ── Weights Directory ──────────────────────────────────────
    println!("  Weights directory: {}", loader.weights_dir().display());
    match loader.metadata() {
        Some(metadata) => {
            let warnings = metadata.check_against(&graph);
            println!("   Metadata entries: {}", metadata.len());
            if warnings.is_empty() {
                println!("   Metadata agrees with the architecture.");
            }
            for warning in warnings {
                println!("   ! {warning}");
            }
        }
        None => println!("   No metadata file."),
    }
    println!();

    Ok(())
}

fn build_report<'a>(
    graph: &'a ModelGraph<Validated>,
    config: &RuntimeConfig,
    loader: &WeightLoader,
) -> GraphReport<'a> {
    let layers = graph
        .iter_with_shapes()
        .map(|(def, input_shape, output_shape)| LayerRow {
            index: def.index,
            name: &def.name,
            kind: def.kind.as_str(),
            activation: def.activation.as_str(),
            input_shape,
            output_shape,
            parameters: def.num_parameters(),
            weight_file_present: def.has_learnable_parameters()
                && loader.layer_path(&def.name).is_file(),
        })
        .collect();

    let convolution = match config.convolution {
        layers::ConvAlgorithm::Direct => config.convolution.to_string(),
        layers::ConvAlgorithm::Tiled => format!("{} ({})", config.convolution, config.tiles),
    };

    GraphReport {
        name: &graph.name,
        input_shape: graph.input_shape,
        output_shape: graph.output_shape(),
        total_parameters: graph.total_parameters(),
        total_weight_bytes: graph.total_weight_bytes(),
        peak_activation_bytes: graph.peak_activation_bytes(),
        convolution,
        layers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_covers_every_layer() {
        let graph = model_ir::alexnet().validate().unwrap();
        let config = RuntimeConfig::default();
        let loader = WeightLoader::new("/nonexistent/tcnn-weights");
        let report = build_report(&graph, &config, &loader);

        assert_eq!(report.layers.len(), 11);
        assert_eq!(report.total_parameters, 61_100_840);
        assert!(report.layers.iter().all(|r| !r.weight_file_present));
        assert_eq!(report.layers[10].activation, "identity");

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["layers"][0]["name"], "conv1");
        assert_eq!(json["output_shape"]["width"], 1000);
    }
}

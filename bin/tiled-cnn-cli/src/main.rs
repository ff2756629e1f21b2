// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tcnn
//!
//! Command-line interface for the tiled-cnn inference engine.
//!
//! ## Usage
//! ```bash
//! # Classify a raw f32 image tensor
//! tcnn run --weights ./weights --input ./image.bin --top-k 5
//!
//! # Compare direct and tiled convolution on every AlexNet conv layer
//! tcnn benchmark --iterations 3
//!
//! # Print the layer table
//! tcnn inspect --json
//! ```

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tcnn",
    about = "AlexNet inference with direct and tiled convolution",
    version,
    author
)]
struct Cli {
    /// Path to a TOML configuration file (CLI arguments override it).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one input tensor and print the top-k predictions.
    Run {
        /// Directory holding `<layer>_combined.bin` files.
        #[arg(short, long)]
        weights: Option<PathBuf>,

        /// Raw native-endian f32 file of shape 3×224×224.
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Constant value for every input element when no file is given.
        #[arg(long, default_value_t = 0.5)]
        fill: f32,

        /// Label file, one class name per line.
        #[arg(short, long)]
        labels: Option<PathBuf>,

        /// Number of predictions to print.
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Convolution algorithm: direct or tiled.
        #[arg(short, long)]
        algorithm: Option<layers::ConvAlgorithm>,
    },

    /// Time direct against tiled convolution on each AlexNet conv layer.
    Benchmark {
        /// Timed repetitions per layer and algorithm.
        #[arg(short = 'n', long, default_value_t = 3)]
        iterations: usize,

        /// Only benchmark the named layer.
        #[arg(long)]
        layer: Option<String>,
    },

    /// Print the AlexNet layer graph with shapes and parameter counts.
    Inspect {
        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            weights,
            input,
            fill,
            labels,
            top_k,
            algorithm,
        } => commands::run::execute(
            config,
            commands::run::RunArgs {
                weights,
                input,
                fill,
                labels,
                top_k,
                algorithm,
            },
        ),
        Commands::Benchmark { iterations, layer } => {
            commands::benchmark::execute(&config, iterations, layer)
        }
        Commands::Inspect { json } => commands::inspect::execute(&config, json),
    }
}

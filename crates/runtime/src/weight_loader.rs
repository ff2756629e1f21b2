// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Weight loading from a directory of combined weight files.
//!
//! [`WeightLoader`] walks the layers in order and loads
//! `<dir>/<layer>_combined.bin` into every layer that has learnable
//! parameters. A failure on one layer never stops the pass: it is logged,
//! recorded in the [`LoadReport`], and the layer keeps whatever parameters
//! it had (zeros or random initialization).
//!
//! If the directory contains `network_metadata.txt`, its sizes are compared
//! against the architecture. Disagreements are warnings only; the weight
//! files are always interpreted with the architecture's shapes.

use layers::{weight_file_path, Layer, LayerError};
use model_ir::{graph::Validated, ModelGraph, NetworkMetadata, METADATA_FILE};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// A layer whose weights could not be loaded.
#[derive(Debug)]
pub struct LoadFailure {
    pub layer: String,
    pub error: LayerError,
}

/// Outcome of a weight-loading pass.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Layers whose parameters were replaced from disk.
    pub loaded: Vec<String>,
    /// Parameter-free layers that were not visited.
    pub skipped: Vec<String>,
    /// Layers that kept their previous parameters.
    pub failures: Vec<LoadFailure>,
    /// Disagreements between `network_metadata.txt` and the architecture.
    pub metadata_warnings: Vec<String>,
    /// Total bytes read from weight files.
    pub bytes_read: usize,
    /// Wall-clock time of the pass.
    pub duration: Duration,
}

impl LoadReport {
    /// `true` when every layer with learnable parameters loaded successfully.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Returns a one-line summary suitable for CLI output.
    pub fn summary(&self) -> String {
        format!(
            "Weights: {} loaded, {} failed, {} skipped ({:.1} MB in {:.2}ms)",
            self.loaded.len(),
            self.failures.len(),
            self.skipped.len(),
            self.bytes_read as f64 / (1024.0 * 1024.0),
            self.duration.as_secs_f64() * 1000.0,
        )
    }
}

/// Loads combined weight files from one directory.
#[derive(Debug, Clone)]
pub struct WeightLoader {
    weights_dir: PathBuf,
}

impl WeightLoader {
    pub fn new(weights_dir: impl Into<PathBuf>) -> Self {
        Self {
            weights_dir: weights_dir.into(),
        }
    }

    /// Returns the weights directory path.
    pub fn weights_dir(&self) -> &Path {
        &self.weights_dir
    }

    /// Path of the weight file for `layer_name`.
    pub fn layer_path(&self, layer_name: &str) -> PathBuf {
        weight_file_path(&self.weights_dir, layer_name)
    }

    /// Reads `network_metadata.txt`, if present and readable.
    pub fn metadata(&self) -> Option<NetworkMetadata> {
        let path = self.weights_dir.join(METADATA_FILE);
        match NetworkMetadata::from_file(&path) {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                tracing::info!("no usable metadata at {}: {e}", path.display());
                None
            }
        }
    }

    /// Loads weights into `layers`, which must be built from `graph` in order.
    pub fn load_into(&self, graph: &ModelGraph<Validated>, layers: &mut [Layer]) -> LoadReport {
        let start = Instant::now();
        let mut report = LoadReport::default();

        if let Some(metadata) = self.metadata() {
            for warning in metadata.check_against(graph) {
                tracing::warn!("metadata: {warning}");
                report.metadata_warnings.push(warning);
            }
        }

        for layer in layers.iter_mut() {
            let name = layer.name().to_string();
            if !layer.has_learnable_parameters() {
                report.skipped.push(name);
                continue;
            }

            let path = self.layer_path(&name);
            tracing::debug!("loading weights for '{name}' from {}", path.display());
            match layer.load_weights(&path) {
                Ok(()) => {
                    report.bytes_read += layer
                        .parameters()
                        .map_or(0, |p| p.len() * std::mem::size_of::<f32>());
                    report.loaded.push(name);
                }
                Err(error) => {
                    tracing::warn!("failed to load weights for '{name}': {error}");
                    report.failures.push(LoadFailure { layer: name, error });
                }
            }
        }

        report.duration = start.elapsed();
        if report.is_complete() {
            tracing::info!("{}", report.summary());
        } else {
            tracing::warn!("{}", report.summary());
        }
        report
    }
}

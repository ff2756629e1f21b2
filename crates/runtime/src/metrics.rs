// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Inference profiling metrics.
//!
//! [`InferenceMetrics`] collects per-layer and aggregate timing for one
//! forward pass. These metrics are the primary tool for comparing the direct
//! and tiled convolution paths.

use std::time::Duration;
use tensor_core::Shape;

/// Metrics for a single layer's execution.
#[derive(Debug, Clone, serde::Serialize)]
pub struct LayerMetrics {
    /// Layer name.
    pub layer_name: String,
    /// Layer kind label (e.g. `"tiled_conv"`).
    pub kind: &'static str,
    /// Time spent executing the layer computation.
    pub compute_duration: Duration,
    /// Shape of the tensor the layer produced.
    pub output_shape: Shape,
}

/// Aggregate metrics for a complete forward pass.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct InferenceMetrics {
    /// Total wall-clock time, including softmax.
    pub total_duration: Duration,
    /// Sum of the per-layer compute times.
    pub total_compute_duration: Duration,
    /// Largest activation produced by any layer, in bytes.
    pub peak_activation_bytes: usize,
    /// Per-layer metrics, in execution order.
    pub layer_metrics: Vec<LayerMetrics>,
}

impl InferenceMetrics {
    /// Creates an empty metrics container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records metrics for a single layer.
    pub fn record_layer(
        &mut self,
        name: impl Into<String>,
        kind: &'static str,
        compute: Duration,
        output_shape: Shape,
    ) {
        self.total_compute_duration += compute;
        self.peak_activation_bytes = self.peak_activation_bytes.max(output_shape.size_bytes());
        self.layer_metrics.push(LayerMetrics {
            layer_name: name.into(),
            kind,
            compute_duration: compute,
            output_shape,
        });
    }

    /// Finalises metrics with the total wall-clock time.
    pub fn finalise(&mut self, total: Duration) {
        self.total_duration = total;
    }

    /// Returns the slowest layer, if any were recorded.
    pub fn slowest_layer(&self) -> Option<&LayerMetrics> {
        self.layer_metrics.iter().max_by_key(|m| m.compute_duration)
    }

    /// Returns a human-readable summary suitable for CLI output.
    pub fn summary(&self) -> String {
        let peak_mb = self.peak_activation_bytes as f64 / (1024.0 * 1024.0);
        let slowest = self
            .slowest_layer()
            .map(|m| {
                format!(
                    ", slowest '{}' {:.2}ms",
                    m.layer_name,
                    m.compute_duration.as_secs_f64() * 1000.0
                )
            })
            .unwrap_or_default();

        format!(
            "Inference: {:.2}ms total, {} layers, {:.2}ms compute, peak activation {:.2} MB{}",
            self.total_duration.as_secs_f64() * 1000.0,
            self.layer_metrics.len(),
            self.total_compute_duration.as_secs_f64() * 1000.0,
            peak_mb,
            slowest,
        )
    }
}

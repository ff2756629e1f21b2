// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The network orchestrator.
//!
//! ```text
//! ModelGraph<Validated> + RuntimeConfig
//!     │  Network::from_graph()
//!     ▼
//! Network  (layers built, parameters initialized)
//!     │  .load_weights(dir)       optional, reports per-layer failures
//!     ▼
//! Network
//!     │  .forward(input) / .classify(input, k)
//!     ▼
//!   probabilities / InferenceOutput
//! ```
//!
//! The network owns its layers exclusively and never changes their order or
//! count after construction.

use crate::config::InitMode;
use crate::{InferenceMetrics, LoadReport, RuntimeConfig, RuntimeError, WeightLoader};
use layers::Layer;
use model_ir::{graph::Validated, ModelGraph};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use std::time::Instant;
use tensor_core::{softmax, top_k, Prediction, Shape, Tensor};

/// The result of classifying one input.
#[derive(Debug, Clone, serde::Serialize)]
pub struct InferenceOutput {
    /// Softmax probabilities, one per class.
    pub probabilities: Vec<f32>,
    /// The `k` most probable classes, most probable first.
    pub predictions: Vec<Prediction>,
    /// Per-layer timings, when profiling is enabled.
    pub metrics: Option<InferenceMetrics>,
}

/// A feed-forward classification network.
///
/// # Example
/// ```
/// use runtime::{Network, RuntimeConfig};
/// use runtime::config::InitMode;
/// use model_ir::{LayerDef, ModelGraph};
/// use tensor_core::{Shape, Tensor};
///
/// let graph = ModelGraph::new(
///     "tiny",
///     Shape::new(1, 4, 4),
///     vec![LayerDef::convolution("conv", 1, 2, 3, 1, 1), LayerDef::fully_connected("fc", 32, 3)],
/// )
/// .validate()
/// .unwrap();
/// let mut config = RuntimeConfig::default();
/// config.init.mode = InitMode::Zeros;
///
/// let mut net = Network::from_graph(graph, &config).unwrap();
/// let probs = net.forward(Tensor::new(1, 4, 4, 1.0)).unwrap();
/// assert_eq!(probs.len(), 3);
/// ```
#[derive(Debug)]
pub struct Network {
    graph: ModelGraph<Validated>,
    layers: Vec<Layer>,
    config: RuntimeConfig,
}

impl Network {
    /// Builds the layers described by `graph` and initializes their
    /// parameters according to `config.init`.
    pub fn from_graph(
        graph: ModelGraph<Validated>,
        config: &RuntimeConfig,
    ) -> Result<Self, RuntimeError> {
        config.validate()?;

        let mut layers = graph
            .iter_layers()
            .map(|def| Layer::from_def(def, config.convolution, config.tiles))
            .collect::<Result<Vec<_>, _>>()?;

        if config.init.mode == InitMode::Random {
            let mut rng = match config.init.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            for layer in &mut layers {
                layer.initialize_random(&mut rng, config.init.stddev);
            }
        }

        tracing::info!(
            "network '{}' built: {} layers, {} convolution, init {:?}",
            graph.name,
            layers.len(),
            config.convolution,
            config.init.mode,
        );

        Ok(Self {
            graph,
            layers,
            config: config.clone(),
        })
    }

    /// Builds the AlexNet reference network.
    pub fn from_config(config: &RuntimeConfig) -> Result<Self, RuntimeError> {
        let graph = model_ir::alexnet().validate()?;
        tracing::info!("{}", graph.summary());
        Self::from_graph(graph, config)
    }

    /// Loads `<dir>/<layer>_combined.bin` into every layer with learnable
    /// parameters. Failures are reported, not returned; layers that fail
    /// keep their current parameters.
    pub fn load_weights(&mut self, dir: impl AsRef<Path>) -> LoadReport {
        WeightLoader::new(dir.as_ref()).load_into(&self.graph, &mut self.layers)
    }

    /// Runs the network and returns softmax probabilities.
    ///
    /// # Errors
    /// Returns [`RuntimeError::InputShape`] if `input` does not have the
    /// graph's input shape.
    pub fn forward(&mut self, input: Tensor) -> Result<Vec<f32>, RuntimeError> {
        let logits = self.logits(input)?;
        Ok(softmax(&logits))
    }

    /// Like [`Network::forward`], also returning per-layer timings.
    pub fn forward_profiled(
        &mut self,
        input: Tensor,
    ) -> Result<(Vec<f32>, InferenceMetrics), RuntimeError> {
        let start = Instant::now();
        self.check_input(&input)?;
        let mut metrics = InferenceMetrics::new();
        let output = self.run_layers(input, Some(&mut metrics));
        let probabilities = softmax(output.as_slice());
        metrics.finalise(start.elapsed());
        tracing::debug!("{}", metrics.summary());
        Ok((probabilities, metrics))
    }

    /// Raw output of the final layer, before softmax.
    pub fn logits(&mut self, input: Tensor) -> Result<Vec<f32>, RuntimeError> {
        self.check_input(&input)?;
        Ok(self.run_layers(input, None).into_vec())
    }

    /// Runs the network and selects the `k` most probable classes.
    /// Metrics are collected when `enable_profiling` is set.
    pub fn classify(&mut self, input: Tensor, k: usize) -> Result<InferenceOutput, RuntimeError> {
        let (probabilities, metrics) = if self.config.enable_profiling {
            let (p, m) = self.forward_profiled(input)?;
            tracing::info!("{}", m.summary());
            (p, Some(m))
        } else {
            (self.forward(input)?, None)
        };
        let predictions = top_k(&probabilities, k);
        Ok(InferenceOutput {
            probabilities,
            predictions,
            metrics,
        })
    }

    /// Returns the model graph.
    pub fn graph(&self) -> &ModelGraph<Validated> {
        &self.graph
    }

    /// Returns the configuration the network was built with.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name() == name)
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn input_shape(&self) -> Shape {
        self.graph.input_shape
    }

    pub fn num_classes(&self) -> usize {
        self.graph.num_classes()
    }

    // ── Private helpers ────────────────────────────────────────

    fn check_input(&self, input: &Tensor) -> Result<(), RuntimeError> {
        if input.shape() != self.graph.input_shape {
            return Err(RuntimeError::InputShape {
                expected: self.graph.input_shape,
                actual: input.shape(),
            });
        }
        Ok(())
    }

    fn run_layers(&mut self, input: Tensor, mut metrics: Option<&mut InferenceMetrics>) -> Tensor {
        let mut current = input;
        for layer in &mut self.layers {
            let layer_start = Instant::now();
            current = layer.forward(current);
            let elapsed = layer_start.elapsed();
            tracing::debug!(
                "{} ({}): output {} in {:.2}ms",
                layer.name(),
                layer.kind_label(),
                current.shape(),
                elapsed.as_secs_f64() * 1000.0,
            );
            if let Some(m) = metrics.as_deref_mut() {
                m.record_layer(layer.name(), layer.kind_label(), elapsed, current.shape());
            }
        }
        current
    }
}

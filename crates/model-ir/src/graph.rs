// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Model graph: the complete network as an ordered chain of layers.
//!
//! # Type-State Pattern
//!
//! The graph transitions through states enforced at compile time:
//!
//! ```text
//! ModelGraph<Loaded>    : layers listed, not yet checked.
//!       │  .validate()
//!       ▼
//! ModelGraph<Validated> : shapes inferred end to end, ready to instantiate.
//! ```
//!
//! The runtime only accepts a validated graph, so every layer it builds is
//! guaranteed to receive the input shape it was described with.

use crate::{LayerDef, ModelError};
use std::collections::HashSet;
use std::fmt;
use tensor_core::Shape;

// ── Type-state markers ─────────────────────────────────────────────

/// Marker: graph has been assembled but not validated.
#[derive(Debug, Clone)]
pub struct Loaded;

/// Marker: graph has been validated and carries inferred shapes.
#[derive(Debug, Clone)]
pub struct Validated;

/// Sealed trait for graph states.
pub trait GraphState: fmt::Debug + Clone {}
impl GraphState for Loaded {}
impl GraphState for Validated {}

// ── ModelGraph ─────────────────────────────────────────────────────

/// The network represented as an ordered sequence of layers.
///
/// The layer order encodes the architecture and is fixed once the graph is
/// built. The generic parameter `S` encodes the validation state.
#[derive(Debug, Clone)]
pub struct ModelGraph<S: GraphState = Loaded> {
    /// Human-readable model name (e.g., `"alexnet"`).
    pub name: String,
    /// Shape of the tensor fed to the first layer.
    pub input_shape: Shape,
    /// Ordered list of layer definitions.
    pub layers: Vec<LayerDef>,
    /// Output shape of each layer (populated by validation).
    output_shapes: Vec<Shape>,
    /// State marker (zero-sized, compile-time only).
    _state: std::marker::PhantomData<S>,
}

// ── Loaded state ───────────────────────────────────────────────────

impl ModelGraph<Loaded> {
    /// Creates a new graph in the `Loaded` state.
    ///
    /// Each layer's `index` is set to its position in `layers`.
    pub fn new(name: impl Into<String>, input_shape: Shape, mut layers: Vec<LayerDef>) -> Self {
        for (i, layer) in layers.iter_mut().enumerate() {
            layer.index = i;
        }
        Self {
            name: name.into(),
            input_shape,
            layers,
            output_shapes: Vec::new(),
            _state: std::marker::PhantomData,
        }
    }

    /// Validates the graph and transitions to the `Validated` state.
    ///
    /// # Checks
    /// - The graph is non-empty.
    /// - Layer names are unique (they key the weight files).
    /// - The input shape has no zero extent.
    /// - Shape inference succeeds for every layer in order, and no layer
    ///   produces a zero-element output.
    pub fn validate(self) -> Result<ModelGraph<Validated>, ModelError> {
        if self.layers.is_empty() {
            return Err(ModelError::InvalidGraph(
                "model graph contains no layers".into(),
            ));
        }

        let mut seen = HashSet::new();
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.index != i {
                return Err(ModelError::InvalidLayer {
                    layer: layer.name.clone(),
                    detail: format!("index {} does not match position {i}", layer.index),
                });
            }
            if !seen.insert(layer.name.as_str()) {
                return Err(ModelError::InvalidLayer {
                    layer: layer.name.clone(),
                    detail: "duplicate layer name".into(),
                });
            }
        }

        if self.input_shape.num_elements() == 0 {
            return Err(ModelError::InvalidGraph(format!(
                "input shape {} has zero elements",
                self.input_shape
            )));
        }

        let mut output_shapes = Vec::with_capacity(self.layers.len());
        let mut current = self.input_shape;
        for layer in &self.layers {
            let next = layer.output_shape(current)?;
            if next.num_elements() == 0 {
                return Err(ModelError::InvalidLayer {
                    layer: layer.name.clone(),
                    detail: format!("output shape {next} has zero elements"),
                });
            }
            tracing::trace!("shape inference: {} {current} -> {next}", layer.name);
            output_shapes.push(next);
            current = next;
        }

        Ok(ModelGraph {
            name: self.name,
            input_shape: self.input_shape,
            layers: self.layers,
            output_shapes,
            _state: std::marker::PhantomData,
        })
    }
}

// ── Validated state ────────────────────────────────────────────────

impl ModelGraph<Validated> {
    /// Returns the total number of layers.
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Shape produced by the final layer.
    pub fn output_shape(&self) -> Shape {
        *self
            .output_shapes
            .last()
            .expect("validated graph has at least one layer")
    }

    /// Number of classes scored by the final layer.
    pub fn num_classes(&self) -> usize {
        self.output_shape().num_elements()
    }

    /// Shape consumed by the layer at `index`.
    pub fn layer_input_shape(&self, index: usize) -> Option<Shape> {
        if index >= self.layers.len() {
            return None;
        }
        match index {
            0 => Some(self.input_shape),
            i => self.output_shapes.get(i - 1).copied(),
        }
    }

    /// Shape produced by the layer at `index`.
    pub fn layer_output_shape(&self, index: usize) -> Option<Shape> {
        self.output_shapes.get(index).copied()
    }

    /// Returns the total number of learnable parameters.
    pub fn total_parameters(&self) -> usize {
        self.layers.iter().map(|l| l.num_parameters()).sum()
    }

    /// Returns the total estimated memory for all parameters in bytes.
    pub fn total_weight_bytes(&self) -> usize {
        self.layers.iter().map(|l| l.estimated_weight_bytes()).sum()
    }

    /// Returns the total memory of all intermediate activations in bytes.
    pub fn total_activation_bytes(&self) -> usize {
        self.output_shapes.iter().map(|s| s.size_bytes()).sum()
    }

    /// Returns the largest input + output activation pair of any layer,
    /// i.e. the peak live activation memory of a forward pass.
    pub fn peak_activation_bytes(&self) -> usize {
        (0..self.num_layers())
            .filter_map(|i| {
                Some(self.layer_input_shape(i)?.size_bytes() + self.layer_output_shape(i)?.size_bytes())
            })
            .max()
            .unwrap_or(0)
    }

    /// Returns an iterator over the layers in execution order.
    pub fn iter_layers(&self) -> impl Iterator<Item = &LayerDef> {
        self.layers.iter()
    }

    /// Iterates `(layer, input_shape, output_shape)` in execution order.
    pub fn iter_with_shapes(&self) -> impl Iterator<Item = (&LayerDef, Shape, Shape)> {
        self.layers.iter().enumerate().map(move |(i, layer)| {
            let input = self.layer_input_shape(i).unwrap_or(self.input_shape);
            (layer, input, self.output_shapes[i])
        })
    }

    /// Returns a reference to a layer by index.
    pub fn layer(&self, index: usize) -> Option<&LayerDef> {
        self.layers.get(index)
    }

    /// Returns a reference to a layer by name.
    pub fn layer_by_name(&self, name: &str) -> Option<&LayerDef> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// Returns a summary string describing the model.
    pub fn summary(&self) -> String {
        let total_weight_mb = self.total_weight_bytes() as f64 / (1024.0 * 1024.0);
        format!(
            "Model '{}': {} layers, input {}, output {}, {} parameters ({:.1} MB)",
            self.name,
            self.num_layers(),
            self.input_shape,
            self.output_shape(),
            self.total_parameters(),
            total_weight_mb,
        )
    }
}

// ── Shared implementations ─────────────────────────────────────────

impl<S: GraphState> fmt::Display for ModelGraph<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ModelGraph '{}' ({} layers):", self.name, self.layers.len())?;
        for layer in &self.layers {
            writeln!(f, "  {}", layer.summary())?;
        }
        Ok(())
    }
}

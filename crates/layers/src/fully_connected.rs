// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Fully-connected (dense) layer.

use crate::Parameters;
use model_ir::Activation;
use tensor_core::{matvec, Shape, Tensor};

/// Dense layer over the flattened input.
///
/// Weights are stored `[out][in][1]`, i.e. row-major `[out][in]`.
#[derive(Debug, Clone)]
pub struct FullyConnected {
    name: String,
    in_features: usize,
    out_features: usize,
    activation: Activation,
    params: Parameters,
}

impl FullyConnected {
    /// Creates a dense layer with zero-initialized parameters.
    pub fn new(
        name: impl Into<String>,
        in_features: usize,
        out_features: usize,
        activation: Activation,
    ) -> Self {
        Self {
            name: name.into(),
            in_features,
            out_features,
            activation,
            params: Parameters::zeros(Shape::new(out_features, in_features, 1)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn in_features(&self) -> usize {
        self.in_features
    }

    pub fn out_features(&self) -> usize {
        self.out_features
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    pub fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    /// Computes `activation(bias + W·x)` where `x` is the input in storage
    /// order, returning a `1 × 1 × out_features` tensor.
    ///
    /// # Panics
    /// If the input does not hold exactly `in_features` elements.
    pub fn forward(&self, input: &Tensor) -> Tensor {
        assert_eq!(
            input.shape().num_elements(),
            self.in_features,
            "layer '{}' expects {} input features, got shape {}",
            self.name,
            self.in_features,
            input.shape()
        );

        let mut output = Tensor::zeros(Shape::vector(self.out_features));
        if let Err(err) = matvec(
            self.params.weights().as_slice(),
            input.as_slice(),
            self.params.bias(),
            output.as_mut_slice(),
        ) {
            panic!("layer '{}': {err}", self.name);
        }
        self.activation.apply_inplace(output.as_mut_slice());
        output
    }
}

// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Learnable parameters shared by convolution and fully-connected layers.

use crate::weights::{read_weight_file, write_weight_file};
use crate::LayerError;
use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use std::path::Path;
use tensor_core::{Shape, Tensor};

/// Weights shaped `[out][in][kernelArea]` plus one bias per output.
///
/// Parameters only change through [`Parameters::load`],
/// [`Parameters::initialize_random`] or construction; inference reads them
/// through a shared reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    weights: Tensor,
    bias: Vec<f32>,
}

impl Parameters {
    /// All-zero parameters for the given weight shape. The bias length is
    /// the weight depth (the output count).
    pub fn zeros(weight_shape: Shape) -> Self {
        Self {
            weights: Tensor::zeros(weight_shape),
            bias: vec![0.0; weight_shape.depth],
        }
    }

    /// Builds parameters from existing buffers.
    ///
    /// # Panics
    /// If `bias.len()` differs from the weight depth.
    pub fn from_parts(weights: Tensor, bias: Vec<f32>) -> Self {
        assert_eq!(
            bias.len(),
            weights.depth(),
            "bias length must equal the number of outputs"
        );
        Self { weights, bias }
    }

    pub fn weights(&self) -> &Tensor {
        &self.weights
    }

    pub fn bias(&self) -> &[f32] {
        &self.bias
    }

    /// Weight shape `[out][in][kernelArea]`.
    pub fn weight_shape(&self) -> Shape {
        self.weights.shape()
    }

    /// Total number of scalars.
    pub fn len(&self) -> usize {
        self.weights.as_slice().len() + self.bias.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Weights for output `o` and input `i`, one entry per kernel tap.
    #[inline(always)]
    pub fn kernel(&self, o: usize, i: usize) -> &[f32] {
        let area = self.weights.width();
        let start = (o * self.weights.height() + i) * area;
        &self.weights.as_slice()[start..start + area]
    }

    /// Fills the weights from a uniform distribution with the given standard
    /// deviation and resets the biases to zero.
    ///
    /// The distribution is `U(-stddev·√3, stddev·√3)`, whose variance is
    /// `stddev²`. Biases are zeroed, not sampled.
    pub fn initialize_random<R: Rng + ?Sized>(&mut self, rng: &mut R, stddev: f32) {
        let bound = stddev.abs() * 3f32.sqrt();
        let dist = Uniform::new_inclusive(-bound, bound);
        for w in self.weights.as_mut_slice() {
            *w = dist.sample(rng);
        }
        self.bias.fill(0.0);
    }

    /// Replaces the parameters with the contents of a combined weight file.
    ///
    /// On error the current parameters are left untouched.
    pub fn load(&mut self, path: &Path) -> Result<(), LayerError> {
        let weight_len = self.weights.as_slice().len();
        let (weights, bias) = read_weight_file(path, weight_len, self.bias.len())?;
        self.weights.as_mut_slice().copy_from_slice(&weights);
        self.bias.copy_from_slice(&bias);
        Ok(())
    }

    /// Writes the parameters in the combined weight-file format.
    pub fn save(&self, path: &Path) -> Result<(), LayerError> {
        write_weight_file(path, self.weights.as_slice(), &self.bias)
    }
}

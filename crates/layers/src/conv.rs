// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Direct (untiled) convolution.
//!
//! This is the straightforward nested-loop formulation. It is the numerical
//! reference that the tiled variant is tested against.

use crate::Parameters;
use model_ir::{conv_output_dim, Activation};
use tensor_core::{Shape, Tensor};

/// Hyper-parameters of a square-kernel convolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConvGeometry {
    /// Input channels (N).
    pub in_channels: usize,
    /// Output channels (M).
    pub out_channels: usize,
    /// Kernel edge length (K).
    pub kernel_size: usize,
    /// Stride (S).
    pub stride: usize,
    /// Zero padding on every border (P).
    pub padding: usize,
}

impl ConvGeometry {
    pub fn new(
        in_channels: usize,
        out_channels: usize,
        kernel_size: usize,
        stride: usize,
        padding: usize,
    ) -> Self {
        Self {
            in_channels,
            out_channels,
            kernel_size,
            stride,
            padding,
        }
    }

    /// Weight tensor shape `[M][N][K·K]`.
    pub fn weight_shape(&self) -> Shape {
        Shape::new(
            self.out_channels,
            self.in_channels,
            self.kernel_size * self.kernel_size,
        )
    }

    /// Output shape for `input`.
    ///
    /// # Panics
    /// If the channel count differs or the kernel does not fit; the graph
    /// validation in `model-ir` rules both out for networks it accepts.
    pub fn output_shape(&self, input: Shape) -> Shape {
        assert_eq!(
            input.depth, self.in_channels,
            "convolution expects {} input channels, got {}",
            self.in_channels, input.depth
        );
        let dim = |extent| {
            conv_output_dim(extent, self.kernel_size, self.stride, self.padding)
                .unwrap_or_else(|| panic!("kernel {} does not fit input {input}", self.kernel_size))
        };
        Shape::new(self.out_channels, dim(input.height), dim(input.width))
    }

    /// Maps an output coordinate plus kernel tap to an input coordinate,
    /// or `None` when it falls in the zero padding.
    #[inline(always)]
    pub(crate) fn input_coord(&self, out: usize, tap: usize, extent: usize) -> Option<usize> {
        (out * self.stride + tap)
            .checked_sub(self.padding)
            .filter(|&x| x < extent)
    }
}

/// Convolution computed one output element at a time.
#[derive(Debug, Clone)]
pub struct Convolution {
    name: String,
    geometry: ConvGeometry,
    activation: Activation,
    params: Parameters,
}

impl Convolution {
    /// Creates a convolution with zero-initialized parameters.
    pub fn new(name: impl Into<String>, geometry: ConvGeometry, activation: Activation) -> Self {
        Self {
            name: name.into(),
            params: Parameters::zeros(geometry.weight_shape()),
            geometry,
            activation,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn geometry(&self) -> &ConvGeometry {
        &self.geometry
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

    /// Computes `activation(bias[o] + Σ_i Σ_ki Σ_kj x[i][r·S+ki−P][c·S+kj−P] · w[o][i][ki·K+kj])`
    /// for every output channel `o` and position `(r, c)`. Taps that land in
    /// the padding contribute nothing.
    ///
    /// # Panics
    /// If `input` does not match the geometry (see [`ConvGeometry::output_shape`]).
    pub fn forward(&self, input: &Tensor) -> Tensor {
        let g = &self.geometry;
        let in_shape = input.shape();
        let out_shape = g.output_shape(in_shape);
        let k = g.kernel_size;
        let mut output = Tensor::zeros(out_shape);

        for o in 0..g.out_channels {
            let bias = self.params.bias()[o];
            for r in 0..out_shape.height {
                for c in 0..out_shape.width {
                    let mut sum = bias;
                    for i in 0..g.in_channels {
                        let kernel = self.params.kernel(o, i);
                        for ki in 0..k {
                            let Some(ih) = g.input_coord(r, ki, in_shape.height) else {
                                continue;
                            };
                            for kj in 0..k {
                                if let Some(iw) = g.input_coord(c, kj, in_shape.width) {
                                    sum += input.at(i, ih, iw) * kernel[ki * k + kj];
                                }
                            }
                        }
                    }
                    *output.at_mut(o, r, c) = self.activation.apply(sum);
                }
            }
        }

        output
    }
}

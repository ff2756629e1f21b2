// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Max pooling.

use model_ir::pool_output_dim;
use tensor_core::{Shape, Tensor};

/// Unpadded square max pooling applied to each channel independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaxPooling {
    name: String,
    pool_size: usize,
    stride: usize,
}

impl MaxPooling {
    pub fn new(name: impl Into<String>, pool_size: usize, stride: usize) -> Self {
        Self {
            name: name.into(),
            pool_size,
            stride,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Output shape for `input`; depth is preserved.
    ///
    /// # Panics
    /// If the window does not fit the input.
    pub fn output_shape(&self, input: Shape) -> Shape {
        let dim = |extent| {
            pool_output_dim(extent, self.pool_size, self.stride).unwrap_or_else(|| {
                panic!("pool window {} does not fit input {input}", self.pool_size)
            })
        };
        Shape::new(input.depth, dim(input.height), dim(input.width))
    }

    /// Writes the maximum of each `pool_size × pool_size` window.
    pub fn forward(&self, input: &Tensor) -> Tensor {
        let out_shape = self.output_shape(input.shape());
        let in_width = input.width();
        let mut output = Tensor::zeros(out_shape);

        for d in 0..out_shape.depth {
            let src = input.channel(d);
            let dst = output.channel_mut(d);
            for r in 0..out_shape.height {
                for c in 0..out_shape.width {
                    let (row0, col0) = (r * self.stride, c * self.stride);
                    let mut max = f32::NEG_INFINITY;
                    for pr in 0..self.pool_size {
                        let row = &src[(row0 + pr) * in_width + col0..][..self.pool_size];
                        max = row.iter().copied().fold(max, f32::max);
                    }
                    dst[r * out_shape.width + c] = max;
                }
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_shape() {
        let pool = MaxPooling::new("pool1", 3, 2);
        assert_eq!(pool.output_shape(Shape::new(64, 55, 55)), Shape::new(64, 27, 27));
        assert_eq!(pool.output_shape(Shape::new(256, 13, 13)), Shape::new(256, 6, 6));
    }

    #[test]
    fn test_window_maximum() {
        let data: Vec<f32> = vec![
            1.0, 5.0, 2.0, 0.0, //
            3.0, 4.0, -1.0, 8.0, //
            -7.0, 0.5, 6.0, 6.5, //
            2.0, 9.0, 1.0, 1.0,
        ];
        let input = Tensor::from_vec(Shape::new(1, 4, 4), data).unwrap();
        let out = MaxPooling::new("p", 2, 2).forward(&input);
        assert_eq!(out.shape(), Shape::new(1, 2, 2));
        assert_eq!(out.as_slice(), &[5.0, 8.0, 9.0, 6.5]);
    }

    #[test]
    fn test_overlapping_windows_per_channel() {
        let data: Vec<f32> = (0..18).map(|x| x as f32).collect();
        let input = Tensor::from_vec(Shape::new(2, 3, 3), data).unwrap();
        let out = MaxPooling::new("p", 2, 1).forward(&input);
        assert_eq!(out.shape(), Shape::new(2, 2, 2));
        assert_eq!(out.channel(0), &[4.0, 5.0, 7.0, 8.0]);
        assert_eq!(out.channel(1), &[13.0, 14.0, 16.0, 17.0]);
    }

    #[test]
    fn test_all_negative() {
        let out = MaxPooling::new("p", 3, 2).forward(&Tensor::new(1, 5, 5, -2.0));
        assert!(out.as_slice().iter().all(|&x| x == -2.0));
    }

    #[test]
    #[should_panic]
    fn test_window_too_large() {
        MaxPooling::new("p", 3, 2).forward(&Tensor::new(1, 2, 2, 0.0));
    }
}

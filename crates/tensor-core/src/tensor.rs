// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Core tensor type.

use crate::{Shape, TensorError};
use std::ops::{Index, IndexMut};

/// An owned, three-axis f32 tensor stored in contiguous memory.
///
/// `Tensor` is the data carrier between layers. Each layer consumes one
/// tensor and produces a new one; tensors are never shared between layers.
///
/// # Memory Layout
/// Data is stored channel-major, then row-major, then column
/// (`index = d·H·W + h·W + w`). The buffer length always equals
/// `depth · height · width`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Shape,
    data: Vec<f32>,
}

impl Tensor {
    /// Creates a `depth × height × width` tensor with every element set to `fill`.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::Tensor;
    /// let t = Tensor::new(3, 2, 2, 0.5);
    /// assert_eq!(t.as_slice().len(), 12);
    /// assert_eq!(t.at(2, 1, 1), 0.5);
    /// ```
    pub fn new(depth: usize, height: usize, width: usize, fill: f32) -> Self {
        Self::filled(Shape::new(depth, height, width), fill)
    }

    /// Creates a tensor of the given shape with every element set to `fill`.
    pub fn filled(shape: Shape, fill: f32) -> Self {
        Self {
            shape,
            data: vec![fill; shape.num_elements()],
        }
    }

    /// Creates a tensor filled with zeros.
    pub fn zeros(shape: Shape) -> Self {
        Self::filled(shape, 0.0)
    }

    /// Wraps an existing buffer.
    ///
    /// Returns an error if `data.len()` does not equal `shape.num_elements()`.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{Shape, Tensor};
    /// let t = Tensor::from_vec(Shape::new(1, 1, 3), vec![1.0, 2.0, 3.0]).unwrap();
    /// assert_eq!(t.as_slice(), &[1.0, 2.0, 3.0]);
    /// ```
    pub fn from_vec(shape: Shape, data: Vec<f32>) -> Result<Self, TensorError> {
        if data.len() != shape.num_elements() {
            return Err(TensorError::BufferSizeMismatch {
                shape,
                expected: shape.num_elements(),
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// Returns the tensor's shape.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Number of channels.
    pub fn depth(&self) -> usize {
        self.shape.depth
    }

    /// Number of rows per channel.
    pub fn height(&self) -> usize {
        self.shape.height
    }

    /// Number of columns per row.
    pub fn width(&self) -> usize {
        self.shape.width
    }

    /// Reads the element at `(d, h, w)`.
    ///
    /// # Panics
    /// Out-of-range coordinates are a caller bug; they are caught by a debug
    /// assertion (or by the slice bounds check when the flat offset overflows).
    #[inline(always)]
    pub fn at(&self, d: usize, h: usize, w: usize) -> f32 {
        self.data[self.shape.offset(d, h, w)]
    }

    /// Returns a mutable reference to the element at `(d, h, w)`.
    #[inline(always)]
    pub fn at_mut(&mut self, d: usize, h: usize, w: usize) -> &mut f32 {
        let idx = self.shape.offset(d, h, w);
        &mut self.data[idx]
    }

    /// Returns the whole backing buffer.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Returns the whole backing buffer mutably.
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consumes the tensor and returns its buffer.
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Returns one channel (feature map) as a row-major slice.
    pub fn channel(&self, d: usize) -> &[f32] {
        let plane = self.shape.plane_size();
        &self.data[d * plane..(d + 1) * plane]
    }

    /// Returns one channel mutably.
    pub fn channel_mut(&mut self, d: usize) -> &mut [f32] {
        let plane = self.shape.plane_size();
        &mut self.data[d * plane..(d + 1) * plane]
    }

    /// Returns the memory footprint of the buffer in bytes.
    pub fn size_bytes(&self) -> usize {
        self.shape.size_bytes()
    }

    /// Sets every element to `value`.
    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }
}

impl Index<[usize; 3]> for Tensor {
    type Output = f32;

    #[inline(always)]
    fn index(&self, [d, h, w]: [usize; 3]) -> &f32 {
        &self.data[self.shape.offset(d, h, w)]
    }
}

impl IndexMut<[usize; 3]> for Tensor {
    #[inline(always)]
    fn index_mut(&mut self, [d, h, w]: [usize; 3]) -> &mut f32 {
        self.at_mut(d, h, w)
    }
}

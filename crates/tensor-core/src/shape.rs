// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor shape descriptors and index arithmetic.

use std::fmt;

/// The extents of a [`crate::Tensor`]: channels × rows × columns.
///
/// Storage order is channel-major, then row-major, then column, so the flat
/// offset of `(d, h, w)` is `d·H·W + h·W + w`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Shape {
    /// Number of channels (feature maps).
    pub depth: usize,
    /// Number of rows per channel.
    pub height: usize,
    /// Number of columns per row.
    pub width: usize,
}

impl Shape {
    /// Creates a new shape.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::Shape;
    /// let s = Shape::new(3, 224, 224);
    /// assert_eq!(s.num_elements(), 150_528);
    /// ```
    pub const fn new(depth: usize, height: usize, width: usize) -> Self {
        Self {
            depth,
            height,
            width,
        }
    }

    /// Shape of a `1 × 1 × len` vector, as produced by fully-connected layers.
    pub const fn vector(len: usize) -> Self {
        Self::new(1, 1, len)
    }

    /// Returns the total number of elements.
    pub const fn num_elements(&self) -> usize {
        self.depth * self.height * self.width
    }

    /// Number of elements in one channel.
    pub const fn plane_size(&self) -> usize {
        self.height * self.width
    }

    /// Returns the memory footprint in bytes for f32 storage.
    pub const fn size_bytes(&self) -> usize {
        self.num_elements() * std::mem::size_of::<f32>()
    }

    /// Returns `true` if `(d, h, w)` lies inside this shape.
    pub const fn contains(&self, d: usize, h: usize, w: usize) -> bool {
        d < self.depth && h < self.height && w < self.width
    }

    /// Flat buffer offset of `(d, h, w)`.
    ///
    /// The caller must respect the declared extents; this is only checked in
    /// debug builds.
    #[inline(always)]
    pub fn offset(&self, d: usize, h: usize, w: usize) -> usize {
        debug_assert!(
            self.contains(d, h, w),
            "index ({d}, {h}, {w}) out of range for shape {self}"
        );
        (d * self.height + h) * self.width + w
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.depth, self.height, self.width)
    }
}

/// Convenience: `Shape::from((3, 224, 224))`.
impl From<(usize, usize, usize)> for Shape {
    fn from((depth, height, width): (usize, usize, usize)) -> Self {
        Self::new(depth, height, width)
    }
}

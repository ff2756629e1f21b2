// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for tensor construction and operations.

use crate::Shape;

/// Errors that can occur when building tensors or running tensor ops.
#[derive(Debug, thiserror::Error)]
pub enum TensorError {
    /// The provided buffer does not hold exactly `shape.num_elements()` values.
    #[error("buffer size mismatch for shape {shape}: expected {expected} elements, got {actual}")]
    BufferSizeMismatch {
        shape: Shape,
        expected: usize,
        actual: usize,
    },

    /// Operand lengths are incompatible for the requested operation.
    #[error("incompatible lengths for {op}: {lhs} vs {rhs}")]
    LengthMismatch {
        op: &'static str,
        lhs: usize,
        rhs: usize,
    },
}

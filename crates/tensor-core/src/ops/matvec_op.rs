// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Dense matrix-vector product.

use crate::TensorError;

/// Computes `output[i] = bias[i] + Σ_j matrix[i·cols + j] · input[j]`.
///
/// `matrix` is row-major `[rows][cols]` with `rows = output.len()` and
/// `cols = input.len()`; `bias` has one entry per row.
///
/// # Errors
/// Returns [`TensorError::LengthMismatch`] if the operand lengths disagree.
pub fn matvec(
    matrix: &[f32],
    input: &[f32],
    bias: &[f32],
    output: &mut [f32],
) -> Result<(), TensorError> {
    let rows = output.len();
    let cols = input.len();

    if matrix.len() != rows * cols {
        return Err(TensorError::LengthMismatch {
            op: "matvec (matrix)",
            lhs: matrix.len(),
            rhs: rows * cols,
        });
    }
    if bias.len() != rows {
        return Err(TensorError::LengthMismatch {
            op: "matvec (bias)",
            lhs: bias.len(),
            rhs: rows,
        });
    }

    matvec_f32_generic(matrix, input, bias, output, cols);
    Ok(())
}

/// Portable kernel: one dot product per output row.
///
/// Rows of the matrix are contiguous, so each dot product streams through
/// memory sequentially.
fn matvec_f32_generic(matrix: &[f32], input: &[f32], bias: &[f32], output: &mut [f32], cols: usize) {
    if cols == 0 {
        output.copy_from_slice(bias);
        return;
    }
    for ((out, row), &b) in output.iter_mut().zip(matrix.chunks_exact(cols)).zip(bias) {
        *out = b + row.iter().zip(input).map(|(w, x)| w * x).sum::<f32>();
    }
}

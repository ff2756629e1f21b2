// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Softmax activation operation.

/// Converts logits to probabilities: `p[i] = exp(x[i] - max) / sum(exp(x - max))`.
///
/// Uses the numerically stable variant that subtracts the maximum value
/// before exponentiation to prevent overflow. The result is invariant to
/// adding a constant to every logit.
///
/// An empty slice yields an empty vector.
///
/// # Examples
/// ```
/// use tensor_core::softmax;
/// let p = softmax(&[1.0, 1.0]);
/// assert!((p[0] - 0.5).abs() < 1e-6);
/// ```
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    if logits.is_empty() {
        return Vec::new();
    }

    // Find max for numerical stability.
    let max_val = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    // Compute exp(x - max) and sum.
    let mut sum = 0.0f32;
    let mut probs: Vec<f32> = logits
        .iter()
        .map(|&x| {
            let e = (x - max_val).exp();
            sum += e;
            e
        })
        .collect();

    // Normalize.
    if sum > 0.0 {
        let inv_sum = 1.0 / sum;
        for p in probs.iter_mut() {
            *p *= inv_sum;
        }
    }

    probs
}

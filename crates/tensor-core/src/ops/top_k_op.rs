// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Top-k selection over a probability distribution.

use std::cmp::Ordering;

/// A single ranked class prediction.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Prediction {
    /// Index of the class in the network's output vector.
    pub class_index: usize,
    /// Probability assigned to the class.
    pub probability: f32,
}

/// Returns the `k` highest-probability entries in non-increasing order.
///
/// `k` is clamped to `probabilities.len()`, so `k == len` yields the whole
/// distribution sorted descending. The order among equal probabilities is
/// unspecified. NaN entries compare as equal to everything and may appear
/// anywhere in the ranking.
///
/// # Examples
/// ```
/// use tensor_core::top_k;
/// let top = top_k(&[0.1, 0.6, 0.3], 2);
/// assert_eq!(top[0].class_index, 1);
/// assert_eq!(top[1].class_index, 2);
/// ```
pub fn top_k(probabilities: &[f32], k: usize) -> Vec<Prediction> {
    let k = k.min(probabilities.len());
    if k == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<Prediction> = probabilities
        .iter()
        .enumerate()
        .map(|(class_index, &probability)| Prediction {
            class_index,
            probability,
        })
        .collect();

    let descending = |a: &Prediction, b: &Prediction| {
        b.probability
            .partial_cmp(&a.probability)
            .unwrap_or(Ordering::Equal)
    };

    // Partition around the k-th element, then sort only the head.
    if k < ranked.len() {
        ranked.select_nth_unstable_by(k - 1, descending);
        ranked.truncate(k);
    }
    ranked.sort_unstable_by(descending);
    ranked
}

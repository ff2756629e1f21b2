// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Rectified linear unit activation.

/// `max(0, x)` for a single value.
#[inline(always)]
pub fn relu(x: f32) -> f32 {
    x.max(0.0)
}

/// Applies `max(0, x)` to every element of `values` in place.
pub fn relu_inplace(values: &mut [f32]) {
    for x in values.iter_mut() {
        *x = relu(*x);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relu_scalar() {
        assert_eq!(relu(-3.0), 0.0);
        assert_eq!(relu(0.0), 0.0);
        assert_eq!(relu(2.5), 2.5);
    }

    #[test]
    fn test_relu_inplace() {
        let mut v = [-1.0, 0.5, -0.0, 4.0];
        relu_inplace(&mut v);
        assert_eq!(v, [0.0, 0.5, 0.0, 4.0]);
    }
}

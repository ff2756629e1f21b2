// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor arithmetic operations.
//!
//! The kernels work on flat f32 slices so they can be shared by layers that
//! hold their data in [`crate::Tensor`]s or in staging buffers.

mod matvec_op;
mod relu_op;
mod softmax_op;
mod top_k_op;

pub use matvec_op::matvec;
pub use relu_op::{relu, relu_inplace};
pub use softmax_op::softmax;
pub use top_k_op::{top_k, Prediction};

// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! Dense three-axis tensors and the numeric kernels used by the CNN engine.
//!
//! This crate provides:
//! - [`Tensor`]: a `depth × height × width` f32 container with contiguous,
//!   channel-major storage.
//! - [`Shape`]: the three extents of a tensor.
//! - Core operations: [`softmax`], [`top_k`], [`relu_inplace`], [`matvec`].
//!
//! # Design Goals
//! - One flat buffer per tensor; index arithmetic is explicit and cheap.
//! - Tensors move by value between layers, never aliased.
//! - Clean error types via `thiserror` for the few fallible constructors.

mod error;
mod ops;
mod shape;
mod tensor;

pub use error::TensorError;
pub use ops::{matvec, relu, relu_inplace, softmax, top_k, Prediction};
pub use shape::Shape;
pub use tensor::Tensor;

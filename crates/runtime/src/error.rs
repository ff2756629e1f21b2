// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the inference runtime.

use tensor_core::Shape;

/// Errors that can occur while building or running a network.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The architecture description is invalid.
    #[error("model error: {0}")]
    Model(#[from] model_ir::ModelError),

    /// A layer could not be constructed.
    #[error("layer error: {0}")]
    Layer(#[from] layers::LayerError),

    /// A tensor could not be constructed from caller data.
    #[error("tensor error: {0}")]
    Tensor(#[from] tensor_core::TensorError),

    /// The input tensor does not match the network's input shape.
    #[error("input shape {actual} does not match network input {expected}")]
    InputShape { expected: Shape, actual: Shape },

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

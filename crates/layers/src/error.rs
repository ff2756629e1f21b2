// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for layer construction and weight I/O.

use std::path::PathBuf;

/// Errors that can occur when configuring layers or moving their parameters
/// to and from disk.
#[derive(Debug, thiserror::Error)]
pub enum LayerError {
    /// The weight file could not be opened, mapped or written.
    #[error("weight file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The weight file does not hold exactly weights + biases.
    #[error("weight file '{}' has {actual} bytes, expected {expected}", path.display())]
    SizeMismatch {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    /// A tile dimension is zero.
    #[error("invalid tile configuration: {0}")]
    InvalidTileConfig(String),
}

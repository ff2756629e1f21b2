// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for architecture description and metadata parsing.

/// Errors that can occur when working with network descriptions.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The metadata file could not be read.
    #[error("failed to read metadata: {0}")]
    MetadataReadError(#[from] std::io::Error),

    /// A layer definition is invalid (e.g., incompatible shapes).
    #[error("invalid layer '{layer}': {detail}")]
    InvalidLayer { layer: String, detail: String },

    /// The layer chain is malformed.
    #[error("invalid model graph: {0}")]
    InvalidGraph(String),
}

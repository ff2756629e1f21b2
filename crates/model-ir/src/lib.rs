// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # model-ir
//!
//! A lightweight intermediate representation for fixed convolutional
//! classification networks.
//!
//! The IR captures what the layer engine and the runtime need to know about
//! an architecture without holding any parameters:
//!
//! - [`LayerKind`]: the computation a layer performs and its hyper-parameters.
//! - [`Activation`]: whether a layer rectifies its output.
//! - [`LayerDef`]: a named layer with shape inference and size estimates.
//! - [`ModelGraph`]: the ordered layer chain with a **type-state pattern**
//!   (`Loaded` → `Validated`); validation runs shape inference end to end.
//! - [`alexnet`]: the reference architecture.
//! - [`NetworkMetadata`]: the advisory `network_metadata.txt` descriptor.
//!
//! # Example
//! ```
//! let graph = model_ir::alexnet().validate().unwrap();
//! assert_eq!(graph.output_shape().num_elements(), 1000);
//! for layer in graph.iter_layers() {
//!     println!("  {}", layer.summary());
//! }
//! ```

mod architecture;
mod error;
pub mod graph;
mod layer;
mod metadata;

pub use architecture::{alexnet, ALEXNET_CLASSES, ALEXNET_INPUT};
pub use error::ModelError;
pub use graph::ModelGraph;
pub use layer::{conv_output_dim, pool_output_dim, Activation, LayerDef, LayerKind};
pub use metadata::{MetadataEntry, NetworkMetadata, METADATA_FILE};

// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # layers
//!
//! Executable CNN layers and their parameters.
//!
//! - [`Convolution`]: direct convolution, the numerical reference.
//! - [`TiledConvolution`]: the same convolution, partitioned into
//!   [`TileConfig`]-sized tiles staged through a [`TileWorkspace`].
//! - [`MaxPooling`] and [`FullyConnected`].
//! - [`Layer`]: the closed enum the runtime dispatches over.
//! - [`Parameters`] and the combined weight-file format
//!   ([`read_weight_file`], [`write_weight_file`]).
//!
//! Layers are built from `model_ir::LayerDef`s with [`Layer::from_def`]:
//!
//! ```
//! use layers::{ConvAlgorithm, Layer, TileConfig};
//! use model_ir::LayerDef;
//! use tensor_core::Tensor;
//!
//! let def = LayerDef::convolution("conv", 3, 8, 3, 1, 1);
//! let mut layer = Layer::from_def(&def, ConvAlgorithm::Tiled, TileConfig::default()).unwrap();
//! let output = layer.forward(Tensor::new(3, 16, 16, 0.5));
//! assert_eq!(output.shape().depth, 8);
//! ```

pub mod conv;
mod error;
mod fully_connected;
mod layer;
mod params;
mod pool;
pub mod tiled;
mod weights;

pub use conv::{ConvGeometry, Convolution};
pub use error::LayerError;
pub use fully_connected::FullyConnected;
pub use layer::{ConvAlgorithm, Layer};
pub use params::Parameters;
pub use pool::MaxPooling;
pub use tiled::{TileConfig, TileWorkspace, TiledConvolution};
pub use weights::{read_weight_file, weight_file_path, write_weight_file};

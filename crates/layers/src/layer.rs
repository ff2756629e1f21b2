// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The closed set of executable layers.

use crate::conv::ConvGeometry;
use crate::{
    Convolution, FullyConnected, LayerError, MaxPooling, Parameters, TileConfig, TiledConvolution,
};
use model_ir::{Activation, LayerDef, LayerKind};
use rand::Rng;
use std::path::Path;
use tensor_core::{Shape, Tensor};

/// Which implementation backs convolution layers.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ConvAlgorithm {
    /// Nested loops straight over the input tensor.
    Direct,
    /// Cache-tiled loops over staged buffers.
    #[default]
    Tiled,
}

impl ConvAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Tiled => "tiled",
        }
    }
}

impl std::fmt::Display for ConvAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ConvAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "direct" => Ok(Self::Direct),
            "tiled" => Ok(Self::Tiled),
            other => Err(format!(
                "unknown convolution algorithm '{other}' (expected 'direct' or 'tiled')"
            )),
        }
    }
}

/// An executable layer.
///
/// Dispatch is a `match` over a closed set, so adding a variant forces every
/// operation to handle it.
#[derive(Debug, Clone)]
pub enum Layer {
    Convolution(Convolution),
    TiledConvolution(TiledConvolution),
    MaxPooling(MaxPooling),
    FullyConnected(FullyConnected),
}

impl Layer {
    /// Builds a layer with zero parameters from its description.
    ///
    /// # Errors
    /// Returns [`LayerError::InvalidTileConfig`] if the tiled algorithm is
    /// selected with a zero tile size.
    pub fn from_def(
        def: &LayerDef,
        algorithm: ConvAlgorithm,
        tiles: TileConfig,
    ) -> Result<Self, LayerError> {
        let layer = match def.kind {
            LayerKind::Convolution {
                in_channels,
                out_channels,
                kernel_size,
                stride,
                padding,
            } => {
                let geometry =
                    ConvGeometry::new(in_channels, out_channels, kernel_size, stride, padding);
                match algorithm {
                    ConvAlgorithm::Direct => {
                        Self::Convolution(Convolution::new(&def.name, geometry, def.activation))
                    }
                    ConvAlgorithm::Tiled => Self::TiledConvolution(TiledConvolution::new(
                        &def.name,
                        geometry,
                        def.activation,
                        tiles,
                    )?),
                }
            }
            LayerKind::MaxPool { pool_size, stride } => {
                Self::MaxPooling(MaxPooling::new(&def.name, pool_size, stride))
            }
            LayerKind::FullyConnected {
                in_features,
                out_features,
            } => Self::FullyConnected(FullyConnected::new(
                &def.name,
                in_features,
                out_features,
                def.activation,
            )),
        };
        Ok(layer)
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Convolution(l) => l.name(),
            Self::TiledConvolution(l) => l.name(),
            Self::MaxPooling(l) => l.name(),
            Self::FullyConnected(l) => l.name(),
        }
    }

    /// Short label for logs and reports.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Convolution(_) => "conv",
            Self::TiledConvolution(_) => "tiled_conv",
            Self::MaxPooling(_) => "max_pool",
            Self::FullyConnected(_) => "fc",
        }
    }

    /// `true` for layers that own weights and biases.
    pub fn has_learnable_parameters(&self) -> bool {
        !matches!(self, Self::MaxPooling(_))
    }

    /// Activation applied to the layer output. Pooling never activates.
    pub fn activation(&self) -> Activation {
        match self {
            Self::Convolution(l) => l.activation(),
            Self::TiledConvolution(l) => l.activation(),
            Self::MaxPooling(_) => Activation::Identity,
            Self::FullyConnected(l) => l.activation(),
        }
    }

    pub fn parameters(&self) -> Option<&Parameters> {
        match self {
            Self::Convolution(l) => Some(l.parameters()),
            Self::TiledConvolution(l) => Some(l.parameters()),
            Self::MaxPooling(_) => None,
            Self::FullyConnected(l) => Some(l.parameters()),
        }
    }

    pub fn parameters_mut(&mut self) -> Option<&mut Parameters> {
        match self {
            Self::Convolution(l) => Some(l.parameters_mut()),
            Self::TiledConvolution(l) => Some(l.parameters_mut()),
            Self::MaxPooling(_) => None,
            Self::FullyConnected(l) => Some(l.parameters_mut()),
        }
    }

    /// Output shape for `input`.
    ///
    /// # Panics
    /// If `input` is incompatible with the layer.
    pub fn output_shape(&self, input: Shape) -> Shape {
        match self {
            Self::Convolution(l) => l.geometry().output_shape(input),
            Self::TiledConvolution(l) => l.geometry().output_shape(input),
            Self::MaxPooling(l) => l.output_shape(input),
            Self::FullyConnected(l) => {
                assert_eq!(input.num_elements(), l.in_features());
                Shape::vector(l.out_features())
            }
        }
    }

    /// Runs the layer. The result depends only on the parameters and the
    /// input; `&mut self` only lends the tiled layer its workspace.
    pub fn forward(&mut self, input: Tensor) -> Tensor {
        match self {
            Self::Convolution(l) => l.forward(&input),
            Self::TiledConvolution(l) => l.forward(&input),
            Self::MaxPooling(l) => l.forward(&input),
            Self::FullyConnected(l) => l.forward(&input),
        }
    }

    /// Loads parameters from a combined weight file. Parameter-free layers
    /// succeed without touching the file.
    pub fn load_weights(&mut self, path: &Path) -> Result<(), LayerError> {
        match self.parameters_mut() {
            Some(params) => params.load(path),
            None => Ok(()),
        }
    }

    /// Fills weights from a zero-mean distribution with standard deviation
    /// `stddev` and zeroes the biases. No-op for parameter-free layers.
    pub fn initialize_random<R: Rng + ?Sized>(&mut self, rng: &mut R, stddev: f32) {
        if let Some(params) = self.parameters_mut() {
            params.initialize_random(rng, stddev);
        }
    }
}

impl From<Convolution> for Layer {
    fn from(l: Convolution) -> Self {
        Self::Convolution(l)
    }
}

impl From<TiledConvolution> for Layer {
    fn from(l: TiledConvolution) -> Self {
        Self::TiledConvolution(l)
    }
}

impl From<MaxPooling> for Layer {
    fn from(l: MaxPooling) -> Self {
        Self::MaxPooling(l)
    }
}

impl From<FullyConnected> for Layer {
    fn from(l: FullyConnected) -> Self {
        Self::FullyConnected(l)
    }
}

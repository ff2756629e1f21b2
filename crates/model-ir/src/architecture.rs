// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Reference architecture.

use crate::graph::ModelGraph;
use crate::{Activation, LayerDef};
use tensor_core::Shape;

/// Input expected by [`alexnet`]: a normalized 3-channel 224×224 image.
pub const ALEXNET_INPUT: Shape = Shape::new(3, 224, 224);

/// Number of classes scored by [`alexnet`].
pub const ALEXNET_CLASSES: usize = 1000;

/// Builds the eleven-layer AlexNet graph (five convolutions, three pools,
/// three dense layers). The final layer is left unactivated so that its
/// outputs are logits.
///
/// The graph is returned in the `Loaded` state; call `validate()` before use.
pub fn alexnet() -> ModelGraph {
    let layers = vec![
        LayerDef::convolution("conv1", 3, 64, 11, 4, 2),
        LayerDef::max_pool("pool1", 3, 2),
        LayerDef::convolution("conv2", 64, 192, 5, 1, 2),
        LayerDef::max_pool("pool2", 3, 2),
        LayerDef::convolution("conv3", 192, 384, 3, 1, 1),
        LayerDef::convolution("conv4", 384, 256, 3, 1, 1),
        LayerDef::convolution("conv5", 256, 256, 3, 1, 1),
        LayerDef::max_pool("pool5", 3, 2),
        LayerDef::fully_connected("fc6", 256 * 6 * 6, 4096),
        LayerDef::fully_connected("fc7", 4096, 4096),
        LayerDef::fully_connected("fc8", 4096, ALEXNET_CLASSES)
            .with_activation(Activation::Identity),
    ];
    ModelGraph::new("alexnet", ALEXNET_INPUT, layers)
}

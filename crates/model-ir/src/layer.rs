// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Layer definitions for the network IR.
//!
//! Each [`LayerDef`] describes a single computation in the chain: its kind,
//! hyper-parameters, activation policy and estimated memory footprint.
//! Parameter data is **not** stored here; the `layers` crate owns it.

use crate::ModelError;
use tensor_core::{relu, relu_inplace, Shape};

/// Output extent of a convolution along one axis:
/// `floor((input + 2·padding − kernel) / stride) + 1`.
///
/// Returns `None` when the padded input is smaller than the kernel or the
/// kernel/stride is zero.
///
/// # Examples
/// ```
/// assert_eq!(model_ir::conv_output_dim(224, 11, 4, 2), Some(55));
/// assert_eq!(model_ir::conv_output_dim(2, 5, 1, 0), None);
/// ```
pub fn conv_output_dim(input: usize, kernel: usize, stride: usize, padding: usize) -> Option<usize> {
    let padded = input + 2 * padding;
    if kernel == 0 || stride == 0 || padded < kernel {
        return None;
    }
    Some((padded - kernel) / stride + 1)
}

/// Output extent of an unpadded pooling window along one axis:
/// `floor((input − pool) / stride) + 1`.
///
/// # Examples
/// ```
/// assert_eq!(model_ir::pool_output_dim(55, 3, 2), Some(27));
/// ```
pub fn pool_output_dim(input: usize, pool: usize, stride: usize) -> Option<usize> {
    conv_output_dim(input, pool, stride, 0)
}

/// Post-accumulation activation policy for a layer.
///
/// The terminal classification layer uses [`Activation::Identity`] so that
/// its raw outputs can be read as logits.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// Rectified linear unit, `max(0, x)`.
    #[default]
    Relu,
    /// No activation.
    Identity,
}

impl Activation {
    /// Applies the activation to a single value.
    #[inline(always)]
    pub fn apply(self, x: f32) -> f32 {
        match self {
            Self::Relu => relu(x),
            Self::Identity => x,
        }
    }

    /// Applies the activation to every element in place.
    pub fn apply_inplace(self, values: &mut [f32]) {
        if self == Self::Relu {
            relu_inplace(values);
        }
    }

    /// Returns a human-readable label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Relu => "relu",
            Self::Identity => "identity",
        }
    }
}

/// The computation a layer performs, with its hyper-parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerKind {
    /// 2-D convolution over all input channels with square kernels.
    Convolution {
        in_channels: usize,
        out_channels: usize,
        kernel_size: usize,
        stride: usize,
        padding: usize,
    },
    /// Unpadded square max pooling.
    MaxPool { pool_size: usize, stride: usize },
    /// Dense layer over the flattened input.
    FullyConnected {
        in_features: usize,
        out_features: usize,
    },
}

impl LayerKind {
    /// Returns a human-readable label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Convolution { .. } => "convolution",
            Self::MaxPool { .. } => "max_pool",
            Self::FullyConnected { .. } => "fully_connected",
        }
    }

    /// Returns `true` for kinds that carry weights and biases.
    pub fn has_learnable_parameters(&self) -> bool {
        !matches!(self, Self::MaxPool { .. })
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata describing a single layer in the network.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayerDef {
    /// Unique identifier (e.g., `"conv1"`); also selects the weight file.
    pub name: String,
    /// Position in the execution order (assigned by [`crate::ModelGraph::new`]).
    pub index: usize,
    /// The computation performed.
    pub kind: LayerKind,
    /// Activation applied to the accumulated output.
    pub activation: Activation,
}

impl LayerDef {
    /// A convolution followed by ReLU.
    pub fn convolution(
        name: impl Into<String>,
        in_channels: usize,
        out_channels: usize,
        kernel_size: usize,
        stride: usize,
        padding: usize,
    ) -> Self {
        Self {
            name: name.into(),
            index: 0,
            kind: LayerKind::Convolution {
                in_channels,
                out_channels,
                kernel_size,
                stride,
                padding,
            },
            activation: Activation::Relu,
        }
    }

    /// A max-pooling layer (never activated).
    pub fn max_pool(name: impl Into<String>, pool_size: usize, stride: usize) -> Self {
        Self {
            name: name.into(),
            index: 0,
            kind: LayerKind::MaxPool { pool_size, stride },
            activation: Activation::Identity,
        }
    }

    /// A fully-connected layer followed by ReLU.
    pub fn fully_connected(name: impl Into<String>, in_features: usize, out_features: usize) -> Self {
        Self {
            name: name.into(),
            index: 0,
            kind: LayerKind::FullyConnected {
                in_features,
                out_features,
            },
            activation: Activation::Relu,
        }
    }

    /// Replaces the activation policy.
    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    /// Returns `true` if the layer owns weights and biases.
    pub fn has_learnable_parameters(&self) -> bool {
        self.kind.has_learnable_parameters()
    }

    /// Shape of the weight tensor, `[out][in][kernelArea]`.
    ///
    /// Fully-connected layers use a kernel area of one, which has the same
    /// memory layout as `[out][in]`.
    pub fn weight_shape(&self) -> Option<Shape> {
        match self.kind {
            LayerKind::Convolution {
                in_channels,
                out_channels,
                kernel_size,
                ..
            } => Some(Shape::new(out_channels, in_channels, kernel_size * kernel_size)),
            LayerKind::FullyConnected {
                in_features,
                out_features,
            } => Some(Shape::new(out_features, in_features, 1)),
            LayerKind::MaxPool { .. } => None,
        }
    }

    /// Number of bias entries (zero for parameter-free layers).
    pub fn bias_len(&self) -> usize {
        match self.kind {
            LayerKind::Convolution { out_channels, .. } => out_channels,
            LayerKind::FullyConnected { out_features, .. } => out_features,
            LayerKind::MaxPool { .. } => 0,
        }
    }

    /// Total number of learnable scalars (weights + biases).
    pub fn num_parameters(&self) -> usize {
        self.weight_shape().map_or(0, |s| s.num_elements()) + self.bias_len()
    }

    /// Estimated memory for this layer's parameters in bytes.
    pub fn estimated_weight_bytes(&self) -> usize {
        self.num_parameters() * std::mem::size_of::<f32>()
    }

    /// Infers the output shape produced from `input`.
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidLayer`] if the input is incompatible
    /// (wrong channel count, flattened size mismatch, or a window that does
    /// not fit).
    pub fn output_shape(&self, input: Shape) -> Result<Shape, ModelError> {
        match self.kind {
            LayerKind::Convolution {
                in_channels,
                out_channels,
                kernel_size,
                stride,
                padding,
            } => {
                if input.depth != in_channels {
                    return Err(self.invalid(format!(
                        "expected {in_channels} input channels, got {}",
                        input.depth
                    )));
                }
                let h = conv_output_dim(input.height, kernel_size, stride, padding);
                let w = conv_output_dim(input.width, kernel_size, stride, padding);
                match (h, w) {
                    (Some(h), Some(w)) => Ok(Shape::new(out_channels, h, w)),
                    _ => Err(self.invalid(format!(
                        "kernel {kernel_size} (stride {stride}, padding {padding}) does not fit input {input}"
                    ))),
                }
            }
            LayerKind::MaxPool { pool_size, stride } => {
                let h = pool_output_dim(input.height, pool_size, stride);
                let w = pool_output_dim(input.width, pool_size, stride);
                match (h, w) {
                    (Some(h), Some(w)) => Ok(Shape::new(input.depth, h, w)),
                    _ => Err(self.invalid(format!(
                        "pool window {pool_size} (stride {stride}) does not fit input {input}"
                    ))),
                }
            }
            LayerKind::FullyConnected {
                in_features,
                out_features,
            } => {
                if input.num_elements() != in_features {
                    return Err(self.invalid(format!(
                        "expected {in_features} input features, got {} from {input}",
                        input.num_elements()
                    )));
                }
                Ok(Shape::vector(out_features))
            }
        }
    }

    /// Returns a concise summary string for display.
    pub fn summary(&self) -> String {
        let detail = match self.kind {
            LayerKind::Convolution {
                in_channels,
                out_channels,
                kernel_size,
                stride,
                padding,
            } => format!("{in_channels}→{out_channels}, k={kernel_size} s={stride} p={padding}"),
            LayerKind::MaxPool { pool_size, stride } => format!("pool={pool_size} s={stride}"),
            LayerKind::FullyConnected {
                in_features,
                out_features,
            } => format!("{in_features}→{out_features}"),
        };
        format!(
            "[{}] {} ({}: {}, {}): {:.1} KB parameters",
            self.index,
            self.name,
            self.kind,
            detail,
            self.activation.as_str(),
            self.estimated_weight_bytes() as f64 / 1024.0,
        )
    }

    fn invalid(&self, detail: String) -> ModelError {
        ModelError::InvalidLayer {
            layer: self.name.clone(),
            detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conv_output_dim() {
        assert_eq!(conv_output_dim(224, 11, 4, 2), Some(55));
        assert_eq!(conv_output_dim(27, 5, 1, 2), Some(27));
        assert_eq!(conv_output_dim(13, 3, 1, 1), Some(13));
        assert_eq!(conv_output_dim(4, 5, 1, 0), None);
        assert_eq!(conv_output_dim(4, 3, 0, 0), None);
    }

    #[test]
    fn test_pool_output_dim() {
        assert_eq!(pool_output_dim(55, 3, 2), Some(27));
        assert_eq!(pool_output_dim(27, 3, 2), Some(13));
        assert_eq!(pool_output_dim(13, 3, 2), Some(6));
        assert_eq!(pool_output_dim(2, 3, 2), None);
    }

    #[test]
    fn test_conv_output_shape() {
        let conv = LayerDef::convolution("conv1", 3, 64, 11, 4, 2);
        assert_eq!(
            conv.output_shape(Shape::new(3, 224, 224)).unwrap(),
            Shape::new(64, 55, 55)
        );
    }

    #[test]
    fn test_conv_wrong_channels() {
        let conv = LayerDef::convolution("conv2", 64, 192, 5, 1, 2);
        assert!(conv.output_shape(Shape::new(3, 27, 27)).is_err());
    }

    #[test]
    fn test_fc_flattened_size() {
        let fc = LayerDef::fully_connected("fc6", 9216, 4096);
        assert_eq!(fc.output_shape(Shape::new(256, 6, 6)).unwrap(), Shape::vector(4096));
        assert!(fc.output_shape(Shape::new(256, 5, 5)).is_err());
    }

    #[test]
    fn test_pool_keeps_depth() {
        let pool = LayerDef::max_pool("pool1", 3, 2);
        assert_eq!(
            pool.output_shape(Shape::new(64, 55, 55)).unwrap(),
            Shape::new(64, 27, 27)
        );
        assert!(pool.output_shape(Shape::new(64, 2, 2)).is_err());
    }

    #[test]
    fn test_parameter_counts() {
        let conv = LayerDef::convolution("c", 3, 64, 11, 4, 2);
        assert_eq!(conv.weight_shape(), Some(Shape::new(64, 3, 121)));
        assert_eq!(conv.num_parameters(), 64 * 3 * 121 + 64);
        assert_eq!(conv.estimated_weight_bytes(), conv.num_parameters() * 4);

        let fc = LayerDef::fully_connected("f", 10, 4);
        assert_eq!(fc.weight_shape(), Some(Shape::new(4, 10, 1)));
        assert_eq!(fc.num_parameters(), 44);

        let pool = LayerDef::max_pool("p", 3, 2);
        assert!(!pool.has_learnable_parameters());
        assert_eq!(pool.num_parameters(), 0);
        assert_eq!(pool.weight_shape(), None);
    }

    #[test]
    fn test_activation_defaults() {
        assert_eq!(LayerDef::convolution("c", 1, 1, 1, 1, 0).activation, Activation::Relu);
        assert_eq!(LayerDef::max_pool("p", 2, 2).activation, Activation::Identity);
        let logits = LayerDef::fully_connected("fc8", 4, 2).with_activation(Activation::Identity);
        assert_eq!(logits.activation, Activation::Identity);
    }

    #[test]
    fn test_activation_apply() {
        let mut v = [-1.0, 2.0];
        Activation::Identity.apply_inplace(&mut v);
        assert_eq!(v, [-1.0, 2.0]);
        Activation::Relu.apply_inplace(&mut v);
        assert_eq!(v, [0.0, 2.0]);
        assert_eq!(Activation::Relu.apply(-0.5), 0.0);
    }

    #[test]
    fn test_summary() {
        let s = LayerDef::convolution("conv3", 192, 384, 3, 1, 1).summary();
        assert!(s.contains("conv3"));
        assert!(s.contains("convolution"));
        assert!(s.contains("192→384"));
    }

    #[test]
    fn test_serde_roundtrip() {
        let layer = LayerDef::fully_connected("fc8", 4096, 1000).with_activation(Activation::Identity);
        let json = serde_json::to_string(&layer).unwrap();
        assert!(json.contains("\"fully_connected\""));
        let back: LayerDef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, layer);
    }
}

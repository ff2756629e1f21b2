// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Cache-tiled convolution.
//!
//! The computation of [`crate::Convolution`] is partitioned into tiles of
//! output channels (`tm`), input channels (`tn`), output rows (`tr`) and
//! output columns (`tc`). For each tile the relevant input patch, weight
//! block and a zeroed partial-sum buffer are staged in small contiguous
//! buffers, the partial sums are computed there, and then added into the
//! global output.
//!
//! # Accumulation
//!
//! ```text
//! output ← bias                       (once, before any tile)
//! for each (m-tile, n-tile, r-tile, c-tile):
//!     local ← 0
//!     local += Σ_{n in tile} w · x    (staged buffers)
//!     output[tile] += local
//! output ← activation(output)         (once, after all tiles)
//! ```
//!
//! Because each input-channel tile only adds its share, the region holds the
//! complete sum once every input tile has been visited. Bias and activation
//! are each applied exactly once.
//!
//! Results agree with direct convolution up to floating-point reassociation.

use crate::conv::ConvGeometry;
use crate::{LayerError, Parameters};
use model_ir::Activation;
use tensor_core::Tensor;

/// Tile extents along the four tiled loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TileConfig {
    /// Output channels per tile.
    pub tm: usize,
    /// Input channels per tile.
    pub tn: usize,
    /// Output rows per tile.
    pub tr: usize,
    /// Output columns per tile.
    pub tc: usize,
}

impl TileConfig {
    pub const fn new(tm: usize, tn: usize, tr: usize, tc: usize) -> Self {
        Self { tm, tn, tr, tc }
    }

    /// Rejects zero-sized tiles.
    pub fn validate(&self) -> Result<(), LayerError> {
        for (label, value) in [("tm", self.tm), ("tn", self.tn), ("tr", self.tr), ("tc", self.tc)] {
            if value == 0 {
                return Err(LayerError::InvalidTileConfig(format!(
                    "{label} must be at least 1"
                )));
            }
        }
        Ok(())
    }
}

impl Default for TileConfig {
    fn default() -> Self {
        Self::new(64, 7, 16, 16)
    }
}

impl std::fmt::Display for TileConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tm={} tn={} tr={} tc={}", self.tm, self.tn, self.tr, self.tc)
    }
}

/// Staging buffers for one tiled forward pass.
///
/// Buffers grow to the largest tile seen and are never shrunk, so repeated
/// forwards over the same layer allocate only once. A workspace must not be
/// used by two forwards at the same time; callers wanting concurrent passes
/// over one layer give each pass its own workspace via
/// [`TiledConvolution::forward_with`].
#[derive(Debug, Clone, Default)]
pub struct TileWorkspace {
    input: Vec<f32>,
    weights: Vec<f32>,
    output: Vec<f32>,
}

impl TileWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of allocated f32 elements across the three buffers.
    pub fn capacity(&self) -> usize {
        self.input.len() + self.weights.len() + self.output.len()
    }

    fn reserve(&mut self, input: usize, weights: usize, output: usize) {
        grow(&mut self.input, input);
        grow(&mut self.weights, weights);
        grow(&mut self.output, output);
    }
}

fn grow(buf: &mut Vec<f32>, len: usize) {
    if buf.len() < len {
        buf.resize(len, 0.0);
    }
}

/// Convolution computed tile by tile through a [`TileWorkspace`].
#[derive(Debug, Clone)]
pub struct TiledConvolution {
    name: String,
    geometry: ConvGeometry,
    activation: Activation,
    tiles: TileConfig,
    params: Parameters,
    workspace: TileWorkspace,
}

impl TiledConvolution {
    /// Creates a tiled convolution with zero-initialized parameters.
    ///
    /// # Errors
    /// Returns [`LayerError::InvalidTileConfig`] if any tile size is zero.
    pub fn new(
        name: impl Into<String>,
        geometry: ConvGeometry,
        activation: Activation,
        tiles: TileConfig,
    ) -> Result<Self, LayerError> {
        tiles.validate()?;
        Ok(Self {
            name: name.into(),
            params: Parameters::zeros(geometry.weight_shape()),
            geometry,
            activation,
            tiles,
            workspace: TileWorkspace::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn geometry(&self) -> &ConvGeometry {
        &self.geometry
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn tiles(&self) -> TileConfig {
        self.tiles
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    pub fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    /// The layer's own workspace.
    pub fn workspace(&self) -> &TileWorkspace {
        &self.workspace
    }

    /// Runs the tiled forward pass with the layer's own workspace.
    pub fn forward(&mut self, input: &Tensor) -> Tensor {
        let mut workspace = std::mem::take(&mut self.workspace);
        let output = self.forward_with(input, &mut workspace);
        self.workspace = workspace;
        output
    }

    /// Runs the tiled forward pass with a caller-supplied workspace.
    ///
    /// # Panics
    /// If `input` does not match the geometry (see [`ConvGeometry::output_shape`]).
    pub fn forward_with(&self, input: &Tensor, ws: &mut TileWorkspace) -> Tensor {
        let g = &self.geometry;
        let in_shape = input.shape();
        let out_shape = g.output_shape(in_shape);
        let (m_total, n_total) = (g.out_channels, g.in_channels);
        let (k, s) = (g.kernel_size, g.stride);
        let kk = k * k;

        let mut output = Tensor::zeros(out_shape);
        for (o, &b) in self.params.bias().iter().enumerate() {
            output.channel_mut(o).fill(b);
        }

        // Size the workspace for the largest tile this call can produce.
        let tm = self.tiles.tm.min(m_total).max(1);
        let tn = self.tiles.tn.min(n_total).max(1);
        let tr = self.tiles.tr.min(out_shape.height).max(1);
        let tc = self.tiles.tc.min(out_shape.width).max(1);
        ws.reserve(
            tn * halo(tr, k, s) * halo(tc, k, s),
            tm * tn * kk,
            tm * tr * tc,
        );

        for m0 in (0..m_total).step_by(tm) {
            let m_len = tm.min(m_total - m0);
            for n0 in (0..n_total).step_by(tn) {
                let n_len = tn.min(n_total - n0);
                self.stage_weights(&mut ws.weights, m0, m_len, n0, n_len);

                for r0 in (0..out_shape.height).step_by(tr) {
                    let r_len = tr.min(out_shape.height - r0);
                    for c0 in (0..out_shape.width).step_by(tc) {
                        let c_len = tc.min(out_shape.width - c0);
                        let tile = Tile {
                            m0,
                            m_len,
                            n0,
                            n_len,
                            r0,
                            r_len,
                            c0,
                            c_len,
                        };
                        self.stage_input(&mut ws.input, input, &tile);
                        compute_tile(ws, &tile, k, s);
                        accumulate(&mut output, &ws.output, &tile);
                    }
                }
            }
        }

        self.activation.apply_inplace(output.as_mut_slice());
        output
    }

    /// Copies `w[m0..m0+m_len][n0..n0+n_len][..]` into `[m_len][n_len][K·K]`.
    fn stage_weights(&self, buf: &mut [f32], m0: usize, m_len: usize, n0: usize, n_len: usize) {
        let kk = self.geometry.kernel_size * self.geometry.kernel_size;
        for mm in 0..m_len {
            for nn in 0..n_len {
                let dst = (mm * n_len + nn) * kk;
                buf[dst..dst + kk].copy_from_slice(self.params.kernel(m0 + mm, n0 + nn));
            }
        }
    }

    /// Copies the input patch (with halo) feeding `tile` into
    /// `[n_len][rows][cols]`; padded positions become zero.
    fn stage_input(&self, buf: &mut [f32], input: &Tensor, tile: &Tile) {
        let g = &self.geometry;
        let rows = halo(tile.r_len, g.kernel_size, g.stride);
        let cols = halo(tile.c_len, g.kernel_size, g.stride);
        let (height, width) = (input.height(), input.width());
        let row0 = tile.r0 * g.stride;
        let col0 = tile.c0 * g.stride;

        for nn in 0..tile.n_len {
            let channel = input.channel(tile.n0 + nn);
            for rr in 0..rows {
                let dst = &mut buf[(nn * rows + rr) * cols..(nn * rows + rr + 1) * cols];
                let ih = (row0 + rr).checked_sub(g.padding).filter(|&h| h < height);
                let Some(ih) = ih else {
                    dst.fill(0.0);
                    continue;
                };
                for (cc, slot) in dst.iter_mut().enumerate() {
                    *slot = match (col0 + cc).checked_sub(g.padding) {
                        Some(iw) if iw < width => channel[ih * width + iw],
                        _ => 0.0,
                    };
                }
            }
        }
    }
}

/// Input extent covering `len` outputs: `stride·(len − 1) + K`.
fn halo(len: usize, kernel: usize, stride: usize) -> usize {
    stride * len.saturating_sub(1) + kernel
}

/// Offsets and (clamped) extents of one tile.
#[derive(Debug, Clone, Copy)]
struct Tile {
    m0: usize,
    m_len: usize,
    n0: usize,
    n_len: usize,
    r0: usize,
    r_len: usize,
    c0: usize,
    c_len: usize,
}

/// Partial sums for one tile, into a zeroed `[m_len][r_len][c_len]` buffer.
///
/// Loop order: kernel row, kernel column, output row, output column, output
/// channel, input channel.
fn compute_tile(ws: &mut TileWorkspace, tile: &Tile, k: usize, s: usize) {
    let rows = halo(tile.r_len, k, s);
    let cols = halo(tile.c_len, k, s);
    let kk = k * k;
    let plane = tile.r_len * tile.c_len;
    let out = &mut ws.output[..tile.m_len * plane];
    out.fill(0.0);

    for ki in 0..k {
        for kj in 0..k {
            let tap = ki * k + kj;
            for rr in 0..tile.r_len {
                let in_row = rr * s + ki;
                for cc in 0..tile.c_len {
                    let in_col = cc * s + kj;
                    for mm in 0..tile.m_len {
                        let weights = &ws.weights[mm * tile.n_len * kk..];
                        let mut acc = 0.0f32;
                        for nn in 0..tile.n_len {
                            acc += weights[nn * kk + tap]
                                * ws.input[(nn * rows + in_row) * cols + in_col];
                        }
                        out[mm * plane + rr * tile.c_len + cc] += acc;
                    }
                }
            }
        }
    }
}

/// Adds the tile's partial sums into the global output.
fn accumulate(output: &mut Tensor, local: &[f32], tile: &Tile) {
    let plane = tile.r_len * tile.c_len;
    let width = output.width();
    for mm in 0..tile.m_len {
        let channel = output.channel_mut(tile.m0 + mm);
        for rr in 0..tile.r_len {
            let dst_start = (tile.r0 + rr) * width + tile.c0;
            let src_start = mm * plane + rr * tile.c_len;
            for (dst, src) in channel[dst_start..dst_start + tile.c_len]
                .iter_mut()
                .zip(&local[src_start..src_start + tile.c_len])
            {
                *dst += src;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Convolution;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use tensor_core::Shape;

    /// Direct and tiled layers sharing the same random parameters.
    fn pair(geometry: ConvGeometry, tiles: TileConfig, seed: u64) -> (Convolution, TiledConvolution) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut direct = Convolution::new("direct", geometry, Activation::Relu);
        direct.parameters_mut().initialize_random(&mut rng, 0.5);
        let bias: Vec<f32> = (0..geometry.out_channels).map(|_| rng.gen_range(-0.5..0.5)).collect();
        let params = Parameters::from_parts(direct.parameters().weights().clone(), bias);
        *direct.parameters_mut() = params.clone();

        let mut tiled = TiledConvolution::new("tiled", geometry, Activation::Relu, tiles).unwrap();
        *tiled.parameters_mut() = params;
        (direct, tiled)
    }

    fn random_input(shape: Shape, seed: u64) -> Tensor {
        let mut rng = StdRng::seed_from_u64(seed);
        let data = (0..shape.num_elements()).map(|_| rng.gen_range(-1.0..1.0)).collect();
        Tensor::from_vec(shape, data).unwrap()
    }

    fn assert_close(a: &Tensor, b: &Tensor) {
        assert_eq!(a.shape(), b.shape());
        for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
            let tol = 1e-3 * x.abs().max(y.abs()).max(1.0);
            assert!((x - y).abs() <= tol, "{x} vs {y}");
        }
    }

    #[test]
    fn test_tile_config_validate() {
        assert!(TileConfig::default().validate().is_ok());
        assert_eq!(TileConfig::default(), TileConfig::new(64, 7, 16, 16));
        assert!(matches!(
            TileConfig::new(4, 0, 4, 4).validate(),
            Err(LayerError::InvalidTileConfig(_))
        ));
        let g = ConvGeometry::new(1, 1, 1, 1, 0);
        assert!(TiledConvolution::new("t", g, Activation::Relu, TileConfig::new(1, 1, 1, 0)).is_err());
    }

    #[test]
    fn test_halo() {
        assert_eq!(halo(16, 3, 1), 18);
        assert_eq!(halo(16, 11, 4), 71);
        assert_eq!(halo(1, 5, 2), 5);
    }

    #[test]
    fn test_matches_direct_default_tiles() {
        let g = ConvGeometry::new(10, 12, 3, 1, 1);
        let (direct, mut tiled) = pair(g, TileConfig::default(), 11);
        let input = random_input(Shape::new(10, 20, 20), 12);
        assert_close(&direct.forward(&input), &tiled.forward(&input));
    }

    #[test]
    fn test_matches_direct_strided_uneven_tiles() {
        // Tile sizes that do not divide any extent, with stride and padding.
        let g = ConvGeometry::new(3, 5, 5, 2, 2);
        let (direct, mut tiled) = pair(g, TileConfig::new(2, 2, 3, 4), 21);
        let input = random_input(Shape::new(3, 17, 13), 22);
        assert_close(&direct.forward(&input), &tiled.forward(&input));
    }

    #[test]
    fn test_matches_direct_unit_tiles() {
        let g = ConvGeometry::new(2, 3, 3, 1, 1);
        let (direct, mut tiled) = pair(g, TileConfig::new(1, 1, 1, 1), 31);
        let input = random_input(Shape::new(2, 5, 6), 32);
        assert_close(&direct.forward(&input), &tiled.forward(&input));
    }

    #[test]
    fn test_matches_direct_oversized_tiles() {
        let g = ConvGeometry::new(4, 4, 3, 1, 0);
        let (direct, mut tiled) = pair(g, TileConfig::new(100, 100, 100, 100), 41);
        let input = random_input(Shape::new(4, 7, 7), 42);
        assert_close(&direct.forward(&input), &tiled.forward(&input));
    }

    #[test]
    fn test_bias_applied_once() {
        // Zero weights with several input-channel tiles: output is exactly
        // the bias, not a multiple of it.
        let g = ConvGeometry::new(6, 2, 1, 1, 0);
        let mut tiled = TiledConvolution::new("t", g, Activation::Identity, TileConfig::new(1, 2, 2, 2)).unwrap();
        *tiled.parameters_mut() = Parameters::from_parts(Tensor::zeros(g.weight_shape()), vec![0.5, -3.0]);
        let out = tiled.forward(&Tensor::new(6, 3, 3, 1.0));
        assert!(out.channel(0).iter().all(|&x| x == 0.5));
        assert!(out.channel(1).iter().all(|&x| x == -3.0));
    }

    #[test]
    fn test_relu_applied_after_full_sum() {
        // Channel 0 contributes -1, channel 1 contributes +2 in a separate
        // input tile. Rectifying per tile would give 2; the true result is 1.
        let g = ConvGeometry::new(2, 1, 1, 1, 0);
        let mut tiled = TiledConvolution::new("t", g, Activation::Relu, TileConfig::new(1, 1, 4, 4)).unwrap();
        *tiled.parameters_mut() = Parameters::from_parts(
            Tensor::from_vec(g.weight_shape(), vec![-1.0, 2.0]).unwrap(),
            vec![0.0],
        );
        let out = tiled.forward(&Tensor::new(2, 2, 2, 1.0));
        assert!(out.as_slice().iter().all(|&x| x == 1.0));
    }

    #[test]
    fn test_workspace_reused() {
        let g = ConvGeometry::new(3, 4, 3, 1, 1);
        let (_, mut tiled) = pair(g, TileConfig::new(2, 2, 4, 4), 51);
        let input = random_input(Shape::new(3, 9, 9), 52);
        assert_eq!(tiled.workspace().capacity(), 0);

        let first = tiled.forward(&input);
        let capacity = tiled.workspace().capacity();
        assert!(capacity > 0);

        let second = tiled.forward(&input);
        assert_eq!(tiled.workspace().capacity(), capacity);
        assert_eq!(first, second);
    }

    #[test]
    fn test_forward_with_external_workspace() {
        let g = ConvGeometry::new(3, 4, 3, 2, 1);
        let (_, mut tiled) = pair(g, TileConfig::default(), 61);
        let input = random_input(Shape::new(3, 11, 11), 62);
        let mut ws = TileWorkspace::new();
        let a = tiled.forward_with(&input, &mut ws);
        assert!(ws.capacity() > 0);
        assert_eq!(tiled.workspace().capacity(), 0);
        assert_eq!(a, tiled.forward(&input));
    }
}

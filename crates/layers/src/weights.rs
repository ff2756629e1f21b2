// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Combined weight files: `<name>_combined.bin`.
//!
//! The format is a headerless run of native-endian f32 values: every weight
//! in `[out][in][kernelArea]` order, immediately followed by the biases.
//! The only validation possible is the total byte count.

use crate::LayerError;
use std::path::{Path, PathBuf};

const F32_BYTES: usize = std::mem::size_of::<f32>();

/// Returns `<dir>/<layer_name>_combined.bin`.
pub fn weight_file_path(dir: impl AsRef<Path>, layer_name: &str) -> PathBuf {
    dir.as_ref().join(format!("{layer_name}_combined.bin"))
}

/// Reads a combined weight file holding exactly `weight_len + bias_len`
/// values and splits it into `(weights, biases)`.
///
/// The file is memory-mapped and copied out with `bytemuck`, which handles
/// the (unaligned) byte buffer without any pointer casts.
///
/// # Errors
/// - [`LayerError::Io`] if the file cannot be opened or mapped.
/// - [`LayerError::SizeMismatch`] if the byte count is wrong.
pub fn read_weight_file(
    path: &Path,
    weight_len: usize,
    bias_len: usize,
) -> Result<(Vec<f32>, Vec<f32>), LayerError> {
    let io_err = |source| LayerError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = std::fs::File::open(path).map_err(io_err)?;
    let expected = (weight_len + bias_len) * F32_BYTES;
    let actual = usize::try_from(file.metadata().map_err(io_err)?.len()).unwrap_or(usize::MAX);
    if actual != expected {
        return Err(LayerError::SizeMismatch {
            path: path.to_path_buf(),
            expected,
            actual,
        });
    }

    // An empty file cannot be mapped on every platform.
    if expected == 0 {
        return Ok((Vec::new(), Vec::new()));
    }

    // SAFETY: the mapping is read-only and copied out before it is dropped.
    let mmap = unsafe { memmap2::Mmap::map(&file) }.map_err(io_err)?;
    let mut values: Vec<f32> = bytemuck::pod_collect_to_vec(&mmap[..expected]);
    let biases = values.split_off(weight_len);

    tracing::trace!(
        "read {} weights + {} biases from {}",
        weight_len,
        bias_len,
        path.display()
    );
    Ok((values, biases))
}

/// Writes weights followed by biases in the combined format.
pub fn write_weight_file(path: &Path, weights: &[f32], biases: &[f32]) -> Result<(), LayerError> {
    let mut bytes = Vec::with_capacity((weights.len() + biases.len()) * F32_BYTES);
    bytes.extend_from_slice(bytemuck::cast_slice(weights));
    bytes.extend_from_slice(bytemuck::cast_slice(biases));
    std::fs::write(path, bytes).map_err(|source| LayerError::Io {
        path: path.to_path_buf(),
        source,
    })
}

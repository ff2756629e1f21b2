// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Parser for the advisory `network_metadata.txt` descriptor written next to
//! the weight files by the exporter.
//!
//! Each non-empty line has the form
//!
//! ```text
//! <layerName> <outSize> <inSize> [kernelSize]
//! ```
//!
//! Convolution lines carry the optional kernel size. Lines starting with `#`
//! are comments. Malformed lines are skipped with a warning: the file only
//! cross-checks the architecture and never drives loading.

use crate::graph::{ModelGraph, Validated};
use crate::{LayerKind, ModelError};
use std::collections::HashMap;
use std::path::Path;

/// File name of the metadata descriptor inside a weights directory.
pub const METADATA_FILE: &str = "network_metadata.txt";

/// One parsed metadata line.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MetadataEntry {
    pub layer_name: String,
    pub out_size: usize,
    pub in_size: usize,
    pub kernel_size: Option<usize>,
}

/// Parsed metadata, keyed by layer name. Later lines override earlier ones.
#[derive(Debug, Clone, Default)]
pub struct NetworkMetadata {
    entries: HashMap<String, MetadataEntry>,
}

impl NetworkMetadata {
    /// Reads and parses a metadata file.
    ///
    /// # Errors
    /// Returns [`ModelError::MetadataReadError`] if the file cannot be read.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let metadata = Self::parse(&contents);
        tracing::debug!(
            "Loaded {} metadata entries from {}",
            metadata.len(),
            path.display()
        );
        Ok(metadata)
    }

    /// Parses metadata text. Never fails; malformed lines are skipped.
    pub fn parse(contents: &str) -> Self {
        let mut entries = HashMap::new();
        for (lineno, raw) in contents.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match parse_line(line) {
                Some(entry) => {
                    entries.insert(entry.layer_name.clone(), entry);
                }
                None => {
                    tracing::warn!("Skipping malformed metadata line {}: '{line}'", lineno + 1);
                }
            }
        }
        Self { entries }
    }

    /// Returns the entry for `layer_name`, if present.
    pub fn get(&self, layer_name: &str) -> Option<&MetadataEntry> {
        self.entries.get(layer_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compares the recorded sizes against `graph` and returns one message
    /// per disagreement. Layers absent from the metadata are not reported.
    pub fn check_against(&self, graph: &ModelGraph<Validated>) -> Vec<String> {
        let mut mismatches = Vec::new();

        for (name, entry) in &self.entries {
            let Some(layer) = graph.layer_by_name(name) else {
                mismatches.push(format!("metadata names unknown layer '{name}'"));
                continue;
            };
            let (out_size, in_size, kernel) = match layer.kind {
                LayerKind::Convolution {
                    in_channels,
                    out_channels,
                    kernel_size,
                    ..
                } => (out_channels, in_channels, Some(kernel_size)),
                LayerKind::FullyConnected {
                    in_features,
                    out_features,
                } => (out_features, in_features, None),
                LayerKind::MaxPool { .. } => {
                    mismatches.push(format!("metadata lists parameter-free layer '{name}'"));
                    continue;
                }
            };
            if entry.out_size != out_size || entry.in_size != in_size {
                mismatches.push(format!(
                    "layer '{name}': metadata says out={} in={}, architecture has out={out_size} in={in_size}",
                    entry.out_size, entry.in_size
                ));
            }
            if let (Some(recorded), Some(expected)) = (entry.kernel_size, kernel) {
                if recorded != expected {
                    mismatches.push(format!(
                        "layer '{name}': metadata kernel {recorded}, architecture kernel {expected}"
                    ));
                }
            }
        }

        mismatches.sort();
        mismatches
    }
}

fn parse_line(line: &str) -> Option<MetadataEntry> {
    let mut fields = line.split_whitespace();
    let layer_name = fields.next()?.to_string();
    let out_size = fields.next()?.parse().ok()?;
    let in_size = fields.next()?.parse().ok()?;
    let kernel_size = match fields.next() {
        Some(k) => Some(k.parse().ok()?),
        None => None,
    };
    if fields.next().is_some() {
        return None;
    }
    Some(MetadataEntry {
        layer_name,
        out_size,
        in_size,
        kernel_size,
    })
}

// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runtime configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! weights_dir = "./weights"
//! convolution = "tiled"
//! top_k = 5
//! enable_profiling = true
//!
//! [tiles]
//! tm = 64
//! tn = 7
//! tr = 16
//! tc = 16
//!
//! [init]
//! mode = "random"
//! seed = 42
//! stddev = 0.01
//! ```
//!
//! Every key is optional; missing keys take the values of
//! [`RuntimeConfig::default`].

use layers::{ConvAlgorithm, TileConfig};
use std::path::{Path, PathBuf};

/// How layer parameters are filled before (or instead of) loading weights.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum InitMode {
    /// All weights and biases zero.
    Zeros,
    /// Zero-mean random weights, zero biases.
    #[default]
    Random,
}

/// Parameter initialization settings.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct InitConfig {
    pub mode: InitMode,
    /// RNG seed; `None` draws a fresh seed from the OS.
    pub seed: Option<u64>,
    /// Standard deviation of the random weights.
    pub stddev: f32,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            mode: InitMode::Random,
            seed: None,
            stddev: 0.01,
        }
    }
}

/// Configuration for building and running a network.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Directory holding `<layer>_combined.bin` files and the optional
    /// `network_metadata.txt`.
    pub weights_dir: PathBuf,
    /// Convolution implementation: `"direct"` or `"tiled"`.
    pub convolution: ConvAlgorithm,
    /// Tile sizes for the tiled convolution.
    pub tiles: TileConfig,
    /// Number of predictions reported by `classify`.
    pub top_k: usize,
    /// Parameter initialization.
    pub init: InitConfig,
    /// Whether to collect per-layer timings.
    pub enable_profiling: bool,
}

impl RuntimeConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, super::RuntimeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            super::RuntimeError::ConfigError(format!(
                "cannot read config '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, super::RuntimeError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| {
            super::RuntimeError::ConfigError(format!("TOML parse error: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, super::RuntimeError> {
        toml::to_string_pretty(self).map_err(|e| {
            super::RuntimeError::ConfigError(format!("TOML serialise error: {e}"))
        })
    }

    /// Checks value ranges that the type system cannot express.
    pub fn validate(&self) -> Result<(), super::RuntimeError> {
        self.tiles
            .validate()
            .map_err(|e| super::RuntimeError::ConfigError(e.to_string()))?;
        if self.top_k == 0 {
            return Err(super::RuntimeError::ConfigError(
                "top_k must be at least 1".into(),
            ));
        }
        if !self.init.stddev.is_finite() || self.init.stddev < 0.0 {
            return Err(super::RuntimeError::ConfigError(format!(
                "init.stddev must be a non-negative finite number, got {}",
                self.init.stddev
            )));
        }
        Ok(())
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            weights_dir: PathBuf::from("./weights"),
            convolution: ConvAlgorithm::Tiled,
            tiles: TileConfig::default(),
            top_k: 5,
            init: InitConfig::default(),
            enable_profiling: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let c = RuntimeConfig::default();
        assert_eq!(c.convolution, ConvAlgorithm::Tiled);
        assert_eq!(c.tiles, TileConfig::new(64, 7, 16, 16));
        assert_eq!(c.top_k, 5);
        assert_eq!(c.init.mode, InitMode::Random);
        assert!(c.enable_profiling);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
weights_dir = "/tmp/weights"
convolution = "direct"
top_k = 3
enable_profiling = false

[tiles]
tm = 32
tc = 8

[init]
mode = "zeros"
"#;
        let c = RuntimeConfig::from_toml(toml).unwrap();
        assert_eq!(c.weights_dir, PathBuf::from("/tmp/weights"));
        assert_eq!(c.convolution, ConvAlgorithm::Direct);
        assert_eq!(c.tiles, TileConfig::new(32, 7, 16, 8));
        assert_eq!(c.top_k, 3);
        assert_eq!(c.init.mode, InitMode::Zeros);
        assert_eq!(c.init.stddev, 0.01);
        assert!(!c.enable_profiling);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(RuntimeConfig::from_toml("").unwrap(), RuntimeConfig::default());
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let c = RuntimeConfig {
            convolution: ConvAlgorithm::Direct,
            init: InitConfig {
                mode: InitMode::Random,
                seed: Some(7),
                stddev: 0.05,
            },
            ..Default::default()
        };
        let toml = c.to_toml().unwrap();
        let back = RuntimeConfig::from_toml(&toml).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_unknown_algorithm_rejected() {
        assert!(RuntimeConfig::from_toml("convolution = \"winograd\"").is_err());
    }

    #[test]
    fn test_zero_tile_rejected() {
        let err = RuntimeConfig::from_toml("[tiles]\ntn = 0\n").unwrap_err();
        assert!(err.to_string().contains("tn"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(RuntimeConfig::from_toml("top_k = 0").is_err());
        assert!(RuntimeConfig::from_toml("[init]\nstddev = -1.0\n").is_err());
    }

    #[test]
    fn test_from_file_missing() {
        let err = RuntimeConfig::from_file(Path::new("/nonexistent/tcnn.toml")).unwrap_err();
        assert!(matches!(err, crate::RuntimeError::ConfigError(_)));
    }
}

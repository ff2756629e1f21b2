// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # runtime
//!
//! The engine that turns a network description into class probabilities.
//!
//! The runtime takes:
//! - A validated `ModelGraph` from `model-ir`.
//! - A [`RuntimeConfig`] selecting the convolution algorithm, tile sizes and
//!   parameter initialization.
//!
//! It builds one `layers::Layer` per graph entry, optionally loads weights
//! from a directory of combined weight files ([`WeightLoader`]), and runs
//! forward passes followed by softmax and top-k selection ([`Network`]).
//!
//! # Concurrency
//! Execution is synchronous and single-threaded. A [`Network`] needs `&mut`
//! access to run because tiled convolution layers reuse their staging
//! buffers between calls.

pub mod config;
mod error;
mod metrics;
mod network;
mod weight_loader;

pub use config::{InitConfig, InitMode, RuntimeConfig};
pub use error::RuntimeError;
pub use metrics::{InferenceMetrics, LayerMetrics};
pub use network::{InferenceOutput, Network};
pub use weight_loader::{LoadFailure, LoadReport, WeightLoader};

// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Storage abstraction traits for cross-platform neural processing
//!
//! The engine's kernels are written against these traits, so a storage
//! implementation only has to hand out slices.

pub mod storage;

// Re-export key types
pub use storage::{AggregationView, ConductanceView, IntegrationView, NeuronStorage, SynapseStorage};

// Re-export error types from lamina-npu-neural
pub use lamina_npu_neural::types::{LaminaError, Result};

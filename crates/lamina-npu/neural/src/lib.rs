// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Lamina Neural Computation (Platform-Agnostic)
//!
//! ALL per-unit neural math in one place:
//! - **Types**: identifiers and the error type
//! - **Models**: Morris–Lecar two-state membrane model
//! - **Synapse**: graded response curve, synaptic current, delay conversion
//! - **Dynamics**: micro-step subdivision and divergence checks
//!
//! Nothing here owns network state; the runtime crate stores arrays and the
//! engine crate schedules these kernels over them.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Core type definitions
pub mod types;

// Neural dynamics algorithms
pub mod dynamics;

// Synaptic algorithms
pub mod synapse;

// Neuron models
pub mod models;

pub use dynamics::*;

// Re-export types
pub use types::{Error, LaminaError, NeuronId, NeuronTypeId, Result, SynapseEnd, SynapseId};

// Re-export synapse module
pub use synapse::{
    compute_conductance, delay_buffer_bytes, delay_to_ticks, dendritic_current,
    synaptic_current, SynapseParameters, MAX_DELAY_BUFFER_BYTES, MAX_DELAY_TICKS,
};

// Re-export neuron models
pub use models::{
    MembraneConstants, MembraneState, ModelParameters, MorrisLecarModel, MorrisLecarParameters,
    NeuronModel,
};

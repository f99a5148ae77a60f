// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for network construction and tick execution

use super::ids::{NeuronId, SynapseId};

/// Which end of a synapse an out-of-range neuron index was found on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynapseEnd {
    Presynaptic,
    Postsynaptic,
}

impl core::fmt::Display for SynapseEnd {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SynapseEnd::Presynaptic => write!(f, "presynaptic"),
            SynapseEnd::Postsynaptic => write!(f, "postsynaptic"),
        }
    }
}

/// Error types for Lamina network operations
///
/// Everything except `ArraySizeMismatch` is a configuration error raised while
/// a network is being built; a network that failed to build never runs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LaminaError {
    #[error("Invalid timestep: dt must be finite and > 0, got {0}")]
    InvalidTimestep(f64),

    #[error("{synapse} references {end} {neuron} outside [0, {num_neurons})")]
    NeuronOutOfRange {
        synapse: SynapseId,
        neuron: NeuronId,
        end: SynapseEnd,
        num_neurons: usize,
    },

    #[error("Synapses are not grouped by postsynaptic neuron: order breaks at synapse index {index}")]
    UnsortedSynapses { index: usize },

    #[error("Dendrite counts sum to {actual}, expected {expected} synapses")]
    DendritePartitionMismatch { expected: usize, actual: usize },

    #[error("Invalid delay for {synapse}: {delay} ({reason})")]
    InvalidDelay {
        synapse: SynapseId,
        delay: f64,
        reason: &'static str,
    },

    #[error("Invalid neuron type layout: {0}")]
    InvalidNeuronTypes(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Array size mismatch for {what}: expected {expected}, got {actual}")]
    ArraySizeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("No resting state: membrane current does not change sign in [{low}, {high}]")]
    NoRestingState { low: f64, high: f64 },
}

pub type Result<T> = core::result::Result<T, LaminaError>;
pub type Error = LaminaError;

// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Lamina Runtime - Standard (Desktop/Server)
//!
//! Vec-backed storage for desktop and server environments.
//!
//! ## Contents
//! - `NeuronArray`: per-neuron voltage, gating, current accumulator, type
//! - `SynapseArray`: per-synapse topology, delays, parameters, conductance
//! - `DendriteIndex`: CSR row offsets grouping synapses by target
//! - `NeuronTypeTable`: `neuron_start` boundaries + per-type parameters
//! - `DelayBuffer`: circular per-neuron voltage history
//!
//! This module is only available when the `std` feature is enabled.

pub mod delay_buffer;
pub mod dendrite_index;
pub mod neuron_array;
pub mod synapse_array;
pub mod type_table;

pub use delay_buffer::DelayBuffer;
pub use dendrite_index::DendriteIndex;
pub use neuron_array::NeuronArray;
pub use synapse_array::{SynapseArray, SynapseRecord};
pub use type_table::NeuronTypeTable;

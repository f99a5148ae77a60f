// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Storage abstraction traits for per-tick kernels
//!
//! Kernels only ever see slices. Implementations decide where the memory
//! lives (Vec today; pinned or device memory later).
//!
//! ## Design Philosophy
//!
//! - **Storage Abstraction**: Separate "what" from "how" (kernels vs storage)
//! - **Zero-Cost**: Traits compile to direct calls (no runtime overhead)
//! - **Split borrows**: Phases that read one array while writing another get
//!   a view struct instead of two conflicting `&mut self` calls

use lamina_npu_neural::SynapseParameters;

/// Borrowed neuron state for the integration phase
pub struct IntegrationView<'a> {
    /// Membrane voltages (updated in place)
    pub voltages: &'a mut [f64],
    /// Gating variables (updated in place)
    pub gating: &'a mut [f64],
    /// Total input current per neuron (external + synaptic)
    pub input_currents: &'a [f64],
    /// Type index per neuron
    pub neuron_types: &'a [u16],
}

/// Borrowed neuron state for the aggregation phase
pub struct AggregationView<'a> {
    /// Current accumulator (external current already injected)
    pub input_currents: &'a mut [f64],
    /// Membrane voltages at the start of the tick
    pub voltages: &'a [f64],
}

/// Borrowed synapse state for the conductance update phase
pub struct ConductanceView<'a> {
    /// Conductance per synapse (overwritten)
    pub conductances: &'a mut [f64],
    /// Presynaptic neuron per synapse
    pub presynaptic: &'a [u32],
    /// Delay in ticks per synapse
    pub delays: &'a [u32],
    /// Response-curve parameters per synapse
    pub parameters: &'a [SynapseParameters],
}

/// Neuron storage trait: structure-of-arrays for neuron state
pub trait NeuronStorage: Send + Sync {
    // === Neuron Properties (Read-Only) ===

    /// Membrane voltages slice
    fn voltages(&self) -> &[f64];

    /// Gating variables slice
    fn gating(&self) -> &[f64];

    /// Per-neuron input current accumulator
    fn input_currents(&self) -> &[f64];

    /// Per-neuron type index (into the neuron type table)
    fn neuron_types(&self) -> &[u16];

    // === Neuron Properties (Mutable) ===

    /// Mutable input current accumulator
    fn input_currents_mut(&mut self) -> &mut [f64];

    /// Disjoint borrows for the integration phase
    fn integration_view(&mut self) -> IntegrationView<'_>;

    /// Disjoint borrows for the aggregation phase
    fn aggregation_view(&mut self) -> AggregationView<'_>;

    // === Metadata ===

    /// Number of neurons stored
    fn count(&self) -> usize;
}

/// Synapse storage trait: structure-of-arrays for synapses, sorted by target
pub trait SynapseStorage: Send + Sync {
    // Read-only property accessors

    /// Presynaptic neuron per synapse
    fn presynaptic(&self) -> &[u32];

    /// Postsynaptic neuron per synapse (non-decreasing)
    fn postsynaptic(&self) -> &[u32];

    /// Delay in ticks per synapse
    fn delays(&self) -> &[u32];

    /// Response-curve parameters per synapse
    fn parameters(&self) -> &[SynapseParameters];

    /// Reversal potentials, contiguous for the aggregation phase
    fn reversals(&self) -> &[f64];

    /// Current conductance per synapse
    fn conductances(&self) -> &[f64];

    /// Row offsets of the dendrite index (length = neuron count + 1).
    ///
    /// Synapses `offsets[i]..offsets[i + 1]` target neuron `i`.
    fn dendrite_offsets(&self) -> &[u32];

    // Mutable property accessors

    /// Disjoint borrows for the conductance update phase
    fn conductance_view(&mut self) -> ConductanceView<'_>;

    // Metadata

    /// Number of synapses stored
    fn count(&self) -> usize;
}

// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! Standard synapse array implementation
//!
//! Structure-of-arrays sorted by postsynaptic neuron, with the dendrite
//! index built alongside so aggregation walks one contiguous block per
//! neuron.

use super::dendrite_index::DendriteIndex;
use crate::traits::{ConductanceView, Result, SynapseStorage};
use lamina_npu_neural::types::{LaminaError, NeuronId, SynapseEnd, SynapseId};
use lamina_npu_neural::SynapseParameters;

/// One synapse as handed to [`SynapseArray::from_sorted`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynapseRecord {
    pub presynaptic: u32,
    pub postsynaptic: u32,
    /// Delay in whole ticks
    pub delay_ticks: u32,
    pub params: SynapseParameters,
}

/// Immutable-topology synapse array for desktop/server environments
#[derive(Debug, Clone)]
pub struct SynapseArray {
    /// Number of synapses
    pub count: usize,

    /// Source neuron per synapse
    pub presynaptic: Vec<u32>,

    /// Target neuron per synapse (non-decreasing)
    pub postsynaptic: Vec<u32>,

    /// Delay in ticks per synapse
    pub delays: Vec<u32>,

    /// Response-curve parameters per synapse
    pub parameters: Vec<SynapseParameters>,

    /// Copy of each synapse's reversal potential, contiguous for aggregation
    pub reversals: Vec<f64>,

    /// Conductance per synapse (state, recomputed every tick)
    pub conductances: Vec<f64>,

    /// Target neuron → contiguous synapse block
    pub dendrites: DendriteIndex,
}

impl SynapseArray {
    /// Build from records already sorted by postsynaptic neuron.
    ///
    /// Conductances start at zero.
    pub fn from_sorted(num_neurons: usize, records: &[SynapseRecord]) -> Result<Self> {
        for (i, record) in records.iter().enumerate() {
            let synapse = SynapseId(i as u32);
            if record.presynaptic as usize >= num_neurons {
                return Err(LaminaError::NeuronOutOfRange {
                    synapse,
                    neuron: NeuronId(record.presynaptic),
                    end: SynapseEnd::Presynaptic,
                    num_neurons,
                });
            }
            record.params.validate(synapse)?;
        }

        let postsynaptic: Vec<u32> = records.iter().map(|r| r.postsynaptic).collect();
        let dendrites = DendriteIndex::from_sorted(&postsynaptic, num_neurons)?;

        let count = records.len();
        Ok(Self {
            count,
            presynaptic: records.iter().map(|r| r.presynaptic).collect(),
            postsynaptic,
            delays: records.iter().map(|r| r.delay_ticks).collect(),
            parameters: records.iter().map(|r| r.params).collect(),
            reversals: records.iter().map(|r| r.params.reversal).collect(),
            conductances: vec![0.0; count],
            dendrites,
        })
    }

    /// Longest delay present, in ticks (0 for an empty array)
    pub fn max_delay(&self) -> u32 {
        self.delays.iter().copied().max().unwrap_or(0)
    }
}

// Implement SynapseStorage trait for runtime abstraction
impl SynapseStorage for SynapseArray {
    // Read-only property accessors
    fn presynaptic(&self) -> &[u32] {
        &self.presynaptic[..self.count]
    }

    fn postsynaptic(&self) -> &[u32] {
        &self.postsynaptic[..self.count]
    }

    fn delays(&self) -> &[u32] {
        &self.delays[..self.count]
    }

    fn parameters(&self) -> &[SynapseParameters] {
        &self.parameters[..self.count]
    }

    fn reversals(&self) -> &[f64] {
        &self.reversals[..self.count]
    }

    fn conductances(&self) -> &[f64] {
        &self.conductances[..self.count]
    }

    fn dendrite_offsets(&self) -> &[u32] {
        self.dendrites.offsets()
    }

    // Mutable property accessors
    fn conductance_view(&mut self) -> ConductanceView<'_> {
        let count = self.count;
        ConductanceView {
            conductances: &mut self.conductances[..count],
            presynaptic: &self.presynaptic[..count],
            delays: &self.delays[..count],
            parameters: &self.parameters[..count],
        }
    }

    // Metadata
    fn count(&self) -> usize {
        self.count
    }
}

// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Network Construction
//!
//! Validates a network description and turns it into the storages the
//! engine runs on:
//!
//! 1. Neuron types → `NeuronTypeTable` (contiguous `neuron_start` ranges)
//! 2. Synapses → range/parameter/delay checks in caller order (including the
//!    delay buffer memory limit), then a stable sort by postsynaptic neuron
//!    and the dendrite index
//! 3. Initial (V, n) per neuron, defaulting to each type's resting state
//! 4. `DelayBuffer` with `max_delay_ticks + 1` slots, prefilled with the
//!    initial voltages
//!
//! Any failure rejects the whole network; nothing is partially built.

use lamina_npu_neural::types::{
    LaminaError, NeuronId, NeuronTypeId, Result, SynapseEnd, SynapseId,
};
use lamina_npu_neural::{
    delay_buffer_bytes, delay_to_ticks, MembraneState, MorrisLecarModel, MorrisLecarParameters,
    SynapseParameters, MAX_DELAY_BUFFER_BYTES,
};
use lamina_npu_runtime::{
    DelayBuffer, NeuronArray, NeuronStorage, NeuronTypeTable, SynapseArray, SynapseRecord,
    SynapseStorage,
};
use tracing::{debug, info};

/// One neuron type: `count` consecutive neurons sharing `params`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeuronTypeSpec {
    pub count: usize,
    pub params: MorrisLecarParameters,
}

/// One synapse as described by the caller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynapseSpec {
    pub presynaptic: u32,
    pub postsynaptic: u32,
    /// Delay in the same time units as `dt`
    pub delay: f64,
    pub params: SynapseParameters,
}

impl SynapseSpec {
    pub fn new(presynaptic: u32, postsynaptic: u32, delay: f64, params: SynapseParameters) -> Self {
        Self {
            presynaptic,
            postsynaptic,
            delay,
            params,
        }
    }
}

/// Validated, ready-to-run network state
#[derive(Debug, Clone)]
pub struct Network {
    pub(crate) types: NeuronTypeTable,
    pub(crate) neurons: NeuronArray,
    pub(crate) synapses: SynapseArray,
    pub(crate) history: DelayBuffer,
}

impl Network {
    pub fn types(&self) -> &NeuronTypeTable {
        &self.types
    }

    pub fn neurons(&self) -> &NeuronArray {
        &self.neurons
    }

    pub fn synapses(&self) -> &SynapseArray {
        &self.synapses
    }

    pub fn history(&self) -> &DelayBuffer {
        &self.history
    }

    pub fn num_neurons(&self) -> usize {
        self.neurons.count()
    }

    pub fn num_synapses(&self) -> usize {
        self.synapses.count()
    }
}

/// Builder for [`Network`]
///
/// ```rust
/// use lamina_npu_engine::{NetworkBuilder, SynapseSpec};
/// use lamina_npu_neural::{MorrisLecarModel, MorrisLecarParameters, SynapseParameters};
///
/// let network = NetworkBuilder::new()
///     .neuron_type(2, MorrisLecarParameters::default())
///     .synapse(SynapseSpec::new(0, 1, 2e-4, SynapseParameters::default()))
///     .build(&MorrisLecarModel::default(), 1e-4)
///     .unwrap();
/// assert_eq!(network.history().depth(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct NetworkBuilder {
    types: Vec<NeuronTypeSpec>,
    synapses: Vec<SynapseSpec>,
    initial_states: Option<Vec<MembraneState>>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a neuron type; its neurons follow the previous type's
    pub fn neuron_type(mut self, count: usize, params: MorrisLecarParameters) -> Self {
        self.types.push(NeuronTypeSpec { count, params });
        self
    }

    pub fn neuron_types(mut self, types: impl IntoIterator<Item = NeuronTypeSpec>) -> Self {
        self.types.extend(types);
        self
    }

    pub fn synapse(mut self, synapse: SynapseSpec) -> Self {
        self.synapses.push(synapse);
        self
    }

    pub fn synapses(mut self, synapses: impl IntoIterator<Item = SynapseSpec>) -> Self {
        self.synapses.extend(synapses);
        self
    }

    /// Explicit (V, n) for every neuron, in neuron index order
    pub fn initial_states(mut self, states: Vec<MembraneState>) -> Self {
        self.initial_states = Some(states);
        self
    }

    /// Same (V, n) for every neuron
    pub fn uniform_initial_state(mut self, state: MembraneState) -> Self {
        let count = self.types.iter().map(|t| t.count).sum();
        self.initial_states = Some(vec![state; count]);
        self
    }

    /// Validate everything and build the storages for timestep `dt`
    pub fn build(self, model: &MorrisLecarModel, dt: f64) -> Result<Network> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(LaminaError::InvalidTimestep(dt));
        }
        model.membrane().validate()?;

        let type_list: Vec<(usize, MorrisLecarParameters)> =
            self.types.iter().map(|t| (t.count, t.params)).collect();
        let types = NeuronTypeTable::new(&type_list)?;
        let num_neurons = types.num_neurons();

        let records = build_synapse_records(&self.synapses, num_neurons, dt)?;
        let synapses = SynapseArray::from_sorted(num_neurons, &records)?;

        let initial = match self.initial_states {
            Some(states) => states,
            None => resting_states(model, &types)?,
        };
        let neurons = NeuronArray::new(&types, &initial)?;

        let depth = synapses.max_delay() as usize + 1;
        let history = DelayBuffer::new(depth, neurons.voltages())?;

        info!(
            "[NETWORK] Built network: {} neurons in {} types, {} synapses, delay buffer depth {} ({:.1} KB)",
            num_neurons,
            types.num_types(),
            synapses.count(),
            depth,
            history.memory_bytes() as f64 / 1024.0
        );

        Ok(Network {
            types,
            neurons,
            synapses,
            history,
        })
    }
}

/// Check every synapse (errors name the caller's index), convert delays and
/// stable-sort by postsynaptic neuron
fn build_synapse_records(
    specs: &[SynapseSpec],
    num_neurons: usize,
    dt: f64,
) -> Result<Vec<SynapseRecord>> {
    if specs.len() > u32::MAX as usize {
        return Err(LaminaError::InvalidParameter(format!(
            "{} synapses exceed the u32 index space",
            specs.len()
        )));
    }

    let mut records = Vec::with_capacity(specs.len());
    for (i, spec) in specs.iter().enumerate() {
        let synapse = SynapseId(i as u32);
        for (neuron, end) in [
            (spec.presynaptic, SynapseEnd::Presynaptic),
            (spec.postsynaptic, SynapseEnd::Postsynaptic),
        ] {
            if neuron as usize >= num_neurons {
                return Err(LaminaError::NeuronOutOfRange {
                    synapse,
                    neuron: NeuronId(neuron),
                    end,
                    num_neurons,
                });
            }
        }
        spec.params.validate(synapse)?;

        let delay_ticks = delay_to_ticks(synapse, spec.delay, dt)?;
        let history_fits = delay_buffer_bytes(delay_ticks as u64 + 1, num_neurons)
            .map_or(false, |bytes| bytes <= MAX_DELAY_BUFFER_BYTES);
        if !history_fits {
            return Err(LaminaError::InvalidDelay {
                synapse,
                delay: spec.delay,
                reason: "delay buffer for this network would exceed the memory limit",
            });
        }

        records.push(SynapseRecord {
            presynaptic: spec.presynaptic,
            postsynaptic: spec.postsynaptic,
            delay_ticks,
            params: spec.params,
        });
    }

    // Stable: synapses sharing a target keep their caller order
    records.sort_by_key(|r| r.postsynaptic);
    Ok(records)
}

/// Every neuron at its type's zero-input equilibrium
fn resting_states(model: &MorrisLecarModel, types: &NeuronTypeTable) -> Result<Vec<MembraneState>> {
    let mut states = Vec::with_capacity(types.num_neurons());
    for (t, params) in types.all_params().iter().enumerate() {
        let rest = model.resting_state(params, 0.0)?;
        let range = types.range(NeuronTypeId(t as u16));
        debug!(
            "[NETWORK] Type {} rests at V={:.6} n={:.6} ({} neurons)",
            t,
            rest.v,
            rest.n,
            range.len()
        );
        states.extend(std::iter::repeat(rest).take(range.len()));
    }
    Ok(states)
}

// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Neuron type table
//!
//! Neurons of one type occupy a contiguous index range. The table stores
//! the `neuron_start` boundaries and each type's Morris–Lecar parameters;
//! both are immutable once built.

use core::ops::Range;
use lamina_npu_neural::types::{LaminaError, NeuronTypeId, Result};
use lamina_npu_neural::{ModelParameters, MorrisLecarParameters};

#[derive(Debug, Clone, PartialEq)]
pub struct NeuronTypeTable {
    params: Vec<MorrisLecarParameters>,
    /// Boundaries, length = type count + 1; type `t` owns `start[t]..start[t + 1]`
    neuron_start: Vec<u32>,
}

impl NeuronTypeTable {
    /// Build from `(neuron count, parameters)` per type, in index order
    pub fn new(types: &[(usize, MorrisLecarParameters)]) -> Result<Self> {
        if types.is_empty() {
            return Err(LaminaError::InvalidNeuronTypes(
                "at least one neuron type is required".to_string(),
            ));
        }
        if types.len() > u16::MAX as usize {
            return Err(LaminaError::InvalidNeuronTypes(format!(
                "{} neuron types exceed the supported maximum of {}",
                types.len(),
                u16::MAX
            )));
        }

        let mut neuron_start = Vec::with_capacity(types.len() + 1);
        let mut params = Vec::with_capacity(types.len());
        let mut total: u64 = 0;
        neuron_start.push(0u32);

        for (t, (count, p)) in types.iter().enumerate() {
            p.validate().map_err(|reason| {
                LaminaError::InvalidNeuronTypes(format!("{}: {}", NeuronTypeId(t as u16), reason))
            })?;
            total += *count as u64;
            if total > u32::MAX as u64 {
                return Err(LaminaError::InvalidNeuronTypes(format!(
                    "{} neurons exceed the u32 index space",
                    total
                )));
            }
            neuron_start.push(total as u32);
            params.push(*p);
        }

        if total == 0 {
            return Err(LaminaError::InvalidNeuronTypes(
                "network has no neurons".to_string(),
            ));
        }

        Ok(Self {
            params,
            neuron_start,
        })
    }

    pub fn num_types(&self) -> usize {
        self.params.len()
    }

    pub fn num_neurons(&self) -> usize {
        self.neuron_start[self.params.len()] as usize
    }

    /// First neuron index of each type (without the trailing total)
    pub fn neuron_start(&self) -> &[u32] {
        &self.neuron_start[..self.params.len()]
    }

    /// Neuron index range owned by `type_id`
    pub fn range(&self, type_id: NeuronTypeId) -> Range<usize> {
        let t = type_id.index();
        self.neuron_start[t] as usize..self.neuron_start[t + 1] as usize
    }

    pub fn params(&self, type_id: NeuronTypeId) -> &MorrisLecarParameters {
        &self.params[type_id.index()]
    }

    /// Parameters of every type, indexed by type
    pub fn all_params(&self) -> &[MorrisLecarParameters] {
        &self.params
    }

    /// Type of a neuron, or `None` when out of range
    pub fn type_of(&self, neuron: usize) -> Option<NeuronTypeId> {
        if neuron >= self.num_neurons() {
            return None;
        }
        // Last boundary <= neuron; empty types share a boundary with the next
        let upper = self.neuron_start.partition_point(|&start| start as usize <= neuron);
        Some(NeuronTypeId((upper - 1) as u16))
    }

    /// Per-neuron type index, expanded from the boundaries
    pub fn expand_per_neuron(&self) -> Vec<u16> {
        let mut out = Vec::with_capacity(self.num_neurons());
        for t in 0..self.num_types() {
            let range = self.range(NeuronTypeId(t as u16));
            out.extend(core::iter::repeat(t as u16).take(range.len()));
        }
        out
    }
}

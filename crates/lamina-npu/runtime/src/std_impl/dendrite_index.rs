// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Dendrite index: compressed-sparse-row grouping of synapses by target
//!
//! Synapses are stored sorted by postsynaptic neuron. A prefix sum over the
//! per-neuron dendrite counts gives, for every neuron, the contiguous block of
//! synapse indices that target it. Built once at construction time.

use core::ops::Range;
use lamina_npu_neural::types::{LaminaError, NeuronId, Result, SynapseEnd, SynapseId};

/// Row offsets for incoming synapses, one row per neuron
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DendriteIndex {
    /// `offsets[i]..offsets[i + 1]` are the synapses targeting neuron `i`
    offsets: Vec<u32>,
}

impl DendriteIndex {
    /// Build from postsynaptic indices that are already sorted
    ///
    /// # Errors
    /// - `UnsortedSynapses` if targets decrease anywhere
    /// - `NeuronOutOfRange` if a target is `>= num_neurons`
    /// - `DendritePartitionMismatch` if counts fail to cover every synapse
    pub fn from_sorted(postsynaptic: &[u32], num_neurons: usize) -> Result<Self> {
        if postsynaptic.len() > u32::MAX as usize {
            return Err(LaminaError::InvalidParameter(format!(
                "{} synapses exceed the u32 index space",
                postsynaptic.len()
            )));
        }

        if let Some(index) = postsynaptic.windows(2).position(|w| w[0] > w[1]) {
            return Err(LaminaError::UnsortedSynapses { index: index + 1 });
        }

        let mut counts = vec![0u32; num_neurons];
        for (i, &post) in postsynaptic.iter().enumerate() {
            match counts.get_mut(post as usize) {
                Some(count) => *count += 1,
                None => {
                    return Err(LaminaError::NeuronOutOfRange {
                        synapse: SynapseId(i as u32),
                        neuron: NeuronId(post),
                        end: SynapseEnd::Postsynaptic,
                        num_neurons,
                    })
                }
            }
        }

        let mut offsets = Vec::with_capacity(num_neurons + 1);
        offsets.push(0u32);
        let mut running = 0u32;
        for count in &counts {
            running += count;
            offsets.push(running);
        }

        if running as usize != postsynaptic.len() {
            return Err(LaminaError::DendritePartitionMismatch {
                expected: postsynaptic.len(),
                actual: running as usize,
            });
        }

        Ok(Self { offsets })
    }

    /// Synapse index range targeting `neuron`
    #[inline(always)]
    pub fn range(&self, neuron: usize) -> Range<usize> {
        self.offsets[neuron] as usize..self.offsets[neuron + 1] as usize
    }

    /// Number of incoming synapses of `neuron`
    #[inline]
    pub fn dendrite_count(&self, neuron: usize) -> u32 {
        self.offsets[neuron + 1] - self.offsets[neuron]
    }

    /// Dendrite count of every neuron
    pub fn dendrite_counts(&self) -> Vec<u32> {
        self.offsets.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Raw row offsets (length = neuron count + 1)
    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    pub fn num_neurons(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn num_synapses(&self) -> usize {
        self.offsets[self.offsets.len() - 1] as usize
    }
}

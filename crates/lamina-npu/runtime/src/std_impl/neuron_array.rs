// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! Standard neuron array implementation
//!
//! Uses `Vec` per property (structure-of-arrays) so every kernel streams
//! contiguous memory.

use super::type_table::NeuronTypeTable;
use crate::traits::{AggregationView, IntegrationView, NeuronStorage, Result};
use lamina_npu_neural::types::LaminaError;
use lamina_npu_neural::MembraneState;

/// Fixed-size neuron array for desktop/server environments
#[derive(Debug, Clone)]
pub struct NeuronArray {
    /// Number of neurons
    pub count: usize,

    /// Membrane voltages
    pub voltages: Vec<f64>,

    /// Potassium gating variables (not clamped)
    pub gating: Vec<f64>,

    /// Input current accumulator, rebuilt every tick
    pub input_currents: Vec<f64>,

    /// Type index per neuron
    pub neuron_types: Vec<u16>,
}

impl NeuronArray {
    /// Create the array from one initial state per neuron
    pub fn new(types: &NeuronTypeTable, initial: &[MembraneState]) -> Result<Self> {
        let count = types.num_neurons();
        if initial.len() != count {
            return Err(LaminaError::ArraySizeMismatch {
                what: "initial neuron states",
                expected: count,
                actual: initial.len(),
            });
        }
        if let Some(i) = initial.iter().position(|s| !s.v.is_finite() || !s.n.is_finite()) {
            return Err(LaminaError::InvalidParameter(format!(
                "initial state of neuron {} is not finite",
                i
            )));
        }

        Ok(Self {
            count,
            voltages: initial.iter().map(|s| s.v).collect(),
            gating: initial.iter().map(|s| s.n).collect(),
            input_currents: vec![0.0; count],
            neuron_types: types.expand_per_neuron(),
        })
    }

    /// State of a single neuron
    pub fn state(&self, neuron: usize) -> Option<MembraneState> {
        if neuron >= self.count {
            return None;
        }
        Some(MembraneState::new(self.voltages[neuron], self.gating[neuron]))
    }
}

impl NeuronStorage for NeuronArray {
    fn voltages(&self) -> &[f64] {
        &self.voltages[..self.count]
    }

    fn gating(&self) -> &[f64] {
        &self.gating[..self.count]
    }

    fn input_currents(&self) -> &[f64] {
        &self.input_currents[..self.count]
    }

    fn neuron_types(&self) -> &[u16] {
        &self.neuron_types[..self.count]
    }

    fn input_currents_mut(&mut self) -> &mut [f64] {
        let count = self.count;
        &mut self.input_currents[..count]
    }

    fn integration_view(&mut self) -> IntegrationView<'_> {
        let count = self.count;
        IntegrationView {
            voltages: &mut self.voltages[..count],
            gating: &mut self.gating[..count],
            input_currents: &self.input_currents[..count],
            neuron_types: &self.neuron_types[..count],
        }
    }

    fn aggregation_view(&mut self) -> AggregationView<'_> {
        let count = self.count;
        AggregationView {
            input_currents: &mut self.input_currents[..count],
            voltages: &self.voltages[..count],
        }
    }

    fn count(&self) -> usize {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lamina_npu_neural::MorrisLecarParameters;

    #[test]
    fn test_new_expands_types_and_state() {
        let types = NeuronTypeTable::new(&[
            (1, MorrisLecarParameters::default()),
            (2, MorrisLecarParameters::with_offset(0.2)),
        ])
        .unwrap();
        let initial = [
            MembraneState::new(-0.5, 0.1),
            MembraneState::new(-0.4, 0.2),
            MembraneState::new(-0.3, 0.3),
        ];
        let array = NeuronArray::new(&types, &initial).unwrap();

        assert_eq!(array.count(), 3);
        assert_eq!(array.voltages(), &[-0.5, -0.4, -0.3]);
        assert_eq!(array.gating(), &[0.1, 0.2, 0.3]);
        assert_eq!(array.neuron_types(), &[0, 1, 1]);
        assert_eq!(array.input_currents(), &[0.0, 0.0, 0.0]);
        assert_eq!(array.state(2), Some(MembraneState::new(-0.3, 0.3)));
        assert_eq!(array.state(3), None);
    }

    #[test]
    fn test_rejects_wrong_initial_length() {
        let types = NeuronTypeTable::new(&[(2, MorrisLecarParameters::default())]).unwrap();
        let err = NeuronArray::new(&types, &[MembraneState::new(-0.5, 0.1)]).unwrap_err();
        assert!(matches!(err, LaminaError::ArraySizeMismatch { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn test_integration_view_borrows_disjointly() {
        let types = NeuronTypeTable::new(&[(2, MorrisLecarParameters::default())]).unwrap();
        let mut array =
            NeuronArray::new(&types, &[MembraneState::new(0.0, 0.0); 2]).unwrap();
        array.input_currents_mut()[1] = 3.0;

        let view = array.integration_view();
        view.voltages[1] += view.input_currents[1];
        assert_eq!(array.voltages()[1], 3.0);
    }
}

// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! Graded synapse response curve
//!
//! Pure functions mapping a delayed presynaptic voltage to a conductance.

use crate::types::{LaminaError, Result, SynapseId};

/// Static response-curve parameters of one synapse
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct SynapseParameters {
    /// Presynaptic voltage at which the response starts
    pub threshold: f64,
    /// Response gain per volt beyond threshold (sign selects the active side)
    pub slope: f64,
    /// Conductance at full activation
    pub saturation: f64,
    /// Exponent applied to the clamped activation
    pub power: f64,
    /// Reversal potential of the synaptic current
    pub reversal: f64,
}

impl Default for SynapseParameters {
    fn default() -> Self {
        Self {
            threshold: -0.5,
            slope: -0.5,
            saturation: 0.1,
            power: 1.0,
            reversal: -0.4,
        }
    }
}

impl SynapseParameters {
    /// Reject parameters that make the response curve undefined
    pub fn validate(&self, synapse: SynapseId) -> Result<()> {
        let all = [
            self.threshold,
            self.slope,
            self.saturation,
            self.power,
            self.reversal,
        ];
        if all.iter().any(|x| !x.is_finite()) {
            return Err(LaminaError::InvalidParameter(format!(
                "{}: response parameters must be finite",
                synapse
            )));
        }
        if self.power <= 0.0 {
            return Err(LaminaError::InvalidParameter(format!(
                "{}: response exponent must be > 0, got {}",
                synapse, self.power
            )));
        }
        Ok(())
    }
}

/// Conductance produced by a delayed presynaptic voltage
///
/// ```text
/// a = clamp(slope × (V_delayed − threshold), 0, 1)
/// g = saturation × a^power
/// ```
///
/// # Example
/// ```
/// use lamina_npu_neural::synapse::{compute_conductance, SynapseParameters};
///
/// let params = SynapseParameters::default(); // threshold -0.5, slope -0.5
/// assert_eq!(compute_conductance(-0.4, &params), 0.0); // wrong side of threshold
/// assert!(compute_conductance(-0.7, &params) > 0.0);
/// ```
#[inline(always)]
pub fn compute_conductance(v_delayed: f64, params: &SynapseParameters) -> f64 {
    let activation = (params.slope * (v_delayed - params.threshold)).clamp(0.0, 1.0);
    params.saturation * activation.powf(params.power)
}

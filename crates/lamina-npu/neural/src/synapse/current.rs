// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Synaptic current calculation

/// Current delivered by one synapse into its postsynaptic neuron
///
/// `I = g × (E_rev − V_post)`
#[inline(always)]
pub fn synaptic_current(conductance: f64, reversal: f64, v_post: f64) -> f64 {
    conductance * (reversal - v_post)
}

/// Sum the currents of one neuron's dendrites, in slice order
///
/// `conductances` and `reversals` cover exactly the neuron's contiguous
/// block of incoming synapses. An empty block contributes zero.
#[inline]
pub fn dendritic_current(conductances: &[f64], reversals: &[f64], v_post: f64) -> f64 {
    debug_assert_eq!(conductances.len(), reversals.len());
    conductances
        .iter()
        .zip(reversals)
        .fold(0.0, |acc, (&g, &e)| acc + synaptic_current(g, e, v_post))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_vanishes_at_reversal() {
        assert_eq!(synaptic_current(0.3, -0.4, -0.4), 0.0);
    }

    #[test]
    fn test_current_sign_follows_reversal() {
        assert!(synaptic_current(0.1, -0.4, -0.6) > 0.0);
        assert!(synaptic_current(0.1, -0.4, -0.2) < 0.0);
    }

    #[test]
    fn test_empty_dendrite_block() {
        assert_eq!(dendritic_current(&[], &[], -0.5), 0.0);
    }

    #[test]
    fn test_dendritic_sum() {
        let g = [0.1, 0.2];
        let e = [0.0, -1.0];
        let v = -0.5;
        let expected = 0.1 * 0.5 + 0.2 * -0.5;
        assert!((dendritic_current(&g, &e, v) - expected).abs() < 1e-15);
    }
}

// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # External Current Injection (Phase 1)
//!
//! Maps the caller's per-channel input vector onto a contiguous range of
//! neurons: channel `c` drives neuron `first_neuron + c` with
//! `scale × input[c]`. Every other neuron's accumulator is reset to zero.

use lamina_npu_neural::types::{LaminaError, Result};
use std::ops::Range;

/// Linear mapping from input channels to neurons
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputMapping {
    channels: usize,
    first_neuron: usize,
    scale: f64,
}

impl InputMapping {
    /// Create a mapping, checking it fits inside `num_neurons`
    pub fn new(channels: usize, first_neuron: usize, scale: f64, num_neurons: usize) -> Result<Self> {
        if !scale.is_finite() {
            return Err(LaminaError::InvalidParameter(format!(
                "input scale must be finite, got {}",
                scale
            )));
        }
        let end = first_neuron.checked_add(channels);
        if end.map_or(true, |end| end > num_neurons) {
            return Err(LaminaError::InvalidParameter(format!(
                "{} input channels starting at neuron {} exceed neuron count {}",
                channels, first_neuron, num_neurons
            )));
        }
        Ok(Self {
            channels,
            first_neuron,
            scale,
        })
    }

    /// Mapping with no input channels
    pub fn none() -> Self {
        Self {
            channels: 0,
            first_neuron: 0,
            scale: 1.0,
        }
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Neuron indices driven by the channels
    pub fn neuron_range(&self) -> Range<usize> {
        self.first_neuron..self.first_neuron + self.channels
    }

    /// Reject an input vector of the wrong length
    pub fn check(&self, input: &[f64]) -> Result<()> {
        if input.len() != self.channels {
            return Err(LaminaError::ArraySizeMismatch {
                what: "external current",
                expected: self.channels,
                actual: input.len(),
            });
        }
        Ok(())
    }

    /// Overwrite the accumulator: mapped neurons get scaled input, the rest 0
    ///
    /// `input` must already have passed [`check`](Self::check).
    pub fn inject(&self, input: &[f64], currents: &mut [f64]) {
        debug_assert_eq!(input.len(), self.channels);
        currents.fill(0.0);
        for (current, &value) in currents[self.neuron_range()].iter_mut().zip(input) {
            *current = self.scale * value;
        }
    }
}

impl Default for InputMapping {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_overwrites_and_scales() {
        let mapping = InputMapping::new(2, 1, 0.5, 4).unwrap();
        let mut currents = [9.0; 4];
        mapping.inject(&[2.0, -4.0], &mut currents);
        assert_eq!(currents, [0.0, 1.0, -2.0, 0.0]);
    }

    #[test]
    fn test_check_rejects_wrong_length() {
        let mapping = InputMapping::new(2, 0, 1.0, 2).unwrap();
        assert!(mapping.check(&[0.0, 0.0]).is_ok());
        assert_eq!(
            mapping.check(&[0.0]),
            Err(LaminaError::ArraySizeMismatch {
                what: "external current",
                expected: 2,
                actual: 1,
            })
        );
    }

    #[test]
    fn test_mapping_must_fit() {
        assert!(InputMapping::new(3, 2, 1.0, 4).is_err());
        assert!(InputMapping::new(2, 2, 1.0, 4).is_ok());
        assert!(InputMapping::new(1, 0, f64::NAN, 4).is_err());
        assert!(InputMapping::new(usize::MAX, 1, 1.0, 4).is_err());
    }

    #[test]
    fn test_none_clears_accumulator() {
        let mut currents = [1.0, 2.0];
        InputMapping::none().inject(&[], &mut currents);
        assert_eq!(currents, [0.0, 0.0]);
    }
}

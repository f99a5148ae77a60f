// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Neuron model traits
//!
//! A model is a pure function of (state, input current, parameters). Storage
//! and scheduling live elsewhere, so the same model runs under any backend.

use crate::dynamics::MicroStepping;

/// Continuous-state neuron model integrated by fixed-step Euler
pub trait NeuronModel: Send + Sync {
    /// Per-type parameter set
    type Parameters: ModelParameters;

    /// Per-neuron state (membrane voltage plus any gating variables)
    type State: Copy;

    /// Human-readable model name for logging
    fn model_name(&self) -> &'static str;

    /// Time derivatives of every state variable, in model time units.
    ///
    /// `input_current` is everything delivered from outside the neuron
    /// (external injection plus synaptic current). Per-type baseline currents
    /// are the model's own business.
    fn derivatives(
        &self,
        state: Self::State,
        input_current: f64,
        params: &Self::Parameters,
    ) -> Self::State;

    /// Advance one outer tick through `stepping.steps` sequential micro-steps.
    ///
    /// `input_current` is held constant across the micro-steps of a tick.
    fn integrate(
        &self,
        state: Self::State,
        input_current: f64,
        params: &Self::Parameters,
        stepping: &MicroStepping,
    ) -> Self::State;
}

/// Model parameter validation
pub trait ModelParameters: Copy + Send + Sync {
    /// Reject parameter sets that make the closed forms undefined
    fn validate(&self) -> Result<(), &'static str>;
}

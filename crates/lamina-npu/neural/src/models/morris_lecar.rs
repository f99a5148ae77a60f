// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Morris–Lecar Neuron Model
//!
//! Two-state (V, n) conductance model with graded (non-spiking) output.
//!
//! ## Model Dynamics
//!
//! ```text
//! Steady states and gating time constant (per neuron type):
//!     m∞(V) = ½ · (1 + tanh((V − V1) / V2))
//!     n∞(V) = ½ · (1 + tanh((V − V3) / V4))
//!     τ(V)  = 1 / (Tphi · cosh((V − V3) / (2 · V4)))
//!
//! Ionic current (membrane constants shared by every type):
//!     I_ion = g_ca · m∞ · (V − e_ca) + g_k · n · (V − e_k) + g_leak · (V − e_leak)
//!
//! Derivatives:
//!     dn/dt = (n∞(V) − n) / τ(V)
//!     dV/dt = (I_input + offset − I_ion) / C
//! ```
//!
//! The system is stiff near threshold, so one outer tick is integrated as
//! several forward-Euler micro-steps (see [`MicroStepping`]).

use super::traits::{ModelParameters, NeuronModel};
use crate::dynamics::MicroStepping;
use crate::types::{LaminaError, Result};

/// Distance beyond the reversal potentials searched for a resting state
const RESTING_SEARCH_MARGIN: f64 = 10.0;

/// Bisection stops once the bracket is this narrow
const RESTING_TOLERANCE: f64 = 1e-14;

const RESTING_MAX_ITERATIONS: usize = 200;

/// Membrane constants shared by every neuron type
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(default))]
pub struct MembraneConstants {
    /// Membrane capacitance
    pub capacitance: f64,
    /// Maximal calcium conductance
    pub g_ca: f64,
    /// Calcium reversal potential
    pub e_ca: f64,
    /// Maximal potassium conductance
    pub g_k: f64,
    /// Potassium reversal potential
    pub e_k: f64,
    /// Leak conductance
    pub g_leak: f64,
    /// Leak reversal potential
    pub e_leak: f64,
}

impl Default for MembraneConstants {
    fn default() -> Self {
        // Dimensionless Morris–Lecar constants
        Self {
            capacitance: 1.0,
            g_ca: 1.0,
            e_ca: 1.0,
            g_k: 2.0,
            e_k: -0.7,
            g_leak: 0.5,
            e_leak: -0.5,
        }
    }
}

impl MembraneConstants {
    /// Reject constants that make the voltage update undefined
    pub fn validate(&self) -> Result<()> {
        let all = [
            self.capacitance,
            self.g_ca,
            self.e_ca,
            self.g_k,
            self.e_k,
            self.g_leak,
            self.e_leak,
        ];
        if all.iter().any(|x| !x.is_finite()) {
            return Err(LaminaError::InvalidParameter(
                "membrane constants must be finite".to_string(),
            ));
        }
        if self.capacitance <= 0.0 {
            return Err(LaminaError::InvalidParameter(format!(
                "membrane capacitance must be > 0, got {}",
                self.capacitance
            )));
        }
        Ok(())
    }
}

/// Per-type Morris–Lecar parameters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct MorrisLecarParameters {
    /// Half-activation voltage of m∞
    pub v1: f64,
    /// Slope factor of m∞
    pub v2: f64,
    /// Half-activation voltage of n∞
    pub v3: f64,
    /// Slope factor of n∞
    pub v4: f64,
    /// Gating rate scale
    pub tphi: f64,
    /// Baseline current added to every neuron of this type
    pub offset: f64,
}

impl Default for MorrisLecarParameters {
    fn default() -> Self {
        Self {
            v1: 0.13,
            v2: 0.15,
            v3: -0.25,
            v4: 0.15,
            tphi: 0.2,
            offset: 0.0,
        }
    }
}

impl MorrisLecarParameters {
    /// Default shape constants with a custom baseline current
    pub fn with_offset(offset: f64) -> Self {
        Self {
            offset,
            ..Self::default()
        }
    }

    #[inline(always)]
    pub fn m_inf(&self, v: f64) -> f64 {
        0.5 * (1.0 + ((v - self.v1) / self.v2).tanh())
    }

    #[inline(always)]
    pub fn n_inf(&self, v: f64) -> f64 {
        0.5 * (1.0 + ((v - self.v3) / self.v4).tanh())
    }

    /// Gating rate 1/τ(V)
    #[inline(always)]
    pub fn n_rate(&self, v: f64) -> f64 {
        self.tphi * ((v - self.v3) / (2.0 * self.v4)).cosh()
    }

    #[inline(always)]
    pub fn tau_n(&self, v: f64) -> f64 {
        1.0 / self.n_rate(v)
    }
}

impl ModelParameters for MorrisLecarParameters {
    fn validate(&self) -> core::result::Result<(), &'static str> {
        let all = [self.v1, self.v2, self.v3, self.v4, self.tphi, self.offset];
        if all.iter().any(|x| !x.is_finite()) {
            return Err("Morris-Lecar: parameters must be finite");
        }
        if self.v2 == 0.0 {
            return Err("Morris-Lecar: V2 must be non-zero");
        }
        if self.v4 == 0.0 {
            return Err("Morris-Lecar: V4 must be non-zero");
        }
        if self.tphi <= 0.0 {
            return Err("Morris-Lecar: Tphi must be > 0");
        }
        Ok(())
    }
}

/// Membrane voltage and potassium gating variable of one neuron
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MembraneState {
    pub v: f64,
    pub n: f64,
}

impl MembraneState {
    pub fn new(v: f64, n: f64) -> Self {
        Self { v, n }
    }
}

/// Morris–Lecar model bound to a set of membrane constants
#[derive(Debug, Clone, Copy, Default)]
pub struct MorrisLecarModel {
    membrane: MembraneConstants,
}

impl MorrisLecarModel {
    pub fn new(membrane: MembraneConstants) -> Self {
        Self { membrane }
    }

    pub fn membrane(&self) -> &MembraneConstants {
        &self.membrane
    }

    /// Total ionic current flowing out of the membrane at (V, n)
    #[inline(always)]
    pub fn ionic_current(&self, v: f64, n: f64, params: &MorrisLecarParameters) -> f64 {
        let m = &self.membrane;
        m.g_ca * params.m_inf(v) * (v - m.e_ca) + m.g_k * n * (v - m.e_k) + m.g_leak * (v - m.e_leak)
    }

    /// Find the equilibrium (V*, n∞(V*)) for a constant external current.
    ///
    /// Solves `external_current + offset = I_ion(V, n∞(V))` by bisection.
    /// When several equilibria exist, one of them is returned.
    pub fn resting_state(
        &self,
        params: &MorrisLecarParameters,
        external_current: f64,
    ) -> Result<MembraneState> {
        let m = &self.membrane;
        let mut low = m.e_ca.min(m.e_k).min(m.e_leak) - RESTING_SEARCH_MARGIN;
        let mut high = m.e_ca.max(m.e_k).max(m.e_leak) + RESTING_SEARCH_MARGIN;
        let (search_low, search_high) = (low, high);

        let net = |v: f64| external_current + params.offset - self.ionic_current(v, params.n_inf(v), params);

        let mut f_low = net(low);
        let f_high = net(high);
        if !f_low.is_finite() || !f_high.is_finite() || f_low.signum() == f_high.signum() {
            return Err(LaminaError::NoRestingState {
                low: search_low,
                high: search_high,
            });
        }

        for _ in 0..RESTING_MAX_ITERATIONS {
            if high - low <= RESTING_TOLERANCE {
                break;
            }
            let mid = 0.5 * (low + high);
            let f_mid = net(mid);
            if f_mid == 0.0 {
                low = mid;
                high = mid;
                break;
            }
            if f_mid.signum() == f_low.signum() {
                low = mid;
                f_low = f_mid;
            } else {
                high = mid;
            }
        }

        let v = 0.5 * (low + high);
        Ok(MembraneState::new(v, params.n_inf(v)))
    }
}

impl NeuronModel for MorrisLecarModel {
    type Parameters = MorrisLecarParameters;
    type State = MembraneState;

    fn model_name(&self) -> &'static str {
        "Morris-Lecar"
    }

    #[inline(always)]
    fn derivatives(
        &self,
        state: MembraneState,
        input_current: f64,
        params: &MorrisLecarParameters,
    ) -> MembraneState {
        let dn = params.n_rate(state.v) * (params.n_inf(state.v) - state.n);
        let dv = (input_current + params.offset - self.ionic_current(state.v, state.n, params))
            / self.membrane.capacitance;
        MembraneState::new(dv, dn)
    }

    #[inline]
    fn integrate(
        &self,
        mut state: MembraneState,
        input_current: f64,
        params: &MorrisLecarParameters,
        stepping: &MicroStepping,
    ) -> MembraneState {
        let h = stepping.model_dt();
        for _ in 0..stepping.steps() {
            let d = self.derivatives(state, input_current, params);
            state.v += h * d.v;
            state.n += h * d.n;
        }
        state
    }
}

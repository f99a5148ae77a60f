// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Tick subdivision and numerical health checks
//!
//! Pure functions shared by every backend.

use crate::types::{LaminaError, Result};

/// Default micro-step target (in the same time unit as `dt`)
pub const DEFAULT_MICRO_STEP_TARGET: f64 = 1e-5;

/// Default conversion from `dt` units (seconds) to model time units (milliseconds)
pub const DEFAULT_TIME_SCALE: f64 = 1000.0;

/// Default absolute voltage bound beyond which a neuron counts as diverged
pub const DEFAULT_DIVERGENCE_BOUND: f64 = 5.0;

/// Fixed subdivision of one outer tick into Euler micro-steps.
///
/// Computed once from `dt`; never changes while a simulation runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MicroStepping {
    steps: u32,
    micro_dt: f64,
    model_dt: f64,
}

impl MicroStepping {
    /// `steps = max(1, round(dt / target))`, `micro_dt = dt / steps`.
    ///
    /// `time_scale` converts `micro_dt` into the model's time unit.
    pub fn new(dt: f64, target: f64, time_scale: f64) -> Result<Self> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(LaminaError::InvalidTimestep(dt));
        }
        if !target.is_finite() || target <= 0.0 {
            return Err(LaminaError::InvalidParameter(format!(
                "micro-step target must be finite and > 0, got {}",
                target
            )));
        }
        if !time_scale.is_finite() || time_scale <= 0.0 {
            return Err(LaminaError::InvalidParameter(format!(
                "time scale must be finite and > 0, got {}",
                time_scale
            )));
        }

        let ratio = (dt / target).round();
        if ratio >= u32::MAX as f64 {
            return Err(LaminaError::InvalidParameter(format!(
                "dt / micro-step target = {} micro-steps per tick is too many",
                ratio
            )));
        }
        let steps = (ratio as u32).max(1);

        let micro_dt = dt / steps as f64;
        Ok(Self {
            steps,
            micro_dt,
            model_dt: micro_dt * time_scale,
        })
    }

    /// Number of micro-steps per tick
    #[inline]
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Micro-step size in `dt` units
    #[inline]
    pub fn micro_dt(&self) -> f64 {
        self.micro_dt
    }

    /// Micro-step size in model time units (the Euler step actually applied)
    #[inline]
    pub fn model_dt(&self) -> f64 {
        self.model_dt
    }
}

/// True when a voltage is non-finite or outside `[-bound, bound]`
#[inline(always)]
pub fn is_diverged(voltage: f64, bound: f64) -> bool {
    !voltage.is_finite() || voltage.abs() > bound
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tick_uses_ten_micro_steps() {
        let stepping = MicroStepping::new(1e-4, DEFAULT_MICRO_STEP_TARGET, DEFAULT_TIME_SCALE).unwrap();
        assert_eq!(stepping.steps(), 10);
        assert!((stepping.micro_dt() - 1e-5).abs() < 1e-18);
        assert!((stepping.model_dt() - 1e-2).abs() < 1e-15);
    }

    #[test]
    fn test_small_dt_still_takes_one_step() {
        let stepping = MicroStepping::new(2e-6, 1e-5, 1.0).unwrap();
        assert_eq!(stepping.steps(), 1);
        assert_eq!(stepping.micro_dt(), 2e-6);
    }

    #[test]
    fn test_rejects_non_positive_dt() {
        assert_eq!(
            MicroStepping::new(0.0, 1e-5, 1.0),
            Err(LaminaError::InvalidTimestep(0.0))
        );
        assert!(MicroStepping::new(-1e-4, 1e-5, 1.0).is_err());
        assert!(MicroStepping::new(f64::NAN, 1e-5, 1.0).is_err());
    }

    #[test]
    fn test_rejects_bad_target_and_scale() {
        assert!(MicroStepping::new(1e-4, 0.0, 1.0).is_err());
        assert!(MicroStepping::new(1e-4, 1e-5, 0.0).is_err());
        assert!(MicroStepping::new(1e-4, 1e-5, f64::INFINITY).is_err());
    }

    #[test]
    fn test_divergence_check() {
        assert!(!is_diverged(-0.5, 5.0));
        assert!(is_diverged(-5.5, 5.0));
        assert!(is_diverged(f64::NAN, 5.0));
        assert!(is_diverged(f64::INFINITY, 5.0));
    }
}

// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Compute Backend Abstraction
//!
//! Provides a unified interface for executing the per-tick kernels. The
//! simulation orchestrator owns phase ordering; a backend only decides how
//! each phase's data-parallel work is executed.

mod cpu;

pub use cpu::{CPUBackend, DEFAULT_PARALLEL_THRESHOLD};

use lamina_npu_neural::types::*;
use lamina_npu_neural::{MicroStepping, MorrisLecarModel, MorrisLecarParameters};
use lamina_npu_runtime::{DelayBuffer, NeuronStorage, SynapseStorage};

/// Detailed timing breakdown for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickTiming {
    /// Time spent on injection + synaptic input aggregation (μs)
    pub aggregation_us: f64,

    /// Time spent integrating membrane state (μs)
    pub integration_us: f64,

    /// Time spent recording voltages and updating conductances (μs)
    pub conductance_us: f64,

    /// Total tick time (μs)
    pub total_us: f64,
}

/// Compute backend trait
///
/// Generic over:
/// - `N: NeuronStorage` - Neuron storage implementation
/// - `S: SynapseStorage` - Synapse storage implementation
///
/// Each method runs exactly one phase over its whole index space and
/// returns only once the phase is complete; the caller relies on that as
/// the barrier between phases.
pub trait ComputeBackend<N: NeuronStorage, S: SynapseStorage>: Send + Sync {
    /// Get backend type name for logging/debugging
    fn backend_name(&self) -> &str;

    /// Add each neuron's synaptic current to its (already injected) input
    /// current, using the synapses' current conductances and the neurons'
    /// current voltages.
    fn aggregate_input(&mut self, neurons: &mut N, synapses: &S) -> Result<()>;

    /// Advance (V, n) of every neuron by one tick
    fn integrate(
        &mut self,
        neurons: &mut N,
        model: &MorrisLecarModel,
        type_params: &[MorrisLecarParameters],
        stepping: &MicroStepping,
    ) -> Result<()>;

    /// Recompute every conductance from the delay buffer as it stands after
    /// this tick's write
    fn update_conductances(&mut self, synapses: &mut S, history: &DelayBuffer) -> Result<()>;

    /// Initialize/upload persistent data to backend
    ///
    /// For CPU backends, this is a no-op.
    fn initialize_persistent_data(&mut self, _neurons: &N, _synapses: &S) -> Result<()> {
        Ok(())
    }
}

/// Backend type enum for construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendType {
    /// CPU, rayon data parallelism above the parallel threshold
    #[default]
    CPU,

    /// CPU, single thread
    CPUSerial,
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendType::CPU => write!(f, "cpu"),
            BackendType::CPUSerial => write!(f, "cpu-serial"),
        }
    }
}

impl std::str::FromStr for BackendType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "cpu" => Ok(BackendType::CPU),
            "cpu-serial" | "serial" => Ok(BackendType::CPUSerial),
            _ => Err(Error::InvalidParameter(format!("unknown backend '{}'", s))),
        }
    }
}

/// Create a backend from configuration
///
/// `num_threads == 0` uses rayon's global pool.
pub fn create_backend(
    backend_type: BackendType,
    num_threads: usize,
    parallel_threshold: usize,
) -> Result<CPUBackend> {
    let backend = match backend_type {
        BackendType::CPU if num_threads > 0 => CPUBackend::with_threads(num_threads)?,
        BackendType::CPU => CPUBackend::new(),
        BackendType::CPUSerial => CPUBackend::serial(),
    };
    Ok(backend.with_parallel_threshold(parallel_threshold))
}

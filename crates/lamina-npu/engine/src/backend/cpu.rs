// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # CPU Backend
//!
//! Wraps the kernel modules (`input_aggregation`, `neural_dynamics`,
//! `synapse_update`) and picks serial or rayon execution per phase based on
//! the size of the index space.

use super::ComputeBackend;
use crate::{input_aggregation, neural_dynamics, synapse_update};
use lamina_npu_neural::types::*;
use lamina_npu_neural::{MicroStepping, MorrisLecarModel, MorrisLecarParameters};
use lamina_npu_runtime::{DelayBuffer, NeuronStorage, SynapseStorage};

/// Element count below which a phase stays on the calling thread
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4096;

/// CPU backend
pub struct CPUBackend {
    /// Backend name for logging
    name: String,

    /// Whether phases may fan out across threads at all
    parallel: bool,

    /// Minimum index-space size for a phase to fan out
    parallel_threshold: usize,

    /// Dedicated pool; `None` uses rayon's global pool
    pool: Option<rayon::ThreadPool>,
}

impl CPUBackend {
    /// Create a CPU backend using rayon's global pool
    pub fn new() -> Self {
        Self {
            name: "CPU (rayon)".to_string(),
            parallel: true,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            pool: None,
        }
    }

    /// Create a CPU backend with a dedicated pool of `num_threads` workers
    pub fn with_threads(num_threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("lamina-npu-{}", i))
            .build()
            .map_err(|e| Error::InvalidParameter(format!("failed to build thread pool: {}", e)))?;
        Ok(Self {
            name: format!("CPU (rayon, {} threads)", num_threads),
            pool: Some(pool),
            ..Self::new()
        })
    }

    /// Create a single-threaded CPU backend
    ///
    /// Produces bit-identical results to the parallel backend.
    pub fn serial() -> Self {
        Self {
            name: "CPU (serial)".to_string(),
            parallel: false,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            pool: None,
        }
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    pub fn parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    #[inline]
    fn fan_out(&self, len: usize) -> bool {
        self.parallel && len >= self.parallel_threshold
    }

    /// Run `op` inside the dedicated pool, if any
    fn run<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

impl Default for CPUBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: NeuronStorage, S: SynapseStorage> ComputeBackend<N, S> for CPUBackend {
    fn backend_name(&self) -> &str {
        &self.name
    }

    fn aggregate_input(&mut self, neurons: &mut N, synapses: &S) -> Result<()> {
        let parallel = self.fan_out(neurons.count().max(synapses.count()));
        let view = neurons.aggregation_view();
        self.run(|| {
            input_aggregation::aggregate_synaptic_input(
                view,
                synapses.dendrite_offsets(),
                synapses.conductances(),
                synapses.reversals(),
                parallel,
            )
        });
        Ok(())
    }

    fn integrate(
        &mut self,
        neurons: &mut N,
        model: &MorrisLecarModel,
        type_params: &[MorrisLecarParameters],
        stepping: &MicroStepping,
    ) -> Result<()> {
        let parallel = self.fan_out(neurons.count());
        let view = neurons.integration_view();
        self.run(|| {
            neural_dynamics::integrate_neurons(view, model, type_params, stepping, parallel)
        });
        Ok(())
    }

    fn update_conductances(&mut self, synapses: &mut S, history: &DelayBuffer) -> Result<()> {
        let parallel = self.fan_out(synapses.count());
        let view = synapses.conductance_view();
        self.run(|| synapse_update::update_conductances(view, history, parallel));
        Ok(())
    }
}

// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Simulation Step
//!
//! Owns all mutable network state and runs one tick per [`Simulation::step`]:
//!
//! ```text
//! 1. Inject      external current → per-neuron accumulator (overwrite)
//! 2. Aggregate   += Σ g × (E − V) over each neuron's dendrites
//! 3. Integrate   micro-stepped Morris–Lecar (V, n) update
//! 4. Record      DelayBuffer.write(V)
//! 5. Update      conductances from delayed presynaptic V
//! 6. Emit        V is returned to the caller
//! 7. Advance     DelayBuffer.advance()
//! ```
//!
//! Ticks are strictly sequential. Within a tick each phase is handed to the
//! compute backend, which returns only when the phase is complete.

use crate::backend::{create_backend, BackendType, CPUBackend, ComputeBackend, TickTiming};
use crate::injection::InputMapping;
use crate::network::{Network, NetworkBuilder};
use lamina_config::LaminaConfig;
use lamina_npu_neural::types::{LaminaError, NeuronId, NeuronTypeId, Result};
use lamina_npu_neural::{
    is_diverged, MembraneConstants, MicroStepping, MorrisLecarModel, DEFAULT_DIVERGENCE_BOUND,
    DEFAULT_MICRO_STEP_TARGET, DEFAULT_TIME_SCALE,
};
use lamina_npu_runtime::{NeuronArray, NeuronStorage, SynapseArray, SynapseStorage};
use std::time::Instant;
use tracing::{debug, info, trace, warn};

/// Everything needed to turn a network description into a simulation
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSettings {
    /// Outer tick size
    pub dt: f64,
    pub micro_step_target: f64,
    /// Model time units per unit of `dt`
    pub time_scale: f64,
    /// |V| above this (or non-finite V) is reported as divergence
    pub divergence_bound: f64,
    pub membrane: MembraneConstants,
    pub input_channels: usize,
    pub input_first_neuron: usize,
    pub input_scale: f64,
    pub backend: BackendType,
    /// 0 = rayon's global pool
    pub num_threads: usize,
    pub parallel_threshold: usize,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            dt: 1e-4,
            micro_step_target: DEFAULT_MICRO_STEP_TARGET,
            time_scale: DEFAULT_TIME_SCALE,
            divergence_bound: DEFAULT_DIVERGENCE_BOUND,
            membrane: MembraneConstants::default(),
            input_channels: 0,
            input_first_neuron: 0,
            input_scale: 1.0,
            backend: BackendType::CPU,
            num_threads: 0,
            parallel_threshold: crate::backend::DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl SimulationSettings {
    /// Convert a loaded configuration
    ///
    /// Value ranges are checked again when the simulation is built.
    pub fn from_config(config: &LaminaConfig) -> Result<Self> {
        let m = &config.membrane;
        Ok(Self {
            dt: config.simulation.dt,
            micro_step_target: config.simulation.micro_step_target,
            time_scale: config.simulation.time_scale,
            divergence_bound: config.simulation.divergence_bound,
            membrane: MembraneConstants {
                capacitance: m.capacitance,
                g_ca: m.g_ca,
                e_ca: m.e_ca,
                g_k: m.g_k,
                e_k: m.e_k,
                g_leak: m.g_leak,
                e_leak: m.e_leak,
            },
            input_channels: config.input.channels,
            input_first_neuron: config.input.first_neuron,
            input_scale: config.input.scale,
            backend: config.engine.backend.parse()?,
            num_threads: config.engine.num_threads,
            parallel_threshold: config.engine.parallel_threshold,
        })
    }

    pub fn with_input(mut self, channels: usize, first_neuron: usize, scale: f64) -> Self {
        self.input_channels = channels;
        self.input_first_neuron = first_neuron;
        self.input_scale = scale;
        self
    }

    pub fn model(&self) -> MorrisLecarModel {
        MorrisLecarModel::new(self.membrane)
    }

    pub fn stepping(&self) -> Result<MicroStepping> {
        MicroStepping::new(self.dt, self.micro_step_target, self.time_scale)
    }

    pub fn create_backend(&self) -> Result<CPUBackend> {
        create_backend(self.backend, self.num_threads, self.parallel_threshold)
    }
}

/// Numerical health of one tick, computed right after integration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickDiagnostics {
    /// Tick index (0-based) these diagnostics belong to
    pub tick: u64,
    /// Neurons whose V is non-finite or beyond the divergence bound
    pub diverged_neurons: usize,
    pub first_diverged: Option<NeuronId>,
    /// Smallest finite V
    pub min_voltage: f64,
    /// Largest finite V
    pub max_voltage: f64,
}

impl TickDiagnostics {
    pub fn is_diverged(&self) -> bool {
        self.diverged_neurons > 0
    }

    fn compute(tick: u64, voltages: &[f64], bound: f64) -> Self {
        let mut diagnostics = Self {
            tick,
            diverged_neurons: 0,
            first_diverged: None,
            min_voltage: f64::INFINITY,
            max_voltage: f64::NEG_INFINITY,
        };
        for (i, &v) in voltages.iter().enumerate() {
            if is_diverged(v, bound) {
                diagnostics.diverged_neurons += 1;
                diagnostics.first_diverged.get_or_insert(NeuronId(i as u32));
            }
            if v.is_finite() {
                diagnostics.min_voltage = diagnostics.min_voltage.min(v);
                diagnostics.max_voltage = diagnostics.max_voltage.max(v);
            }
        }
        diagnostics
    }
}

/// Cumulative engine statistics
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EngineStats {
    pub total_ticks: u64,
    pub diverged_ticks: u64,
    pub total_aggregation_us: f64,
    pub total_integration_us: f64,
    pub total_conductance_us: f64,
    pub total_processing_time_us: f64,
}

impl EngineStats {
    /// Get average processing time per tick (microseconds)
    pub fn avg_tick_time_us(&self) -> f64 {
        self.per_tick(self.total_processing_time_us)
    }

    pub fn avg_aggregation_us(&self) -> f64 {
        self.per_tick(self.total_aggregation_us)
    }

    pub fn avg_integration_us(&self) -> f64 {
        self.per_tick(self.total_integration_us)
    }

    pub fn avg_conductance_us(&self) -> f64 {
        self.per_tick(self.total_conductance_us)
    }

    fn per_tick(&self, total: f64) -> f64 {
        if self.total_ticks == 0 {
            0.0
        } else {
            total / self.total_ticks as f64
        }
    }

    fn record(&mut self, timing: &TickTiming, diverged: bool) {
        self.total_ticks += 1;
        if diverged {
            self.diverged_ticks += 1;
        }
        self.total_aggregation_us += timing.aggregation_us;
        self.total_integration_us += timing.integration_us;
        self.total_conductance_us += timing.conductance_us;
        self.total_processing_time_us += timing.total_us;
    }
}

/// A running network
pub struct Simulation<B = CPUBackend>
where
    B: ComputeBackend<NeuronArray, SynapseArray>,
{
    network: Network,
    model: MorrisLecarModel,
    stepping: MicroStepping,
    input: InputMapping,
    divergence_bound: f64,
    backend: B,
    tick: u64,
    last_diagnostics: Option<TickDiagnostics>,
    last_timing: TickTiming,
    stats: EngineStats,
}

impl Simulation<CPUBackend> {
    /// Build with the backend described by `settings`
    pub fn with_settings(builder: NetworkBuilder, settings: &SimulationSettings) -> Result<Self> {
        let backend = settings.create_backend()?;
        Self::new(builder, settings, backend)
    }
}

impl<B> Simulation<B>
where
    B: ComputeBackend<NeuronArray, SynapseArray>,
{
    /// Validate and build the network, then wire it to `backend`
    pub fn new(builder: NetworkBuilder, settings: &SimulationSettings, mut backend: B) -> Result<Self> {
        let stepping = settings.stepping()?;
        if !settings.divergence_bound.is_finite() || settings.divergence_bound <= 0.0 {
            return Err(LaminaError::InvalidParameter(format!(
                "divergence bound must be finite and > 0, got {}",
                settings.divergence_bound
            )));
        }

        let model = settings.model();
        let network = builder.build(&model, settings.dt)?;
        let input = InputMapping::new(
            settings.input_channels,
            settings.input_first_neuron,
            settings.input_scale,
            network.num_neurons(),
        )?;
        backend.initialize_persistent_data(&network.neurons, &network.synapses)?;

        info!(
            "[TICK-ENGINE] Simulation ready: {} neurons, {} synapses, dt={}, {} micro-steps/tick (model δ={}), {} input channels, backend={}",
            network.num_neurons(),
            network.num_synapses(),
            settings.dt,
            stepping.steps(),
            stepping.model_dt(),
            input.channels(),
            backend.backend_name()
        );

        Ok(Self {
            network,
            model,
            stepping,
            input,
            divergence_bound: settings.divergence_bound,
            backend,
            tick: 0,
            last_diagnostics: None,
            last_timing: TickTiming::default(),
            stats: EngineStats::default(),
        })
    }

    /// Advance one tick and return the new voltage of every neuron
    ///
    /// # Errors
    /// `ArraySizeMismatch` when `external_current` does not have one value
    /// per input channel. No state is touched in that case.
    pub fn step(&mut self, external_current: &[f64]) -> Result<&[f64]> {
        self.input.check(external_current)?;
        let tick_start = Instant::now();

        // Phase 1 + 2: inject, then aggregate synaptic input on top
        self.input
            .inject(external_current, self.network.neurons.input_currents_mut());
        self.backend
            .aggregate_input(&mut self.network.neurons, &self.network.synapses)?;
        let aggregation_done = Instant::now();

        // Phase 3: integrate
        self.backend.integrate(
            &mut self.network.neurons,
            &self.model,
            self.network.types.all_params(),
            &self.stepping,
        )?;
        let integration_done = Instant::now();

        let diagnostics =
            TickDiagnostics::compute(self.tick, self.network.neurons.voltages(), self.divergence_bound);
        self.report_divergence(&diagnostics);

        // Phase 4 + 5: record, then conductances read the post-write buffer
        self.network.history.write(self.network.neurons.voltages())?;
        self.backend
            .update_conductances(&mut self.network.synapses, &self.network.history)?;
        let conductance_done = Instant::now();

        // Phase 7: advance (reads are relative to the latest write, so the
        // emitted voltages below are unaffected)
        self.network.history.advance();

        let timing = TickTiming {
            aggregation_us: (aggregation_done - tick_start).as_secs_f64() * 1e6,
            integration_us: (integration_done - aggregation_done).as_secs_f64() * 1e6,
            conductance_us: (conductance_done - integration_done).as_secs_f64() * 1e6,
            total_us: tick_start.elapsed().as_secs_f64() * 1e6,
        };
        self.stats.record(&timing, diagnostics.is_diverged());
        self.last_timing = timing;
        self.last_diagnostics = Some(diagnostics);

        trace!(
            "[TICK-ENGINE] Tick {} done in {:.1}µs (V in [{:.4}, {:.4}])",
            self.tick,
            timing.total_us,
            diagnostics.min_voltage,
            diagnostics.max_voltage
        );
        self.tick += 1;

        // Phase 6: emit
        Ok(self.network.neurons.voltages())
    }

    /// Run `ticks` ticks, asking `input` for each tick's external current
    ///
    /// Returns the voltage vector of every tick.
    pub fn run<F>(&mut self, ticks: usize, mut input: F) -> Result<Vec<Vec<f64>>>
    where
        F: FnMut(u64) -> Vec<f64>,
    {
        let mut outputs = Vec::with_capacity(ticks);
        for _ in 0..ticks {
            let current = input(self.tick);
            outputs.push(self.step(&current)?.to_vec());
        }
        debug!(
            "[TICK-ENGINE] Ran {} ticks, avg {:.1}µs/tick",
            ticks,
            self.stats.avg_tick_time_us()
        );
        Ok(outputs)
    }

    fn report_divergence(&self, diagnostics: &TickDiagnostics) {
        if !diagnostics.is_diverged() {
            return;
        }
        let first = diagnostics
            .first_diverged
            .map(|id| id.to_string())
            .unwrap_or_default();
        let was_diverged = self.last_diagnostics.map_or(false, |d| d.is_diverged());
        if was_diverged {
            debug!(
                "[TICK-ENGINE] Tick {}: {} neurons still diverged (first {})",
                diagnostics.tick, diagnostics.diverged_neurons, first
            );
        } else {
            warn!(
                "[TICK-ENGINE] Tick {}: {} neurons diverged beyond |V| > {} (first {}); check dt/micro-step settings",
                diagnostics.tick, diagnostics.diverged_neurons, self.divergence_bound, first
            );
        }
    }

    /// Number of completed ticks
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn voltages(&self) -> &[f64] {
        self.network.neurons.voltages()
    }

    pub fn gating(&self) -> &[f64] {
        self.network.neurons.gating()
    }

    /// Conductance per synapse, in postsynaptic-sorted order
    pub fn conductances(&self) -> &[f64] {
        self.network.synapses.conductances()
    }

    /// Current voltages, one slice per neuron type
    pub fn voltages_by_type(&self) -> Vec<&[f64]> {
        let voltages = self.network.neurons.voltages();
        (0..self.network.types.num_types())
            .map(|t| &voltages[self.network.types.range(NeuronTypeId(t as u16))])
            .collect()
    }

    /// Diagnostics of the most recent tick (`None` before the first tick)
    pub fn last_diagnostics(&self) -> Option<&TickDiagnostics> {
        self.last_diagnostics.as_ref()
    }

    pub fn last_timing(&self) -> &TickTiming {
        &self.last_timing
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = EngineStats::default();
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn model(&self) -> &MorrisLecarModel {
        &self.model
    }

    pub fn stepping(&self) -> &MicroStepping {
        &self.stepping
    }

    pub fn input_mapping(&self) -> &InputMapping {
        &self.input
    }

    pub fn backend_name(&self) -> &str {
        self.backend.backend_name()
    }

    pub fn num_neurons(&self) -> usize {
        self.network.num_neurons()
    }

    pub fn num_synapses(&self) -> usize {
        self.network.synapses.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lamina_npu_neural::MorrisLecarParameters;

    #[test]
    fn test_settings_from_config() {
        let mut config = LaminaConfig::default();
        config.simulation.dt = 5e-4;
        config.engine.backend = "cpu-serial".to_string();
        config.input.channels = 2;
        config.membrane.g_k = 3.0;

        let settings = SimulationSettings::from_config(&config).unwrap();
        assert_eq!(settings.dt, 5e-4);
        assert_eq!(settings.backend, BackendType::CPUSerial);
        assert_eq!(settings.input_channels, 2);
        assert_eq!(settings.membrane.g_k, 3.0);
        assert_eq!(settings.stepping().unwrap().steps(), 50);

        config.engine.backend = "tpu".to_string();
        assert!(SimulationSettings::from_config(&config).is_err());
    }

    #[test]
    fn test_diagnostics_flag_out_of_bound_and_nan() {
        let d = TickDiagnostics::compute(7, &[-0.5, 6.0, f64::NAN, 0.2], 5.0);
        assert_eq!(d.tick, 7);
        assert_eq!(d.diverged_neurons, 2);
        assert_eq!(d.first_diverged, Some(NeuronId(1)));
        assert_eq!(d.min_voltage, -0.5);
        assert_eq!(d.max_voltage, 6.0);
        assert!(d.is_diverged());
    }

    #[test]
    fn test_stats_averages() {
        let mut stats = EngineStats::default();
        assert_eq!(stats.avg_tick_time_us(), 0.0);
        let timing = TickTiming {
            aggregation_us: 1.0,
            integration_us: 2.0,
            conductance_us: 3.0,
            total_us: 6.0,
        };
        stats.record(&timing, false);
        stats.record(&timing, true);
        assert_eq!(stats.total_ticks, 2);
        assert_eq!(stats.diverged_ticks, 1);
        assert_eq!(stats.avg_tick_time_us(), 6.0);
        assert_eq!(stats.avg_integration_us(), 2.0);
    }

    #[test]
    fn test_voltages_by_type() {
        let builder = NetworkBuilder::new()
            .neuron_type(2, MorrisLecarParameters::default())
            .neuron_type(3, MorrisLecarParameters::with_offset(0.2));
        let sim = Simulation::with_settings(builder, &SimulationSettings::default()).unwrap();

        let groups = sim.voltages_by_type();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[1].len(), 3);
        assert_eq!(groups[1][0], sim.voltages()[2]);
    }

    #[test]
    fn test_rejects_bad_divergence_bound() {
        let settings = SimulationSettings {
            divergence_bound: 0.0,
            ..Default::default()
        };
        let builder = NetworkBuilder::new().neuron_type(1, MorrisLecarParameters::default());
        assert!(Simulation::with_settings(builder, &settings).is_err());
    }
}

// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Integration Tests: Tick Pipeline
//!
//! End-to-end tests for one tick and chains of ticks:
//! - Delayed conductance update from the voltage history
//! - Aggregated input = injection + Σ g × (E − V) over each dendrite
//! - Two-neuron chain: the postsynaptic neuron only diverges from its
//!   presynaptic twin once the delayed signal arrives
//! - Rejected input leaves every piece of state untouched

use lamina_npu_engine::{NetworkBuilder, Simulation, SimulationSettings, SynapseSpec};
use lamina_npu_neural::types::LaminaError;
use lamina_npu_neural::{
    compute_conductance, MembraneState, MorrisLecarModel, MorrisLecarParameters,
    SynapseParameters,
};
use lamina_npu_runtime::{NeuronStorage, SynapseStorage};
use lamina_observability::init_test_logging;

// ═══════════════════════════════════════════════════════════
// Helper Functions
// ═══════════════════════════════════════════════════════════

fn chain_synapse() -> SynapseParameters {
    SynapseParameters {
        threshold: -0.5,
        slope: -0.5,
        saturation: 0.1,
        power: 1.0,
        reversal: -0.4,
    }
}

/// Two neurons of one type, both starting at the same (V, n)
fn two_neuron_chain(delay: f64) -> NetworkBuilder {
    let params = MorrisLecarParameters::with_offset(-1.0);
    let start = MembraneState::new(-0.45, params.n_inf(-0.45));
    NetworkBuilder::new()
        .neuron_type(2, params)
        .synapse(SynapseSpec::new(0, 1, delay, chain_synapse()))
        .uniform_initial_state(start)
}

/// Two neurons of one type left at the type's resting state, joined by a
/// two-tick synapse
fn resting_pair(params: MorrisLecarParameters) -> Simulation {
    let builder = NetworkBuilder::new()
        .neuron_type(2, params)
        .synapse(SynapseSpec::new(0, 1, 2e-4, chain_synapse()));
    Simulation::with_settings(builder, &SimulationSettings::default()).unwrap()
}

/// First tick whose emitted voltages differ between neuron 0 and neuron 1
fn first_divergent_tick(outputs: &[Vec<f64>]) -> Option<usize> {
    outputs.iter().position(|v| v[0] != v[1])
}

/// Sinusoidal drive on channel 0
fn drive(tick: u64) -> Vec<f64> {
    vec![0.3 * (tick as f64 * 0.7).sin()]
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[test]
fn test_two_neuron_chain_diverges_after_delay() {
    init_test_logging();
    let mut sim =
        Simulation::with_settings(two_neuron_chain(2e-4), &SimulationSettings::default()).unwrap();
    assert_eq!(sim.network().synapses().delays(), &[2]);

    let outputs = sim.run(10, |_| Vec::new()).unwrap();

    // Conductance stays zero until the first post-tick voltage of neuron 0
    // has travelled through the two-tick delay
    for (tick, v) in outputs.iter().enumerate().take(3) {
        assert_eq!(v[0], v[1], "tick {}: neurons should still be identical", tick);
    }
    assert_ne!(outputs[3][0], outputs[3][1]);
    // Reversal above the postsynaptic voltage: the synapse depolarizes
    assert!(outputs[3][1] > outputs[3][0]);

    for v in outputs.iter().flatten() {
        assert!(v.is_finite() && v.abs() < 5.0);
    }
    assert_eq!(sim.tick(), 10);
    assert!(!sim.last_diagnostics().unwrap().is_diverged());
}

#[test]
fn test_resting_pair_never_diverges_before_delay() {
    init_test_logging();
    // Rests near V = -0.457, on the inactive side of the -0.5 threshold
    let params = MorrisLecarParameters::with_offset(0.05);
    let rest = MorrisLecarModel::default().resting_state(&params, 0.0).unwrap();
    assert!(rest.v >= -0.5);

    let mut sim = resting_pair(params);
    assert_eq!(sim.voltages(), &[rest.v, rest.v]);
    assert_eq!(sim.gating(), &[rest.n, rest.n]);
    assert_eq!(sim.network().synapses().delays(), &[2]);

    let outputs = sim.run(10, |_| Vec::new()).unwrap();
    assert_eq!(outputs.len(), 10);
    if let Some(tick) = first_divergent_tick(&outputs) {
        assert!(tick >= 2, "neuron 1 diverged at tick {}", tick);
    }
    assert_eq!(sim.conductances(), &[0.0]);
    assert_eq!(sim.stats().diverged_ticks, 0);
}

#[test]
fn test_prefilled_history_drives_synapse_from_first_tick() {
    // The default type rests near V = -0.519, already past the -0.5 threshold,
    // so the prefilled history activates the synapse before any delay elapses
    let params = MorrisLecarParameters::default();
    let rest = MorrisLecarModel::default().resting_state(&params, 0.0).unwrap();
    assert!(rest.v < -0.5);

    let mut sim = resting_pair(params);
    let outputs = sim.run(10, |_| Vec::new()).unwrap();

    assert_eq!(first_divergent_tick(&outputs), Some(1));
    assert!(compute_conductance(rest.v, &chain_synapse()) > 0.0);
    // The last update read neuron 0's voltage emitted two ticks earlier
    assert_eq!(sim.conductances(), &[compute_conductance(outputs[7][0], &chain_synapse())]);
}

#[test]
fn test_conductance_follows_delayed_presynaptic_voltage() {
    init_test_logging();
    let delay_ticks = 3;
    let params = chain_synapse();
    let builder = NetworkBuilder::new()
        .neuron_type(2, MorrisLecarParameters::with_offset(-0.2))
        .synapse(SynapseSpec::new(0, 1, delay_ticks as f64 * 1e-4, params));
    let settings = SimulationSettings::default().with_input(1, 0, 1.0);
    let mut sim = Simulation::with_settings(builder, &settings).unwrap();

    let initial_v0 = sim.voltages()[0];
    let mut emitted_v0 = Vec::new();
    for tick in 0..20u64 {
        let v = sim.step(&drive(tick)).unwrap();
        emitted_v0.push(v[0]);

        let t = tick as usize;
        let delayed = if t >= delay_ticks {
            emitted_v0[t - delay_ticks]
        } else {
            initial_v0
        };
        assert_eq!(
            sim.conductances()[0],
            compute_conductance(delayed, &params),
            "tick {}",
            tick
        );
    }
}

#[test]
fn test_single_tick_perturbation_arrives_exactly_delay_later() {
    let delay_ticks = 3u64;
    let pulse_tick = 5u64;
    let params = SynapseParameters {
        threshold: -0.6,
        slope: 2.0,
        saturation: 0.1,
        power: 1.0,
        reversal: 0.5,
    };
    let make = || {
        let builder = NetworkBuilder::new()
            .neuron_type(2, MorrisLecarParameters::default())
            .synapse(SynapseSpec::new(0, 1, delay_ticks as f64 * 1e-4, params));
        let settings = SimulationSettings::default().with_input(1, 0, 1.0);
        Simulation::with_settings(builder, &settings).unwrap()
    };
    let mut baseline = make();
    let mut perturbed = make();

    for tick in 0..15u64 {
        baseline.step(&[0.0]).unwrap();
        let pulse = if tick == pulse_tick { 0.5 } else { 0.0 };
        perturbed.step(&[pulse]).unwrap();

        let same = baseline.conductances()[0] == perturbed.conductances()[0];
        if tick < pulse_tick + delay_ticks {
            assert!(same, "tick {}: conductance changed before the delay elapsed", tick);
        } else if tick == pulse_tick + delay_ticks {
            assert!(!same, "tick {}: perturbation should have arrived", tick);
        }
    }
}

#[test]
fn test_zero_delay_reads_this_ticks_voltage() {
    let params = chain_synapse();
    let builder = NetworkBuilder::new()
        .neuron_type(2, MorrisLecarParameters::with_offset(-0.5))
        .synapse(SynapseSpec::new(0, 1, 0.0, params));
    let mut sim = Simulation::with_settings(builder, &SimulationSettings::default()).unwrap();
    assert_eq!(sim.network().history().depth(), 1);

    for _ in 0..5 {
        let v0 = sim.step(&[]).unwrap()[0];
        assert_eq!(sim.conductances()[0], compute_conductance(v0, &params));
    }
}

#[test]
fn test_aggregated_input_matches_dendrite_sum() {
    init_test_logging();
    let mut builder = NetworkBuilder::new()
        .neuron_type(3, MorrisLecarParameters::default())
        .neuron_type(3, MorrisLecarParameters::with_offset(-0.3));
    // Fan-in on neuron 4 from everyone, plus a few stragglers
    for pre in 0..6 {
        let params = SynapseParameters {
            reversal: if pre % 2 == 0 { -0.4 } else { -0.9 },
            ..chain_synapse()
        };
        builder = builder.synapse(SynapseSpec::new(pre, 4, 1e-4 * pre as f64, params));
    }
    builder = builder
        .synapse(SynapseSpec::new(5, 0, 0.0, chain_synapse()))
        .synapse(SynapseSpec::new(4, 2, 2e-4, chain_synapse()));

    let settings = SimulationSettings::default().with_input(2, 3, 0.5);
    let mut sim = Simulation::with_settings(builder, &settings).unwrap();
    // Let conductances become non-trivial first
    sim.run(5, |t| vec![0.2 + 0.01 * t as f64, -0.1]).unwrap();

    let voltages_before = sim.voltages().to_vec();
    let conductances_before = sim.conductances().to_vec();
    let input = [0.4, -0.2];
    sim.step(&input).unwrap();

    let synapses = sim.network().synapses();
    let offsets = synapses.dendrite_offsets();
    let reversals = synapses.reversals();
    let accumulated = sim.network().neurons().input_currents();
    for neuron in 0..6 {
        let injected = match neuron {
            3 => 0.5 * input[0],
            4 => 0.5 * input[1],
            _ => 0.0,
        };
        let range = offsets[neuron] as usize..offsets[neuron + 1] as usize;
        let synaptic: f64 = range
            .map(|s| conductances_before[s] * (reversals[s] - voltages_before[neuron]))
            .sum();
        let expected = injected + synaptic;
        assert!(
            (accumulated[neuron] - expected).abs() < 1e-12,
            "neuron {}: {} vs {}",
            neuron,
            accumulated[neuron],
            expected
        );
    }
    assert_eq!(offsets[5] - offsets[4], 6);
}

#[test]
fn test_input_is_overwritten_each_tick() {
    let builder = NetworkBuilder::new().neuron_type(2, MorrisLecarParameters::default());
    let settings = SimulationSettings::default().with_input(1, 1, 2.0);
    let mut sim = Simulation::with_settings(builder, &settings).unwrap();

    sim.step(&[0.25]).unwrap();
    assert_eq!(sim.network().neurons().input_currents(), &[0.0, 0.5]);
    sim.step(&[0.0]).unwrap();
    assert_eq!(sim.network().neurons().input_currents(), &[0.0, 0.0]);
}

#[test]
fn test_wrong_input_length_leaves_state_untouched() {
    init_test_logging();
    let settings = SimulationSettings::default().with_input(2, 0, 1.0);
    let mut sim = Simulation::with_settings(two_neuron_chain(1e-4), &settings).unwrap();
    sim.step(&[0.1, 0.1]).unwrap();

    let voltages = sim.voltages().to_vec();
    let gating = sim.gating().to_vec();
    let conductances = sim.conductances().to_vec();
    let cursor = sim.network().history().cursor();
    let stats = *sim.stats();

    let err = sim.step(&[0.1]).unwrap_err();
    assert_eq!(
        err,
        LaminaError::ArraySizeMismatch {
            what: "external current",
            expected: 2,
            actual: 1
        }
    );
    assert_eq!(sim.voltages(), voltages.as_slice());
    assert_eq!(sim.gating(), gating.as_slice());
    assert_eq!(sim.conductances(), conductances.as_slice());
    assert_eq!(sim.network().history().cursor(), cursor);
    assert_eq!(sim.tick(), 1);
    assert_eq!(sim.stats(), &stats);

    // Still usable afterwards
    assert!(sim.step(&[0.0, 0.0]).is_ok());
    assert_eq!(sim.tick(), 2);
}

#[test]
fn test_voltages_by_type_partition() {
    let builder = NetworkBuilder::new()
        .neuron_type(1, MorrisLecarParameters::default())
        .neuron_type(4, MorrisLecarParameters::with_offset(0.1))
        .neuron_type(2, MorrisLecarParameters::with_offset(-0.1));
    let mut sim = Simulation::with_settings(builder, &SimulationSettings::default()).unwrap();
    sim.step(&[]).unwrap();

    let groups = sim.voltages_by_type();
    let lengths: Vec<usize> = groups.iter().map(|g| g.len()).collect();
    assert_eq!(lengths, vec![1, 4, 2]);
    let flattened: Vec<f64> = groups.concat();
    assert_eq!(flattened.as_slice(), sim.voltages());
}

#[test]
fn test_stats_accumulate() {
    let builder = NetworkBuilder::new().neuron_type(8, MorrisLecarParameters::default());
    let mut sim = Simulation::with_settings(builder, &SimulationSettings::default()).unwrap();
    sim.run(4, |_| Vec::new()).unwrap();

    let stats = sim.stats();
    assert_eq!(stats.total_ticks, 4);
    assert_eq!(stats.diverged_ticks, 0);
    assert!(stats.total_processing_time_us >= stats.total_integration_us);

    sim.reset_stats();
    assert_eq!(sim.stats().total_ticks, 0);
}

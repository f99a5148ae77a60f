// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Tick Throughput Benchmarks
//!
//! Purpose:
//! - Track full-tick cost on a realistic network shape (15 types, sparse
//!   random connectivity, delays up to a few ticks).
//! - Compare serial and rayon execution at a few network sizes.
//!
//! Notes:
//! - Fixed RNG seed; construction is outside the measured loop.
//! - Micro-stepping dominates: each tick runs 10 Euler steps per neuron.

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lamina_npu_engine::{
    CPUBackend, NetworkBuilder, Simulation, SimulationSettings, SynapseSpec,
};
use lamina_npu_neural::{MorrisLecarParameters, SynapseParameters};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const NUM_TYPES: usize = 15;
const SYNAPSES_PER_NEURON: usize = 6;
const INPUT_CHANNELS: usize = 32;

fn create_network(neuron_count: usize) -> NetworkBuilder {
    let mut rng = StdRng::seed_from_u64(0x1a41a);
    let per_type = neuron_count / NUM_TYPES;

    let mut builder = NetworkBuilder::new();
    for t in 0..NUM_TYPES {
        let params = MorrisLecarParameters::with_offset(-0.15 + 0.02 * t as f64);
        builder = builder.neuron_type(per_type, params);
    }

    let total = (per_type * NUM_TYPES) as u32;
    let synapses: Vec<SynapseSpec> = (0..total as usize * SYNAPSES_PER_NEURON)
        .map(|_| {
            let excitatory = rng.gen_bool(0.8);
            let params = SynapseParameters {
                threshold: -0.5,
                slope: if excitatory { 2.0 } else { -0.5 },
                saturation: rng.gen_range(0.005..0.02),
                power: 1.0,
                reversal: if excitatory { 0.5 } else { -0.7 },
            };
            SynapseSpec::new(
                rng.gen_range(0..total),
                rng.gen_range(0..total),
                rng.gen_range(0..4) as f64 * 1e-4,
                params,
            )
        })
        .collect();
    builder.synapses(synapses)
}

fn settings() -> SimulationSettings {
    SimulationSettings::default().with_input(INPUT_CHANNELS, 0, 1.0)
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");
    group.measurement_time(Duration::from_secs(5));

    let input: Vec<f64> = (0..INPUT_CHANNELS).map(|i| 0.05 * (i % 4) as f64).collect();

    for &neurons in &[1_500usize, 15_000, 60_000] {
        group.throughput(Throughput::Elements(neurons as u64));

        let mut serial =
            Simulation::new(create_network(neurons), &settings(), CPUBackend::serial())
                .expect("network should build");
        group.bench_with_input(BenchmarkId::new("serial", neurons), &neurons, |b, _| {
            b.iter(|| {
                let v = serial.step(black_box(&input)).expect("tick");
                black_box(v[0]);
            });
        });

        let mut parallel = Simulation::new(create_network(neurons), &settings(), CPUBackend::new())
            .expect("network should build");
        group.bench_with_input(BenchmarkId::new("rayon", neurons), &neurons, |b, _| {
            b.iter(|| {
                let v = parallel.step(black_box(&input)).expect("tick");
                black_box(v[0]);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_tick);
criterion_main!(benches);

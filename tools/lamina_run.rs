// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Headless simulation runner.
//!
//! Loads `lamina_configuration.toml` (or built-in defaults), builds a
//! synthetic ring-connected network and runs it for a number of ticks,
//! printing per-type voltage summaries and engine statistics.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::process;

use lamina::config::{load_config, validate_config, LaminaConfig};
use lamina::engine::{NetworkBuilder, Simulation, SimulationSettings, SynapseSpec};
use lamina::neural::{MorrisLecarParameters, SynapseParameters};
use lamina::observability::{debug_flags_help, init_console_logging, parse_debug_flags};

const NUM_TYPES: usize = 15;
const SYNAPSES_PER_NEURON: usize = 6;

struct Args {
    config: Option<PathBuf>,
    ticks: usize,
    neurons_per_type: usize,
    overrides: HashMap<String, String>,
}

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: lamina_run [--config <path>] [--ticks <n>] [--neurons-per-type <n>] [--set key=value]...\n\n\
         Defaults:\n\
         - config: search for lamina_configuration.toml, else built-in defaults\n\
         - ticks: 1000\n\
         - neurons-per-type: 100\n\n\
         {}",
        debug_flags_help()
    );
    process::exit(2);
}

fn parse_args() -> Args {
    let mut parsed = Args {
        config: None,
        ticks: 1000,
        neurons_per_type: 100,
        overrides: HashMap::new(),
    };

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                parsed.config = Some(PathBuf::from(v));
            }
            "--ticks" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                parsed.ticks = v.parse().unwrap_or_else(|_| usage_and_exit());
            }
            "--neurons-per-type" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                parsed.neurons_per_type = v.parse().unwrap_or_else(|_| usage_and_exit());
            }
            "--set" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                let (key, value) = v.split_once('=').unwrap_or_else(|| usage_and_exit());
                parsed.overrides.insert(key.to_string(), value.to_string());
            }
            "-h" | "--help" => usage_and_exit(),
            // Consumed by parse_debug_flags
            other if other.starts_with("--debug-") => {}
            other => {
                eprintln!("Unknown argument: {other}");
                usage_and_exit();
            }
        }
    }

    parsed
}

fn load(args: &Args) -> Result<LaminaConfig, Box<dyn std::error::Error>> {
    let config = match load_config(args.config.as_deref(), Some(&args.overrides)) {
        Ok(config) => config,
        // No file anywhere: defaults + overrides
        Err(lamina::config::ConfigError::FileNotFound(_)) if args.config.is_none() => {
            let mut config = LaminaConfig::default();
            lamina::config::apply_environment_overrides(&mut config);
            lamina::config::apply_cli_overrides(&mut config, &args.overrides);
            config
        }
        Err(e) => return Err(e.into()),
    };
    validate_config(&config)?;
    Ok(config)
}

/// Each neuron excites its next neighbours and inhibits one further out
fn ring_network(neurons_per_type: usize) -> NetworkBuilder {
    let mut builder = NetworkBuilder::new();
    for t in 0..NUM_TYPES {
        let params = MorrisLecarParameters::with_offset(-0.1 + 0.015 * t as f64);
        builder = builder.neuron_type(neurons_per_type, params);
    }

    let total = neurons_per_type * NUM_TYPES;
    let excitatory = SynapseParameters {
        threshold: -0.45,
        slope: 2.0,
        saturation: 0.01,
        power: 1.0,
        reversal: 0.5,
    };
    let inhibitory = SynapseParameters {
        threshold: -0.45,
        slope: 2.0,
        saturation: 0.02,
        power: 2.0,
        reversal: -0.7,
    };

    let mut synapses = Vec::with_capacity(total * SYNAPSES_PER_NEURON);
    for source in 0..total {
        for offset in 0..SYNAPSES_PER_NEURON {
            let target = (source + offset + 1) % total;
            let params = if offset % 4 == 3 { inhibitory } else { excitatory };
            let delay = (offset % 3 + 1) as f64 * 1e-4;
            synapses.push(SynapseSpec::new(source as u32, target as u32, delay, params));
        }
    }
    builder.synapses(synapses)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = parse_args();
    let config = load(&args)?;

    let debug_flags = parse_debug_flags();
    init_console_logging(&debug_flags, &config.logging.level)?;

    let settings = SimulationSettings::from_config(&config)?;
    let mut sim = Simulation::with_settings(ring_network(args.neurons_per_type), &settings)?;

    let channels = settings.input_channels;
    sim.run(args.ticks, |tick| {
        (0..channels)
            .map(|c| 0.2 * ((tick as f64) * 0.01 + c as f64).sin())
            .collect()
    })?;

    println!("Lamina run: {} ticks, {} neurons, {} synapses", sim.tick(), sim.num_neurons(), sim.num_synapses());
    for (t, voltages) in sim.voltages_by_type().iter().enumerate() {
        let mean = voltages.iter().sum::<f64>() / voltages.len().max(1) as f64;
        let (min, max) = voltages
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        println!("  type {:>2}: mean V = {:+.4}  range [{:+.4}, {:+.4}]", t, mean, min, max);
    }

    let stats = sim.stats();
    println!(
        "  avg tick {:.1}µs (aggregate {:.1}, integrate {:.1}, conductance {:.1}), diverged ticks: {}",
        stats.avg_tick_time_us(),
        stats.avg_aggregation_us(),
        stats.avg_integration_us(),
        stats.avg_conductance_us(),
        stats.diverged_ticks
    );
    Ok(())
}

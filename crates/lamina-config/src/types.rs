// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `lamina_configuration.toml`.

use serde::{Deserialize, Serialize};

use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LaminaConfig {
    pub simulation: SimulationConfig,
    pub membrane: MembraneConfig,
    pub input: InputConfig,
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

/// Time stepping and numerical diagnostics
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Outer tick size
    pub dt: f64,
    /// Target micro-step size; steps per tick = max(1, round(dt / target))
    pub micro_step_target: f64,
    /// Model time units per unit of `dt`
    pub time_scale: f64,
    /// |V| above this counts as diverged
    pub divergence_bound: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dt: 1e-4,
            micro_step_target: 1e-5,
            time_scale: 1000.0,
            divergence_bound: 5.0,
        }
    }
}

/// Morris–Lecar membrane constants shared by all neuron types
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MembraneConfig {
    pub capacitance: f64,
    pub g_ca: f64,
    pub e_ca: f64,
    pub g_k: f64,
    pub e_k: f64,
    pub g_leak: f64,
    pub e_leak: f64,
}

impl Default for MembraneConfig {
    fn default() -> Self {
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

/// External current mapping: channel `c` drives neuron `first_neuron + c`
/// with `scale × input[c]`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct InputConfig {
    pub channels: usize,
    pub first_neuron: usize,
    pub scale: f64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            channels: 0,
            first_neuron: 0,
            scale: 1.0,
        }
    }
}

/// Compute backend selection
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// "cpu" or "cpu-serial"
    pub backend: String,
    /// Worker threads, 0 = rayon default
    pub num_threads: usize,
    /// Index-space size below which a phase stays single-threaded
    pub parallel_threshold: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backend: "cpu".to_string(),
            num_threads: 0,
            parallel_threshold: 4096,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter level ("error", "warn", "info", "debug", "trace")
    pub level: String,
    /// Directory for run log folders
    pub log_dir: PathBuf,
    /// Write log files in addition to the console
    pub file_logging: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: PathBuf::from("logs"),
            file_logging: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: LaminaConfig = toml::from_str(
            r#"
            [simulation]
            dt = 0.001

            [engine]
            backend = "cpu-serial"
            "#,
        )
        .unwrap();

        assert_eq!(config.simulation.dt, 0.001);
        assert_eq!(config.simulation.time_scale, 1000.0);
        assert_eq!(config.engine.backend, "cpu-serial");
        assert_eq!(config.engine.parallel_threshold, 4096);
        assert_eq!(config.membrane, MembraneConfig::default());
    }

    #[test]
    fn test_round_trip_through_toml() {
        let mut config = LaminaConfig::default();
        config.input.channels = 3;
        config.input.scale = 0.25;
        let text = toml::to_string(&config).unwrap();
        let parsed: LaminaConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}

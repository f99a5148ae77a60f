// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, LaminaConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File name searched for when no explicit path is given
pub const CONFIG_FILE_NAME: &str = "lamina_configuration.toml";

/// Find the Lamina configuration file
///
/// Search order:
/// 1. `LAMINA_CONFIG_PATH` environment variable
/// 2. Current working directory: `./lamina_configuration.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("LAMINA_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by LAMINA_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    if let Some(found) = search_paths.iter().find(|p| p.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "Lamina configuration file '{}' not found in any of these locations:\n{}\n\nSet LAMINA_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Returns
///
/// Complete `LaminaConfig` with all overrides applied. Call
/// [`validate_config`](crate::validate_config) before building a simulation.
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<LaminaConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: LaminaConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

/// Parse `value` into `target`, leaving `target` unchanged if it doesn't parse
fn set_parsed<T: FromStr>(target: &mut T, value: &str) {
    if let Ok(parsed) = value.trim().parse::<T>() {
        *target = parsed;
    }
}

fn parse_bool(value: &str) -> bool {
    let value = value.trim().to_lowercase();
    value == "true" || value == "1" || value == "yes"
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `LAMINA_DT` -> `simulation.dt`
/// - `LAMINA_TIME_SCALE` -> `simulation.time_scale`
/// - `LAMINA_DIVERGENCE_BOUND` -> `simulation.divergence_bound`
/// - `LAMINA_INPUT_SCALE` -> `input.scale`
/// - `LAMINA_BACKEND` -> `engine.backend`
/// - `LAMINA_NUM_THREADS` -> `engine.num_threads`
/// - `LAMINA_LOG_LEVEL` -> `logging.level`
/// - `LAMINA_LOG_DIR` -> `logging.log_dir`
/// - `LAMINA_FILE_LOGGING` -> `logging.file_logging`
pub fn apply_environment_overrides(config: &mut LaminaConfig) {
    // Simulation settings
    if let Ok(value) = env::var("LAMINA_DT") {
        set_parsed(&mut config.simulation.dt, &value);
    }
    if let Ok(value) = env::var("LAMINA_TIME_SCALE") {
        set_parsed(&mut config.simulation.time_scale, &value);
    }
    if let Ok(value) = env::var("LAMINA_DIVERGENCE_BOUND") {
        set_parsed(&mut config.simulation.divergence_bound, &value);
    }

    // Input
    if let Ok(value) = env::var("LAMINA_INPUT_SCALE") {
        set_parsed(&mut config.input.scale, &value);
    }

    // Engine
    if let Ok(value) = env::var("LAMINA_BACKEND") {
        config.engine.backend = value;
    }
    if let Ok(value) = env::var("LAMINA_NUM_THREADS") {
        set_parsed(&mut config.engine.num_threads, &value);
    }

    // Logging
    if let Ok(value) = env::var("LAMINA_LOG_LEVEL") {
        config.logging.level = value;
    }
    if let Ok(value) = env::var("LAMINA_LOG_DIR") {
        config.logging.log_dir = PathBuf::from(value);
    }
    if let Ok(value) = env::var("LAMINA_FILE_LOGGING") {
        config.logging.file_logging = parse_bool(&value);
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - HashMap of CLI arguments (e.g., `{"dt": "0.0005", "backend": "cpu-serial"}`)
pub fn apply_cli_overrides(config: &mut LaminaConfig, cli_args: &HashMap<String, String>) {
    // Simulation settings
    if let Some(value) = cli_args.get("dt") {
        set_parsed(&mut config.simulation.dt, value);
    }
    if let Some(value) = cli_args.get("micro_step_target") {
        set_parsed(&mut config.simulation.micro_step_target, value);
    }
    if let Some(value) = cli_args.get("time_scale") {
        set_parsed(&mut config.simulation.time_scale, value);
    }
    if let Some(value) = cli_args.get("divergence_bound") {
        set_parsed(&mut config.simulation.divergence_bound, value);
    }

    // Input
    if let Some(value) = cli_args.get("input_channels") {
        set_parsed(&mut config.input.channels, value);
    }
    if let Some(value) = cli_args.get("input_first_neuron") {
        set_parsed(&mut config.input.first_neuron, value);
    }
    if let Some(value) = cli_args.get("input_scale") {
        set_parsed(&mut config.input.scale, value);
    }

    // Engine
    if let Some(value) = cli_args.get("backend") {
        config.engine.backend = value.clone();
    }
    if let Some(value) = cli_args.get("num_threads") {
        set_parsed(&mut config.engine.num_threads, value);
    }
    if let Some(value) = cli_args.get("parallel_threshold") {
        set_parsed(&mut config.engine.parallel_threshold, value);
    }

    // Logging
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
    if let Some(value) = cli_args.get("file_logging") {
        config.logging.file_logging = parse_bool(value);
    }
}

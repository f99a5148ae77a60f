// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Checks value ranges before a simulation is built from the configuration.
//! All problems are collected and reported together.

use crate::{ConfigError, ConfigResult, LaminaConfig};

/// Backends accepted in `engine.backend`
pub const KNOWN_BACKENDS: &[&str] = &["cpu", "cpu-serial"];

/// Log levels accepted in `logging.level`
pub const KNOWN_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    NotPositive { field: String, value: f64 },
    NotFinite { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotPositive { field, value } => {
                write!(f, "{} must be > 0, got {}", field, value)
            }
            Self::NotFinite { field } => write!(f, "{} must be finite", field),
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - Positive, finite time stepping values
/// - Finite membrane constants with positive capacitance
/// - Finite input scale
/// - Known backend and log level names
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &LaminaConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_simulation(config, &mut errors);
    validate_membrane(config, &mut errors);
    validate_input(config, &mut errors);
    validate_engine(config, &mut errors);
    validate_logging(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn require_positive(field: &str, value: f64, errors: &mut Vec<ConfigValidationError>) {
    if !value.is_finite() {
        errors.push(ConfigValidationError::NotFinite {
            field: field.to_string(),
        });
    } else if value <= 0.0 {
        errors.push(ConfigValidationError::NotPositive {
            field: field.to_string(),
            value,
        });
    }
}

fn require_finite(field: &str, value: f64, errors: &mut Vec<ConfigValidationError>) {
    if !value.is_finite() {
        errors.push(ConfigValidationError::NotFinite {
            field: field.to_string(),
        });
    }
}

fn validate_simulation(config: &LaminaConfig, errors: &mut Vec<ConfigValidationError>) {
    let sim = &config.simulation;
    require_positive("simulation.dt", sim.dt, errors);
    require_positive("simulation.micro_step_target", sim.micro_step_target, errors);
    require_positive("simulation.time_scale", sim.time_scale, errors);
    require_positive("simulation.divergence_bound", sim.divergence_bound, errors);
}

fn validate_membrane(config: &LaminaConfig, errors: &mut Vec<ConfigValidationError>) {
    let m = &config.membrane;
    require_positive("membrane.capacitance", m.capacitance, errors);
    for (field, value) in [
        ("membrane.g_ca", m.g_ca),
        ("membrane.e_ca", m.e_ca),
        ("membrane.g_k", m.g_k),
        ("membrane.e_k", m.e_k),
        ("membrane.g_leak", m.g_leak),
        ("membrane.e_leak", m.e_leak),
    ] {
        require_finite(field, value, errors);
    }
}

fn validate_input(config: &LaminaConfig, errors: &mut Vec<ConfigValidationError>) {
    require_finite("input.scale", config.input.scale, errors);
}

fn validate_engine(config: &LaminaConfig, errors: &mut Vec<ConfigValidationError>) {
    let backend = config.engine.backend.to_lowercase();
    if !KNOWN_BACKENDS.contains(&backend.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "engine.backend".to_string(),
            reason: format!(
                "unknown backend '{}', expected one of {:?}",
                config.engine.backend, KNOWN_BACKENDS
            ),
        });
    }
}

fn validate_logging(config: &LaminaConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.logging.level.to_lowercase();
    if !KNOWN_LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("unknown level '{}'", config.logging.level),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_every_problem() {
        let mut config = LaminaConfig::default();
        config.simulation.dt = 0.0;
        config.membrane.capacitance = -1.0;
        config.input.scale = f64::INFINITY;
        config.engine.backend = "cuda".to_string();

        let message = match validate_config(&config) {
            Err(ConfigError::ValidationError(message)) => message,
            other => panic!("expected validation error, got {:?}", other),
        };
        assert!(message.contains("simulation.dt"));
        assert!(message.contains("membrane.capacitance"));
        assert!(message.contains("input.scale"));
        assert!(message.contains("engine.backend"));
    }

    #[test]
    fn test_nan_timestep_is_not_finite() {
        let mut errors = Vec::new();
        require_positive("simulation.dt", f64::NAN, &mut errors);
        assert_eq!(
            errors,
            vec![ConfigValidationError::NotFinite {
                field: "simulation.dt".to_string()
            }]
        );
    }

    #[test]
    fn test_backend_and_level_are_case_insensitive() {
        let mut config = LaminaConfig::default();
        config.engine.backend = "CPU-Serial".to_string();
        config.logging.level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }
}

// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Lamina
//!
//! Discrete-time simulation of networks of Morris–Lecar neurons coupled by
//! delayed, graded (non-spiking) conductance synapses.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! lamina = "0.1"  # Default: engine + config + observability
//! ```
//!
//! ## Feature Flags
//! - **`engine`** (default): network builder, compute backends, simulation step
//! - **`config`** (default): `lamina_configuration.toml` loading and validation
//! - **`observability`** (default): logging initialization
//! - **`file-logging`**: daily-rolling log files in a timestamped run folder
//!
//! ## Usage
//!
//! ```rust
//! use lamina::prelude::*;
//!
//! let builder = NetworkBuilder::new()
//!     .neuron_type(4, MorrisLecarParameters::default())
//!     .neuron_type(2, MorrisLecarParameters::with_offset(0.2))
//!     .synapse(SynapseSpec::new(0, 5, 3e-4, SynapseParameters::default()));
//! let settings = SimulationSettings::default().with_input(2, 0, 1.0);
//!
//! let mut sim = Simulation::with_settings(builder, &settings)?;
//! for _ in 0..10 {
//!     let voltages = sim.step(&[0.1, -0.1])?;
//!     assert_eq!(voltages.len(), 6);
//! }
//! # Ok::<(), lamina::neural::LaminaError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: lamina-npu-neural                          │
//! │  (Errors, ids, Morris–Lecar model, synapse response)    │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Storage: lamina-npu-runtime                            │
//! │  (SoA neuron/synapse arrays, CSR dendrites, history)    │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Execution: lamina-npu-engine                           │
//! │  (Kernels, CPU backends, seven-phase simulation step)   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

// Re-export foundation
pub use lamina_npu_neural as neural;

// Re-export storage + execution
#[cfg(feature = "engine")]
pub use lamina_npu_engine as engine;

#[cfg(feature = "engine")]
pub use lamina_npu_runtime as runtime;

// Re-export infrastructure
#[cfg(feature = "config")]
pub use lamina_config as config;

#[cfg(feature = "observability")]
pub use lamina_observability as observability;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::neural::{
        LaminaError, MembraneConstants, MembraneState, MorrisLecarModel, MorrisLecarParameters,
        NeuronId, NeuronTypeId, SynapseId, SynapseParameters,
    };

    #[cfg(feature = "engine")]
    pub use crate::engine::{
        BackendType, CPUBackend, ComputeBackend, EngineStats, NetworkBuilder, NeuronTypeSpec,
        Simulation, SimulationSettings, SynapseSpec, TickDiagnostics,
    };

    #[cfg(feature = "config")]
    pub use crate::config::{load_config, validate_config, LaminaConfig};
}

#[cfg(all(test, feature = "engine"))]
mod tests {
    #[test]
    fn test_prelude_builds_a_network() {
        use crate::prelude::*;

        let builder = NetworkBuilder::new().neuron_type(3, MorrisLecarParameters::default());
        let sim = Simulation::with_settings(builder, &SimulationSettings::default()).unwrap();
        assert_eq!(sim.num_neurons(), 3);
        assert_eq!(sim.tick(), 0);
    }
}

// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! # Lamina Tick Engine
//!
//! Discrete-time simulation of conductance-coupled Morris–Lecar networks.
//!
//! ## Architecture
//! - One [`Simulation`] owns all mutable state; ticks are strictly sequential
//! - Rayon data parallelism inside each phase, with a serial fallback below
//!   the backend's parallel threshold
//! - Per-neuron reductions always run in CSR order, so parallel and serial
//!   runs produce bit-identical voltages
//! - Structure-of-arrays storage from `lamina-npu-runtime`
//!
//! ## Example
//! ```rust
//! use lamina_npu_engine::{NetworkBuilder, Simulation, SimulationSettings, SynapseSpec};
//! use lamina_npu_neural::{MorrisLecarParameters, SynapseParameters};
//!
//! let builder = NetworkBuilder::new()
//!     .neuron_type(2, MorrisLecarParameters::default())
//!     .synapse(SynapseSpec::new(0, 1, 2e-4, SynapseParameters::default()));
//! let settings = SimulationSettings::default().with_input(1, 0, 1.0);
//!
//! let mut sim = Simulation::with_settings(builder, &settings).unwrap();
//! let voltages = sim.step(&[0.05]).unwrap();
//! assert_eq!(voltages.len(), 2);
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod backend;
pub mod injection;
pub mod input_aggregation;
pub mod network;
pub mod neural_dynamics;
pub mod simulation;
pub mod synapse_update;

pub use backend::{
    create_backend, BackendType, CPUBackend, ComputeBackend, TickTiming,
    DEFAULT_PARALLEL_THRESHOLD,
};
pub use injection::InputMapping;
pub use input_aggregation::aggregate_synaptic_input;
pub use network::{Network, NetworkBuilder, NeuronTypeSpec, SynapseSpec};
pub use neural_dynamics::integrate_neurons;
pub use simulation::{EngineStats, Simulation, SimulationSettings, TickDiagnostics};
pub use synapse_update::update_conductances;

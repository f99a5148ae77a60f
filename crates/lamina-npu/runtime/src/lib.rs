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

//! # Lamina Runtime Storage
//!
//! Storage traits and implementations for network state.
//!
//! This crate provides:
//! - **Traits** (always available): `NeuronStorage`, `SynapseStorage`
//! - **Std Implementation** (behind `std` feature): Vec-backed arrays, the
//!   dendrite index, the neuron type table and the delay buffer
//!
//! ## Usage
//!
//! ```rust
//! use lamina_npu_runtime::DelayBuffer;
//!
//! let mut buffer = DelayBuffer::new(3, &[-0.5, -0.5]).unwrap();
//! buffer.write(&[-0.4, -0.6]).unwrap();
//! assert_eq!(buffer.read(1, 0), -0.6);
//! assert_eq!(buffer.read(1, 2), -0.5); // still the prefilled resting value
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Traits module (always available)
pub mod traits;

// Re-export traits for convenience
pub use traits::{
    AggregationView, ConductanceView, IntegrationView, LaminaError, NeuronStorage, Result,
    SynapseStorage,
};

// Standard library implementation (behind "std" feature)
#[cfg(feature = "std")]
pub mod std_impl;

#[cfg(feature = "std")]
pub use std_impl::{
    DelayBuffer, DendriteIndex, NeuronArray, NeuronTypeTable, SynapseArray, SynapseRecord,
};

// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Neuron Model Architecture
//!
//! Trait-based neuron models. Each model is a pure per-neuron kernel that
//! backends apply across the whole neuron array.
//!
//! ## Adding a New Neuron Model
//!
//! 1. Create `src/models/your_model.rs`
//! 2. Implement `NeuronModel` trait
//! 3. Add tests
//! 4. Export in `mod.rs`

pub mod morris_lecar;
pub mod traits;

// Re-export core types
pub use morris_lecar::{MembraneConstants, MembraneState, MorrisLecarModel, MorrisLecarParameters};
pub use traits::{ModelParameters, NeuronModel};

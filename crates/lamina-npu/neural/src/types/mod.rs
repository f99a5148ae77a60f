// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Neural Types Module
//!
//! Core type definitions shared by the storage and engine layers.

pub mod error;
pub mod ids;

// Re-export commonly used types
pub use error::{Error, LaminaError, Result, SynapseEnd};
pub use ids::{NeuronId, NeuronTypeId, SynapseId};

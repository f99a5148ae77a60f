// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! Synaptic computation module
//!
//! Platform-agnostic synaptic algorithms: response curve, current, delays.

pub mod conductance;
pub mod current;
pub mod delay;

pub use conductance::*;
pub use current::*;
pub use delay::*;

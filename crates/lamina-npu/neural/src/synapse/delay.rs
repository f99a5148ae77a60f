// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Conversion of physical synaptic delays to whole ticks

use crate::types::{LaminaError, Result, SynapseId};

/// Longest delay (in ticks) a network may contain.
///
/// The delay buffer holds one voltage per neuron per tick of delay, so this
/// bounds its memory.
pub const MAX_DELAY_TICKS: u32 = 1 << 16;

/// Largest delay buffer (one `f64` per neuron per slot) a network may allocate
pub const MAX_DELAY_BUFFER_BYTES: u64 = 1 << 32;

/// Bytes held by a delay buffer of `depth` slots over `num_neurons` voltages,
/// or `None` on overflow
pub fn delay_buffer_bytes(depth: u64, num_neurons: usize) -> Option<u64> {
    depth
        .checked_mul(num_neurons as u64)?
        .checked_mul(core::mem::size_of::<f64>() as u64)
}

/// `round(delay / dt)`, rejecting negative, non-finite or oversized delays
pub fn delay_to_ticks(synapse: SynapseId, delay: f64, dt: f64) -> Result<u32> {
    if !dt.is_finite() || dt <= 0.0 {
        return Err(LaminaError::InvalidTimestep(dt));
    }
    if !delay.is_finite() {
        return Err(LaminaError::InvalidDelay {
            synapse,
            delay,
            reason: "delay must be finite",
        });
    }
    if delay < 0.0 {
        return Err(LaminaError::InvalidDelay {
            synapse,
            delay,
            reason: "delay must be >= 0",
        });
    }

    let ticks = (delay / dt).round();
    if ticks > MAX_DELAY_TICKS as f64 {
        return Err(LaminaError::InvalidDelay {
            synapse,
            delay,
            reason: "delay exceeds the maximum supported tick count",
        });
    }
    Ok(ticks as u32)
}

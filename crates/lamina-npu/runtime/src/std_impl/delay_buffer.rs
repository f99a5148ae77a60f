// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Delay Buffer
//!
//! Circular voltage history: `depth` slots, each a full per-neuron voltage
//! vector, stored as one dense `[depth × num_neurons]` grid.
//!
//! ```text
//! slot:    0      1      2    ...  depth-1
//!        [V(t)] [V(t-2)] [V(t-1)]          <- example after a few ticks
//!          ^ latest write; read(i, d) = slot (latest - d) mod depth
//! ```
//!
//! Per tick: one `write` (into the cursor slot), any number of `read`s, one
//! `advance`. Reads are relative to the most recent write, so they give the
//! same answer before and after `advance`.

use lamina_npu_neural::types::{LaminaError, Result};

#[derive(Debug, Clone)]
pub struct DelayBuffer {
    depth: usize,
    num_neurons: usize,
    /// Row-major: slot `s` holds `slots[s * num_neurons..(s + 1) * num_neurons]`
    slots: Vec<f64>,
    /// Slot the next `write` goes into
    cursor: usize,
    /// Slot written most recently (or the slot before `cursor` if none yet)
    latest: usize,
}

impl DelayBuffer {
    /// Create a buffer with every slot filled with `initial`
    ///
    /// Delayed reads during the first `depth` ticks then return the initial
    /// condition instead of uninitialized memory.
    pub fn new(depth: usize, initial: &[f64]) -> Result<Self> {
        if depth == 0 {
            return Err(LaminaError::InvalidParameter(
                "delay buffer depth must be > 0".to_string(),
            ));
        }
        let num_neurons = initial.len();
        let mut slots = Vec::with_capacity(depth * num_neurons);
        for _ in 0..depth {
            slots.extend_from_slice(initial);
        }

        Ok(Self {
            depth,
            num_neurons,
            slots,
            cursor: 0,
            latest: depth - 1,
        })
    }

    /// Store `voltages` in the cursor slot, overwriting the oldest history
    pub fn write(&mut self, voltages: &[f64]) -> Result<()> {
        if voltages.len() != self.num_neurons {
            return Err(LaminaError::ArraySizeMismatch {
                what: "delay buffer write",
                expected: self.num_neurons,
                actual: voltages.len(),
            });
        }
        let start = self.cursor * self.num_neurons;
        self.slots[start..start + self.num_neurons].copy_from_slice(voltages);
        self.latest = self.cursor;
        Ok(())
    }

    /// Move the cursor to the next slot
    pub fn advance(&mut self) {
        self.cursor += 1;
        if self.cursor >= self.depth {
            self.cursor = 0;
        }
    }

    /// Voltage of `neuron` recorded `delay` writes before the latest one
    ///
    /// Valid for `delay < depth`.
    #[inline(always)]
    pub fn read(&self, neuron: usize, delay: usize) -> f64 {
        self.slot(delay)[neuron]
    }

    /// Full voltage vector recorded `delay` writes before the latest one
    #[inline(always)]
    pub fn slot(&self, delay: usize) -> &[f64] {
        debug_assert!(delay < self.depth, "delay {} >= depth {}", delay, self.depth);
        let index = (self.latest + self.depth - delay) % self.depth;
        let start = index * self.num_neurons;
        &self.slots[start..start + self.num_neurons]
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn num_neurons(&self) -> usize {
        self.num_neurons
    }

    /// Slot the next write goes into
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Size of the history grid in bytes
    pub fn memory_bytes(&self) -> usize {
        self.slots.len() * core::mem::size_of::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefilled_reads_return_initial_condition() {
        let rest = [-0.51, -0.52, -0.53];
        let buffer = DelayBuffer::new(4, &rest).unwrap();
        for delay in 0..4 {
            for (i, &v) in rest.iter().enumerate() {
                assert_eq!(buffer.read(i, delay), v);
            }
        }
    }

    #[test]
    fn test_reads_follow_write_history() {
        let depth = 3;
        let mut buffer = DelayBuffer::new(depth, &[0.0, 0.0]).unwrap();
        let history: Vec<[f64; 2]> = (0..7).map(|k| [k as f64, -(k as f64)]).collect();

        for (k, v) in history.iter().enumerate() {
            buffer.write(v).unwrap();
            for d in 0..depth.min(k + 1) {
                assert_eq!(buffer.read(0, d), history[k - d][0]);
                assert_eq!(buffer.read(1, d), history[k - d][1]);
            }
            buffer.advance();
            // Still relative to the latest write after advancing
            for d in 0..depth.min(k + 1) {
                assert_eq!(buffer.read(0, d), history[k - d][0]);
            }
        }
    }

    #[test]
    fn test_early_reads_mix_history_and_prefill() {
        let mut buffer = DelayBuffer::new(3, &[-0.5]).unwrap();
        buffer.write(&[1.0]).unwrap();
        assert_eq!(buffer.read(0, 0), 1.0);
        assert_eq!(buffer.read(0, 1), -0.5);
        assert_eq!(buffer.read(0, 2), -0.5);
    }

    #[test]
    fn test_cursor_wraps() {
        let mut buffer = DelayBuffer::new(2, &[0.0]).unwrap();
        assert_eq!(buffer.cursor(), 0);
        buffer.advance();
        assert_eq!(buffer.cursor(), 1);
        buffer.advance();
        assert_eq!(buffer.cursor(), 0);
    }

    #[test]
    fn test_rejects_zero_depth_and_wrong_width() {
        assert!(DelayBuffer::new(0, &[0.0]).is_err());
        let mut buffer = DelayBuffer::new(2, &[0.0, 0.0]).unwrap();
        assert_eq!(
            buffer.write(&[1.0]),
            Err(LaminaError::ArraySizeMismatch {
                what: "delay buffer write",
                expected: 2,
                actual: 1,
            })
        );
    }

    #[test]
    fn test_depth_one_reads_current_tick() {
        let mut buffer = DelayBuffer::new(1, &[0.0]).unwrap();
        buffer.write(&[2.0]).unwrap();
        assert_eq!(buffer.read(0, 0), 2.0);
        buffer.advance();
        buffer.write(&[3.0]).unwrap();
        assert_eq!(buffer.read(0, 0), 3.0);
    }
}

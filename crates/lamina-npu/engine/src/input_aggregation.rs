// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Input Aggregation (Phase 2)
//!
//! Per-neuron reduction of synaptic current over the dendrite index:
//!
//! ```text
//! I[i] += Σ_{j ∈ offsets[i]..offsets[i+1]} g[j] × (E[j] − V[i])
//! ```
//!
//! Runs after external injection (the accumulator already holds the injected
//! current) and before integration. Each neuron sums its own contiguous block
//! in synapse order, so the serial and parallel paths are bit-identical.

use lamina_npu_neural::dendritic_current;
use lamina_npu_runtime::AggregationView;
use rayon::prelude::*;

/// Add every neuron's synaptic current on top of its injected current
///
/// `offsets` is the dendrite index (length = neuron count + 1);
/// `conductances` and `reversals` are indexed by synapse.
pub fn aggregate_synaptic_input(
    view: AggregationView<'_>,
    offsets: &[u32],
    conductances: &[f64],
    reversals: &[f64],
    parallel: bool,
) {
    let AggregationView {
        input_currents,
        voltages,
    } = view;
    debug_assert_eq!(offsets.len(), input_currents.len() + 1);
    debug_assert_eq!(conductances.len(), reversals.len());

    let accumulate = |(i, current): (usize, &mut f64)| {
        let range = offsets[i] as usize..offsets[i + 1] as usize;
        *current += dendritic_current(&conductances[range.clone()], &reversals[range], voltages[i]);
    };

    if parallel {
        input_currents.par_iter_mut().enumerate().for_each(accumulate);
    } else {
        input_currents.iter_mut().enumerate().for_each(accumulate);
    }
}

// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Synapse Conductance Update (Phase 5)
//!
//! Every synapse reads its presynaptic voltage `delay` ticks back from the
//! delay buffer and recomputes its conductance. Must run after the current
//! tick's voltages were written and before the buffer advances.

use lamina_npu_neural::compute_conductance;
use lamina_npu_runtime::{ConductanceView, DelayBuffer};
use rayon::prelude::*;

/// Recompute all conductances from delayed presynaptic voltages
pub fn update_conductances(view: ConductanceView<'_>, history: &DelayBuffer, parallel: bool) {
    let ConductanceView {
        conductances,
        presynaptic,
        delays,
        parameters,
    } = view;

    let update = |(j, g): (usize, &mut f64)| {
        let v_delayed = history.read(presynaptic[j] as usize, delays[j] as usize);
        *g = compute_conductance(v_delayed, &parameters[j]);
    };

    if parallel {
        conductances.par_iter_mut().enumerate().for_each(update);
    } else {
        conductances.iter_mut().enumerate().for_each(update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lamina_npu_neural::SynapseParameters;

    #[test]
    fn test_reads_each_synapse_at_its_own_delay() {
        let mut history = DelayBuffer::new(3, &[-0.4]).unwrap();
        history.write(&[-0.7]).unwrap();
        history.advance();
        history.write(&[-0.9]).unwrap();

        let params = [SynapseParameters::default(); 3];
        let mut conductances = [f64::NAN; 3];
        update_conductances(
            ConductanceView {
                conductances: &mut conductances,
                presynaptic: &[0, 0, 0],
                delays: &[0, 1, 2],
                parameters: &params,
            },
            &history,
            false,
        );

        assert_eq!(conductances[0], compute_conductance(-0.9, &params[0]));
        assert_eq!(conductances[1], compute_conductance(-0.7, &params[1]));
        // Prefilled slot, above threshold
        assert_eq!(conductances[2], 0.0);
    }

    #[test]
    fn test_parallel_matches_serial() {
        let voltages: Vec<f64> = (0..64).map(|i| -1.0 + 0.02 * i as f64).collect();
        let mut history = DelayBuffer::new(4, &voltages).unwrap();
        let shifted: Vec<f64> = voltages.iter().map(|v| v - 0.1).collect();
        history.write(&shifted).unwrap();

        let presynaptic: Vec<u32> = (0..200).map(|j| (j * 11 % 64) as u32).collect();
        let delays: Vec<u32> = (0..200).map(|j| (j % 4) as u32).collect();
        let params = vec![SynapseParameters::default(); 200];
        let mut serial = vec![0.0; 200];
        let mut parallel = vec![0.0; 200];

        for (out, par) in [(&mut serial, false), (&mut parallel, true)] {
            update_conductances(
                ConductanceView {
                    conductances: out,
                    presynaptic: &presynaptic,
                    delays: &delays,
                    parameters: &params,
                },
                &history,
                par,
            );
        }
        assert_eq!(serial, parallel);
    }
}

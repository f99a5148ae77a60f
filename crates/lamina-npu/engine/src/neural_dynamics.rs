// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Neural Dynamics (Phase 3)
//!
//! Micro-stepped Morris–Lecar integration of every neuron.
//!
//! ## Performance Critical Path
//! Every neuron runs `steps` Euler micro-steps per tick, so this phase
//! dominates tick time. Neurons are independent within a tick; micro-steps
//! of one neuron are strictly sequential.
//!
//! The per-type parameter table is tiny (one entry per type) and stays in
//! cache; per-neuron state is streamed from the SoA arrays.

use lamina_npu_neural::{
    MembraneState, MicroStepping, MorrisLecarModel, MorrisLecarParameters, NeuronModel,
};
use lamina_npu_runtime::IntegrationView;
use rayon::prelude::*;
use std::sync::OnceLock;
use tracing::trace;

/// Runtime-gated tracing config for neural dynamics.
/// Enable with:
/// - LAMINA_NPU_TRACE_DYNAMICS=1
/// Optional filters:
/// - LAMINA_NPU_TRACE_NEURON=<u32 neuron index> (single neuron)
struct DynamicsTraceCfg {
    enabled: bool,
    neuron_filter: Option<u32>,
}

fn dynamics_trace_cfg() -> &'static DynamicsTraceCfg {
    static CFG: OnceLock<DynamicsTraceCfg> = OnceLock::new();
    CFG.get_or_init(|| {
        let enabled = std::env::var("LAMINA_NPU_TRACE_DYNAMICS")
            .ok()
            .as_deref()
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let neuron_filter = std::env::var("LAMINA_NPU_TRACE_NEURON").ok().and_then(|v| v.parse().ok());

        DynamicsTraceCfg {
            enabled,
            neuron_filter,
        }
    })
}

/// Advance (V, n) of every neuron by one tick
///
/// `type_params` is indexed by the per-neuron type index in the view.
pub fn integrate_neurons(
    view: IntegrationView<'_>,
    model: &MorrisLecarModel,
    type_params: &[MorrisLecarParameters],
    stepping: &MicroStepping,
    parallel: bool,
) {
    let IntegrationView {
        voltages,
        gating,
        input_currents,
        neuron_types,
    } = view;
    debug_assert_eq!(voltages.len(), gating.len());
    debug_assert_eq!(voltages.len(), input_currents.len());
    debug_assert_eq!(voltages.len(), neuron_types.len());

    let advance = |(i, (v, n)): (usize, (&mut f64, &mut f64))| {
        let params = &type_params[neuron_types[i] as usize];
        let next = model.integrate(MembraneState::new(*v, *n), input_currents[i], params, stepping);
        *v = next.v;
        *n = next.n;
    };

    if parallel {
        voltages
            .par_iter_mut()
            .zip(gating.par_iter_mut())
            .enumerate()
            .for_each(advance);
    } else {
        voltages.iter_mut().zip(gating.iter_mut()).enumerate().for_each(advance);
    }

    let cfg = dynamics_trace_cfg();
    if cfg.enabled {
        for i in 0..voltages.len() {
            if cfg.neuron_filter.map_or(true, |id| id as usize == i) {
                trace!(
                    "[ML] neuron={} type={} I={:.6} V={:.6} n={:.6}",
                    i,
                    neuron_types[i],
                    input_currents[i],
                    voltages[i],
                    gating[i]
                );
            }
        }
    }
}

// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # lamina-observability
//!
//! Logging initialization for Lamina with per-crate debug flag support.
//!
//! Engine crates only emit `tracing` events; binaries and tests pick a
//! subscriber from here.
//!
//! ## Features
//! - `file-logging`: Daily-rolling log files in a timestamped run folder

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod init;

// Re-export commonly used items
pub use cli::*;
pub use init::*;

/// Known Lamina crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "lamina",
    "lamina-config",
    "lamina-npu-neural",
    "lamina-npu-runtime",
    "lamina-npu-engine",
];

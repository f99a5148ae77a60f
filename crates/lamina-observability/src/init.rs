// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Unified logging initialization for Lamina
//!
//! Console logging is always available; file logging with a timestamped run
//! folder needs the `file-logging` feature.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

use crate::cli::CrateDebugFlags;

/// `RUST_LOG` wins over the debug flags when set
fn build_filter(debug_flags: &CrateDebugFlags, default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(debug_flags.filter_with_default(default_level)))
}

/// Initialize console logging
///
/// # Errors
/// Fails if a global subscriber is already installed.
pub fn init_console_logging(debug_flags: &CrateDebugFlags, default_level: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(debug_flags, default_level))
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))
}

/// Install a test-writer subscriber; safe to call from every test
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

#[cfg(feature = "file-logging")]
pub use file::{init_logging, LoggingGuard};

#[cfg(feature = "file-logging")]
mod file {
    use super::build_filter;
    use crate::cli::CrateDebugFlags;
    use anyhow::{anyhow, Context, Result};
    use chrono::{NaiveDateTime, Utc};
    use std::path::{Path, PathBuf};
    use tracing_appender::rolling;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{Layer, Registry};

    const RUN_PREFIX: &str = "run_";
    const RUN_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

    /// Keeps the non-blocking file writer alive; logs flush on drop
    pub struct LoggingGuard {
        _file_guard: tracing_appender::non_blocking::WorkerGuard,
        log_dir: PathBuf,
    }

    impl LoggingGuard {
        /// Get the run folder path
        pub fn log_dir(&self) -> &Path {
            &self.log_dir
        }
    }

    /// Initialize console + file logging
    ///
    /// Creates a timestamped folder structure:
    /// ```text
    /// ./logs/
    ///   └── run_20250101_120000/
    ///       └── lamina.log.<date>
    /// ```
    ///
    /// # Arguments
    /// * `debug_flags` - Per-crate debug flags for filtering
    /// * `default_level` - Level for crates without a debug flag
    /// * `log_dir` - Base directory for logs (default: `./logs`)
    /// * `retention_runs` - Keep N most recent runs (default: 10)
    pub fn init_logging(
        debug_flags: &CrateDebugFlags,
        default_level: &str,
        log_dir: Option<PathBuf>,
        retention_runs: Option<usize>,
    ) -> Result<LoggingGuard> {
        let base_log_dir = log_dir.unwrap_or_else(|| PathBuf::from("./logs"));

        let timestamp = Utc::now().format(RUN_TIMESTAMP_FORMAT);
        let run_folder = base_log_dir.join(format!("{}{}", RUN_PREFIX, timestamp));
        std::fs::create_dir_all(&run_folder)
            .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;

        cleanup_old_runs(&base_log_dir, retention_runs.unwrap_or(10))?;

        let console_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_filter(build_filter(debug_flags, default_level))
            .boxed();

        let (non_blocking, file_guard) =
            tracing_appender::non_blocking(rolling::daily(&run_folder, "lamina.log"));
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(build_filter(debug_flags, default_level))
            .boxed();

        Registry::default()
            .with(vec![console_layer, file_layer])
            .try_init()
            .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

        Ok(LoggingGuard {
            _file_guard: file_guard,
            log_dir: run_folder,
        })
    }

    /// Remove all but the `keep` most recent run folders
    fn cleanup_old_runs(base_log_dir: &Path, keep: usize) -> Result<()> {
        let mut runs: Vec<(PathBuf, NaiveDateTime)> = Vec::new();

        for entry in std::fs::read_dir(base_log_dir)? {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            let stamp = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_prefix(RUN_PREFIX))
                .and_then(|s| NaiveDateTime::parse_from_str(s, RUN_TIMESTAMP_FORMAT).ok());
            if let Some(stamp) = stamp {
                runs.push((path, stamp));
            }
        }

        if runs.len() <= keep {
            return Ok(());
        }

        // Oldest first
        runs.sort_by_key(|(_, stamp)| *stamp);
        let excess = runs.len() - keep;
        for (path, _) in runs.iter().take(excess) {
            if let Err(e) = std::fs::remove_dir_all(path) {
                eprintln!(
                    "Warning: Failed to remove old log directory {}: {}",
                    path.display(),
                    e
                );
            }
        }
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_cleanup_keeps_most_recent_runs() {
            let dir = tempfile::tempdir().unwrap();
            for stamp in ["20250101_000000", "20250102_000000", "20250103_000000"] {
                std::fs::create_dir(dir.path().join(format!("run_{}", stamp))).unwrap();
            }
            std::fs::create_dir(dir.path().join("not_a_run")).unwrap();

            cleanup_old_runs(dir.path(), 2).unwrap();

            assert!(!dir.path().join("run_20250101_000000").exists());
            assert!(dir.path().join("run_20250102_000000").exists());
            assert!(dir.path().join("run_20250103_000000").exists());
            assert!(dir.path().join("not_a_run").exists());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_logging_is_idempotent() {
        init_test_logging();
        init_test_logging();
        tracing::info!("[TEST] logging initialized twice");
    }
}

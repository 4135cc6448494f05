//! Process runner trait and implementations.
//!
//! Runners consume [`ProcessDescriptor`]s and own everything about the OS
//! process: spawning, I/O capture, timeouts and killing.

mod local;

pub use local::LocalRunner;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::command::ProcessDescriptor;

/// Result of launching one phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct PhaseOutput {
    /// Exit code of the process (0 = success, -1 when killed by a signal).
    pub exit_code: i32,
    /// Captured stdout.
    pub stdout: String,
    /// Captured stderr.
    pub stderr: String,
    /// The process was killed after exceeding its timeout.
    pub timed_out: bool,
}

impl PhaseOutput {
    pub const fn succeeded(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }
}

/// Per-phase timeouts.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub compile_timeout: Duration,
    pub run_timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            compile_timeout: Duration::from_secs(30),
            run_timeout: Duration::from_secs(10),
        }
    }
}

impl RunnerConfig {
    /// Create from environment variables, falling back to defaults.
    ///
    /// Reads `COMPILE_TIMEOUT` and `RUN_TIMEOUT` (in seconds).
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            compile_timeout: std::env::var("COMPILE_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .map_or(defaults.compile_timeout, Duration::from_secs),
            run_timeout: std::env::var("RUN_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .map_or(defaults.run_timeout, Duration::from_secs),
        }
    }
}

/// Launches resolved descriptors.
///
/// Implementations are never handed a no-op descriptor by
/// [`crate::pipeline::execute`]; direct callers must skip those themselves.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Launch the descriptor and wait for it, killing it after `timeout`.
    ///
    /// A timeout is reported through [`PhaseOutput::timed_out`]; `Err` is
    /// reserved for failures to launch or observe the process.
    async fn launch(&self, descriptor: &ProcessDescriptor, timeout: Duration)
        -> Result<PhaseOutput>;
}

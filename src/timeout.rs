//! Timeout utilities for commands built by the loader.
//!
//! Spawning stays with the platform process launcher; this module only adds
//! a deadline on top of it so a misbehaving payload cannot hang the caller.

use crate::error::{LoaderError, Result};
use std::process::{Command, ExitStatus};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error};

/// Default timeout duration in seconds
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 300; // 5 minutes

/// Fast command timeout in seconds
pub const FAST_TIMEOUT_SECONDS: u64 = 10;

/// Timeout configuration for a spawned command
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Maximum duration for the command
    pub duration: Duration,
    /// Whether to log timeout errors
    pub log_warnings: bool,
    /// Operation name for logging
    pub operation_name: String,
}

impl TimeoutConfig {
    pub fn new(seconds: u64, operation: impl Into<String>) -> Self {
        Self {
            duration: Duration::from_secs(seconds),
            log_warnings: true,
            operation_name: operation.into(),
        }
    }

    /// Create a fast timeout configuration (10 seconds)
    pub fn fast(operation: impl Into<String>) -> Self {
        Self::new(FAST_TIMEOUT_SECONDS, operation)
    }

    /// Create a default timeout configuration (5 minutes)
    pub fn default_timeout(operation: impl Into<String>) -> Self {
        Self::new(DEFAULT_TIMEOUT_SECONDS, operation)
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Spawns `command` and waits for it, killing it if `config.duration` passes.
///
/// The handle that produced `command` must stay open until this returns.
///
/// # Errors
///
/// `Spawn` if the process cannot be started or waited on, `Timeout` if it
/// was killed at the deadline.
pub async fn run_with_timeout(command: Command, config: TimeoutConfig) -> Result<ExitStatus> {
    let mut command = tokio::process::Command::from(command);
    command.kill_on_drop(true);
    let mut child = command.spawn().map_err(LoaderError::Spawn)?;

    debug!(
        "Started '{}' (pid {:?}) with timeout of {:?}",
        config.operation_name,
        child.id(),
        config.duration
    );

    match timeout(config.duration, child.wait()).await {
        Ok(status) => {
            let status = status.map_err(LoaderError::Spawn)?;
            debug!("'{}' exited with {}", config.operation_name, status);
            Ok(status)
        }
        Err(_) => {
            if config.log_warnings {
                error!(
                    "'{}' timed out after {:?}, killing it",
                    config.operation_name, config.duration
                );
            }
            // Reap it so no zombie outlives the call.
            if child.kill().await.is_err() {
                debug!("'{}' already exited before kill", config.operation_name);
            }
            Err(LoaderError::Timeout {
                millis: u64::try_from(config.duration.as_millis()).unwrap_or(u64::MAX),
            })
        }
    }
}

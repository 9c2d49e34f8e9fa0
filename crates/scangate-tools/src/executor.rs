// scangate-tools/src/executor.rs
// ============================================================================
// Module: Bounded Executor
// Description: Child-process execution with a hard wall-clock budget.
// Purpose: Run wrapped engines and kill them at the descriptor timeout.
// Dependencies: std process and io
// ============================================================================

//! ## Overview
//! The executor runs one [`EngineCommand`] as a child process with stdout
//! redirected to the run's artifact file. The descriptor timeout is absolute:
//! on expiry the process is killed and the run reports a timeout. Standard
//! error is drained on a separate thread so a chatty engine cannot deadlock
//! the pipe.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process::Command;
use std::process::Stdio;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use thiserror::Error;

use crate::adapter::EngineCommand;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Interval between child status polls.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Maximum bytes of standard error retained for diagnostics.
const MAX_STDERR_BYTES: usize = 64 * 1024;

// ============================================================================
// SECTION: Errors and Outcomes
// ============================================================================

/// Errors raised while executing an engine.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The artifact file or results directory could not be prepared.
    #[error("artifact preparation failed: {0}")]
    Artifact(String),
    /// The engine process could not be started.
    #[error("engine failed to start: {0}")]
    Spawn(String),
    /// Waiting on the engine process failed.
    #[error("engine wait failed: {0}")]
    Wait(String),
    /// The engine exceeded its wall-clock budget and was killed.
    #[error("engine exceeded its {}s timeout and was terminated", .limit.as_secs())]
    Timeout {
        /// Budget that was exceeded.
        limit: Duration,
    },
}

/// Result of one completed engine run.
#[derive(Debug)]
pub struct ToolOutcome {
    /// Engine exit code, when the platform reports one.
    pub exit_code: Option<i32>,
    /// Artifact file holding the engine's standard output.
    pub artifact: PathBuf,
    /// Wall-clock duration of the run.
    pub duration: Duration,
    /// Retained standard-error text for diagnostics.
    pub stderr: String,
}

impl ToolOutcome {
    /// Returns true when the engine exited with status zero.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0)
    }
}

// ============================================================================
// SECTION: Executor
// ============================================================================

/// Bounded child-process executor.
#[derive(Debug, Default, Clone, Copy)]
pub struct ToolExecutor;

impl ToolExecutor {
    /// Creates an executor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Runs an engine command under the given wall-clock budget.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError`] when the process cannot run or exceeds the
    /// budget; on timeout the child is killed before returning.
    pub fn execute(
        &self,
        command: &EngineCommand,
        timeout: Duration,
    ) -> Result<ToolOutcome, ExecutionError> {
        if let Some(parent) = command.artifact.parent() {
            fs::create_dir_all(parent).map_err(|err| ExecutionError::Artifact(err.to_string()))?;
        }
        let artifact_file = fs::File::create(&command.artifact)
            .map_err(|err| ExecutionError::Artifact(err.to_string()))?;

        let started = Instant::now();
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::from(artifact_file))
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| ExecutionError::Spawn(err.to_string()))?;

        let stderr_handle = child.stderr.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut buffer = Vec::new();
                let _ = pipe.read_to_end(&mut buffer);
                buffer.truncate(MAX_STDERR_BYTES);
                String::from_utf8_lossy(&buffer).into_owned()
            })
        });

        loop {
            match child.try_wait() {
                Ok(Some(_)) => break,
                Ok(None) => {
                    if started.elapsed() >= timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        if let Some(handle) = stderr_handle {
                            let _ = handle.join();
                        }
                        return Err(ExecutionError::Timeout {
                            limit: timeout,
                        });
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(err) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    if let Some(handle) = stderr_handle {
                        let _ = handle.join();
                    }
                    return Err(ExecutionError::Wait(err.to_string()));
                }
            }
        }

        // The child has exited; wait() returns the cached status.
        let status = child.wait().map_err(|err| ExecutionError::Wait(err.to_string()))?;
        let stderr = stderr_handle.and_then(|handle| handle.join().ok()).unwrap_or_default();
        Ok(ToolOutcome {
            exit_code: status.code(),
            artifact: command.artifact.clone(),
            duration: started.elapsed(),
            stderr,
        })
    }
}

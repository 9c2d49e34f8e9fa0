// scangate-tools/tests/executor_runs.rs
// ============================================================================
// Module: Executor Tests
// Description: Bounded child-process execution and timeout termination.
// ============================================================================
//! ## Overview
//! Runs small real processes through the executor: stdout lands in the
//! artifact file, exit codes are reported, and a process that outlives its
//! budget is killed with a timeout error.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use scangate_tools::EngineCommand;
use scangate_tools::ExecutionError;
use scangate_tools::ToolExecutor;

fn command(program: &str, args: &[&str], artifact: PathBuf) -> EngineCommand {
    EngineCommand {
        program: PathBuf::from(program),
        args: args.iter().map(|arg| (*arg).to_string()).collect(),
        artifact,
    }
}

#[test]
fn stdout_is_captured_into_the_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("echo.txt");
    let outcome = ToolExecutor::new()
        .execute(&command("/bin/echo", &["captured"], artifact.clone()), Duration::from_secs(10))
        .unwrap();
    assert!(outcome.succeeded());
    assert_eq!(fs::read_to_string(&artifact).unwrap(), "captured\n");
}

#[test]
fn nonzero_exit_codes_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("false.txt");
    let outcome = ToolExecutor::new()
        .execute(&command("/bin/false", &[], artifact), Duration::from_secs(10))
        .unwrap();
    assert!(!outcome.succeeded());
}

#[test]
fn missing_engine_binary_fails_to_spawn() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("none.txt");
    let error = ToolExecutor::new()
        .execute(&command("/nonexistent/engine", &[], artifact), Duration::from_secs(10))
        .unwrap_err();
    assert!(matches!(error, ExecutionError::Spawn(_)));
}

#[test]
fn overlong_process_is_killed_at_the_budget() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("sleep.txt");
    let started = std::time::Instant::now();
    let error = ToolExecutor::new()
        .execute(&command("/bin/sleep", &["30"], artifact), Duration::from_millis(300))
        .unwrap_err();
    assert!(matches!(error, ExecutionError::Timeout { .. }));
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[test]
fn results_directory_is_created_on_demand() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("nested/deeper/out.txt");
    let outcome = ToolExecutor::new()
        .execute(&command("/bin/echo", &["ok"], artifact.clone()), Duration::from_secs(10))
        .unwrap();
    assert!(outcome.succeeded());
    assert!(artifact.exists());
}

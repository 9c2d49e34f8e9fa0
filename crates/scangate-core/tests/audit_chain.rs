// scangate-core/tests/audit_chain.rs
// ============================================================================
// Module: Audit Chain Tests
// Description: Hash-chain integrity of the file audit sink.
// ============================================================================
//! ## Overview
//! Verifies that appended records link to their predecessors, that the chain
//! survives reopening the file, and that edits or truncation are detected.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]

use std::fs;

use scangate_core::AuditEvent;
use scangate_core::AuditSink;
use scangate_core::Decision;
use scangate_core::FileAuditSink;
use scangate_core::GateStage;
use scangate_core::Severity;
use scangate_core::verify_chain;

fn event(seconds: i64, message: &str) -> AuditEvent {
    AuditEvent {
        unix_seconds: seconds,
        severity: Severity::Info,
        correlation_id: "c0ffee".to_string(),
        actor: Some("alice".to_string()),
        origin: Some("local".to_string()),
        stage: GateStage::Authenticate,
        decision: Decision::Allow,
        message: message.to_string(),
    }
}

#[test]
fn chain_verifies_after_appends() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.log");
    let sink = FileAuditSink::open(&path).unwrap();
    for index in 0 .. 5 {
        sink.record(event(1_700_000_000 + index, &format!("record {index}"))).unwrap();
    }
    assert_eq!(verify_chain(&path).unwrap(), 5);
}

#[test]
fn chain_resumes_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.log");
    {
        let sink = FileAuditSink::open(&path).unwrap();
        sink.record(event(1_700_000_000, "first")).unwrap();
    }
    {
        let sink = FileAuditSink::open(&path).unwrap();
        sink.record(event(1_700_000_001, "second")).unwrap();
    }
    assert_eq!(verify_chain(&path).unwrap(), 2);
}

#[test]
fn edited_record_breaks_the_chain() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.log");
    let sink = FileAuditSink::open(&path).unwrap();
    sink.record(event(1_700_000_000, "first")).unwrap();
    sink.record(event(1_700_000_001, "second")).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let tampered = content.replacen("first", "fixed", 1);
    assert_ne!(content, tampered);
    fs::write(&path, tampered).unwrap();

    assert!(verify_chain(&path).is_err());
}

#[test]
fn deleted_record_breaks_the_chain() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.log");
    let sink = FileAuditSink::open(&path).unwrap();
    for index in 0 .. 3 {
        sink.record(event(1_700_000_000 + index, &format!("record {index}"))).unwrap();
    }
    let content = fs::read_to_string(&path).unwrap();
    let mut lines: Vec<&str> = content.lines().collect();
    lines.remove(1);
    fs::write(&path, format!("{}\n", lines.join("\n"))).unwrap();

    assert!(verify_chain(&path).is_err());
}

#[test]
fn empty_log_verifies_as_zero_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.log");
    fs::write(&path, b"").unwrap();
    assert_eq!(verify_chain(&path).unwrap(), 0);
}

#[test]
fn opening_a_tampered_log_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.log");
    {
        let sink = FileAuditSink::open(&path).unwrap();
        sink.record(event(1_700_000_000, "first")).unwrap();
        sink.record(event(1_700_000_001, "second")).unwrap();
    }
    let content = fs::read_to_string(&path).unwrap();
    fs::write(&path, content.replacen("alice", "admin", 1)).unwrap();
    assert!(FileAuditSink::open(&path).is_err());
}

// scangate-core/src/core/audit.rs
// ============================================================================
// Module: Scangate Audit Log
// Description: Append-only, hash-chained audit records for gate decisions.
// Purpose: Make every decision durable and every tampering attempt evident.
// Dependencies: serde, serde_json, scangate hashing
// ============================================================================

//! ## Overview
//! Every guard stage emits exactly one audit record per request, in stage
//! order. Records are JSON lines; each record embeds the canonical SHA-256
//! digest of its predecessor, so truncating or editing the log breaks the
//! chain. A sink that cannot accept a record is a fatal condition for the
//! in-flight request: the gateway never performs an unaudited action.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::hashing::canonical_json_bytes;
use crate::core::hashing::digest_bytes;
use crate::core::time::render_rfc3339;

// ============================================================================
// SECTION: Severity and Stages
// ============================================================================

/// Severity of an audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Routine decision.
    Info,
    /// Denied or degraded decision worth operator attention.
    Warn,
    /// Failure or posture loss.
    Error,
}

/// Guard-chain stage that produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateStage {
    /// Credential verification.
    Authenticate,
    /// Authorized-user membership check.
    Authorize,
    /// Sliding-window rate admission.
    RateLimit,
    /// Target allow/deny resolution.
    ValidateTarget,
    /// Invocation descriptor construction.
    BuildPolicy,
    /// External engine execution.
    Execute,
    /// Artifact sealing.
    Seal,
}

/// Outcome of a stage decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// The stage admitted the request.
    Allow,
    /// The stage rejected the request.
    Deny,
}

// ============================================================================
// SECTION: Events and Records
// ============================================================================

/// Caller-supplied portion of an audit record.
///
/// # Invariants
/// - Timestamps are supplied by the caller's clock; sinks never read the
///   wall clock themselves.
/// - Messages must not contain secret material or enumerate policy contents.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    /// Event time in unix seconds.
    pub unix_seconds: i64,
    /// Record severity.
    pub severity: Severity,
    /// Correlation identifier of the request.
    pub correlation_id: String,
    /// Acting principal, when resolved.
    pub actor: Option<String>,
    /// Origin address of the request, when known.
    pub origin: Option<String>,
    /// Stage that produced the record.
    pub stage: GateStage,
    /// Stage outcome.
    pub decision: Decision,
    /// Human-readable decision summary.
    pub message: String,
}

/// One durable audit record.
///
/// # Invariants
/// - `prev` is the canonical digest of the previous record line, or absent
///   for the first record in a log.
/// - Records are append-only; normal operation never mutates or deletes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Zero-based position in the log.
    pub seq: u64,
    /// Event time in unix seconds.
    pub unix_seconds: i64,
    /// Event time rendered as RFC 3339 UTC.
    pub time: String,
    /// Record severity.
    pub severity: Severity,
    /// Correlation identifier of the request.
    pub correlation_id: String,
    /// Acting principal, when resolved.
    pub actor: Option<String>,
    /// Origin address of the request, when known.
    pub origin: Option<String>,
    /// Stage that produced the record.
    pub stage: GateStage,
    /// Stage outcome.
    pub decision: Decision,
    /// Human-readable decision summary.
    pub message: String,
    /// Canonical digest of the previous record line.
    pub prev: Option<String>,
}

impl AuditRecord {
    /// Builds a record from an event plus chain position data.
    #[must_use]
    fn from_event(event: AuditEvent, seq: u64, prev: Option<String>) -> Self {
        Self {
            seq,
            unix_seconds: event.unix_seconds,
            time: render_rfc3339(event.unix_seconds),
            severity: event.severity,
            correlation_id: event.correlation_id,
            actor: event.actor,
            origin: event.origin,
            stage: event.stage,
            decision: event.decision,
            message: event.message,
            prev,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by audit sinks and chain verification.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The sink could not accept the record; fatal for the request.
    #[error("audit sink unavailable: {0}")]
    SinkUnavailable(String),
    /// The record could not be serialized.
    #[error("audit record serialization failed: {0}")]
    Serialization(String),
    /// Sink state was poisoned by a panicking writer.
    #[error("audit sink lock poisoned")]
    Poisoned,
    /// A stored record line does not parse.
    #[error("audit log line {0} is not a valid record")]
    MalformedRecord(u64),
    /// A stored record's chain link does not match its predecessor.
    #[error("audit chain broken at line {0}")]
    ChainBroken(u64),
}

// ============================================================================
// SECTION: Sink Trait
// ============================================================================

/// Append-only audit record sink.
pub trait AuditSink: Send + Sync {
    /// Records one event.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError`] when the record cannot be durably written;
    /// callers must abort the in-flight request.
    fn record(&self, event: AuditEvent) -> Result<(), AuditError>;
}

// ============================================================================
// SECTION: File Sink
// ============================================================================

/// Chain position carried between appends.
#[derive(Debug)]
struct ChainState {
    /// Open append handle.
    file: fs::File,
    /// Next sequence number.
    next_seq: u64,
    /// Digest of the most recent record line.
    prev: Option<String>,
}

/// Hash-chained audit sink appending JSON lines to a file.
#[derive(Debug)]
pub struct FileAuditSink {
    /// Serialized chain state.
    state: Mutex<ChainState>,
}

impl FileAuditSink {
    /// Opens (or creates) the audit log and resumes its chain.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError`] when the file cannot be opened or an existing
    /// log does not verify.
    pub fn open(path: &Path) -> Result<Self, AuditError> {
        let existing = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(AuditError::SinkUnavailable(err.to_string())),
        };
        let (next_seq, prev) = resume_chain(&existing)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|err| AuditError::SinkUnavailable(err.to_string()))?;
        Ok(Self {
            state: Mutex::new(ChainState {
                file,
                next_seq,
                prev,
            }),
        })
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, event: AuditEvent) -> Result<(), AuditError> {
        let mut state = self.state.lock().map_err(|_| AuditError::Poisoned)?;
        let record = AuditRecord::from_event(event, state.next_seq, state.prev.clone());
        let bytes = canonical_json_bytes(&record)
            .map_err(|err| AuditError::Serialization(err.to_string()))?;
        state
            .file
            .write_all(&bytes)
            .and_then(|()| state.file.write_all(b"\n"))
            .and_then(|()| state.file.flush())
            .map_err(|err| AuditError::SinkUnavailable(err.to_string()))?;
        state.prev = Some(digest_bytes(&bytes));
        state.next_seq += 1;
        Ok(())
    }
}

/// Walks an existing log and returns the resume position.
fn resume_chain(bytes: &[u8]) -> Result<(u64, Option<String>), AuditError> {
    if bytes.is_empty() {
        return Ok((0, None));
    }
    let content =
        std::str::from_utf8(bytes).map_err(|err| AuditError::SinkUnavailable(err.to_string()))?;
    let mut seq: u64 = 0;
    let mut prev: Option<String> = None;
    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let record: AuditRecord =
            serde_json::from_str(line).map_err(|_| AuditError::MalformedRecord(seq))?;
        if record.prev != prev {
            return Err(AuditError::ChainBroken(seq));
        }
        prev = Some(digest_bytes(line.as_bytes()));
        seq += 1;
    }
    Ok((seq, prev))
}

/// Verifies the hash chain of a stored audit log.
///
/// Returns the number of verified records.
///
/// # Errors
///
/// Returns [`AuditError`] when the log is unreadable, a line does not parse,
/// or a chain link does not match its predecessor.
pub fn verify_chain(path: &Path) -> Result<u64, AuditError> {
    let bytes = fs::read(path).map_err(|err| AuditError::SinkUnavailable(err.to_string()))?;
    let (count, _) = resume_chain(&bytes)?;
    Ok(count)
}

// ============================================================================
// SECTION: Auxiliary Sinks
// ============================================================================

/// Audit sink buffering records in memory for tests and diagnostics.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    /// Buffered records in append order.
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditSink {
    /// Creates an empty memory sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all buffered records.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Poisoned`] when the buffer lock is poisoned.
    pub fn records(&self) -> Result<Vec<AuditRecord>, AuditError> {
        Ok(self.records.lock().map_err(|_| AuditError::Poisoned)?.clone())
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: AuditEvent) -> Result<(), AuditError> {
        let mut records = self.records.lock().map_err(|_| AuditError::Poisoned)?;
        let seq = records.len() as u64;
        records.push(AuditRecord::from_event(event, seq, None));
        Ok(())
    }
}

/// Audit sink writing JSON lines to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record(&self, event: AuditEvent) -> Result<(), AuditError> {
        let record = AuditRecord::from_event(event, 0, None);
        let payload = serde_json::to_string(&record)
            .map_err(|err| AuditError::Serialization(err.to_string()))?;
        writeln!(std::io::stderr(), "{payload}")
            .map_err(|err| AuditError::SinkUnavailable(err.to_string()))
    }
}

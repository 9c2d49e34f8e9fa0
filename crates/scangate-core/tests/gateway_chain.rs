// scangate-core/tests/gateway_chain.rs
// ============================================================================
// Module: Gateway Chain Tests
// Description: Full guard-chain scenarios with audit and ledger assertions.
// ============================================================================
//! ## Overview
//! End-to-end guard-chain runs: the happy path produces one allow record per
//! stage in order; denied stages stop the chain; a target denied after rate
//! admission leaves its ledger entry in place (the chain order is fixed).

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]

use std::collections::BTreeSet;
use std::sync::Arc;

use scangate_core::AuthMode;
use scangate_core::Authenticator;
use scangate_core::ClearedTarget;
use scangate_core::CorrelationId;
use scangate_core::CredentialRecord;
use scangate_core::CredentialStore;
use scangate_core::Decision;
use scangate_core::GateError;
use scangate_core::GateRequest;
use scangate_core::GateStage;
use scangate_core::Gateway;
use scangate_core::GatewayParams;
use scangate_core::ManualClock;
use scangate_core::MemoryAuditSink;
use scangate_core::OperationName;
use scangate_core::PolicySnapshot;
use scangate_core::PolicyStore;
use scangate_core::PresentedSecret;
use scangate_core::TargetDeniedKind;
use scangate_core::TargetRequest;
use scangate_core::Username;
use scangate_core::parse_network;

/// Builds a gateway with alice authorized, private ranges allowed, and the
/// public-resolver deny entries in place.
fn gateway(sink: Arc<MemoryAuditSink>, clock: Arc<ManualClock>) -> Gateway {
    let record =
        CredentialRecord::provision(Username::new("alice"), &PresentedSecret::new("s3cret"));
    let store = CredentialStore::from_records(vec![record]);
    let mut users = BTreeSet::new();
    users.insert("alice".to_string());
    let allow = vec![parse_network("192.168.0.0/16").unwrap()];
    let deny = vec![parse_network("8.8.8.8").unwrap(), parse_network("127.0.0.0/8").unwrap()];
    let snapshot = PolicySnapshot::from_parts(users, allow, deny);
    Gateway::new(GatewayParams {
        authenticator: Authenticator::new(AuthMode::Enabled(store)),
        policy: Arc::new(PolicyStore::fixed(snapshot)),
        rate_ceiling: 10,
        max_target_hosts: 256,
        evidence_root: None,
        audit: sink,
        clock,
    })
}

fn request(target: &str) -> GateRequest {
    GateRequest {
        username: Username::new("alice"),
        secret: Some(PresentedSecret::new("s3cret")),
        operation: OperationName::new("portscan"),
        target: TargetRequest::Network(target.to_string()),
        origin: Some("local".to_string()),
        correlation_id: CorrelationId::new("test-run"),
    }
}

#[test]
fn happy_path_emits_one_allow_record_per_stage_in_order() {
    let sink = Arc::new(MemoryAuditSink::new());
    let clock = Arc::new(ManualClock::new(1_700_000_000));
    let gate = gateway(Arc::clone(&sink), clock);

    let clearance = gate.clear(&request("192.168.1.50")).unwrap();
    match clearance.target {
        ClearedTarget::Network(network) => assert_eq!(network.to_string(), "192.168.1.50/32"),
        ClearedTarget::Evidence(_) => unreachable!("network request clears to a network"),
    }

    let records = sink.records().unwrap();
    let stages: Vec<GateStage> = records.iter().map(|record| record.stage).collect();
    assert_eq!(
        stages,
        vec![
            GateStage::Authenticate,
            GateStage::Authorize,
            GateStage::RateLimit,
            GateStage::ValidateTarget,
        ]
    );
    assert!(records.iter().all(|record| record.decision == Decision::Allow));
    assert!(records.iter().all(|record| record.correlation_id == "test-run"));
}

#[test]
fn wrong_secret_stops_the_chain_at_authentication() {
    let sink = Arc::new(MemoryAuditSink::new());
    let clock = Arc::new(ManualClock::new(1_700_000_000));
    let gate = gateway(Arc::clone(&sink), clock);

    let mut bad = request("192.168.1.50");
    bad.secret = Some(PresentedSecret::new("wrong"));
    let error = gate.clear(&bad).unwrap_err();
    assert!(matches!(error, GateError::Authentication));

    let records = sink.records().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].stage, GateStage::Authenticate);
    assert_eq!(records[0].decision, Decision::Deny);
    // Nothing was written to the ledger for a request that never got there.
    let live = gate
        .limiter()
        .ledger()
        .count(&Username::new("alice"), &OperationName::new("portscan"), 1_700_000_000)
        .unwrap();
    assert_eq!(live, 0);
}

#[test]
fn unauthorized_user_stops_after_authentication() {
    let sink = Arc::new(MemoryAuditSink::new());
    let clock = Arc::new(ManualClock::new(1_700_000_000));
    let record = CredentialRecord::provision(Username::new("bob"), &PresentedSecret::new("pw"));
    let store = CredentialStore::from_records(vec![record]);
    let mut users = BTreeSet::new();
    users.insert("alice".to_string());
    let snapshot = PolicySnapshot::from_parts(
        users,
        vec![parse_network("192.168.0.0/16").unwrap()],
        Vec::new(),
    );
    let gate = Gateway::new(GatewayParams {
        authenticator: Authenticator::new(AuthMode::Enabled(store)),
        policy: Arc::new(PolicyStore::fixed(snapshot)),
        rate_ceiling: 10,
        max_target_hosts: 256,
        evidence_root: None,
        audit: Arc::clone(&sink) as Arc<dyn scangate_core::AuditSink>,
        clock,
    });

    let bob = GateRequest {
        username: Username::new("bob"),
        secret: Some(PresentedSecret::new("pw")),
        operation: OperationName::new("portscan"),
        target: TargetRequest::Network("192.168.1.50".to_string()),
        origin: None,
        correlation_id: CorrelationId::generate(),
    };
    let error = gate.clear(&bob).unwrap_err();
    assert!(matches!(error, GateError::Authorization));
    let records = sink.records().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].stage, GateStage::Authorize);
    assert_eq!(records[1].decision, Decision::Deny);
}

#[test]
fn denied_resolver_target_keeps_its_rate_ledger_entry() {
    // Chain order is fixed: the rate stage runs (and records) before the
    // target stage denies the public resolver address.
    let sink = Arc::new(MemoryAuditSink::new());
    let clock = Arc::new(ManualClock::new(1_700_000_000));
    let gate = gateway(Arc::clone(&sink), clock);

    let error = gate.clear(&request("8.8.8.8")).unwrap_err();
    assert!(matches!(
        error,
        GateError::TargetDenied {
            kind: TargetDeniedKind::DenyMatch,
        }
    ));

    let records = sink.records().unwrap();
    let stages: Vec<GateStage> = records.iter().map(|record| record.stage).collect();
    assert_eq!(
        stages,
        vec![
            GateStage::Authenticate,
            GateStage::Authorize,
            GateStage::RateLimit,
            GateStage::ValidateTarget,
        ]
    );
    assert_eq!(records[3].decision, Decision::Deny);

    let live = gate
        .limiter()
        .ledger()
        .count(&Username::new("alice"), &OperationName::new("portscan"), 1_700_000_000)
        .unwrap();
    assert_eq!(live, 1);
}

#[test]
fn eleventh_request_in_a_minute_is_throttled() {
    let sink = Arc::new(MemoryAuditSink::new());
    let clock = Arc::new(ManualClock::new(1_700_000_000));
    let gate = gateway(Arc::clone(&sink), Arc::clone(&clock));

    for second in 0 .. 10 {
        clock.set(1_700_000_000 + second);
        gate.clear(&request("192.168.1.50")).unwrap();
    }
    clock.set(1_700_000_000 + 59);
    let error = gate.clear(&request("192.168.1.50")).unwrap_err();
    assert!(matches!(error, GateError::RateLimited { .. }));

    let records = sink.records().unwrap();
    let throttle = records.last().unwrap();
    assert_eq!(throttle.stage, GateStage::RateLimit);
    assert_eq!(throttle.decision, Decision::Deny);
}

#[test]
fn bypassed_authentication_is_audited_at_warn() {
    let sink = Arc::new(MemoryAuditSink::new());
    let clock = Arc::new(ManualClock::new(1_700_000_000));
    let mut users = BTreeSet::new();
    users.insert("alice".to_string());
    let snapshot = PolicySnapshot::from_parts(
        users,
        vec![parse_network("192.168.0.0/16").unwrap()],
        Vec::new(),
    );
    let gate = Gateway::new(GatewayParams {
        authenticator: Authenticator::new(AuthMode::Disabled),
        policy: Arc::new(PolicyStore::fixed(snapshot)),
        rate_ceiling: 10,
        max_target_hosts: 256,
        evidence_root: None,
        audit: Arc::clone(&sink) as Arc<dyn scangate_core::AuditSink>,
        clock,
    });

    let mut bare = request("192.168.1.50");
    bare.secret = None;
    gate.clear(&bare).unwrap();

    let records = sink.records().unwrap();
    assert_eq!(records[0].stage, GateStage::Authenticate);
    assert_eq!(records[0].decision, Decision::Allow);
    assert_eq!(records[0].severity, scangate_core::Severity::Warn);
    assert!(records[0].message.contains("bypass"));
}

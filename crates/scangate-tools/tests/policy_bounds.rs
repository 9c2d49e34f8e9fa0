// scangate-tools/tests/policy_bounds.rs
// ============================================================================
// Module: Policy Bounds Tests
// Description: Mode enumeration and resource-ceiling enforcement per class.
// ============================================================================
//! ## Overview
//! Verifies that every builder rejects unknown modes and over-ceiling
//! resources outright, and that descriptors carry the configured (not
//! caller-supplied) timeout and rate bounds.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]

use std::time::Duration;

use scangate_core::Clearance;
use scangate_core::ClearedTarget;
use scangate_core::CorrelationId;
use scangate_core::Identity;
use scangate_core::OperationName;
use scangate_core::Username;
use scangate_core::parse_network;
use scangate_tools::DiskScanLimits;
use scangate_tools::DiskScanPolicy;
use scangate_tools::DiskScanRequest;
use scangate_tools::InvocationError;
use scangate_tools::MemScanLimits;
use scangate_tools::MemScanPolicy;
use scangate_tools::MemScanRequest;
use scangate_tools::PortScanLimits;
use scangate_tools::PortScanMode;
use scangate_tools::PortScanPolicy;
use scangate_tools::PortScanRequest;
use scangate_tools::ToolAction;
use scangate_tools::VulnScanLimits;
use scangate_tools::VulnScanPolicy;
use scangate_tools::VulnScanRequest;

fn network_clearance(target: &str, operation: &str) -> Clearance {
    Clearance {
        identity: Identity::verified(Username::new("alice")),
        operation: OperationName::new(operation),
        target: ClearedTarget::Network(parse_network(target).unwrap()),
        correlation_id: CorrelationId::new("fixture"),
    }
}

fn evidence_clearance(operation: &str) -> Clearance {
    Clearance {
        identity: Identity::verified(Username::new("alice")),
        operation: OperationName::new(operation),
        target: ClearedTarget::Evidence("/evidence/image.raw".into()),
        correlation_id: CorrelationId::new("fixture"),
    }
}

#[test]
fn quick_scan_with_ports_under_ceiling_builds() {
    let policy = PortScanPolicy::new(PortScanLimits {
        max_ports: 1000,
        timeout: Duration::from_secs(600),
        packet_rate_ceiling: 100,
    });
    let clearance = network_clearance("192.168.1.50", "portscan");
    let descriptor = policy
        .build(
            &clearance,
            &PortScanRequest {
                mode: "quick".to_string(),
                ports: Some("1-500".to_string()),
            },
        )
        .unwrap();
    match &descriptor.action {
        ToolAction::PortScan {
            mode,
            ports,
        } => {
            assert_eq!(*mode, PortScanMode::Quick);
            assert_eq!(ports.as_ref().unwrap().count(), 500);
        }
        _ => unreachable!("port scan builder produces port scan actions"),
    }
    assert_eq!(descriptor.timeout, Duration::from_secs(600));
    assert_eq!(descriptor.packet_rate_ceiling, 100);
}

#[test]
fn port_count_over_ceiling_is_rejected_not_truncated() {
    let policy = PortScanPolicy::new(PortScanLimits::default());
    let clearance = network_clearance("192.168.1.50", "portscan");
    let error = policy
        .build(
            &clearance,
            &PortScanRequest {
                mode: "quick".to_string(),
                ports: Some("1-1001".to_string()),
            },
        )
        .unwrap_err();
    assert!(matches!(
        error,
        InvocationError::ResourceCeiling {
            requested: 1001,
            ceiling: 1000,
            ..
        }
    ));
}

#[test]
fn unknown_port_scan_mode_is_rejected() {
    let policy = PortScanPolicy::new(PortScanLimits::default());
    let clearance = network_clearance("192.168.1.50", "portscan");
    for token in ["vuln", "stealth-frag", "exploit", ""] {
        let error = policy
            .build(
                &clearance,
                &PortScanRequest {
                    mode: token.to_string(),
                    ports: None,
                },
            )
            .unwrap_err();
        assert!(matches!(error, InvocationError::UnknownMode { .. }), "token `{token}`");
    }
}

#[test]
fn port_scan_rejects_evidence_targets() {
    let policy = PortScanPolicy::new(PortScanLimits::default());
    let clearance = evidence_clearance("portscan");
    let error = policy
        .build(
            &clearance,
            &PortScanRequest {
                mode: "quick".to_string(),
                ports: None,
            },
        )
        .unwrap_err();
    assert!(matches!(error, InvocationError::TargetMismatch { .. }));
}

#[test]
fn vulnscan_host_ceiling_applies_to_target_width() {
    let policy = VulnScanPolicy::new(VulnScanLimits {
        max_hosts: 16,
        timeout: Duration::from_secs(3600),
        packet_rate_ceiling: 50,
    });
    let narrow = network_clearance("192.168.1.0/28", "vulnscan");
    assert!(
        policy
            .build(
                &narrow,
                &VulnScanRequest {
                    mode: "fast".to_string(),
                },
            )
            .is_ok()
    );
    let wide = network_clearance("192.168.1.0/24", "vulnscan");
    let error = policy
        .build(
            &wide,
            &VulnScanRequest {
                mode: "fast".to_string(),
            },
        )
        .unwrap_err();
    assert!(matches!(error, InvocationError::ResourceCeiling { requested: 256, .. }));
}

#[test]
fn vulnscan_has_no_destructive_mode() {
    let policy = VulnScanPolicy::new(VulnScanLimits::default());
    let clearance = network_clearance("192.168.1.50", "vulnscan");
    for token in ["ultimate", "full_and_fast_ultimate", "dos"] {
        let error = policy
            .build(
                &clearance,
                &VulnScanRequest {
                    mode: token.to_string(),
                },
            )
            .unwrap_err();
        assert!(matches!(error, InvocationError::UnknownMode { .. }), "token `{token}`");
    }
}

#[test]
fn memscan_row_bound_is_clamped_by_rejection() {
    let policy = MemScanPolicy::new(MemScanLimits {
        max_rows: 10_000,
        timeout: Duration::from_secs(1800),
    });
    let clearance = evidence_clearance("memscan");
    let ok = policy
        .build(
            &clearance,
            &MemScanRequest {
                mode: "processes".to_string(),
                max_rows: Some(500),
            },
        )
        .unwrap();
    assert!(matches!(ok.action, ToolAction::MemoryForensics { max_rows: 500, .. }));
    let error = policy
        .build(
            &clearance,
            &MemScanRequest {
                mode: "processes".to_string(),
                max_rows: Some(10_001),
            },
        )
        .unwrap_err();
    assert!(matches!(error, InvocationError::ResourceCeiling { .. }));
}

#[test]
fn memscan_defaults_row_bound_to_ceiling() {
    let policy = MemScanPolicy::new(MemScanLimits::default());
    let clearance = evidence_clearance("memscan");
    let descriptor = policy
        .build(
            &clearance,
            &MemScanRequest {
                mode: "network".to_string(),
                max_rows: None,
            },
        )
        .unwrap();
    assert!(matches!(descriptor.action, ToolAction::MemoryForensics { max_rows: 10_000, .. }));
}

#[test]
fn diskscan_depth_bound_is_enforced() {
    let policy = DiskScanPolicy::new(DiskScanLimits {
        max_depth: 16,
        timeout: Duration::from_secs(1800),
    });
    let clearance = evidence_clearance("diskscan");
    let error = policy
        .build(
            &clearance,
            &DiskScanRequest {
                mode: "file-list".to_string(),
                max_depth: Some(64),
            },
        )
        .unwrap_err();
    assert!(matches!(error, InvocationError::ResourceCeiling { requested: 64, ceiling: 16, .. }));
}

#[test]
fn forensics_builders_reject_network_targets() {
    let mem = MemScanPolicy::new(MemScanLimits::default());
    let clearance = network_clearance("192.168.1.50", "memscan");
    let error = mem
        .build(
            &clearance,
            &MemScanRequest {
                mode: "processes".to_string(),
                max_rows: None,
            },
        )
        .unwrap_err();
    assert!(matches!(error, InvocationError::TargetMismatch { .. }));

    let disk = DiskScanPolicy::new(DiskScanLimits::default());
    let clearance = network_clearance("192.168.1.50", "diskscan");
    let error = disk
        .build(
            &clearance,
            &DiskScanRequest {
                mode: "timeline".to_string(),
                max_depth: None,
            },
        )
        .unwrap_err();
    assert!(matches!(error, InvocationError::TargetMismatch { .. }));
}

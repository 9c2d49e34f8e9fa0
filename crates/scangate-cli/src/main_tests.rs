// scangate-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Unit Tests
// Description: Sealer assembly, request construction, and CLI parsing.
// ============================================================================
//! ## Overview
//! Unit tests for the wiring helpers: sealer mode resolution from config,
//! gate request construction, and clap surface parsing.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]

use clap::Parser;
use scangate_core::TargetRequest;
use scangate_seal::generate_key;

use crate::Cli;
use crate::Commands;
use crate::IdentityArgs;
use crate::build_sealer;
use crate::network_request;

/// Builds a default config with sealing fields overridden.
fn seal_config(enabled: bool, key: Option<String>) -> scangate_config::ScangateConfig {
    scangate_config::ScangateConfig {
        seal: scangate_config::SealConfig {
            enabled,
            key,
            key_file: None,
        },
        ..Default::default()
    }
}

#[test]
fn sealer_is_disabled_when_config_disables_it() {
    let sealer = build_sealer(&seal_config(false, Some(generate_key()))).unwrap();
    assert!(!sealer.is_enabled());
}

#[test]
fn sealer_is_enabled_without_key_when_key_absent() {
    let sealer = build_sealer(&seal_config(true, None)).unwrap();
    assert!(sealer.is_enabled());
    assert!(sealer.seal(&["never-written".into()]).is_err());
}

#[test]
fn sealer_rejects_invalid_key_material() {
    assert!(build_sealer(&seal_config(true, Some("not-a-key".to_string()))).is_err());
}

#[test]
fn network_request_carries_operation_and_target() {
    let identity = IdentityArgs {
        user: "alice".to_string(),
    };
    let request = network_request(&identity, "portscan", "192.168.1.50");
    assert_eq!(request.username.as_str(), "alice");
    assert_eq!(request.operation.as_str(), "portscan");
    match request.target {
        TargetRequest::Network(raw) => assert_eq!(raw, "192.168.1.50"),
        TargetRequest::Evidence(_) => unreachable!("network request carries a network target"),
    }
}

#[test]
fn cli_parses_a_portscan_invocation() {
    let cli = Cli::parse_from([
        "scangate", "portscan", "--user", "alice", "--target", "192.168.1.50", "--mode", "quick",
        "--ports", "1-500",
    ]);
    match cli.command {
        Commands::Portscan(args) => {
            assert_eq!(args.identity.user, "alice");
            assert_eq!(args.mode, "quick");
            assert_eq!(args.ports.as_deref(), Some("1-500"));
            assert!(!args.plan);
        }
        _ => unreachable!("portscan arguments parse to the portscan command"),
    }
}

#[test]
fn cli_requires_a_target_for_portscan() {
    assert!(Cli::try_parse_from(["scangate", "portscan", "--user", "alice"]).is_err());
}

#[test]
fn cli_parses_forensics_bounds() {
    let cli = Cli::parse_from([
        "scangate", "diskscan", "--user", "alice", "--image", "/evidence/disk.img", "--mode",
        "timeline", "--max-depth", "8",
    ]);
    match cli.command {
        Commands::Diskscan(args) => {
            assert_eq!(args.max_depth, Some(8));
            assert_eq!(args.mode, "timeline");
        }
        _ => unreachable!("diskscan arguments parse to the diskscan command"),
    }
}

// scangate-config/tests/config_defaults.rs
// ============================================================================
// Module: Config Defaults Tests
// Description: Default values and defaulted-section parsing.
// ============================================================================
//! ## Overview
//! Verifies the documented defaults and that partial TOML files inherit the
//! remaining defaults per section.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]

use scangate_config::AuditSinkKind;
use scangate_config::ScangateConfig;

#[test]
fn default_config_validates() {
    let mut config = ScangateConfig::default();
    config.validate().unwrap();
    assert!(config.auth.enabled);
    assert_eq!(config.rate.ceiling, 10);
    assert_eq!(config.target.max_hosts, 256);
    assert_eq!(config.portscan.max_ports, 1000);
    assert_eq!(config.portscan.timeout_secs, 600);
    assert_eq!(config.audit.sink, AuditSinkKind::File);
    assert!(!config.seal.enabled);
}

#[test]
fn partial_toml_inherits_section_defaults() {
    let mut config: ScangateConfig = toml::from_str(
        r#"
        [rate]
        ceiling = 25

        [portscan]
        max_ports = 2000
        "#,
    )
    .unwrap();
    config.validate().unwrap();
    assert_eq!(config.rate.ceiling, 25);
    assert_eq!(config.portscan.max_ports, 2000);
    // Untouched fields keep their defaults.
    assert_eq!(config.portscan.timeout_secs, 600);
    assert_eq!(config.vulnscan.max_hosts, 16);
    assert_eq!(config.diskscan.max_depth, 16);
}

#[test]
fn empty_toml_is_the_default_config() {
    let mut config: ScangateConfig = toml::from_str("").unwrap();
    config.validate().unwrap();
    assert_eq!(config.memscan.max_rows, 10_000);
    assert!(config.policy.users_file.is_none());
}

#[test]
fn engine_paths_have_sensible_defaults() {
    let config = ScangateConfig::default();
    assert!(config.engines.portscan.ends_with("nmap"));
    assert!(config.engines.diskscan.ends_with("fls"));
}

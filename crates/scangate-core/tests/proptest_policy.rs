// scangate-core/tests/proptest_policy.rs
// ============================================================================
// Module: Property Tests for Policy Resolution
// Description: Deny precedence and default-deny hold for arbitrary addresses.
// ============================================================================
//! ## Overview
//! Property checks over random IPv4 addresses: a target inside a deny entry
//! is never allowed regardless of allow coverage, a target covered by no
//! allow entry is never allowed, and hex encoding round-trips losslessly.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]

use std::collections::BTreeSet;
use std::net::Ipv4Addr;

use proptest::prelude::*;
use scangate_core::PolicySnapshot;
use scangate_core::TargetRejection;
use scangate_core::TargetValidator;
use scangate_core::core::hashing::hex_decode;
use scangate_core::core::hashing::hex_encode;
use scangate_core::parse_network;

/// Snapshot allowing all of 10.0.0.0/8 while denying 10.20.0.0/16.
fn overlapping_snapshot() -> PolicySnapshot {
    PolicySnapshot::from_parts(
        BTreeSet::new(),
        vec![parse_network("10.0.0.0/8").unwrap()],
        vec![parse_network("10.20.0.0/16").unwrap()],
    )
}

proptest! {
    #[test]
    fn deny_wins_for_every_address_in_the_denied_range(c in 0u8..=255, d in 0u8..=255) {
        let snapshot = overlapping_snapshot();
        let validator = TargetValidator::new(u128::MAX);
        let target = Ipv4Addr::new(10, 20, c, d).to_string();
        let rejection = validator.validate(&snapshot, &target).unwrap_err();
        prop_assert!(matches!(rejection, TargetRejection::DenyMatch(_)));
    }

    #[test]
    fn addresses_outside_every_allow_entry_are_denied(a in 11u8..=126, b in 0u8..=255) {
        let snapshot = overlapping_snapshot();
        let validator = TargetValidator::new(u128::MAX);
        let target = Ipv4Addr::new(a, b, 1, 1).to_string();
        let rejection = validator.validate(&snapshot, &target).unwrap_err();
        prop_assert_eq!(rejection, TargetRejection::NotAllowListed);
    }

    #[test]
    fn allowed_addresses_resolve_to_host_networks(c in 0u8..=255, d in 0u8..=255) {
        prop_assume!(c != 20);
        let snapshot = PolicySnapshot::from_parts(
            BTreeSet::new(),
            vec![parse_network("10.0.0.0/8").unwrap()],
            vec![parse_network("10.20.0.0/16").unwrap()],
        );
        let validator = TargetValidator::new(256);
        let target = Ipv4Addr::new(10, c, 7, d).to_string();
        let network = validator.validate(&snapshot, &target).unwrap();
        prop_assert_eq!(network.prefix(), 32);
    }

    #[test]
    fn hex_encoding_round_trips(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        let encoded = hex_encode(&bytes);
        prop_assert_eq!(hex_decode(&encoded).unwrap(), bytes);
    }
}

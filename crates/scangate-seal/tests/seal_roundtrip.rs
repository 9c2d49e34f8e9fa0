// scangate-seal/tests/seal_roundtrip.rs
// ============================================================================
// Module: Seal Round-Trip Tests
// Description: Encryption at rest, plaintext removal, and exact recovery.
// ============================================================================
//! ## Overview
//! Verifies that sealing removes the plaintext, unsealing recovers the exact
//! original bytes, and misconfiguration fails loudly instead of silently
//! skipping encryption.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]

use std::fs;

use scangate_seal::ResultSealer;
use scangate_seal::SealError;
use scangate_seal::SealerMode;
use scangate_seal::decode_key;
use scangate_seal::generate_key;
use scangate_seal::sealed_path_for;

fn keyed_sealer() -> ResultSealer {
    let key = decode_key(&generate_key()).unwrap();
    ResultSealer::new(SealerMode::Keyed(key))
}

#[test]
fn seal_then_unseal_recovers_exact_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("scan.xml");
    let original = b"<scan><host addr=\"192.168.1.50\"/></scan>".to_vec();
    fs::write(&artifact, &original).unwrap();

    let sealer = keyed_sealer();
    let sealed = sealer.seal(&[artifact.clone()]).unwrap();
    assert_eq!(sealed.len(), 1);

    let recovered = dir.path().join("recovered.xml");
    sealer.unseal(&sealed[0], &recovered).unwrap();
    assert_eq!(fs::read(&recovered).unwrap(), original);
}

#[test]
fn plaintext_is_removed_after_sealing() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("scan.xml");
    fs::write(&artifact, b"results").unwrap();

    let sealed = keyed_sealer().seal(&[artifact.clone()]).unwrap();
    assert!(!artifact.exists());
    assert!(sealed[0].exists());
    assert_eq!(sealed[0], sealed_path_for(&artifact));
}

#[test]
fn sealed_container_is_not_plaintext() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("scan.xml");
    fs::write(&artifact, b"highly identifiable scan output").unwrap();

    let sealed = keyed_sealer().seal(&[artifact]).unwrap();
    let container = fs::read(&sealed[0]).unwrap();
    assert!(container.starts_with(b"SGSEAL01"));
    assert!(!container.windows(b"identifiable".len()).any(|window| window == b"identifiable"));
}

#[test]
fn disabled_sealer_passes_artifacts_through() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("scan.xml");
    fs::write(&artifact, b"results").unwrap();

    let sealer = ResultSealer::new(SealerMode::Disabled);
    assert!(!sealer.is_enabled());
    let output = sealer.seal(&[artifact.clone()]).unwrap();
    assert_eq!(output, vec![artifact.clone()]);
    assert!(artifact.exists());
}

#[test]
fn enabled_without_key_fails_loudly_and_keeps_plaintext() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("scan.xml");
    fs::write(&artifact, b"results").unwrap();

    let sealer = ResultSealer::new(SealerMode::EnabledWithoutKey);
    assert!(sealer.is_enabled());
    let error = sealer.seal(&[artifact.clone()]).unwrap_err();
    assert!(matches!(error, SealError::KeyMissing(_)));
    assert!(artifact.exists());
}

#[test]
fn unsealing_with_the_wrong_key_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("scan.xml");
    fs::write(&artifact, b"results").unwrap();

    let sealed = keyed_sealer().seal(&[artifact]).unwrap();
    let other = keyed_sealer();
    let output = dir.path().join("out.xml");
    let error = other.unseal(&sealed[0], &output).unwrap_err();
    assert!(matches!(error, SealError::Container(_)));
}

#[test]
fn truncated_container_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let bogus = dir.path().join("scan.xml.sealed");
    fs::write(&bogus, b"SGSEAL01short").unwrap();
    let output = dir.path().join("out.xml");
    let error = keyed_sealer().unseal(&bogus, &output).unwrap_err();
    assert!(matches!(error, SealError::Container(_)));
}

#[test]
fn key_decoding_rejects_bad_material() {
    assert!(decode_key("not base64!!").is_err());
    assert!(decode_key("c2hvcnQ=").is_err());
    assert!(decode_key(&generate_key()).is_ok());
}

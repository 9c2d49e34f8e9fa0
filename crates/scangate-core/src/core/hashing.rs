// scangate-core/src/core/hashing.rs
// ============================================================================
// Module: Scangate Canonical Hashing
// Description: RFC 8785 JSON canonicalization and digest helpers.
// Purpose: Provide deterministic digests for audit chaining and credentials.
// Dependencies: serde, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! Audit-chain links and credential fingerprints are SHA-256 digests. JSON
//! values are canonicalized with RFC 8785 (JCS) before hashing so a record
//! re-serialized by any compliant writer produces the same link value.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when computing canonical digests.
#[derive(Debug, Error)]
pub enum HashError {
    /// JSON canonicalization failed.
    #[error("failed to canonicalize json: {0}")]
    Canonicalization(String),
}

// ============================================================================
// SECTION: Digest Helpers
// ============================================================================

/// Hashes raw bytes and returns the lowercase hex digest.
#[must_use]
pub fn digest_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex_encode(&hasher.finalize())
}

/// Hashes raw bytes and returns the raw 32-byte digest.
#[must_use]
pub fn digest_bytes_raw(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

/// Returns canonical JSON bytes for a serializable value using RFC 8785.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails.
pub fn canonical_json_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, HashError> {
    serde_jcs::to_vec(value).map_err(|err| HashError::Canonicalization(err.to_string()))
}

/// Hashes the canonical JSON form of a serializable value.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails.
pub fn canonical_digest<T: Serialize + ?Sized>(value: &T) -> Result<String, HashError> {
    Ok(digest_bytes(&canonical_json_bytes(value)?))
}

// ============================================================================
// SECTION: Hex Encoding
// ============================================================================

/// Encodes bytes as a lowercase hex string.
#[must_use]
pub fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}

/// Decodes a lowercase or uppercase hex string into bytes.
///
/// Returns `None` when the input has odd length or non-hex characters.
#[must_use]
pub fn hex_decode(text: &str) -> Option<Vec<u8>> {
    if !text.len().is_multiple_of(2) {
        return None;
    }
    let mut out = Vec::with_capacity(text.len() / 2);
    let bytes = text.as_bytes();
    let mut index = 0;
    while index < bytes.len() {
        let high = hex_nibble(bytes[index])?;
        let low = hex_nibble(bytes[index + 1])?;
        out.push((high << 4) | low);
        index += 2;
    }
    Some(out)
}

/// Decodes a single hex character into its nibble value.
fn hex_nibble(byte: u8) -> Option<u8> {
    match byte {
        b'0' ..= b'9' => Some(byte - b'0'),
        b'a' ..= b'f' => Some(byte - b'a' + 10),
        b'A' ..= b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

// scangate-core/src/core/credentials.rs
// ============================================================================
// Module: Scangate Credential Store
// Description: Salted one-way credential digests loaded from a flat file.
// Purpose: Authenticate presented secrets without ever persisting plaintext.
// Dependencies: rand, sha2, subtle
// ============================================================================

//! ## Overview
//! Credentials are stored as `username:salt:digest` lines where the digest is
//! SHA-256 over `salt || secret`. The file supports `#` comments and blank
//! lines. Comparison is constant-time. A store that cannot be read or parsed
//! is an error; callers must treat that as a rejection, never as a pass.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use rand::RngCore;
use sha2::Digest;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::core::hashing::hex_decode;
use crate::core::hashing::hex_encode;
use crate::core::identity::PresentedSecret;
use crate::core::identity::Username;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum credential file size in bytes.
const MAX_CREDENTIAL_FILE_SIZE: usize = 1024 * 1024;
/// Salt length in bytes for newly provisioned records.
const SALT_LENGTH: usize = 16;
/// Expected digest length in bytes.
const DIGEST_LENGTH: usize = 32;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while loading or querying the credential store.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The credential file could not be read.
    #[error("credential store unreadable: {0}")]
    Unreadable(String),
    /// The credential file exceeds the size limit.
    #[error("credential store exceeds size limit")]
    TooLarge,
    /// A line in the credential file is malformed.
    #[error("credential store line {0} is malformed")]
    Malformed(usize),
    /// The same username appears more than once.
    #[error("credential store line {0} duplicates an earlier username")]
    Duplicate(usize),
}

// ============================================================================
// SECTION: Records
// ============================================================================

/// One stored credential: a username with its salt and secret digest.
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    /// Principal the record belongs to.
    username: Username,
    /// Per-record random salt.
    salt: Vec<u8>,
    /// SHA-256 digest over `salt || secret`.
    digest: [u8; DIGEST_LENGTH],
}

impl CredentialRecord {
    /// Provisions a new record from a plaintext secret with a random salt.
    #[must_use]
    pub fn provision(username: Username, secret: &PresentedSecret) -> Self {
        let mut salt = vec![0u8; SALT_LENGTH];
        rand::rngs::OsRng.fill_bytes(&mut salt);
        let digest = compute_digest(&salt, secret.reveal());
        Self {
            username,
            salt,
            digest,
        }
    }

    /// Returns the principal name.
    #[must_use]
    pub const fn username(&self) -> &Username {
        &self.username
    }

    /// Renders the record in credential-file line format.
    #[must_use]
    pub fn to_line(&self) -> String {
        format!("{}:{}:{}", self.username, hex_encode(&self.salt), hex_encode(&self.digest))
    }

    /// Compares a presented secret against the stored digest in constant time.
    #[must_use]
    pub fn matches(&self, secret: &PresentedSecret) -> bool {
        let presented = compute_digest(&self.salt, secret.reveal());
        bool::from(presented.ct_eq(&self.digest))
    }
}

/// Computes the salted secret digest.
fn compute_digest(salt: &[u8], secret: &str) -> [u8; DIGEST_LENGTH] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(secret.as_bytes());
    hasher.finalize().into()
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Outcome of a credential lookup and comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialCheck {
    /// The presented secret matches the stored digest.
    Verified,
    /// The username has no stored record.
    UnknownUser,
    /// The presented secret does not match the stored digest.
    DigestMismatch,
}

/// In-memory credential store keyed by username.
#[derive(Debug, Default)]
pub struct CredentialStore {
    /// Stored records keyed by principal name.
    records: HashMap<Username, CredentialRecord>,
}

impl CredentialStore {
    /// Builds a store from already-parsed records.
    #[must_use]
    pub fn from_records(records: Vec<CredentialRecord>) -> Self {
        let mut map = HashMap::with_capacity(records.len());
        for record in records {
            map.insert(record.username.clone(), record);
        }
        Self {
            records: map,
        }
    }

    /// Loads and parses a credential file.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] when the file is unreadable, oversized,
    /// malformed, or contains duplicate usernames.
    pub fn load(path: &Path) -> Result<Self, CredentialError> {
        let bytes = fs::read(path).map_err(|err| CredentialError::Unreadable(err.to_string()))?;
        if bytes.len() > MAX_CREDENTIAL_FILE_SIZE {
            return Err(CredentialError::TooLarge);
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|err| CredentialError::Unreadable(err.to_string()))?;
        let mut records = HashMap::new();
        for (index, raw) in content.lines().enumerate() {
            let line_number = index + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let record = parse_line(line).ok_or(CredentialError::Malformed(line_number))?;
            if records.insert(record.username.clone(), record).is_some() {
                return Err(CredentialError::Duplicate(line_number));
            }
        }
        Ok(Self {
            records,
        })
    }

    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true when the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Checks a presented secret for a username.
    #[must_use]
    pub fn check(&self, username: &Username, secret: &PresentedSecret) -> CredentialCheck {
        match self.records.get(username) {
            None => CredentialCheck::UnknownUser,
            Some(record) if record.matches(secret) => CredentialCheck::Verified,
            Some(_) => CredentialCheck::DigestMismatch,
        }
    }
}

/// Parses one `username:salt:digest` line.
fn parse_line(line: &str) -> Option<CredentialRecord> {
    let mut parts = line.splitn(3, ':');
    let username = parts.next()?.trim();
    let salt_hex = parts.next()?.trim();
    let digest_hex = parts.next()?.trim();
    if username.is_empty() {
        return None;
    }
    let salt = hex_decode(salt_hex)?;
    if salt.is_empty() {
        return None;
    }
    let digest_bytes = hex_decode(digest_hex)?;
    let digest: [u8; DIGEST_LENGTH] = digest_bytes.try_into().ok()?;
    Some(CredentialRecord {
        username: Username::new(username),
        salt,
        digest,
    })
}

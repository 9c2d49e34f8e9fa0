// scangate-core/src/core/identity.rs
// ============================================================================
// Module: Scangate Identity Types
// Description: Canonical principal and operation identifiers for gate requests.
// Purpose: Provide strongly typed, serializable identities with stable string forms.
// Dependencies: serde, rand
// ============================================================================

//! ## Overview
//! This module defines the identifier types carried through the guard chain.
//! Identifiers are opaque and serialize as strings. Presented secrets are
//! wrapped so they never appear in debug output or serialized events.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use rand::RngCore;
use serde::Deserialize;
use serde::Serialize;

use crate::core::hashing::hex_encode;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Principal name presented with a gate request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Creates a new username.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for Username {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Username {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Name of a gated operation class (for example `portscan`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationName(String);

impl OperationName {
    /// Creates a new operation name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the operation name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for OperationName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for OperationName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Correlation identifier tying together all audit records of one request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Creates a correlation identifier from an existing string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random correlation identifier.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; 8];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(hex_encode(&bytes))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Presented Secrets
// ============================================================================

/// Secret material presented alongside a username.
///
/// # Invariants
/// - The plaintext is never serialized and never appears in debug output.
#[derive(Clone)]
pub struct PresentedSecret(String);

impl PresentedSecret {
    /// Wraps a plaintext secret for in-memory handling.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Exposes the plaintext for digest computation only.
    #[must_use]
    pub fn reveal(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PresentedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PresentedSecret(<redacted>)")
    }
}

// ============================================================================
// SECTION: Resolved Identity
// ============================================================================

/// An identity that has passed the authentication stage.
///
/// # Invariants
/// - Values of this type are only constructed by the authenticator; later
///   guard stages accept them as proof that authentication already ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Authenticated principal name.
    username: Username,
    /// Whether authentication was bypassed by configuration.
    bypassed: bool,
}

impl Identity {
    /// Builds an identity resolved through credential verification.
    #[must_use]
    pub const fn verified(username: Username) -> Self {
        Self {
            username,
            bypassed: false,
        }
    }

    /// Builds an identity admitted while authentication is disabled.
    #[must_use]
    pub const fn bypass(username: Username) -> Self {
        Self {
            username,
            bypassed: true,
        }
    }

    /// Returns the principal name.
    #[must_use]
    pub const fn username(&self) -> &Username {
        &self.username
    }

    /// Returns true when authentication was bypassed by configuration.
    #[must_use]
    pub const fn is_bypassed(&self) -> bool {
        self.bypassed
    }
}

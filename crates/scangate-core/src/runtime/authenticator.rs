// scangate-core/src/runtime/authenticator.rs
// ============================================================================
// Module: Scangate Authenticator
// Description: Credential verification stage of the guard chain.
// Purpose: Resolve a presented username/secret pair into an identity.
// Dependencies: scangate credential store
// ============================================================================

//! ## Overview
//! The authenticator compares a presented secret against the stored salted
//! digest for the username. Missing users, digest mismatches, and missing
//! secrets all reject; there is no default-allow path. When authentication is
//! disabled by configuration the stage short-circuits to accepted but reports
//! the bypass so the audit trail records the reduced posture.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::credentials::CredentialCheck;
use crate::core::credentials::CredentialStore;
use crate::core::identity::Identity;
use crate::core::identity::PresentedSecret;
use crate::core::identity::Username;

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Reason an authentication attempt was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No secret was presented.
    MissingSecret,
    /// The username has no stored credential.
    UnknownUser,
    /// The presented secret does not match the stored digest.
    DigestMismatch,
}

impl AuthRejection {
    /// Returns a stable label for audit messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MissingSecret => "missing secret",
            Self::UnknownUser => "unknown user",
            Self::DigestMismatch => "digest mismatch",
        }
    }
}

/// Result of the authentication stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The identity is resolved; `Identity::is_bypassed` records whether
    /// verification actually ran.
    Accepted(Identity),
    /// The request is rejected.
    Rejected(AuthRejection),
}

// ============================================================================
// SECTION: Authenticator
// ============================================================================

/// Authentication mode fixed at gateway construction.
#[derive(Debug)]
pub enum AuthMode {
    /// Verify presented secrets against the credential store.
    Enabled(CredentialStore),
    /// Accept every username without verification (explicit opt-out).
    Disabled,
}

/// Credential verification stage.
#[derive(Debug)]
pub struct Authenticator {
    /// Configured mode.
    mode: AuthMode,
}

impl Authenticator {
    /// Creates an authenticator in the given mode.
    #[must_use]
    pub const fn new(mode: AuthMode) -> Self {
        Self {
            mode,
        }
    }

    /// Returns true when verification is disabled by configuration.
    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        matches!(self.mode, AuthMode::Disabled)
    }

    /// Resolves a presented username/secret pair.
    #[must_use]
    pub fn authenticate(
        &self,
        username: &Username,
        secret: Option<&PresentedSecret>,
    ) -> AuthOutcome {
        match &self.mode {
            AuthMode::Disabled => AuthOutcome::Accepted(Identity::bypass(username.clone())),
            AuthMode::Enabled(store) => {
                let Some(secret) = secret else {
                    return AuthOutcome::Rejected(AuthRejection::MissingSecret);
                };
                match store.check(username, secret) {
                    CredentialCheck::Verified => {
                        AuthOutcome::Accepted(Identity::verified(username.clone()))
                    }
                    CredentialCheck::UnknownUser => {
                        AuthOutcome::Rejected(AuthRejection::UnknownUser)
                    }
                    CredentialCheck::DigestMismatch => {
                        AuthOutcome::Rejected(AuthRejection::DigestMismatch)
                    }
                }
            }
        }
    }
}

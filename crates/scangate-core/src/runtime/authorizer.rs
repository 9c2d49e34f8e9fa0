// scangate-core/src/runtime/authorizer.rs
// ============================================================================
// Module: Scangate Authorizer
// Description: Authorized-user membership stage of the guard chain.
// Purpose: Confirm an authenticated identity may run gated operations.
// Dependencies: scangate policy snapshot
// ============================================================================

//! ## Overview
//! Authorization is a pure membership check over the policy snapshot's
//! authorized-user set. An empty set rejects every identity: a deployment
//! that has not enumerated its operators fails closed rather than open.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::identity::Identity;
use crate::core::policy::PolicySnapshot;

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Result of the authorization stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthzOutcome {
    /// The identity is in the authorized-user set.
    Accepted,
    /// The identity is not authorized.
    Rejected {
        /// True when the set itself is empty (configuration gap).
        empty_set: bool,
    },
}

// ============================================================================
// SECTION: Authorizer
// ============================================================================

/// Authorized-user membership stage. Pure over the snapshot; no mutation.
#[derive(Debug, Default, Clone, Copy)]
pub struct Authorizer;

impl Authorizer {
    /// Checks the identity against the snapshot's authorized-user set.
    #[must_use]
    pub fn authorize(self, snapshot: &PolicySnapshot, identity: &Identity) -> AuthzOutcome {
        if snapshot.has_no_authorized_users() {
            return AuthzOutcome::Rejected {
                empty_set: true,
            };
        }
        if snapshot.is_authorized(identity.username()) {
            AuthzOutcome::Accepted
        } else {
            AuthzOutcome::Rejected {
                empty_set: false,
            }
        }
    }
}

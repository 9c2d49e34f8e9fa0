// scangate-core/src/runtime/target.rs
// ============================================================================
// Module: Scangate Target Validator
// Description: Allow/deny resolution for requested scan targets.
// Purpose: Enforce deny precedence and default-deny before any engine runs.
// Dependencies: ipnetwork, scangate policy snapshot
// ============================================================================

//! ## Overview
//! Network targets resolve deny-list first: any touch of a deny entry rejects
//! before the allow list is consulted, so a broad allow range can never mask
//! a forbidden sub-range. Targets covered by no allow entry are rejected
//! (default-deny). Requested ranges wider than the host ceiling are rejected
//! outright. Forensic evidence targets are local image paths validated
//! against the configured evidence root instead.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use ipnetwork::IpNetwork;
use thiserror::Error;

use crate::core::policy::PolicySnapshot;
use crate::core::policy::parse_network;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default ceiling on addresses in one requested range (a /24).
pub const DEFAULT_MAX_TARGET_HOSTS: u128 = 256;

// ============================================================================
// SECTION: Rejections
// ============================================================================

/// Reason a target was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetRejection {
    /// The target does not parse as an address or CIDR block.
    #[error("target is not a valid address or CIDR block")]
    Malformed,
    /// The target touches a deny-list entry.
    #[error("target matches deny rule {0}")]
    DenyMatch(IpNetwork),
    /// No allow-list entry covers the target.
    #[error("target is not covered by the allow list")]
    NotAllowListed,
    /// The requested range holds more addresses than permitted.
    #[error("requested range spans {hosts} addresses (ceiling {ceiling})")]
    RangeTooLarge {
        /// Addresses in the requested range.
        hosts: u128,
        /// Configured ceiling.
        ceiling: u128,
    },
    /// The evidence path failed validation.
    #[error("evidence path rejected: {0}")]
    Evidence(&'static str),
}

// ============================================================================
// SECTION: Network Validation
// ============================================================================

/// Allow/deny resolution stage for network targets.
#[derive(Debug, Clone, Copy)]
pub struct TargetValidator {
    /// Maximum addresses one request may span.
    max_hosts: u128,
}

impl TargetValidator {
    /// Creates a validator with the given range ceiling.
    #[must_use]
    pub const fn new(max_hosts: u128) -> Self {
        Self {
            max_hosts,
        }
    }

    /// Resolves a raw target expression against the policy snapshot.
    ///
    /// Order is fixed: parse, deny list (short-circuit), allow list, range
    /// ceiling. Malformed input is a rejection, never an error.
    ///
    /// # Errors
    ///
    /// Returns [`TargetRejection`] naming the first failing check.
    pub fn validate(
        &self,
        snapshot: &PolicySnapshot,
        raw: &str,
    ) -> Result<IpNetwork, TargetRejection> {
        let target = parse_network(raw.trim()).ok_or(TargetRejection::Malformed)?;
        if let Some(rule) = snapshot.deny_match(&target) {
            return Err(TargetRejection::DenyMatch(rule));
        }
        if !snapshot.allow_covers(&target) {
            return Err(TargetRejection::NotAllowListed);
        }
        let hosts = host_count(&target);
        if hosts > self.max_hosts {
            return Err(TargetRejection::RangeTooLarge {
                hosts,
                ceiling: self.max_hosts,
            });
        }
        Ok(target)
    }
}

/// Returns the number of addresses a network spans.
fn host_count(network: &IpNetwork) -> u128 {
    let bits = match network {
        IpNetwork::V4(net) => 32 - u32::from(net.prefix()),
        IpNetwork::V6(net) => 128 - u32::from(net.prefix()),
    };
    if bits >= 128 {
        u128::MAX
    } else {
        1u128 << bits
    }
}

// ============================================================================
// SECTION: Evidence Validation
// ============================================================================

/// Validates a forensic evidence image path.
///
/// The path must name an existing regular file, contain no parent-directory
/// components, and (when a root is configured) resolve inside that root.
///
/// # Errors
///
/// Returns [`TargetRejection::Evidence`] naming the failed check.
pub fn validate_evidence(
    evidence_root: Option<&Path>,
    path: &Path,
) -> Result<PathBuf, TargetRejection> {
    if path.components().any(|component| matches!(component, Component::ParentDir)) {
        return Err(TargetRejection::Evidence("parent-directory component"));
    }
    let resolved = fs::canonicalize(path)
        .map_err(|_| TargetRejection::Evidence("path does not resolve"))?;
    let metadata = fs::metadata(&resolved)
        .map_err(|_| TargetRejection::Evidence("path is not readable"))?;
    if !metadata.is_file() {
        return Err(TargetRejection::Evidence("path is not a regular file"));
    }
    if let Some(root) = evidence_root {
        let root = fs::canonicalize(root)
            .map_err(|_| TargetRejection::Evidence("evidence root does not resolve"))?;
        if !resolved.starts_with(&root) {
            return Err(TargetRejection::Evidence("path is outside the evidence root"));
        }
    }
    Ok(resolved)
}

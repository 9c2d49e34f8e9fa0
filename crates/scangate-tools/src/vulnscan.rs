// scangate-tools/src/vulnscan.rs
// ============================================================================
// Module: Vulnerability Scan Policy
// Description: Safe-mode enumeration and bounds for the vulnerability class.
// Purpose: Map caller requests onto constrained vulnerability-scan descriptors.
// Dependencies: scangate-core, crate::descriptor
// ============================================================================

//! ## Overview
//! Vulnerability-scan modes map onto non-destructive engine configurations.
//! The "ultimate" configuration family, which includes denial-of-service
//! checks, is not representable. The host ceiling bounds how many addresses
//! one scan may sweep.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use ipnetwork::IpNetwork;
use scangate_core::Clearance;
use scangate_core::ClearedTarget;

use crate::descriptor::InvocationDescriptor;
use crate::descriptor::InvocationError;
use crate::descriptor::InvocationTarget;
use crate::descriptor::ToolAction;
use crate::descriptor::ToolClass;

// ============================================================================
// SECTION: Modes
// ============================================================================

/// Safe vulnerability-scan modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VulnScanMode {
    /// Host and service discovery only.
    Discovery,
    /// Standard non-intrusive check set.
    Fast,
    /// Extended non-intrusive check set.
    Full,
}

impl VulnScanMode {
    /// Parses a caller-supplied mode token.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "discovery" => Some(Self::Discovery),
            "fast" => Some(Self::Fast),
            "full" => Some(Self::Full),
            _ => None,
        }
    }

    /// Returns the stable mode label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Discovery => "discovery",
            Self::Fast => "fast",
            Self::Full => "full",
        }
    }

    /// Returns the engine configuration name for the mode.
    #[must_use]
    pub const fn engine_config(self) -> &'static str {
        match self {
            Self::Discovery => "discovery",
            Self::Fast => "full_and_fast",
            Self::Full => "full_and_deep",
        }
    }
}

// ============================================================================
// SECTION: Limits and Requests
// ============================================================================

/// Configured bounds for the vulnerability-scan class.
#[derive(Debug, Clone, Copy)]
pub struct VulnScanLimits {
    /// Maximum addresses one scan may sweep.
    pub max_hosts: u32,
    /// Absolute engine timeout.
    pub timeout: Duration,
    /// Engine request-rate ceiling in requests per second.
    pub packet_rate_ceiling: u32,
}

impl Default for VulnScanLimits {
    fn default() -> Self {
        Self {
            max_hosts: 16,
            timeout: Duration::from_secs(3600),
            packet_rate_ceiling: 50,
        }
    }
}

/// Caller-supplied vulnerability-scan parameters.
#[derive(Debug, Clone)]
pub struct VulnScanRequest {
    /// Requested mode token.
    pub mode: String,
}

// ============================================================================
// SECTION: Policy Builder
// ============================================================================

/// Invocation policy builder for the vulnerability-scan class.
#[derive(Debug, Clone, Copy)]
pub struct VulnScanPolicy {
    /// Configured bounds.
    limits: VulnScanLimits,
}

impl VulnScanPolicy {
    /// Creates a builder with the given bounds.
    #[must_use]
    pub const fn new(limits: VulnScanLimits) -> Self {
        Self {
            limits,
        }
    }

    /// Builds a descriptor from a cleared request.
    ///
    /// # Errors
    ///
    /// Returns [`InvocationError`] naming the first failing validation.
    pub fn build(
        &self,
        clearance: &Clearance,
        request: &VulnScanRequest,
    ) -> Result<InvocationDescriptor, InvocationError> {
        let class = ToolClass::VulnScan;
        let ClearedTarget::Network(network) = &clearance.target else {
            return Err(InvocationError::TargetMismatch {
                class: class.operation(),
            });
        };
        let mode =
            VulnScanMode::parse(&request.mode).ok_or_else(|| InvocationError::UnknownMode {
                class: class.operation(),
                token: request.mode.clone(),
            })?;
        let hosts = network_hosts(network);
        if hosts > u64::from(self.limits.max_hosts) {
            return Err(InvocationError::ResourceCeiling {
                class: class.operation(),
                parameter: "host count",
                requested: hosts,
                ceiling: u64::from(self.limits.max_hosts),
            });
        }
        Ok(InvocationDescriptor {
            class,
            target: InvocationTarget::Network(*network),
            action: ToolAction::VulnScan {
                mode,
            },
            timeout: self.limits.timeout,
            packet_rate_ceiling: self.limits.packet_rate_ceiling,
            correlation_id: clearance.correlation_id.clone(),
        })
    }
}

/// Returns the number of addresses a network spans, saturating at `u64::MAX`.
fn network_hosts(network: &IpNetwork) -> u64 {
    let bits = match network {
        IpNetwork::V4(net) => 32 - u32::from(net.prefix()),
        IpNetwork::V6(net) => 128 - u32::from(net.prefix()),
    };
    if bits >= 64 {
        u64::MAX
    } else {
        1u64 << bits
    }
}

// scangate-tools/src/portscan.rs
// ============================================================================
// Module: Port Scan Policy
// Description: Safe-mode enumeration and bounds for the port scanner class.
// Purpose: Map caller requests onto constrained port-scan descriptors.
// Dependencies: scangate-core, crate::descriptor
// ============================================================================

//! ## Overview
//! Port-scan modes are a closed set mapped onto conservative engine flag
//! groups. Intrusive script execution and packet-flood timing templates are
//! not representable. Port counts are rejected, never truncated, when they
//! exceed the configured ceiling.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use scangate_core::Clearance;
use scangate_core::ClearedTarget;

use crate::descriptor::InvocationDescriptor;
use crate::descriptor::InvocationError;
use crate::descriptor::InvocationTarget;
use crate::descriptor::PortSpec;
use crate::descriptor::ToolAction;
use crate::descriptor::ToolClass;

// ============================================================================
// SECTION: Modes
// ============================================================================

/// Safe port-scan modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortScanMode {
    /// Fast scan of the engine's common-port set.
    Quick,
    /// Standard connect scan without host discovery.
    Standard,
    /// SYN plus service-version scan.
    Full,
    /// Service-version detection only.
    Service,
    /// Operating-system fingerprinting.
    OsDetect,
}

impl PortScanMode {
    /// Parses a caller-supplied mode token.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "quick" => Some(Self::Quick),
            "standard" => Some(Self::Standard),
            "full" => Some(Self::Full),
            "service" => Some(Self::Service),
            "os-detect" => Some(Self::OsDetect),
            _ => None,
        }
    }

    /// Returns the stable mode label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Standard => "standard",
            Self::Full => "full",
            Self::Service => "service",
            Self::OsDetect => "os-detect",
        }
    }

    /// Returns the engine flag group for the mode.
    #[must_use]
    pub const fn engine_args(self) -> &'static [&'static str] {
        match self {
            Self::Quick => &["-T4", "-F"],
            Self::Standard => &["-T4", "-Pn"],
            Self::Full => &["-sS", "-sV", "-T4"],
            Self::Service => &["-sV", "-Pn"],
            Self::OsDetect => &["-O", "-Pn"],
        }
    }
}

// ============================================================================
// SECTION: Limits and Requests
// ============================================================================

/// Configured bounds for the port-scan class.
#[derive(Debug, Clone, Copy)]
pub struct PortScanLimits {
    /// Maximum ports one request may cover.
    pub max_ports: u32,
    /// Absolute engine timeout.
    pub timeout: Duration,
    /// Engine packet-rate ceiling in packets per second.
    pub packet_rate_ceiling: u32,
}

impl Default for PortScanLimits {
    fn default() -> Self {
        Self {
            max_ports: 1000,
            timeout: Duration::from_secs(600),
            packet_rate_ceiling: 100,
        }
    }
}

/// Caller-supplied port-scan parameters.
#[derive(Debug, Clone)]
pub struct PortScanRequest {
    /// Requested mode token.
    pub mode: String,
    /// Optional explicit port specification.
    pub ports: Option<String>,
}

// ============================================================================
// SECTION: Policy Builder
// ============================================================================

/// Invocation policy builder for the port-scan class.
#[derive(Debug, Clone, Copy)]
pub struct PortScanPolicy {
    /// Configured bounds.
    limits: PortScanLimits,
}

impl PortScanPolicy {
    /// Creates a builder with the given bounds.
    #[must_use]
    pub const fn new(limits: PortScanLimits) -> Self {
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
        request: &PortScanRequest,
    ) -> Result<InvocationDescriptor, InvocationError> {
        let class = ToolClass::PortScan;
        let ClearedTarget::Network(network) = &clearance.target else {
            return Err(InvocationError::TargetMismatch {
                class: class.operation(),
            });
        };
        let mode =
            PortScanMode::parse(&request.mode).ok_or_else(|| InvocationError::UnknownMode {
                class: class.operation(),
                token: request.mode.clone(),
            })?;
        let ports = match &request.ports {
            None => None,
            Some(text) => {
                let spec = PortSpec::parse(text)?;
                if spec.count() > self.limits.max_ports {
                    return Err(InvocationError::ResourceCeiling {
                        class: class.operation(),
                        parameter: "port count",
                        requested: u64::from(spec.count()),
                        ceiling: u64::from(self.limits.max_ports),
                    });
                }
                Some(spec)
            }
        };
        Ok(InvocationDescriptor {
            class,
            target: InvocationTarget::Network(*network),
            action: ToolAction::PortScan {
                mode,
                ports,
            },
            timeout: self.limits.timeout,
            packet_rate_ceiling: self.limits.packet_rate_ceiling,
            correlation_id: clearance.correlation_id.clone(),
        })
    }
}

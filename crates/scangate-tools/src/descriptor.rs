// scangate-tools/src/descriptor.rs
// ============================================================================
// Module: Scangate Invocation Descriptors
// Description: Validated, bounded parameter sets handed to engine adapters.
// Purpose: Guarantee no engine invocation carries an unvetted option.
// Dependencies: ipnetwork, scangate-core
// ============================================================================

//! ## Overview
//! An [`InvocationDescriptor`] is the only value the engine adapters accept.
//! Every field is drawn from a closed enum or clamped against a configured
//! ceiling by a policy builder; requests over a ceiling are rejected outright
//! rather than silently truncated, so the caller is never misled about the
//! scope actually executed. Timeouts and engine rate ceilings are injected by
//! the builders and are not caller-overridable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use ipnetwork::IpNetwork;
use scangate_core::ClearedTarget;
use scangate_core::CorrelationId;
use thiserror::Error;

use crate::diskscan::DiskMode;
use crate::memscan::MemoryMode;
use crate::portscan::PortScanMode;
use crate::vulnscan::VulnScanMode;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum comma-separated segments in one port specification.
const MAX_PORT_SEGMENTS: usize = 64;

// ============================================================================
// SECTION: Tool Classes
// ============================================================================

/// Wrapped tool classes the gateway knows how to constrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolClass {
    /// Network port scanner.
    PortScan,
    /// Network vulnerability scanner.
    VulnScan,
    /// Memory-image forensics analyzer.
    MemoryForensics,
    /// Disk-image forensics analyzer.
    DiskForensics,
}

impl ToolClass {
    /// Returns the operation name used for rate limiting and audit records.
    #[must_use]
    pub const fn operation(self) -> &'static str {
        match self {
            Self::PortScan => "portscan",
            Self::VulnScan => "vulnscan",
            Self::MemoryForensics => "memscan",
            Self::DiskForensics => "diskscan",
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Rejection reasons produced by the invocation policy builders.
///
/// Builders fail fast: the first failing check is returned and no partial
/// descriptor exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvocationError {
    /// The operation-mode token is not in the tool class's safe set.
    #[error("unknown {class} mode: {token}")]
    UnknownMode {
        /// Tool class label.
        class: &'static str,
        /// Rejected token.
        token: String,
    },
    /// A port specification failed to parse.
    #[error("invalid port specification: {0}")]
    InvalidPortSpec(&'static str),
    /// A resource parameter exceeds its configured ceiling.
    #[error("{class} {parameter} {requested} exceeds ceiling {ceiling}")]
    ResourceCeiling {
        /// Tool class label.
        class: &'static str,
        /// Parameter name.
        parameter: &'static str,
        /// Requested amount.
        requested: u64,
        /// Configured ceiling.
        ceiling: u64,
    },
    /// The cleared target kind does not fit the tool class.
    #[error("{class} cannot operate on the cleared target kind")]
    TargetMismatch {
        /// Tool class label.
        class: &'static str,
    },
}

// ============================================================================
// SECTION: Port Specifications
// ============================================================================

/// One parsed element of a port specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PortSegment {
    /// A single port.
    Single(u16),
    /// An inclusive range.
    Range(u16, u16),
}

/// Validated port list/range expression such as `80,443,8000-8100`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSpec {
    /// Parsed segments in input order.
    segments: Vec<PortSegment>,
    /// Total ports covered, counting overlaps once per mention.
    count: u32,
}

impl PortSpec {
    /// Parses a port specification.
    ///
    /// # Errors
    ///
    /// Returns [`InvocationError::InvalidPortSpec`] for empty input, ports
    /// outside 1-65535, inverted ranges, or too many segments.
    pub fn parse(text: &str) -> Result<Self, InvocationError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(InvocationError::InvalidPortSpec("empty specification"));
        }
        let mut segments = Vec::new();
        let mut count: u32 = 0;
        for part in trimmed.split(',') {
            if segments.len() >= MAX_PORT_SEGMENTS {
                return Err(InvocationError::InvalidPortSpec("too many segments"));
            }
            let part = part.trim();
            let segment = if let Some((start, end)) = part.split_once('-') {
                let start = parse_port(start)?;
                let end = parse_port(end)?;
                if start > end {
                    return Err(InvocationError::InvalidPortSpec("inverted range"));
                }
                count = count.saturating_add(u32::from(end - start) + 1);
                PortSegment::Range(start, end)
            } else {
                let port = parse_port(part)?;
                count = count.saturating_add(1);
                PortSegment::Single(port)
            };
            segments.push(segment);
        }
        Ok(Self {
            segments,
            count,
        })
    }

    /// Returns the number of ports the specification covers.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Renders the specification in the engine's `-p` argument form.
    #[must_use]
    pub fn render(&self) -> String {
        let parts: Vec<String> = self
            .segments
            .iter()
            .map(|segment| match segment {
                PortSegment::Single(port) => port.to_string(),
                PortSegment::Range(start, end) => format!("{start}-{end}"),
            })
            .collect();
        parts.join(",")
    }
}

/// Parses one port number in 1-65535.
fn parse_port(text: &str) -> Result<u16, InvocationError> {
    let port: u16 = text
        .trim()
        .parse()
        .map_err(|_| InvocationError::InvalidPortSpec("port is not a number in 1-65535"))?;
    if port == 0 {
        return Err(InvocationError::InvalidPortSpec("port zero is not scannable"));
    }
    Ok(port)
}

// ============================================================================
// SECTION: Descriptors
// ============================================================================

/// Target a descriptor acts on.
#[derive(Debug, Clone)]
pub enum InvocationTarget {
    /// Validated network target.
    Network(IpNetwork),
    /// Canonicalized evidence image path.
    Evidence(PathBuf),
}

impl From<ClearedTarget> for InvocationTarget {
    fn from(target: ClearedTarget) -> Self {
        match target {
            ClearedTarget::Network(network) => Self::Network(network),
            ClearedTarget::Evidence(path) => Self::Evidence(path),
        }
    }
}

/// Per-class validated action and bounds.
#[derive(Debug, Clone)]
pub enum ToolAction {
    /// Port scan with an optional explicit port set.
    PortScan {
        /// Validated scan mode.
        mode: PortScanMode,
        /// Explicit ports; the mode's default set applies when absent.
        ports: Option<PortSpec>,
    },
    /// Vulnerability scan.
    VulnScan {
        /// Validated scan mode.
        mode: VulnScanMode,
    },
    /// Memory-image analysis.
    MemoryForensics {
        /// Validated analysis mode.
        mode: MemoryMode,
        /// Result-row ceiling recorded for the run.
        max_rows: u32,
    },
    /// Disk-image analysis.
    DiskForensics {
        /// Validated analysis mode.
        mode: DiskMode,
        /// Directory-depth ceiling recorded for the run.
        max_depth: u32,
    },
}

/// Fully validated invocation handed to an engine adapter.
///
/// # Invariants
/// - Only the policy builders construct values of this type; every field is
///   from a closed set or checked against a configured ceiling.
/// - `timeout` and `packet_rate_ceiling` come from configuration, never from
///   the caller.
#[derive(Debug, Clone)]
pub struct InvocationDescriptor {
    /// Tool class the descriptor belongs to.
    pub class: ToolClass,
    /// Validated target.
    pub target: InvocationTarget,
    /// Validated action and bounds.
    pub action: ToolAction,
    /// Absolute wall-clock budget for the engine process.
    pub timeout: Duration,
    /// Engine packet-rate ceiling (packets per second) for network scans.
    pub packet_rate_ceiling: u32,
    /// Correlation identifier of the originating request.
    pub correlation_id: CorrelationId,
}

// scangate-tools/src/memscan.rs
// ============================================================================
// Module: Memory Forensics Policy
// Description: Safe-mode enumeration and bounds for memory-image analysis.
// Purpose: Map caller requests onto constrained memory-forensics descriptors.
// Dependencies: scangate-core, crate::descriptor
// ============================================================================

//! ## Overview
//! Memory analysis runs against a validated local evidence image, never a
//! live system. Modes map onto read-only carving plugins; the row ceiling
//! bounds the result volume recorded for the run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

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

/// Safe memory-analysis modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryMode {
    /// Process listing.
    Processes,
    /// Network connection carving.
    Network,
    /// Loaded-module listing.
    Modules,
    /// Event timeline reconstruction.
    Timeline,
}

impl MemoryMode {
    /// Parses a caller-supplied mode token.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "processes" => Some(Self::Processes),
            "network" => Some(Self::Network),
            "modules" => Some(Self::Modules),
            "timeline" => Some(Self::Timeline),
            _ => None,
        }
    }

    /// Returns the stable mode label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Processes => "processes",
            Self::Network => "network",
            Self::Modules => "modules",
            Self::Timeline => "timeline",
        }
    }

    /// Returns the engine plugin name for the mode.
    #[must_use]
    pub const fn engine_plugin(self) -> &'static str {
        match self {
            Self::Processes => "windows.pslist",
            Self::Network => "windows.netscan",
            Self::Modules => "windows.modules",
            Self::Timeline => "timeliner.Timeliner",
        }
    }
}

// ============================================================================
// SECTION: Limits and Requests
// ============================================================================

/// Configured bounds for the memory-forensics class.
#[derive(Debug, Clone, Copy)]
pub struct MemScanLimits {
    /// Maximum result rows one analysis may request.
    pub max_rows: u32,
    /// Absolute engine timeout.
    pub timeout: Duration,
}

impl Default for MemScanLimits {
    fn default() -> Self {
        Self {
            max_rows: 10_000,
            timeout: Duration::from_secs(1800),
        }
    }
}

/// Caller-supplied memory-analysis parameters.
#[derive(Debug, Clone)]
pub struct MemScanRequest {
    /// Requested mode token.
    pub mode: String,
    /// Optional result-row bound; the configured ceiling applies when absent.
    pub max_rows: Option<u32>,
}

// ============================================================================
// SECTION: Policy Builder
// ============================================================================

/// Invocation policy builder for the memory-forensics class.
#[derive(Debug, Clone, Copy)]
pub struct MemScanPolicy {
    /// Configured bounds.
    limits: MemScanLimits,
}

impl MemScanPolicy {
    /// Creates a builder with the given bounds.
    #[must_use]
    pub const fn new(limits: MemScanLimits) -> Self {
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
        request: &MemScanRequest,
    ) -> Result<InvocationDescriptor, InvocationError> {
        let class = ToolClass::MemoryForensics;
        let ClearedTarget::Evidence(image) = &clearance.target else {
            return Err(InvocationError::TargetMismatch {
                class: class.operation(),
            });
        };
        let mode = MemoryMode::parse(&request.mode).ok_or_else(|| InvocationError::UnknownMode {
            class: class.operation(),
            token: request.mode.clone(),
        })?;
        let max_rows = request.max_rows.unwrap_or(self.limits.max_rows);
        if max_rows > self.limits.max_rows {
            return Err(InvocationError::ResourceCeiling {
                class: class.operation(),
                parameter: "row count",
                requested: u64::from(max_rows),
                ceiling: u64::from(self.limits.max_rows),
            });
        }
        Ok(InvocationDescriptor {
            class,
            target: InvocationTarget::Evidence(image.clone()),
            action: ToolAction::MemoryForensics {
                mode,
                max_rows,
            },
            timeout: self.limits.timeout,
            packet_rate_ceiling: 0,
            correlation_id: clearance.correlation_id.clone(),
        })
    }
}

// scangate-tools/src/diskscan.rs
// ============================================================================
// Module: Disk Forensics Policy
// Description: Safe-mode enumeration and bounds for disk-image analysis.
// Purpose: Map caller requests onto constrained disk-forensics descriptors.
// Dependencies: scangate-core, crate::descriptor
// ============================================================================

//! ## Overview
//! Disk analysis runs read-only against a validated local image. Modes map
//! onto filesystem enumeration flag groups; the depth ceiling bounds how far
//! directory recursion may descend.

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

/// Safe disk-analysis modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskMode {
    /// Recursive file listing.
    FileList,
    /// Filesystem activity timeline.
    Timeline,
    /// Deleted-entry enumeration.
    DeletedFiles,
}

impl DiskMode {
    /// Parses a caller-supplied mode token.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "file-list" => Some(Self::FileList),
            "timeline" => Some(Self::Timeline),
            "deleted-files" => Some(Self::DeletedFiles),
            _ => None,
        }
    }

    /// Returns the stable mode label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FileList => "file-list",
            Self::Timeline => "timeline",
            Self::DeletedFiles => "deleted-files",
        }
    }

    /// Returns the engine flag group for the mode.
    #[must_use]
    pub const fn engine_args(self) -> &'static [&'static str] {
        match self {
            Self::FileList => &["-r", "-p"],
            Self::Timeline => &["-m", "/"],
            Self::DeletedFiles => &["-r", "-d"],
        }
    }
}

// ============================================================================
// SECTION: Limits and Requests
// ============================================================================

/// Configured bounds for the disk-forensics class.
#[derive(Debug, Clone, Copy)]
pub struct DiskScanLimits {
    /// Maximum directory recursion depth one analysis may request.
    pub max_depth: u32,
    /// Absolute engine timeout.
    pub timeout: Duration,
}

impl Default for DiskScanLimits {
    fn default() -> Self {
        Self {
            max_depth: 16,
            timeout: Duration::from_secs(1800),
        }
    }
}

/// Caller-supplied disk-analysis parameters.
#[derive(Debug, Clone)]
pub struct DiskScanRequest {
    /// Requested mode token.
    pub mode: String,
    /// Optional depth bound; the configured ceiling applies when absent.
    pub max_depth: Option<u32>,
}

// ============================================================================
// SECTION: Policy Builder
// ============================================================================

/// Invocation policy builder for the disk-forensics class.
#[derive(Debug, Clone, Copy)]
pub struct DiskScanPolicy {
    /// Configured bounds.
    limits: DiskScanLimits,
}

impl DiskScanPolicy {
    /// Creates a builder with the given bounds.
    #[must_use]
    pub const fn new(limits: DiskScanLimits) -> Self {
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
        request: &DiskScanRequest,
    ) -> Result<InvocationDescriptor, InvocationError> {
        let class = ToolClass::DiskForensics;
        let ClearedTarget::Evidence(image) = &clearance.target else {
            return Err(InvocationError::TargetMismatch {
                class: class.operation(),
            });
        };
        let mode = DiskMode::parse(&request.mode).ok_or_else(|| InvocationError::UnknownMode {
            class: class.operation(),
            token: request.mode.clone(),
        })?;
        let max_depth = request.max_depth.unwrap_or(self.limits.max_depth);
        if max_depth > self.limits.max_depth {
            return Err(InvocationError::ResourceCeiling {
                class: class.operation(),
                parameter: "directory depth",
                requested: u64::from(max_depth),
                ceiling: u64::from(self.limits.max_depth),
            });
        }
        Ok(InvocationDescriptor {
            class,
            target: InvocationTarget::Evidence(image.clone()),
            action: ToolAction::DiskForensics {
                mode,
                max_depth,
            },
            timeout: self.limits.timeout,
            packet_rate_ceiling: 0,
            correlation_id: clearance.correlation_id.clone(),
        })
    }
}

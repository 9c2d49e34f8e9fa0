// scangate-tools/src/adapter.rs
// ============================================================================
// Module: Engine Adapter
// Description: Translation from descriptors to external engine argv.
// Purpose: Keep engine invocation shell-free and descriptor-driven.
// Dependencies: crate::descriptor
// ============================================================================

//! ## Overview
//! The adapter turns a validated [`InvocationDescriptor`] into the wrapped
//! engine's native argument vector. Arguments are always passed as a vector,
//! never through a shell, and are built only from descriptor fields; there is
//! no path for caller-supplied text to reach the command line unvalidated.
//! Engine output is written to one artifact path per run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use crate::descriptor::InvocationDescriptor;
use crate::descriptor::InvocationTarget;
use crate::descriptor::ToolAction;
use crate::descriptor::ToolClass;

// ============================================================================
// SECTION: Engine Locations
// ============================================================================

/// Filesystem locations of the wrapped engines.
#[derive(Debug, Clone)]
pub struct EnginePaths {
    /// Port scanner binary.
    pub portscan: PathBuf,
    /// Vulnerability scanner binary.
    pub vulnscan: PathBuf,
    /// Memory forensics binary.
    pub memscan: PathBuf,
    /// Disk forensics binary.
    pub diskscan: PathBuf,
}

impl Default for EnginePaths {
    fn default() -> Self {
        Self {
            portscan: PathBuf::from("/usr/bin/nmap"),
            vulnscan: PathBuf::from("/usr/bin/gvm-script"),
            memscan: PathBuf::from("/usr/bin/vol"),
            diskscan: PathBuf::from("/usr/bin/fls"),
        }
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// One fully assembled engine invocation.
///
/// # Invariants
/// - `args` contains only values derived from a validated descriptor.
#[derive(Debug, Clone)]
pub struct EngineCommand {
    /// Engine binary to execute.
    pub program: PathBuf,
    /// Argument vector (no shell interpretation).
    pub args: Vec<String>,
    /// File that will receive the engine's standard output.
    pub artifact: PathBuf,
}

impl EngineCommand {
    /// Renders the command for display without executing it.
    #[must_use]
    pub fn render(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Builds the engine command for a descriptor.
#[must_use]
pub fn build_command(
    descriptor: &InvocationDescriptor,
    engines: &EnginePaths,
    results_dir: &Path,
) -> EngineCommand {
    let artifact = artifact_path(descriptor, results_dir);
    let (program, args) = match &descriptor.action {
        ToolAction::PortScan {
            mode,
            ports,
        } => {
            let mut args: Vec<String> =
                mode.engine_args().iter().map(|arg| (*arg).to_string()).collect();
            args.push("--max-rate".to_string());
            args.push(descriptor.packet_rate_ceiling.to_string());
            if let Some(spec) = ports {
                args.push("-p".to_string());
                args.push(spec.render());
            }
            args.push("-oX".to_string());
            args.push("-".to_string());
            args.push(target_argument(&descriptor.target));
            (engines.portscan.clone(), args)
        }
        ToolAction::VulnScan {
            mode,
        } => {
            let args = vec![
                "--config".to_string(),
                mode.engine_config().to_string(),
                "--max-checks".to_string(),
                descriptor.packet_rate_ceiling.to_string(),
                "--target".to_string(),
                target_argument(&descriptor.target),
            ];
            (engines.vulnscan.clone(), args)
        }
        ToolAction::MemoryForensics {
            mode,
            max_rows: _,
        } => {
            let args = vec![
                "-f".to_string(),
                target_argument(&descriptor.target),
                mode.engine_plugin().to_string(),
            ];
            (engines.memscan.clone(), args)
        }
        ToolAction::DiskForensics {
            mode,
            max_depth: _,
        } => {
            let mut args: Vec<String> =
                mode.engine_args().iter().map(|arg| (*arg).to_string()).collect();
            args.push(target_argument(&descriptor.target));
            (engines.diskscan.clone(), args)
        }
    };
    EngineCommand {
        program,
        args,
        artifact,
    }
}

/// Renders the descriptor target as one argv element.
fn target_argument(target: &InvocationTarget) -> String {
    match target {
        InvocationTarget::Network(network) => {
            // A host-length network renders as the bare address.
            if host_prefix(network) {
                network.ip().to_string()
            } else {
                network.to_string()
            }
        }
        InvocationTarget::Evidence(path) => path.display().to_string(),
    }
}

/// Returns true for /32 and /128 networks.
fn host_prefix(network: &ipnetwork::IpNetwork) -> bool {
    match network {
        ipnetwork::IpNetwork::V4(net) => net.prefix() == 32,
        ipnetwork::IpNetwork::V6(net) => net.prefix() == 128,
    }
}

/// Chooses the artifact path for a run.
fn artifact_path(descriptor: &InvocationDescriptor, results_dir: &Path) -> PathBuf {
    let extension = match descriptor.class {
        ToolClass::PortScan => "xml",
        ToolClass::VulnScan | ToolClass::MemoryForensics | ToolClass::DiskForensics => "txt",
    };
    results_dir.join(format!(
        "{}-{}.{extension}",
        descriptor.class.operation(),
        descriptor.correlation_id
    ))
}

// scangate-tools/src/lib.rs
// ============================================================================
// Module: Scangate Tools Library
// Description: Public API surface for invocation policy and engine execution.
// Purpose: Expose descriptors, per-class builders, adapters, and the executor.
// Dependencies: crate::{descriptor, portscan, vulnscan, memscan, diskscan, adapter, executor}
// ============================================================================

//! ## Overview
//! This crate holds the per-tool-class invocation policy builders that turn a
//! cleared gateway request into a bounded [`descriptor::InvocationDescriptor`],
//! the adapter that renders descriptors into engine argument vectors, and the
//! bounded executor that runs engines under the descriptor timeout.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod adapter;
pub mod descriptor;
pub mod diskscan;
pub mod executor;
pub mod memscan;
pub mod portscan;
pub mod vulnscan;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use adapter::EngineCommand;
pub use adapter::EnginePaths;
pub use adapter::build_command;
pub use descriptor::InvocationDescriptor;
pub use descriptor::InvocationError;
pub use descriptor::InvocationTarget;
pub use descriptor::PortSpec;
pub use descriptor::ToolAction;
pub use descriptor::ToolClass;
pub use diskscan::DiskMode;
pub use diskscan::DiskScanLimits;
pub use diskscan::DiskScanPolicy;
pub use diskscan::DiskScanRequest;
pub use executor::ExecutionError;
pub use executor::ToolExecutor;
pub use executor::ToolOutcome;
pub use memscan::MemScanLimits;
pub use memscan::MemScanPolicy;
pub use memscan::MemScanRequest;
pub use memscan::MemoryMode;
pub use portscan::PortScanLimits;
pub use portscan::PortScanMode;
pub use portscan::PortScanPolicy;
pub use portscan::PortScanRequest;
pub use vulnscan::VulnScanLimits;
pub use vulnscan::VulnScanMode;
pub use vulnscan::VulnScanPolicy;
pub use vulnscan::VulnScanRequest;

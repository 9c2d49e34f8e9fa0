// scangate-config/src/lib.rs
// ============================================================================
// Module: Scangate Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for scangate.toml semantics.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! `scangate-config` defines the canonical configuration model for the
//! gateway. Parsing is strict and fail-closed: explicit files must exist,
//! sizes are bounded, and every numeric ceiling is validated against a named
//! hard limit.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;

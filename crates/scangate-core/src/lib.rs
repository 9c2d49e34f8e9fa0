// scangate-core/src/lib.rs
// ============================================================================
// Module: Scangate Core Library
// Description: Public API surface for the Scangate gateway core.
// Purpose: Expose identity, policy, audit, and guard-chain runtime types.
// Dependencies: crate::{core, runtime}
// ============================================================================

//! ## Overview
//! Scangate core implements the authorization-and-execution-safety gateway
//! shared by every wrapped scanning tool: fail-closed guards, a sliding
//! window rate limiter, CIDR allow/deny resolution with deny precedence, and
//! a hash-chained append-only audit trail. Engine invocation itself lives in
//! the tools crate; this crate only decides and records.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use runtime::AuthMode;
pub use runtime::AuthOutcome;
pub use runtime::AuthRejection;
pub use runtime::Authenticator;
pub use runtime::Authorizer;
pub use runtime::AuthzOutcome;
pub use runtime::Clearance;
pub use runtime::ClearedTarget;
pub use runtime::DEFAULT_MAX_TARGET_HOSTS;
pub use runtime::DEFAULT_RATE_CEILING;
pub use runtime::GateError;
pub use runtime::GateRequest;
pub use runtime::Gateway;
pub use runtime::GatewayParams;
pub use runtime::RATE_WINDOW_SECONDS;
pub use runtime::RateDecision;
pub use runtime::RateError;
pub use runtime::RateLedger;
pub use runtime::RateLimiter;
pub use runtime::TargetDeniedKind;
pub use runtime::TargetRejection;
pub use runtime::TargetRequest;
pub use runtime::TargetValidator;
pub use runtime::validate_evidence;

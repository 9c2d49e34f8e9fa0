// scangate-core/src/runtime/mod.rs
// ============================================================================
// Module: Scangate Runtime
// Description: Guard stages and the ordered gateway that runs them.
// Purpose: Compose the leaf types into the policy-enforcement point.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The runtime holds the four guard stages and the [`gateway::Gateway`] that
//! executes them in fixed order, auditing every decision.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod authenticator;
pub mod authorizer;
pub mod gateway;
pub mod rate;
pub mod target;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use authenticator::AuthMode;
pub use authenticator::AuthOutcome;
pub use authenticator::AuthRejection;
pub use authenticator::Authenticator;
pub use authorizer::Authorizer;
pub use authorizer::AuthzOutcome;
pub use gateway::Clearance;
pub use gateway::ClearedTarget;
pub use gateway::GateError;
pub use gateway::GateRequest;
pub use gateway::Gateway;
pub use gateway::GatewayParams;
pub use gateway::TargetDeniedKind;
pub use gateway::TargetRequest;
pub use rate::DEFAULT_RATE_CEILING;
pub use rate::RATE_WINDOW_SECONDS;
pub use rate::RateDecision;
pub use rate::RateError;
pub use rate::RateLedger;
pub use rate::RateLimiter;
pub use target::DEFAULT_MAX_TARGET_HOSTS;
pub use target::TargetRejection;
pub use target::TargetValidator;
pub use target::validate_evidence;

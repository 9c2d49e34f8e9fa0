// scangate-core/src/runtime/gateway.rs
// ============================================================================
// Module: Scangate Gateway
// Description: Ordered guard-chain execution for gated tool requests.
// Purpose: Decide, audit, and fail closed before any external engine runs.
// Dependencies: scangate core types, runtime guards
// ============================================================================

//! ## Overview
//! `Gateway::clear` runs the guard chain as an ordered, blocking sequence:
//! authenticate, authorize, rate-limit, validate target. No stage is skipped
//! or reordered, every stage decision emits exactly one audit record, and an
//! unwritable audit sink aborts the request no matter how far the chain has
//! progressed. Construction is explicit; nothing happens at load time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::sync::Arc;

use ipnetwork::IpNetwork;
use thiserror::Error;

use crate::core::audit::AuditError;
use crate::core::audit::AuditEvent;
use crate::core::audit::AuditSink;
use crate::core::audit::Decision;
use crate::core::audit::GateStage;
use crate::core::audit::Severity;
use crate::core::identity::CorrelationId;
use crate::core::identity::Identity;
use crate::core::identity::OperationName;
use crate::core::identity::PresentedSecret;
use crate::core::identity::Username;
use crate::core::policy::PolicyStore;
use crate::runtime::authenticator::AuthOutcome;
use crate::runtime::authenticator::Authenticator;
use crate::runtime::authorizer::Authorizer;
use crate::runtime::authorizer::AuthzOutcome;
use crate::runtime::rate::RateDecision;
use crate::runtime::rate::RateLimiter;
use crate::runtime::target::TargetRejection;
use crate::runtime::target::TargetValidator;
use crate::runtime::target::validate_evidence;

// ============================================================================
// SECTION: Requests and Clearances
// ============================================================================

/// Target a request asks to act on.
#[derive(Debug, Clone)]
pub enum TargetRequest {
    /// A network address or CIDR expression to scan.
    Network(String),
    /// A local forensic evidence image to analyze.
    Evidence(PathBuf),
}

/// One request entering the guard chain.
#[derive(Debug, Clone)]
pub struct GateRequest {
    /// Claimed principal name.
    pub username: Username,
    /// Presented secret, absent when the caller supplies none.
    pub secret: Option<PresentedSecret>,
    /// Operation class being requested.
    pub operation: OperationName,
    /// Requested target.
    pub target: TargetRequest,
    /// Origin address of the caller, when known.
    pub origin: Option<String>,
    /// Correlation identifier tying the request's audit records together.
    pub correlation_id: CorrelationId,
}

/// Target that survived validation.
#[derive(Debug, Clone)]
pub enum ClearedTarget {
    /// Validated network target.
    Network(IpNetwork),
    /// Canonicalized evidence image path.
    Evidence(PathBuf),
}

/// Proof that a request passed the full guard chain.
///
/// Produced by [`Gateway::clear`] after every stage has passed; the policy
/// builders consume it when constructing descriptors.
#[derive(Debug, Clone)]
pub struct Clearance {
    /// Authenticated identity.
    pub identity: Identity,
    /// Operation class admitted by the rate limiter.
    pub operation: OperationName,
    /// Validated target.
    pub target: ClearedTarget,
    /// Correlation identifier of the request.
    pub correlation_id: CorrelationId,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Why a target was denied, without exposing policy contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetDeniedKind {
    /// The target does not parse.
    Malformed,
    /// The target touches a deny-list entry.
    DenyMatch,
    /// No allow-list entry covers the target.
    NotAllowListed,
    /// The requested range is wider than permitted.
    RangeTooLarge,
    /// The evidence path failed validation.
    EvidenceRejected,
}

impl TargetDeniedKind {
    /// Returns a stable label for user-visible messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Malformed => "malformed target",
            Self::DenyMatch => "target matches a deny rule",
            Self::NotAllowListed => "target is not allow-listed",
            Self::RangeTooLarge => "requested range too large",
            Self::EvidenceRejected => "evidence path rejected",
        }
    }
}

/// Terminal guard-chain failures. No guard is retried; callers resubmit.
#[derive(Debug, Error)]
pub enum GateError {
    /// Credential verification failed. The reason is deliberately generic.
    #[error("authentication failed")]
    Authentication,
    /// The identity is not in the authorized-user set.
    #[error("user is not authorized for gated operations")]
    Authorization,
    /// The sliding-window ceiling is reached for this user and operation.
    #[error("rate limit exceeded; retry after {retry_after}s")]
    RateLimited {
        /// Seconds until budget frees up.
        retry_after: i64,
    },
    /// The target was denied.
    #[error("target denied: {}", .kind.label())]
    TargetDenied {
        /// Denial category.
        kind: TargetDeniedKind,
    },
    /// The policy store could not produce a snapshot; fail closed.
    #[error("policy store unavailable")]
    PolicyUnavailable,
    /// The rate ledger is unusable; fail closed.
    #[error("rate ledger unavailable")]
    LedgerUnavailable,
    /// The audit sink rejected a record; fatal regardless of stage.
    #[error(transparent)]
    Audit(#[from] AuditError),
}

// ============================================================================
// SECTION: Gateway
// ============================================================================

/// Construction parameters for [`Gateway::new`].
pub struct GatewayParams {
    /// Credential verification stage.
    pub authenticator: Authenticator,
    /// Policy store providing snapshots to the authorizer and validator.
    pub policy: Arc<PolicyStore>,
    /// Admissions per (user, operation) per rolling hour.
    pub rate_ceiling: u32,
    /// Maximum addresses one network target may span.
    pub max_target_hosts: u128,
    /// Root directory forensic evidence images must live under.
    pub evidence_root: Option<PathBuf>,
    /// Audit record sink.
    pub audit: Arc<dyn AuditSink>,
    /// Time source for the rate window and audit timestamps.
    pub clock: Arc<dyn crate::core::time::Clock>,
}

/// Policy-enforcement point executing the guard chain.
pub struct Gateway {
    /// Credential verification stage.
    authenticator: Authenticator,
    /// Membership stage.
    authorizer: Authorizer,
    /// Sliding-window admission stage.
    limiter: RateLimiter,
    /// Allow/deny resolution stage.
    validator: TargetValidator,
    /// Policy snapshots.
    policy: Arc<PolicyStore>,
    /// Evidence image root.
    evidence_root: Option<PathBuf>,
    /// Audit record sink.
    audit: Arc<dyn AuditSink>,
    /// Time source.
    clock: Arc<dyn crate::core::time::Clock>,
}

impl Gateway {
    /// Builds a gateway. Idempotent and side-effect free; the owning process
    /// calls this once before serving any request.
    #[must_use]
    pub fn new(params: GatewayParams) -> Self {
        Self {
            authenticator: params.authenticator,
            authorizer: Authorizer,
            limiter: RateLimiter::new(params.rate_ceiling),
            validator: TargetValidator::new(params.max_target_hosts),
            policy: params.policy,
            evidence_root: params.evidence_root,
            audit: params.audit,
            clock: params.clock,
        }
    }

    /// Returns the audit sink so later stages reuse the same trail.
    #[must_use]
    pub fn audit(&self) -> &Arc<dyn AuditSink> {
        &self.audit
    }

    /// Returns the clock used for audit timestamps.
    #[must_use]
    pub fn clock(&self) -> &Arc<dyn crate::core::time::Clock> {
        &self.clock
    }

    /// Returns the rate limiter for diagnostics and tests.
    #[must_use]
    pub const fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Runs the guard chain for one request.
    ///
    /// Stage order is fixed: authenticate, authorize, rate-limit, validate
    /// target. Each stage emits exactly one audit record before its outcome
    /// is acted on.
    ///
    /// # Errors
    ///
    /// Returns [`GateError`] naming the first failing stage, or
    /// [`GateError::Audit`] when the trail cannot be written.
    pub fn clear(&self, request: &GateRequest) -> Result<Clearance, GateError> {
        let identity = self.stage_authenticate(request)?;
        // One snapshot serves the whole request; a reload lands on the next.
        let snapshot = self.fetch_snapshot(request)?;
        self.stage_authorize(request, &snapshot, &identity)?;
        self.stage_rate_limit(request, &identity)?;
        let target = self.stage_validate_target(request, &snapshot)?;
        Ok(Clearance {
            identity,
            operation: request.operation.clone(),
            target,
            correlation_id: request.correlation_id.clone(),
        })
    }

    /// Fetches the policy snapshot, failing closed (and auditing) when the
    /// store is unavailable.
    fn fetch_snapshot(
        &self,
        request: &GateRequest,
    ) -> Result<std::sync::Arc<crate::core::policy::PolicySnapshot>, GateError> {
        match self.policy.snapshot() {
            Ok(snapshot) => Ok(snapshot),
            Err(err) => {
                self.emit(
                    request,
                    GateStage::Authorize,
                    Decision::Deny,
                    Severity::Error,
                    format!("policy store unavailable; failing closed: {err}"),
                )?;
                Err(GateError::PolicyUnavailable)
            }
        }
    }

    /// Stage 1: credential verification.
    fn stage_authenticate(&self, request: &GateRequest) -> Result<Identity, GateError> {
        let outcome = self.authenticator.authenticate(&request.username, request.secret.as_ref());
        match outcome {
            AuthOutcome::Accepted(identity) => {
                let (severity, message) = if identity.is_bypassed() {
                    (Severity::Warn, "authentication disabled by configuration; bypassing".to_string())
                } else {
                    (Severity::Info, "credential verified".to_string())
                };
                self.emit(request, GateStage::Authenticate, Decision::Allow, severity, message)?;
                Ok(identity)
            }
            AuthOutcome::Rejected(rejection) => {
                self.emit(
                    request,
                    GateStage::Authenticate,
                    Decision::Deny,
                    Severity::Warn,
                    format!("authentication rejected: {}", rejection.label()),
                )?;
                Err(GateError::Authentication)
            }
        }
    }

    /// Stage 2: authorized-user membership.
    fn stage_authorize(
        &self,
        request: &GateRequest,
        snapshot: &crate::core::policy::PolicySnapshot,
        identity: &Identity,
    ) -> Result<(), GateError> {
        match self.authorizer.authorize(snapshot, identity) {
            AuthzOutcome::Accepted => {
                self.emit(
                    request,
                    GateStage::Authorize,
                    Decision::Allow,
                    Severity::Info,
                    "user is in the authorized set".to_string(),
                )?;
                Ok(())
            }
            AuthzOutcome::Rejected {
                empty_set,
            } => {
                let message = if empty_set {
                    "authorized-user set is empty; failing closed".to_string()
                } else {
                    "user is not in the authorized set".to_string()
                };
                self.emit(request, GateStage::Authorize, Decision::Deny, Severity::Warn, message)?;
                Err(GateError::Authorization)
            }
        }
    }

    /// Stage 3: sliding-window rate admission.
    fn stage_rate_limit(&self, request: &GateRequest, identity: &Identity) -> Result<(), GateError> {
        let now = self.clock.now_unix();
        let decision = self.limiter.admit(identity.username(), &request.operation, now);
        match decision {
            Ok(RateDecision::Admitted {
                used,
            }) => {
                self.emit(
                    request,
                    GateStage::RateLimit,
                    Decision::Allow,
                    Severity::Info,
                    format!("admitted ({used}/{} in window)", self.limiter.ceiling()),
                )?;
                Ok(())
            }
            Ok(RateDecision::Throttled {
                retry_after,
            }) => {
                self.emit(
                    request,
                    GateStage::RateLimit,
                    Decision::Deny,
                    Severity::Warn,
                    format!("throttled; ceiling {} reached", self.limiter.ceiling()),
                )?;
                Err(GateError::RateLimited {
                    retry_after,
                })
            }
            Err(err) => {
                self.emit(
                    request,
                    GateStage::RateLimit,
                    Decision::Deny,
                    Severity::Error,
                    format!("rate ledger unavailable; failing closed: {err}"),
                )?;
                Err(GateError::LedgerUnavailable)
            }
        }
    }

    /// Stage 4: target allow/deny resolution.
    fn stage_validate_target(
        &self,
        request: &GateRequest,
        snapshot: &crate::core::policy::PolicySnapshot,
    ) -> Result<ClearedTarget, GateError> {
        match &request.target {
            TargetRequest::Network(raw) => {
                match self.validator.validate(snapshot, raw) {
                    Ok(network) => {
                        self.emit(
                            request,
                            GateStage::ValidateTarget,
                            Decision::Allow,
                            Severity::Info,
                            format!("target {network} allowed"),
                        )?;
                        Ok(ClearedTarget::Network(network))
                    }
                    Err(rejection) => {
                        let kind = network_denial_kind(&rejection);
                        self.emit(
                            request,
                            GateStage::ValidateTarget,
                            Decision::Deny,
                            Severity::Warn,
                            format!("target denied: {rejection}"),
                        )?;
                        Err(GateError::TargetDenied {
                            kind,
                        })
                    }
                }
            }
            TargetRequest::Evidence(path) => {
                match validate_evidence(self.evidence_root.as_deref(), path) {
                    Ok(resolved) => {
                        self.emit(
                            request,
                            GateStage::ValidateTarget,
                            Decision::Allow,
                            Severity::Info,
                            format!("evidence image {} allowed", resolved.display()),
                        )?;
                        Ok(ClearedTarget::Evidence(resolved))
                    }
                    Err(rejection) => {
                        self.emit(
                            request,
                            GateStage::ValidateTarget,
                            Decision::Deny,
                            Severity::Warn,
                            format!("target denied: {rejection}"),
                        )?;
                        Err(GateError::TargetDenied {
                            kind: TargetDeniedKind::EvidenceRejected,
                        })
                    }
                }
            }
        }
    }

    /// Emits one audit record for a stage decision.
    fn emit(
        &self,
        request: &GateRequest,
        stage: GateStage,
        decision: Decision,
        severity: Severity,
        message: String,
    ) -> Result<(), AuditError> {
        self.audit.record(AuditEvent {
            unix_seconds: self.clock.now_unix(),
            severity,
            correlation_id: request.correlation_id.as_str().to_string(),
            actor: Some(request.username.as_str().to_string()),
            origin: request.origin.clone(),
            stage,
            decision,
            message,
        })
    }
}

/// Maps a validator rejection onto its public denial category.
const fn network_denial_kind(rejection: &TargetRejection) -> TargetDeniedKind {
    match rejection {
        TargetRejection::Malformed => TargetDeniedKind::Malformed,
        TargetRejection::DenyMatch(_) => TargetDeniedKind::DenyMatch,
        TargetRejection::NotAllowListed => TargetDeniedKind::NotAllowListed,
        TargetRejection::RangeTooLarge {
            ..
        } => TargetDeniedKind::RangeTooLarge,
        TargetRejection::Evidence(_) => TargetDeniedKind::EvidenceRejected,
    }
}

// scangate-core/src/core/time.rs
// ============================================================================
// Module: Scangate Time Model
// Description: Clock seam and timestamp rendering for guard decisions.
// Purpose: Keep guard logic deterministic by injecting time explicitly.
// Dependencies: time
// ============================================================================

//! ## Overview
//! Guard components never read wall-clock time directly. A [`Clock`] is
//! injected at construction so the rate-limiter window and audit timestamps
//! are fully controllable in tests and replayable from recorded inputs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Clock Seam
// ============================================================================

/// Source of the current time in unix seconds.
pub trait Clock: Send + Sync {
    /// Returns the current time as seconds since the unix epoch.
    fn now_unix(&self) -> i64;
}

/// Clock backed by the operating system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> i64 {
        let elapsed = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
        i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX)
    }
}

/// Manually advanced clock for deterministic tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    /// Current value in unix seconds.
    now: AtomicI64,
}

impl ManualClock {
    /// Creates a manual clock starting at the given unix second.
    #[must_use]
    pub fn new(start: i64) -> Self {
        Self {
            now: AtomicI64::new(start),
        }
    }

    /// Replaces the current time.
    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Advances the current time by the given number of seconds.
    pub fn advance(&self, seconds: i64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_unix(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders a unix-second timestamp as RFC 3339 UTC for audit records.
///
/// Out-of-range values fall back to the raw second count so a record is
/// always written.
#[must_use]
pub fn render_rfc3339(unix_seconds: i64) -> String {
    OffsetDateTime::from_unix_timestamp(unix_seconds)
        .ok()
        .and_then(|stamp| stamp.format(&Rfc3339).ok())
        .unwrap_or_else(|| unix_seconds.to_string())
}

// scangate-core/src/runtime/rate.rs
// ============================================================================
// Module: Scangate Rate Limiter
// Description: Sliding-window admission over an in-memory keyed ledger.
// Purpose: Bound operations per (user, operation) pair per rolling hour.
// Dependencies: std collections and locks
// ============================================================================

//! ## Overview
//! The ledger keeps one timestamp deque per `(user, operation)` key. Checking
//! the window count and inserting the new entry happen under that key's own
//! lock, so a concurrent burst from one user cannot slip past the ceiling,
//! while unrelated keys proceed without contention. Entries that age out of
//! the trailing window are purged on the next access to the same key.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use thiserror::Error;

use crate::core::identity::OperationName;
use crate::core::identity::Username;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Sliding window length in seconds.
pub const RATE_WINDOW_SECONDS: i64 = 3600;

/// Default admissions per key per window.
pub const DEFAULT_RATE_CEILING: u32 = 10;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by ledger access.
#[derive(Debug, Error)]
pub enum RateError {
    /// A ledger lock was poisoned by a panicking holder.
    #[error("rate ledger lock poisoned")]
    Poisoned,
}

// ============================================================================
// SECTION: Ledger
// ============================================================================

/// Ledger key: one admission history per user and operation.
type LedgerKey = (String, String);

/// Per-key admission timestamps, oldest first.
type KeyHistory = Arc<Mutex<VecDeque<i64>>>;

/// In-memory append-only admission ledger.
#[derive(Debug, Default)]
pub struct RateLedger {
    /// Admission histories keyed by (user, operation).
    keys: Mutex<HashMap<LedgerKey, KeyHistory>>,
}

impl RateLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the per-key history, creating it on first use.
    fn history(&self, username: &Username, operation: &OperationName) -> Result<KeyHistory, RateError> {
        let key = (username.as_str().to_string(), operation.as_str().to_string());
        let mut keys = self.keys.lock().map_err(|_| RateError::Poisoned)?;
        Ok(Arc::clone(keys.entry(key).or_default()))
    }

    /// Counts non-expired entries for a key without inserting.
    ///
    /// # Errors
    ///
    /// Returns [`RateError::Poisoned`] when a ledger lock is poisoned.
    pub fn count(
        &self,
        username: &Username,
        operation: &OperationName,
        now: i64,
    ) -> Result<u32, RateError> {
        let history = self.history(username, operation)?;
        let entries = history.lock().map_err(|_| RateError::Poisoned)?;
        let window_start = now - RATE_WINDOW_SECONDS;
        let live = entries.iter().filter(|stamp| **stamp >= window_start).count();
        Ok(u32::try_from(live).unwrap_or(u32::MAX))
    }
}

// ============================================================================
// SECTION: Limiter
// ============================================================================

/// Result of a rate admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// The request is admitted and recorded in the ledger.
    Admitted {
        /// Admissions used inside the window, including this one.
        used: u32,
    },
    /// The ceiling is reached; nothing was recorded.
    Throttled {
        /// Seconds until the oldest in-window entry expires.
        retry_after: i64,
    },
}

/// Sliding-window rate limiter over the ledger.
#[derive(Debug)]
pub struct RateLimiter {
    /// Backing ledger.
    ledger: RateLedger,
    /// Maximum admissions per key per window.
    ceiling: u32,
}

impl RateLimiter {
    /// Creates a limiter with the given per-window ceiling.
    #[must_use]
    pub fn new(ceiling: u32) -> Self {
        Self {
            ledger: RateLedger::new(),
            ceiling,
        }
    }

    /// Returns the configured ceiling.
    #[must_use]
    pub const fn ceiling(&self) -> u32 {
        self.ceiling
    }

    /// Returns the backing ledger for inspection.
    #[must_use]
    pub const fn ledger(&self) -> &RateLedger {
        &self.ledger
    }

    /// Admits or throttles one request at time `now`.
    ///
    /// Count-then-insert runs under the key's lock so concurrent requests for
    /// the same key serialize; purging stays inside the same critical section
    /// and only removes entries already outside the window.
    ///
    /// # Errors
    ///
    /// Returns [`RateError::Poisoned`] when a ledger lock is poisoned; the
    /// caller must fail closed.
    pub fn admit(
        &self,
        username: &Username,
        operation: &OperationName,
        now: i64,
    ) -> Result<RateDecision, RateError> {
        let history = self.ledger.history(username, operation)?;
        let mut entries = history.lock().map_err(|_| RateError::Poisoned)?;
        let window_start = now - RATE_WINDOW_SECONDS;
        while entries.front().is_some_and(|stamp| *stamp < window_start) {
            entries.pop_front();
        }
        let used = u32::try_from(entries.len()).unwrap_or(u32::MAX);
        if used >= self.ceiling {
            let retry_after = entries
                .front()
                .map_or(RATE_WINDOW_SECONDS, |oldest| oldest + RATE_WINDOW_SECONDS - now);
            return Ok(RateDecision::Throttled {
                retry_after,
            });
        }
        entries.push_back(now);
        Ok(RateDecision::Admitted {
            used: used + 1,
        })
    }
}

//! Timestamp freshness checks (replay window).
//!
//! The window is symmetric: a timestamp slightly in the future is accepted
//! the same way as one slightly in the past, which absorbs clock skew
//! between caller and membrane.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Result of checking a timestamp against the replay window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayOutcome {
    /// Within the window.
    Valid,
    /// Parsed, but further than the window from now.
    Expired,
    /// Not a finite decimal number of epoch seconds.
    Malformed,
}

/// Parse a decimal Unix epoch seconds value, fractional part allowed.
pub fn parse_timestamp(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|ts| ts.is_finite())
}

/// Check `raw` against `now` with a tolerance of `window` in either direction.
pub fn check_timestamp(raw: &str, now: SystemTime, window: Duration) -> ReplayOutcome {
    let Some(ts) = parse_timestamp(raw) else {
        return ReplayOutcome::Malformed;
    };

    if (epoch_seconds(now) - ts).abs() > window.as_secs_f64() {
        ReplayOutcome::Expired
    } else {
        ReplayOutcome::Valid
    }
}

fn epoch_seconds(at: SystemTime) -> f64 {
    match at.duration_since(UNIX_EPOCH) {
        Ok(since) => since.as_secs_f64(),
        Err(before) => -before.duration().as_secs_f64(),
    }
}

/// Replay window bound to the wall clock.
#[derive(Debug, Clone, Copy)]
pub struct ReplayGuard {
    window: Duration,
}

impl ReplayGuard {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Check a timestamp against the current wall-clock time.
    pub fn check(&self, raw: &str) -> ReplayOutcome {
        self.check_at(raw, SystemTime::now())
    }

    pub fn check_at(&self, raw: &str, now: SystemTime) -> ReplayOutcome {
        check_timestamp(raw, now, self.window)
    }
}

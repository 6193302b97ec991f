//! Interval derivation shared by the blocking and async limiters.

use std::time::Duration;

use crate::error::{Result, RpmGateError};

/// The window a per-minute rate is expressed over.
pub const RATE_WINDOW: Duration = Duration::from_secs(60);

/// Compute the minimum spacing between two gated calls for a per-minute rate.
///
/// The rate must be finite and positive, and the resulting interval must be
/// representable as a non-zero [`Duration`].
pub fn interval_for_rpm(max_rpm: f64) -> Result<Duration> {
    if !max_rpm.is_finite() || max_rpm <= 0.0 {
        return Err(RpmGateError::InvalidRate(max_rpm));
    }

    match Duration::try_from_secs_f64(RATE_WINDOW.as_secs_f64() / max_rpm) {
        Ok(interval) if !interval.is_zero() => Ok(interval),
        _ => Err(RpmGateError::InvalidRate(max_rpm)),
    }
}

/// How long a caller must still wait, given the time elapsed since the last call.
///
/// `None` means the gate has never been passed, so no wait is due.
pub(crate) fn remaining_wait(since_last_call: Option<Duration>, interval: Duration) -> Duration {
    since_last_call.map_or(Duration::ZERO, |elapsed| interval.saturating_sub(elapsed))
}

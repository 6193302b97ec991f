//! Async fixed-interval rate limiter.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, trace};

use super::interval::{interval_for_rpm, remaining_wait};
use crate::config::LimiterConfig;
use crate::error::Result;

/// The async counterpart of [`PeakRpmLimiter`](super::PeakRpmLimiter).
///
/// Waiting suspends the task instead of blocking the worker thread. Tasks
/// sharing one limiter queue on the internal lock in arrival order.
pub struct AsyncPeakRpmLimiter {
    max_rpm: f64,
    interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl AsyncPeakRpmLimiter {
    /// Create a new limiter allowing at most `max_rpm` calls per minute.
    pub fn new(max_rpm: f64) -> Result<Self> {
        let interval = interval_for_rpm(max_rpm)?;
        Ok(Self {
            max_rpm,
            interval,
            last_call: Mutex::new(None),
        })
    }

    /// Create a new limiter from configuration.
    pub fn from_config(config: &LimiterConfig) -> Result<Self> {
        Self::new(config.max_rpm)
    }

    /// Wait until a call is allowed to proceed.
    pub async fn gate(&self) {
        let mut last_call = self.last_call.lock().await;

        let wait = remaining_wait(last_call.map(|at| at.elapsed()), self.interval);
        if wait.is_zero() {
            trace!(interval_ms = self.interval.as_millis() as u64, "Gate open");
        } else {
            debug!(
                wait_ms = wait.as_millis() as u64,
                interval_ms = self.interval.as_millis() as u64,
                "Waiting before next call"
            );
            tokio::time::sleep(wait).await;
        }

        *last_call = Some(Instant::now());
    }

    /// Forget the previous call so the next gate passes immediately.
    pub async fn reset(&self) {
        *self.last_call.lock().await = None;
    }

    /// Get how long a call made now would have to wait, without waiting.
    pub async fn time_until_ready(&self) -> Duration {
        let last_call = self.last_call.lock().await;
        remaining_wait(last_call.map(|at| at.elapsed()), self.interval)
    }

    /// Get the configured maximum calls per minute.
    pub fn max_rpm(&self) -> f64 {
        self.max_rpm
    }

    /// Get the minimum spacing between calls.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

//! Blocking fixed-interval rate limiter.

use parking_lot::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use super::interval::{interval_for_rpm, remaining_wait};
use crate::config::LimiterConfig;
use crate::error::Result;

/// A rate limiter that spaces calls at least `60 / max_rpm` seconds apart.
///
/// [`gate`](Self::gate) blocks the calling thread until the interval since the
/// previous gated call has elapsed. The limiter is thread-safe and can be shared
/// across threads behind an `Arc`: callers queue on an internal lock, so the
/// spacing holds between any two gated calls regardless of which thread made them.
pub struct PeakRpmLimiter {
    max_rpm: f64,
    interval: Duration,
    /// When the gate was last passed; `None` until the first call
    last_call: Mutex<Option<Instant>>,
}

impl PeakRpmLimiter {
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

    /// Block until a call is allowed to proceed.
    ///
    /// The first call on a fresh limiter returns immediately. The timestamp is
    /// taken after waking, so scheduler overshoot only ever widens the spacing.
    pub fn gate(&self) {
        let mut last_call = self.last_call.lock();

        let wait = remaining_wait(last_call.map(|at| at.elapsed()), self.interval);
        if wait.is_zero() {
            trace!(interval_ms = self.interval.as_millis() as u64, "Gate open");
        } else {
            debug!(
                wait_ms = wait.as_millis() as u64,
                interval_ms = self.interval.as_millis() as u64,
                "Waiting before next call"
            );
            std::thread::sleep(wait);
        }

        *last_call = Some(Instant::now());
    }

    /// Get how long a call made now would have to wait, without waiting.
    pub fn time_until_ready(&self) -> Duration {
        let last_call = self.last_call.lock();
        remaining_wait(last_call.map(|at| at.elapsed()), self.interval)
    }

    /// Forget the previous call so the next gate passes immediately.
    pub fn reset(&self) {
        *self.last_call.lock() = None;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RpmGateError;
    use std::sync::Arc;

    /// Slack for timer granularity and scheduling noise.
    const TOLERANCE: Duration = Duration::from_millis(100);

    fn timed_gates(limiter: &PeakRpmLimiter, calls: usize) -> Duration {
        let start = Instant::now();
        for _ in 0..calls {
            limiter.gate();
        }
        start.elapsed()
    }

    #[test]
    fn test_limiter_creation() {
        let limiter = PeakRpmLimiter::new(30.0).unwrap();
        assert_eq!(limiter.max_rpm(), 30.0);
        assert_eq!(limiter.interval(), Duration::from_secs(2));
        assert_eq!(limiter.time_until_ready(), Duration::ZERO);
    }

    #[test]
    fn test_limiter_rejects_invalid_rate() {
        assert!(matches!(PeakRpmLimiter::new(0.0), Err(RpmGateError::InvalidRate(_))));
        assert!(matches!(PeakRpmLimiter::new(-5.0), Err(RpmGateError::InvalidRate(_))));
    }

    #[test]
    fn test_limiter_from_config() {
        let config = LimiterConfig { max_rpm: 120.0 };
        let limiter = PeakRpmLimiter::from_config(&config).unwrap();
        assert_eq!(limiter.interval(), Duration::from_millis(500));
    }

    #[test]
    fn test_first_call_is_free() {
        let limiter = PeakRpmLimiter::new(1.0).unwrap();
        assert!(timed_gates(&limiter, 1) < TOLERANCE);
    }

    #[test]
    fn test_three_calls_at_30_rpm() {
        let limiter = PeakRpmLimiter::new(30.0).unwrap();
        assert!(timed_gates(&limiter, 3) >= Duration::from_millis(3900));
    }

    #[test]
    fn test_three_calls_at_10_rpm() {
        let limiter = PeakRpmLimiter::new(10.0).unwrap();
        assert!(timed_gates(&limiter, 3) >= Duration::from_secs(12));
    }

    #[test]
    fn test_spacing_lower_bound() {
        // 600 RPM = 100ms between calls
        let limiter = PeakRpmLimiter::new(600.0).unwrap();
        let calls = 6;
        let elapsed = timed_gates(&limiter, calls);
        assert!(elapsed >= limiter.interval() * (calls as u32 - 1) - TOLERANCE);
    }

    #[test]
    fn test_no_wait_after_interval_elapsed() {
        let limiter = PeakRpmLimiter::new(60.0).unwrap();
        limiter.gate();

        std::thread::sleep(Duration::from_secs(1));

        assert_eq!(limiter.time_until_ready(), Duration::ZERO);
        assert!(timed_gates(&limiter, 1) < TOLERANCE);
    }

    #[test]
    fn test_each_wait_bounded_by_interval() {
        let limiter = PeakRpmLimiter::new(600.0).unwrap();
        limiter.gate();

        for _ in 0..5 {
            let start = Instant::now();
            limiter.gate();
            assert!(start.elapsed() <= limiter.interval() + TOLERANCE);
        }
    }

    #[test]
    fn test_partial_wait_after_delay() {
        let limiter = PeakRpmLimiter::new(30.0).unwrap();
        limiter.gate();

        std::thread::sleep(Duration::from_millis(300));

        let remaining = limiter.time_until_ready();
        assert!(remaining > Duration::ZERO);
        assert!(remaining <= Duration::from_millis(1700));
    }

    #[test]
    fn test_reset() {
        let limiter = PeakRpmLimiter::new(1.0).unwrap();
        limiter.gate();
        assert!(limiter.time_until_ready() > Duration::from_secs(50));

        limiter.reset();
        assert_eq!(limiter.time_until_ready(), Duration::ZERO);
        assert!(timed_gates(&limiter, 1) < TOLERANCE);
    }

    #[test]
    fn test_shared_across_threads() {
        let limiter = Arc::new(PeakRpmLimiter::new(600.0).unwrap());
        let threads = 4;
        let calls_per_thread = 2;

        let start = Instant::now();
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                std::thread::spawn(move || {
                    for _ in 0..calls_per_thread {
                        limiter.gate();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let total_calls = (threads * calls_per_thread) as u32;
        assert!(start.elapsed() >= limiter.interval() * (total_calls - 1) - TOLERANCE);
    }
}

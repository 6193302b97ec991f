//! Rate limiting logic and state management.

mod async_limiter;
mod interval;
mod limiter;

pub use async_limiter::AsyncPeakRpmLimiter;
pub use interval::{interval_for_rpm, RATE_WINDOW};
pub use limiter::PeakRpmLimiter;

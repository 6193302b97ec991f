//! rpmgate - Client-side Request Rate Limiting
//!
//! This crate paces outgoing calls to an API so that no more than a configured
//! number of requests are issued per minute. Every call passes through a gate
//! that waits until a fixed interval has elapsed since the previous call.

pub mod config;
pub mod error;
pub mod ratelimit;

pub use error::{Result, RpmGateError};
pub use ratelimit::{interval_for_rpm, AsyncPeakRpmLimiter, PeakRpmLimiter};

//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → timeouts.rs (enforce per-attempt deadline)
//!     → On failure: surface the error, no retry
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every upstream call has a deadline
//! - Streamed bodies have no total deadline, only a per-read idle timeout,
//!   so long media transfers are not cut off but stalled ones are

pub mod timeouts;

//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → basic_auth.rs (optional Basic-Auth gate, constant-time compare)
//!     → Pass to routing
//! Outbound request:
//!     → headers.rs (allowlist, credential injection)
//! Relayed response:
//!     → headers.rs (strip transport framing headers)
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any gate check failure
//! - No trust in client input: inbound headers are allowlisted

pub mod basic_auth;
pub mod headers;

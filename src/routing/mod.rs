//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (path, query)
//!     → axum route table (http/server.rs) picks api | file | stream
//!     → router.rs builds the upstream URL
//!     → matcher.rs vets caller-supplied stream URLs
//!     → Return: target URL, BadRequest or Forbidden
//!
//! Compilation (at startup):
//!     UpstreamConfig
//!     → origins + relay prefix
//!     → stream policy (scheme AND host suffix)
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Upstream origins are configuration, not constants
//! - Deterministic: same input always yields the same target

pub mod matcher;
pub mod router;

pub use router::{FixedRoute, RouteKind, Router};

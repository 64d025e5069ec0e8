//! Upstream credential handling.
//!
//! # Data Flow
//! ```text
//! CustomizedToken header ─┐
//!                         ├→ resolver.rs → "Bearer <token>" → outbound Authorization
//! IWARA_AUTHORIZATION ────┘
//!
//! IWARA_AUTHORIZATION → status.rs → not_configured | valid | expired → /token-status
//! ```

pub mod resolver;
pub mod status;

pub use resolver::{normalize_bearer, resolve_authorization, CUSTOMIZED_TOKEN};
pub use status::{token_status, TokenStatus};

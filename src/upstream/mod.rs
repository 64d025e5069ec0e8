//! Upstream access.
//!
//! # Data Flow
//! ```text
//! handler → UpstreamRequest (url, filtered headers, body mode, timeout)
//!     → UpstreamClient::get (reqwest_client.rs in production)
//!     → UpstreamResponse { status, headers, Full(bytes) | Stream(chunks) }
//!     → chunked.rs bounds stream chunk size for the relay
//! ```
//!
//! # Design Decisions
//! - No retries: a failed attempt surfaces immediately
//! - Streamed bodies get a per-read idle timeout, not a total deadline
//! - Streams are one-shot; dropping one releases the connection

pub mod chunked;
pub mod client;
pub mod reqwest_client;

pub use chunked::BoundedChunks;
pub use client::{
    BodyMode, ByteStream, UpstreamBody, UpstreamClient, UpstreamError, UpstreamRequest,
    UpstreamResponse,
};
pub use reqwest_client::ReqwestUpstream;

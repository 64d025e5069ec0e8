//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap upstream calls with a per-attempt deadline
//! - Cancel the wrapped future cleanly when the deadline passes
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other transport errors
//! - No retry follows a timeout

use std::future::Future;
use std::time::Duration;

use crate::upstream::UpstreamError;

/// Run `fut` with a deadline, mapping expiry to [`UpstreamError::Timeout`].
pub async fn with_timeout<F, T>(duration: Duration, fut: F) -> Result<T, UpstreamError>
where
    F: Future<Output = Result<T, UpstreamError>>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(result) => result,
        Err(_) => Err(UpstreamError::Timeout(duration)),
    }
}

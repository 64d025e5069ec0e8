//! Re-chunking of streamed upstream bodies.

use std::pin::Pin;
use std::task::{ready, Context, Poll};

use bytes::Bytes;
use futures_util::Stream;

use super::client::{ByteStream, UpstreamError};

/// Splits an upstream byte stream into chunks of at most `max` bytes.
///
/// The inner stream is only polled once the previous chunk has been fully
/// handed out, so reading never runs ahead of the consumer. Dropping this
/// stream drops the upstream body and releases its connection.
pub struct BoundedChunks {
    inner: ByteStream,
    pending: Bytes,
    max: usize,
}

impl BoundedChunks {
    pub fn new(inner: ByteStream, max: usize) -> Self {
        Self {
            inner,
            pending: Bytes::new(),
            max: max.max(1),
        }
    }
}

impl Stream for BoundedChunks {
    type Item = Result<Bytes, UpstreamError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if !this.pending.is_empty() {
                let len = this.pending.len().min(this.max);
                return Poll::Ready(Some(Ok(this.pending.split_to(len))));
            }
            match ready!(this.inner.as_mut().poll_next(cx)) {
                Some(Ok(bytes)) => this.pending = bytes,
                other => return Poll::Ready(other),
            }
        }
    }
}

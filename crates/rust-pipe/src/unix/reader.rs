//! Timed, buffered reads over one child output stream.
//!
//! A [`StreamReader`] keeps the bytes that made the stream "ready" in an
//! internal buffer, so a readiness poll that races with a timeout never
//! drops output.

use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::Result;
use crate::traits::Readable;

/// Largest chunk handed out by a single read (10,000 bytes).
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// Poll timeout used between reads while draining.
pub const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Buffered reader over one stream of a piped child.
pub struct StreamReader {
    /// Name used in trace output ("stdout", "stderr").
    label: &'static str,
    /// The underlying async stream.
    inner: Box<dyn AsyncRead + Unpin + Send>,
    /// Bytes read from the stream but not yet handed out.
    pending: BytesMut,
    /// End-of-file latch.
    eof: bool,
}

impl std::fmt::Debug for StreamReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamReader")
            .field("label", &self.label)
            .field("pending", &self.pending.len())
            .field("eof", &self.eof)
            .finish()
    }
}

impl StreamReader {
    /// Wrap an async stream.
    pub fn new(label: &'static str, inner: Box<dyn AsyncRead + Unpin + Send>) -> Self {
        Self {
            label,
            inner,
            pending: BytesMut::with_capacity(DEFAULT_CHUNK_SIZE),
            eof: false,
        }
    }

    /// The label given at construction.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.label
    }

    /// Number of buffered bytes not yet returned by a read.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Perform one read from the underlying stream into the pending buffer.
    ///
    /// Cancel-safe: dropping this future before completion consumes nothing.
    async fn fill(&mut self) -> Result<()> {
        self.pending.reserve(DEFAULT_CHUNK_SIZE);
        let n = self.inner.read_buf(&mut self.pending).await?;
        if n == 0 {
            tracing::trace!(stream = self.label, "end of file");
            self.eof = true;
        } else {
            tracing::trace!(stream = self.label, bytes = n, "read");
        }
        Ok(())
    }
}

impl Readable for StreamReader {
    async fn poll(&mut self, timeout: Duration) -> Result<bool> {
        if !self.pending.is_empty() || self.eof {
            return Ok(true);
        }

        match tokio::time::timeout(timeout, self.fill()).await {
            Ok(result) => result.map(|()| true),
            Err(_elapsed) => Ok(false),
        }
    }

    async fn read_chunk(&mut self, max_bytes: usize) -> Result<(Bytes, bool)> {
        if self.pending.is_empty() && !self.eof {
            self.fill().await?;
        }

        if self.pending.is_empty() {
            return Ok((Bytes::new(), true));
        }

        let n = max_bytes.min(self.pending.len());
        Ok((self.pending.split_to(n).freeze(), false))
    }

    async fn drain(&mut self, max_iterations: usize) -> Result<Vec<u8>> {
        let mut drained = Vec::new();

        for _ in 0..max_iterations {
            if !self.poll(DRAIN_POLL_INTERVAL).await? {
                break;
            }
            let (chunk, eof) = self.read_chunk(DEFAULT_CHUNK_SIZE).await?;
            if eof {
                break;
            }
            drained.extend_from_slice(&chunk);
        }

        Ok(drained)
    }

    fn is_eof(&self) -> bool {
        self.eof && self.pending.is_empty()
    }
}

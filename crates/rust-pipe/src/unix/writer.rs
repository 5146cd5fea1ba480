//! Command sink connected to the child's stdin.

use tokio::io::AsyncWriteExt;
use tokio::process::ChildStdin;

use crate::error::{PipeError, Result};
use crate::traits::Writable;

/// Writer over the child's stdin pipe.
///
/// Closing drops the pipe, which the child observes as end-of-file.
#[derive(Debug)]
pub struct PipeWriter {
    inner: Option<ChildStdin>,
}

impl PipeWriter {
    /// Wrap a child's stdin.
    #[must_use]
    pub const fn new(stdin: ChildStdin) -> Self {
        Self { inner: Some(stdin) }
    }
}

impl Writable for PipeWriter {
    async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let stdin = self.inner.as_mut().ok_or(PipeError::Closed)?;
        stdin.write_all(data).await?;
        stdin.flush().await?;
        tracing::trace!(bytes = data.len(), "wrote to stdin");
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.inner.take().is_some() {
            tracing::trace!("closed stdin");
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.inner.is_some()
    }
}

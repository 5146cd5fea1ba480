//! Error types for the rust-pipe crate.
//!
//! This module provides a unified error type [`PipeError`] that covers the
//! failure modes of spawning and talking to a piped child process.

use std::io;

/// The error type for pipe operations.
#[derive(Debug, thiserror::Error)]
pub enum PipeError {
    /// Failed to create a pipe.
    #[error("failed to create pipe: {0}")]
    Create(#[source] io::Error),

    /// The child could not be started.
    #[error("spawn failed: {0}")]
    Spawn(#[source] io::Error),

    /// An I/O error occurred while reading or writing a pipe.
    #[error("pipe I/O error: {0}")]
    Io(#[from] io::Error),

    /// The pipe has been closed.
    #[error("pipe has been closed")]
    Closed,

    /// The child is gone.
    #[error("child already exited ({0})")]
    ProcessExited(i32),

    /// The OS refused a signal.
    #[error("failed to send signal {signal}: {source}")]
    Signal {
        /// The OS signal number that was being sent.
        signal: i32,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// Reaping the child failed.
    #[error("waiting on child failed: {0}")]
    Wait(#[source] io::Error),
}

/// A specialized Result type for pipe operations.
pub type Result<T> = std::result::Result<T, PipeError>;

#[cfg(unix)]
impl From<rustix::io::Errno> for PipeError {
    fn from(errno: rustix::io::Errno) -> Self {
        Self::Io(io::Error::from_raw_os_error(errno.raw_os_error()))
    }
}

impl PipeError {
    /// Create a signal error.
    #[must_use]
    pub const fn signal(signal: i32, source: io::Error) -> Self {
        Self::Signal { signal, source }
    }

    /// Check if this error means the peer closed its end.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        match self {
            Self::Closed | Self::ProcessExited(_) => true,
            Self::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::BrokenPipe | io::ErrorKind::UnexpectedEof
            ),
            _ => false,
        }
    }
}

//! Core traits for piped process I/O.
//!
//! This module defines the capability traits used by the rust-pipe crate:
//!
//! - [`Readable`]: A stream that can be polled for readiness and read in chunks.
//! - [`Writable`]: A stream commands can be written to.
//! - [`PipeChild`]: Handle for the spawned child process.

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;

use crate::error::Result;

/// A readable stream with timed readiness checks.
///
/// Implementations buffer internally so that a successful [`Readable::poll`]
/// never loses data: the bytes that made the stream ready are returned by
/// the next [`Readable::read_chunk`].
pub trait Readable: Send {
    /// Wait up to `timeout` for data (or end-of-file) to become available.
    ///
    /// Returns `false` if nothing arrived in time.
    fn poll(&mut self, timeout: Duration) -> impl Future<Output = Result<bool>> + Send;

    /// Read at most `max_bytes`.
    ///
    /// Returns the bytes read and whether the stream reached end-of-file.
    /// An empty chunk is always reported together with `eof == true`.
    fn read_chunk(&mut self, max_bytes: usize) -> impl Future<Output = Result<(Bytes, bool)>> + Send;

    /// Read whatever is immediately available, up to `max_iterations` reads.
    ///
    /// Each iteration polls with a short timeout; draining stops as soon as
    /// nothing is available, end-of-file is seen, or the budget is spent.
    fn drain(&mut self, max_iterations: usize) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// Whether end-of-file has been observed.
    fn is_eof(&self) -> bool;
}

/// A writable command sink.
pub trait Writable: Send {
    /// Write all bytes and flush.
    fn write_all(&mut self, data: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Close the stream, signalling EOF to the reader on the other end.
    fn close(&mut self) -> Result<()>;

    /// Check if the stream is still open.
    fn is_open(&self) -> bool;
}

/// Handle for a child process spawned with piped stdio.
pub trait PipeChild: Send {
    /// Get the process ID of the child.
    fn pid(&self) -> u32;

    /// Check if the child process is still running.
    fn is_running(&mut self) -> bool;

    /// Wait for the child process to exit.
    fn wait(&mut self) -> impl Future<Output = Result<ExitStatus>> + Send;

    /// Try to get the exit status without blocking.
    ///
    /// Returns `None` if the process is still running.
    fn try_wait(&mut self) -> Result<Option<ExitStatus>>;

    /// Send an OS signal number to the child process.
    fn signal(&self, signal: i32) -> Result<()>;

    /// Kill the child process.
    fn kill(&mut self) -> Result<()>;
}

/// How a piped child ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitStatus {
    /// Normal exit with this code.
    Exited(i32),

    /// Killed by this signal number.
    Signaled(i32),
}

impl ExitStatus {
    /// Whether the child exited with code 0.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self, Self::Exited(0))
    }

    /// The exit code, or `None` when a signal ended the child.
    #[must_use]
    pub const fn code(&self) -> Option<i32> {
        if let Self::Exited(code) = *self { Some(code) } else { None }
    }

    /// The terminating signal, or `None` on a normal exit.
    #[must_use]
    pub const fn signal(&self) -> Option<i32> {
        if let Self::Signaled(sig) = *self { Some(sig) } else { None }
    }
}

impl std::fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::Exited(code) => write!(f, "exit code {code}"),
            Self::Signaled(sig) => write!(f, "killed by signal {sig}"),
        }
    }
}

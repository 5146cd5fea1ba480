//! Unix platform implementation for piped child processes.
//!
//! This module provides the Unix-specific implementation, including:
//!
//! - Child spawning with three anonymous pipes (or stdout+stderr merged)
//! - Timed readiness polling and chunked reads over tokio's async pipes
//! - Signal delivery by process id via `rustix`
//!
//! # Example
//!
//! ```ignore
//! use rust_pipe::unix::UnixPipeSystem;
//! use rust_pipe::PipeConfig;
//!
//! let pipes = UnixPipeSystem::spawn("gdb", ["-q"], &PipeConfig::default())?;
//! println!("spawned pid {}", pipes.child.pid());
//! ```

mod child;
mod reader;
mod signals;
mod writer;

use std::ffi::OsStr;
use std::io;
use std::process::Stdio;

use rustix::io::{FdFlags, fcntl_setfd};
use tokio::io::AsyncRead;
use tokio::process::Command;

pub use child::UnixPipeChild;
pub use reader::{DEFAULT_CHUNK_SIZE, DRAIN_POLL_INTERVAL, StreamReader};
pub use signals::{is_alive, send_signal};
pub use writer::PipeWriter;

use crate::config::PipeConfig;
use crate::error::{PipeError, Result};
use crate::traits::PipeChild;

/// The three stream endpoints and the process handle of a spawned child.
#[derive(Debug)]
pub struct ChildPipes {
    /// Sink connected to the child's stdin.
    pub stdin: PipeWriter,
    /// Reader over the child's stdout (and stderr, when merged).
    pub stdout: StreamReader,
    /// Reader over the child's stderr; permanently at EOF when merged.
    pub stderr: StreamReader,
    /// The child process.
    pub child: UnixPipeChild,
}

/// Unix piped-process system.
///
/// This struct provides the factory method for spawning children on Unix.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnixPipeSystem;

impl UnixPipeSystem {
    /// Spawn `program` with `args`, connecting its stdio to fresh pipes.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`PipeError::Spawn`] if the process cannot be created and
    /// [`PipeError::Create`] if a pipe cannot be set up.
    pub fn spawn<S, I>(program: S, args: I, config: &PipeConfig) -> Result<ChildPipes>
    where
        S: AsRef<OsStr>,
        I: IntoIterator,
        I::Item: AsRef<OsStr>,
    {
        let mut cmd = Command::new(program.as_ref());
        cmd.args(args);
        cmd.env_clear();
        cmd.envs(config.effective_env());
        cmd.stdin(Stdio::piped());

        if let Some(ref dir) = config.cwd {
            cmd.current_dir(dir);
        }

        if config.new_process_group {
            cmd.process_group(0);
        }

        let merged_read = if config.merge_stderr {
            let (read, write) = rustix::pipe::pipe().map_err(errno_to_create)?;
            fcntl_setfd(&read, FdFlags::CLOEXEC).map_err(errno_to_create)?;
            fcntl_setfd(&write, FdFlags::CLOEXEC).map_err(errno_to_create)?;
            let write_dup = write.try_clone().map_err(PipeError::Create)?;
            cmd.stdout(Stdio::from(write));
            cmd.stderr(Stdio::from(write_dup));
            Some(read)
        } else {
            cmd.stdout(Stdio::piped());
            cmd.stderr(Stdio::piped());
            None
        };

        let mut child = cmd.spawn().map_err(PipeError::Spawn)?;
        // Our copies of a merged write end live in `cmd`; they must be closed
        // or the reader never sees EOF.
        drop(cmd);

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| PipeError::Create(missing("stdin")))?;

        let (stdout, stderr): (Box<dyn AsyncRead + Unpin + Send>, Box<dyn AsyncRead + Unpin + Send>) =
            if let Some(read) = merged_read {
                let receiver = tokio::net::unix::pipe::Receiver::from_owned_fd(read)
                    .map_err(PipeError::Create)?;
                (Box::new(receiver), Box::new(tokio::io::empty()))
            } else {
                let out = child
                    .stdout
                    .take()
                    .ok_or_else(|| PipeError::Create(missing("stdout")))?;
                let err = child
                    .stderr
                    .take()
                    .ok_or_else(|| PipeError::Create(missing("stderr")))?;
                (Box::new(out), Box::new(err))
            };

        let child = UnixPipeChild::new(child)?;
        tracing::debug!(pid = child.pid(), merged = config.merge_stderr, "spawned piped child");

        Ok(ChildPipes {
            stdin: PipeWriter::new(stdin),
            stdout: StreamReader::new("stdout", stdout),
            stderr: StreamReader::new("stderr", stderr),
            child,
        })
    }
}

/// Convenience type alias for the default pipe system on Unix.
pub type NativePipeSystem = UnixPipeSystem;

fn errno_to_create(errno: rustix::io::Errno) -> PipeError {
    PipeError::Create(io::Error::from_raw_os_error(errno.raw_os_error()))
}

fn missing(stream: &str) -> io::Error {
    io::Error::other(format!("child {stream} was not captured"))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::traits::{PipeChild, Readable, Writable};

    #[tokio::test]
    async fn spawn_cat_round_trip() {
        let mut pipes =
            UnixPipeSystem::spawn("cat", std::iter::empty::<&str>(), &PipeConfig::default())
                .expect("spawn cat");

        pipes.stdin.write_all(b"ping\n").await.expect("write");
        assert!(pipes.stdout.poll(Duration::from_secs(5)).await.expect("poll"));
        let (chunk, eof) = pipes.stdout.read_chunk(DEFAULT_CHUNK_SIZE).await.expect("read");
        assert!(!eof);
        assert_eq!(&chunk[..], b"ping\n");

        pipes.child.kill().ok();
    }

    #[tokio::test]
    async fn merged_stderr_arrives_on_stdout() {
        let config = PipeConfig::builder().merge_stderr(true).build();
        let mut pipes = UnixPipeSystem::spawn("sh", ["-c", "echo oops 1>&2"], &config)
            .expect("spawn sh");

        let mut seen = Vec::new();
        loop {
            assert!(pipes.stdout.poll(Duration::from_secs(5)).await.expect("poll"));
            let (chunk, eof) = pipes.stdout.read_chunk(DEFAULT_CHUNK_SIZE).await.expect("read");
            if eof {
                break;
            }
            seen.extend_from_slice(&chunk);
        }
        assert_eq!(seen, b"oops\n");

        let (_, eof) = pipes.stderr.read_chunk(16).await.expect("stderr read");
        assert!(eof);
        let _ = pipes.child.wait().await;
    }

    #[test]
    fn spawn_missing_program_fails() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");
        let _guard = runtime.enter();

        let result = UnixPipeSystem::spawn(
            "/nonexistent/definitely-not-here",
            std::iter::empty::<&str>(),
            &PipeConfig::default(),
        );
        assert!(matches!(result, Err(PipeError::Spawn(_))));
    }
}

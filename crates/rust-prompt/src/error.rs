//! Error types for rust-prompt.
//!
//! Only construction can fail with an error value: spawning the child and
//! the post-spawn handshake. Round-trip outcomes (timeout, stop, EOF) are
//! reported as [`ErrorKind`](crate::types::ErrorKind) data instead.

use std::io;

use rust_pipe::PipeError;
use thiserror::Error;

use crate::types::{ErrorKind, RoundTripResult};

/// Maximum length of output to display in handshake error messages.
const MAX_OUTPUT_DISPLAY: usize = 200;

/// Format the tail of a handshake response for display.
fn format_output_snippet(output: &str) -> String {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return "(no output)".to_string();
    }

    if trimmed.len() <= MAX_OUTPUT_DISPLAY {
        return trimmed.to_string();
    }

    let mut start = trimmed.len() - MAX_OUTPUT_DISPLAY;
    while !trimmed.is_char_boundary(start) {
        start += 1;
    }
    format!("...{}", &trimmed[start..])
}

/// The main error type for rust-prompt operations.
#[derive(Debug, Error)]
pub enum PromptError {
    /// Failed to spawn the child process.
    #[error("cannot start child: {0}")]
    Spawn(#[from] SpawnError),

    /// A setup command failed while opening the session.
    #[error(
        "handshake command '{command}' failed ({kind}): {}",
        format_output_snippet(output)
    )]
    Handshake {
        /// The setup command that failed.
        command: String,
        /// How the round trip ended.
        kind: ErrorKind,
        /// Output (stdout, then stderr) received before the failure.
        output: String,
    },

    /// Reading or writing a pipe failed.
    #[error("pipe I/O failed: {0}")]
    Io(#[from] io::Error),

    /// An I/O failure, with the operation that hit it.
    #[error("{context}: {source}")]
    IoWithContext {
        /// The operation.
        context: String,
        /// The cause.
        #[source]
        source: io::Error,
    },

    /// Invalid prompt regex.
    #[error("invalid prompt pattern: {0}")]
    Regex(#[from] regex::Error),

    /// Configuration error.
    #[error("bad configuration: {message}")]
    Config {
        /// What is wrong.
        message: String,
    },

    /// Signal delivery failed.
    #[error("signal not delivered: {message}")]
    Signal {
        /// Why delivery failed.
        message: String,
    },

    /// The session has been disposed.
    #[error("session already disposed")]
    SessionClosed,
}

/// Why the child could not be started.
#[derive(Debug, Error)]
pub enum SpawnError {
    /// The executable does not exist.
    #[error("no such executable: {command}")]
    CommandNotFound {
        /// The executable as configured.
        command: String,
    },

    /// The executable exists but cannot be run.
    #[error("not executable: {path}")]
    PermissionDenied {
        /// The path that could not be executed.
        path: String,
    },

    /// A spawn parameter was rejected before spawning.
    #[error("bad {kind} {value:?}: {reason}")]
    InvalidArgument {
        /// The kind of invalid input (e.g., "executable", "argument").
        kind: String,
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Pipe setup or other I/O error during spawn.
    #[error("spawn I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for rust-prompt operations.
pub type Result<T> = std::result::Result<T, PromptError>;

impl PromptError {
    /// Create a handshake error from the failed round trip.
    pub fn handshake(command: impl Into<String>, result: &RoundTripResult) -> Self {
        let mut output = result.output.clone();
        if !result.stderr.is_empty() {
            output.push_str(&result.stderr);
        }
        Self::Handshake {
            command: command.into(),
            kind: result.error,
            output,
        }
    }

    /// A configuration problem.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a signal error.
    pub fn signal(message: impl Into<String>) -> Self {
        Self::Signal {
            message: message.into(),
        }
    }

    /// An I/O failure during `context`.
    pub fn io_context(context: impl Into<String>, source: io::Error) -> Self {
        Self::IoWithContext {
            context: context.into(),
            source,
        }
    }

    /// Check if this is a spawn error.
    #[must_use]
    pub const fn is_spawn(&self) -> bool {
        matches!(self, Self::Spawn(_))
    }

    /// Check if this is a handshake error.
    #[must_use]
    pub const fn is_handshake(&self) -> bool {
        matches!(self, Self::Handshake { .. })
    }
}

impl From<PipeError> for PromptError {
    fn from(err: PipeError) -> Self {
        match err {
            PipeError::Io(e) | PipeError::Create(e) | PipeError::Wait(e) => Self::Io(e),
            PipeError::Spawn(e) => Self::Spawn(SpawnError::Io(e)),
            PipeError::Closed => Self::SessionClosed,
            PipeError::Signal { signal, source } => Self::signal(format!("signal {signal}: {source}")),
            other => Self::Io(io::Error::other(other.to_string())),
        }
    }
}

impl SpawnError {
    /// The executable does not exist.
    pub fn command_not_found(command: impl Into<String>) -> Self {
        Self::CommandNotFound {
            command: command.into(),
        }
    }

    /// The executable cannot be run.
    pub fn permission_denied(path: impl Into<String>) -> Self {
        Self::PermissionDenied { path: path.into() }
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(
        kind: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidArgument {
            kind: kind.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Classify a pipe-layer failure for `command`.
    pub fn from_pipe(err: PipeError, command: &str) -> Self {
        match err {
            PipeError::Spawn(io_err) => match io_err.kind() {
                io::ErrorKind::NotFound => Self::command_not_found(command),
                io::ErrorKind::PermissionDenied => Self::permission_denied(command),
                _ => Self::Io(io_err),
            },
            PipeError::Create(io_err) | PipeError::Io(io_err) | PipeError::Wait(io_err) => {
                Self::Io(io_err)
            }
            other => Self::Io(io::Error::other(other.to_string())),
        }
    }
}

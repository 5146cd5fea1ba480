//! Session handle.
//!
//! This module provides the [`Session`] type: the child's pipes, its
//! process handle, and the per-session defaults used by round trips.

use std::fmt;

use rust_pipe::{
    ExitStatus, PipeChild, PipeWriter, StreamReader, UnixPipeChild, UnixPipeSystem,
};

use crate::config::SessionConfig;
use crate::error::{PromptError, Result, SpawnError};
use crate::hooks::{CompletionHook, PollHook};
use crate::prompt::PromptPattern;
use crate::types::ErrorKind;

/// Values a round trip falls back to when its request leaves them unset.
pub(super) struct Defaults {
    pub(super) timeout_secs: u64,
    pub(super) prompt: PromptPattern,
    pub(super) poll_hook: Option<PollHook>,
    pub(super) completion_hook: Option<CompletionHook>,
}

/// A session with a spawned, prompt-driven child process.
///
/// Round trips take `&mut self`, so at most one exchange is in flight at a
/// time. The child is torn down by [`Session::dispose`] or on drop.
pub struct Session {
    pub(super) stdin: PipeWriter,
    pub(super) stdout: StreamReader,
    pub(super) stderr: StreamReader,
    pub(super) child: UnixPipeChild,
    pub(super) pid: u32,
    pub(super) config: SessionConfig,
    pub(super) defaults: Defaults,
    pub(super) last_error: ErrorKind,
    /// Latched once stdout reaches end-of-file.
    pub(super) eof: bool,
    pub(super) disposed: bool,
    pub(super) warnings: Vec<String>,
}

impl Session {
    /// Spawn the configured child without running the handshake.
    ///
    /// Must be called from within a Tokio runtime. See
    /// [`Session::open`] for spawn plus handshake.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::Regex`] if the default prompt does not compile
    /// and [`PromptError::Spawn`] if the process cannot be started.
    pub fn spawn(config: SessionConfig) -> Result<Self> {
        if config.executable.trim().is_empty() {
            return Err(SpawnError::invalid_argument(
                "executable",
                config.executable.clone(),
                "executable must not be empty",
            )
            .into());
        }
        let prompt = PromptPattern::new(&config.prompt)?;

        let pipes = UnixPipeSystem::spawn(
            &config.executable,
            config.arg_list(),
            &config.pipe_config(),
        )
        .map_err(|e| SpawnError::from_pipe(e, &config.executable))?;

        let pid = pipes.child.pid();
        tracing::debug!(
            pid,
            executable = %config.executable,
            args = %config.args,
            "spawned session child"
        );

        Ok(Self {
            stdin: pipes.stdin,
            stdout: pipes.stdout,
            stderr: pipes.stderr,
            child: pipes.child,
            pid,
            defaults: Defaults {
                timeout_secs: config.timeout_secs,
                prompt,
                poll_hook: None,
                completion_hook: None,
            },
            config,
            last_error: ErrorKind::None,
            eof: false,
            disposed: false,
            warnings: Vec::new(),
        })
    }

    /// Get the child process ID.
    #[must_use]
    pub const fn pid(&self) -> u32 {
        self.pid
    }

    /// Get the session configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The outcome of the most recent round trip.
    #[must_use]
    pub const fn last_error(&self) -> ErrorKind {
        self.last_error
    }

    /// Check if stdout end-of-file has been observed.
    ///
    /// Once true, every round trip returns [`ErrorKind::Eof`].
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        self.eof
    }

    /// Non-fatal problems collected while opening the session.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// The default prompt pattern.
    #[must_use]
    pub const fn default_prompt(&self) -> &PromptPattern {
        &self.defaults.prompt
    }

    /// Replace the default prompt pattern.
    pub fn set_default_prompt(&mut self, prompt: PromptPattern) {
        self.defaults.prompt = prompt;
    }

    /// The default timeout in seconds.
    #[must_use]
    pub const fn default_timeout_secs(&self) -> u64 {
        self.defaults.timeout_secs
    }

    /// Replace the default timeout.
    pub const fn set_default_timeout_secs(&mut self, secs: u64) {
        self.defaults.timeout_secs = secs;
    }

    /// Install (or remove) the default poll hook.
    pub fn set_poll_hook(&mut self, hook: Option<PollHook>) {
        self.defaults.poll_hook = hook;
    }

    /// Install (or remove) the default completion hook.
    pub fn set_completion_hook(&mut self, hook: Option<CompletionHook>) {
        self.defaults.completion_hook = hook;
    }

    /// The exit status, if the child's exit has been observed.
    #[must_use]
    pub const fn exit_status(&self) -> Option<ExitStatus> {
        self.child.exit_status()
    }

    /// Check whether the child has exited, without blocking.
    pub fn try_wait(&mut self) -> Result<Option<ExitStatus>> {
        self.child.try_wait().map_err(PromptError::from)
    }

    /// Send an OS signal number to the child.
    ///
    /// Returns whether delivery succeeded. Buffers are untouched.
    pub fn signal(&self, signal: i32) -> bool {
        crate::signal::signal(self, signal)
    }

    /// Send the configured interrupt signal.
    pub fn interrupt(&self) -> bool {
        self.signal(self.config.signals.interrupt)
    }

    pub(super) fn log_traffic(&self, direction: &'static str, text: &str) {
        if self.config.verbose {
            tracing::info!(pid = self.pid, direction, text, "traffic");
        } else {
            tracing::trace!(pid = self.pid, direction, text, "traffic");
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("pid", &self.pid)
            .field("executable", &self.config.executable)
            .field("prompt", &self.defaults.prompt)
            .field("timeout_secs", &self.defaults.timeout_secs)
            .field("last_error", &self.last_error)
            .field("eof", &self.eof)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

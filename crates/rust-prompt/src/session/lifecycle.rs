//! Session lifecycle management.
//!
//! Opening a session runs a handshake after spawn: wait for the startup
//! prompt, send the setup commands, then load the target file. Teardown
//! kills a still-running child and closes its stdin; it is idempotent and
//! runs on drop.

use std::path::Path;

use rust_pipe::{PipeChild, PipeSignal, Writable};

use super::handle::Session;
use super::round_trip::RoundTrip;
use crate::config::SessionConfig;
use crate::error::{PromptError, Result};

/// Command name reported when the startup prompt never arrives.
pub const STARTUP_COMMAND: &str = "<startup>";

impl Session {
    /// Spawn the configured child and run the handshake.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::Spawn`] if the process cannot be started and
    /// [`PromptError::Handshake`] if the startup prompt or any setup command
    /// does not complete normally. A failing target load is only recorded
    /// in [`Session::warnings`].
    pub async fn open(config: SessionConfig) -> Result<Self> {
        let mut session = Self::spawn(config)?;
        session.handshake().await?;
        Ok(session)
    }

    pub(super) async fn handshake(&mut self) -> Result<()> {
        if self.config.await_startup_prompt {
            let result = self.await_prompt(RoundTrip::clear()).await;
            if !result.is_ok() {
                return Err(PromptError::handshake(STARTUP_COMMAND, &result));
            }
            tracing::debug!(pid = self.pid, "startup prompt received");
        }

        let commands = self.config.setup_commands.clone();
        for command in &commands {
            let result = self.round_trip(RoundTrip::new(command.as_str())).await;
            if !result.is_ok() {
                tracing::debug!(pid = self.pid, command = %command, error = %result.error, "setup command failed");
                return Err(PromptError::handshake(command.as_str(), &result));
            }
            tracing::debug!(pid = self.pid, command = %command, "setup command acknowledged");
        }

        if let Some(target) = self.config.target.clone() {
            self.load_target(&target).await;
        }
        Ok(())
    }

    async fn load_target(&mut self, target: &Path) {
        let request = RoundTrip::new(format!("file {}", target.display()))
            .timeout_secs(self.config.load_timeout_secs);
        let result = self.round_trip(request).await;

        let warning = if !result.is_ok() {
            Some(format!(
                "loading {} failed ({}): {}",
                target.display(),
                result.error,
                result.output.trim()
            ))
        } else if !result.stderr.trim().is_empty() {
            Some(format!("loading {}: {}", target.display(), result.stderr.trim()))
        } else {
            None
        };

        if let Some(warning) = warning {
            tracing::warn!(pid = self.pid, %warning, "target load reported a problem");
            self.warnings.push(warning);
        } else {
            tracing::debug!(pid = self.pid, target = %target.display(), "target loaded");
        }
    }

    /// Tear the session down.
    ///
    /// Probes the child; if it is still alive it is killed. Stdin is closed
    /// and an already-exited child is reaped. Further round trips return
    /// [`ErrorKind::Eof`](crate::ErrorKind::Eof). Calling this more than
    /// once is harmless.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.eof = true;

        let probe = self.config.signals.resolve(PipeSignal::Probe);
        if self.child.signal(probe).is_ok() {
            let kill = self.config.signals.resolve(PipeSignal::Kill);
            match self.child.signal(kill) {
                Ok(()) => tracing::debug!(pid = self.pid, signal = kill, "killed session child"),
                Err(err) => tracing::warn!(pid = self.pid, error = %err, "failed to kill session child"),
            }
        }

        if let Err(err) = self.stdin.close() {
            tracing::debug!(pid = self.pid, error = %err, "closing stdin failed");
        }

        match self.child.try_wait() {
            Ok(Some(status)) => tracing::debug!(pid = self.pid, %status, "reaped session child"),
            Ok(None) => tracing::debug!(pid = self.pid, "session child not yet reaped"),
            Err(err) => tracing::debug!(pid = self.pid, error = %err, "reaping session child failed"),
        }
    }

    /// Whether [`Session::dispose`] has run.
    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.dispose();
    }
}

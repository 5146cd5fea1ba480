//! Synchronous wrapper for async sessions.
//!
//! This module provides a blocking API for callers without an async
//! runtime. Each [`SyncSession`] drives its session on a private
//! current-thread Tokio runtime.

use tokio::runtime::{Builder, Runtime};

use crate::config::SessionConfig;
use crate::error::{PromptError, Result};
use crate::session::{RoundTrip, Session, SessionBuilder};
use crate::types::{ErrorKind, RoundTripResult};

/// A [`Session`] whose round trips block the calling thread.
pub struct SyncSession {
    /// The inner async session. Declared first so it is torn down while the
    /// runtime still exists.
    inner: Session,
    /// The tokio runtime.
    runtime: Runtime,
}

fn runtime() -> Result<Runtime> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| PromptError::io_context("creating tokio runtime", e))
}

impl SyncSession {
    /// Spawn and run the handshake.
    ///
    /// # Errors
    ///
    /// Returns an error if spawning or the handshake fails.
    pub fn open(config: SessionConfig) -> Result<Self> {
        let runtime = runtime()?;
        let inner = runtime.block_on(Session::open(config))?;
        Ok(Self { inner, runtime })
    }

    /// Spawn without running the handshake.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::Spawn`] if the child cannot be started.
    pub fn spawn(config: SessionConfig) -> Result<Self> {
        let runtime = runtime()?;
        let inner = {
            let _guard = runtime.enter();
            Session::spawn(config)?
        };
        Ok(Self { inner, runtime })
    }

    /// Open a session from a builder, keeping its hooks.
    ///
    /// # Errors
    ///
    /// Returns an error if spawning or the handshake fails.
    pub fn from_builder(builder: SessionBuilder) -> Result<Self> {
        let runtime = runtime()?;
        let inner = runtime.block_on(builder.open())?;
        Ok(Self { inner, runtime })
    }

    /// The configuration the session was spawned with.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        self.inner.config()
    }

    /// The child's pid.
    #[must_use]
    pub const fn pid(&self) -> u32 {
        self.inner.pid()
    }

    /// The outcome of the most recent round trip.
    #[must_use]
    pub const fn last_error(&self) -> ErrorKind {
        self.inner.last_error()
    }

    /// Check if stdout end-of-file has been observed.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        self.inner.is_eof()
    }

    /// Non-fatal problems collected while opening the session.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        self.inner.warnings()
    }

    /// Write one command and block until the prompt, a timeout, a stop or
    /// end-of-file.
    pub fn round_trip(&mut self, request: RoundTrip) -> RoundTripResult {
        self.runtime.block_on(self.inner.round_trip(request))
    }

    /// Block until the prompt without writing.
    pub fn await_prompt(&mut self, request: RoundTrip) -> RoundTripResult {
        self.runtime.block_on(self.inner.await_prompt(request))
    }

    /// Run `command` with the session defaults.
    pub fn execute(&mut self, command: &str) -> RoundTripResult {
        self.runtime.block_on(self.inner.execute(command))
    }

    /// Run `command` and return only its output.
    pub fn get(&mut self, command: &str) -> String {
        self.runtime.block_on(self.inner.get(command))
    }

    /// Send an OS signal number to the child.
    pub fn signal(&self, signal: i32) -> bool {
        self.inner.signal(signal)
    }

    /// Send the configured interrupt signal.
    pub fn interrupt(&self) -> bool {
        self.inner.interrupt()
    }

    /// Tear the session down. Idempotent.
    pub fn dispose(&mut self) {
        let _guard = self.runtime.enter();
        self.inner.dispose();
    }

    /// Get the inner async session.
    #[must_use]
    pub const fn inner(&self) -> &Session {
        &self.inner
    }

    /// Get mutable access to the inner session.
    pub fn inner_mut(&mut self) -> &mut Session {
        &mut self.inner
    }
}

impl std::fmt::Debug for SyncSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncSession")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

//! Session builder for constructing sessions with layered configuration.
//!
//! Values are resolved from, lowest precedence first: built-in defaults, a
//! config file, the environment, and explicit builder calls. The order in
//! which builder methods are called does not change that precedence.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use rust_pipe::SignalMap;

use super::handle::Session;
use crate::config::{ConfigOverrides, EnvConfig, SessionConfig};
use crate::error::Result;
use crate::hooks::{CompletionHook, PollHook};
use crate::types::RoundTripResult;

/// Builder for creating sessions.
pub struct SessionBuilder {
    base: SessionConfig,
    file: Option<ConfigOverrides>,
    env: Option<ConfigOverrides>,
    explicit: ConfigOverrides,
    poll_hook: Option<PollHook>,
    completion_hook: Option<CompletionHook>,
}

impl SessionBuilder {
    /// Start from [`SessionConfig::default`].
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(SessionConfig::default())
    }

    /// Start from an existing configuration instead of the defaults.
    #[must_use]
    pub fn from_config(config: SessionConfig) -> Self {
        Self {
            base: config,
            file: None,
            env: None,
            explicit: ConfigOverrides::default(),
            poll_hook: None,
            completion_hook: None,
        }
    }

    /// Set the executable.
    #[must_use]
    pub fn executable(mut self, executable: impl Into<String>) -> Self {
        self.explicit.executable = Some(executable.into());
        self
    }

    /// Set the argument string.
    #[must_use]
    pub fn args(mut self, args: impl Into<String>) -> Self {
        self.explicit.args = Some(args.into());
        self
    }

    /// Set the target file loaded after the setup commands.
    #[must_use]
    pub fn target(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit.target = Some(path.into());
        self
    }

    /// Set the default timeout in seconds.
    #[must_use]
    pub const fn timeout_secs(mut self, secs: u64) -> Self {
        self.explicit.timeout_secs = Some(secs);
        self
    }

    /// Set the target load timeout in seconds.
    #[must_use]
    pub const fn load_timeout_secs(mut self, secs: u64) -> Self {
        self.explicit.load_timeout_secs = Some(secs);
        self
    }

    /// Set the default prompt regex.
    #[must_use]
    pub fn prompt(mut self, pattern: impl Into<String>) -> Self {
        self.explicit.prompt = Some(pattern.into());
        self
    }

    /// Replace the setup commands.
    #[must_use]
    pub fn setup_commands<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.explicit.setup_commands = Some(commands.into_iter().map(Into::into).collect());
        self
    }

    /// Skip the startup prompt and the setup commands.
    #[must_use]
    pub fn no_handshake(mut self) -> Self {
        self.explicit.await_startup_prompt = Some(false);
        self.explicit.setup_commands = Some(Vec::new());
        self
    }

    /// Set whether to wait for the startup prompt.
    #[must_use]
    pub const fn await_startup_prompt(mut self, value: bool) -> Self {
        self.explicit.await_startup_prompt = Some(value);
        self
    }

    /// Set whether stale output is drained before each command.
    #[must_use]
    pub const fn drain_before_send(mut self, value: bool) -> Self {
        self.explicit.drain_before_send = Some(value);
        self
    }

    /// Set the read budget of each drain.
    #[must_use]
    pub const fn drain_iterations(mut self, iterations: usize) -> Self {
        self.explicit.drain_iterations = Some(iterations);
        self
    }

    /// Set how many trailing bytes are searched for the prompt.
    #[must_use]
    pub const fn search_depth(mut self, depth: usize) -> Self {
        self.explicit.search_depth = Some(depth);
        self
    }

    /// Enable verbose traffic logging.
    #[must_use]
    pub const fn verbose(mut self, verbose: bool) -> Self {
        self.explicit.verbose = Some(verbose);
        self
    }

    /// Route stderr into the stdout pipe.
    #[must_use]
    pub const fn merge_stderr(mut self, merge: bool) -> Self {
        self.explicit.merge_stderr = Some(merge);
        self
    }

    /// Set the signal sent after a timeout and by [`Session::interrupt`].
    #[must_use]
    pub const fn interrupt_signal(mut self, signal: i32) -> Self {
        self.explicit.interrupt_signal = Some(signal);
        self
    }

    /// Set the whole signal map.
    #[must_use]
    pub const fn signals(mut self, signals: SignalMap) -> Self {
        self.explicit.interrupt_signal = Some(signals.interrupt);
        self.explicit.terminate_signal = Some(signals.terminate);
        self.explicit.kill_signal = Some(signals.kill);
        self
    }

    /// Add an environment variable for the child.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.explicit
            .env
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Directory the child starts in.
    #[must_use]
    pub fn working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit.working_dir = Some(path.into());
        self
    }

    /// Apply overrides at builder-call precedence.
    #[must_use]
    pub fn overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.explicit = std::mem::take(&mut self.explicit).merge(overrides);
        self
    }

    /// Load the config-file layer.
    pub fn config_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        self.file = Some(ConfigOverrides::from_file(path)?);
        Ok(self)
    }

    /// Load the environment layer from `RUST_PROMPT_*` variables.
    pub fn with_env(self) -> Result<Self> {
        self.with_env_config(&EnvConfig::default())
    }

    /// Load the environment layer from `env`.
    pub fn with_env_config(mut self, env: &EnvConfig) -> Result<Self> {
        self.env = Some(env.overrides()?);
        Ok(self)
    }

    /// Set the default poll hook.
    #[must_use]
    pub fn poll_hook<F>(mut self, hook: F) -> Self
    where
        F: FnMut(u64) -> bool + Send + 'static,
    {
        self.poll_hook = Some(Box::new(hook));
        self
    }

    /// Set the default completion hook.
    #[must_use]
    pub fn completion_hook<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&RoundTripResult) + Send + 'static,
    {
        self.completion_hook = Some(Box::new(hook));
        self
    }

    /// Resolve all layers into a configuration.
    #[must_use]
    pub fn config(&self) -> SessionConfig {
        let mut config = self.base.clone();
        for layer in [self.file.as_ref(), self.env.as_ref(), Some(&self.explicit)]
            .into_iter()
            .flatten()
        {
            config.apply(layer);
        }
        config
    }

    /// Build the session configuration, dropping any hooks.
    #[must_use]
    pub fn build(self) -> SessionConfig {
        self.config()
    }

    /// Spawn the session without running the handshake.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(self) -> Result<Session> {
        let config = self.config();
        let mut session = Session::spawn(config)?;
        session.set_poll_hook(self.poll_hook);
        session.set_completion_hook(self.completion_hook);
        Ok(session)
    }

    /// Spawn the session and run the handshake.
    ///
    /// Hooks are installed once the handshake has succeeded, so they only
    /// observe the caller's own round trips.
    pub async fn open(self) -> Result<Session> {
        let config = self.config();
        let mut session = Session::open(config).await?;
        session.set_poll_hook(self.poll_hook);
        session.set_completion_hook(self.completion_hook);
        Ok(session)
    }
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SessionBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionBuilder")
            .field("config", &self.config())
            .field("poll_hook", &self.poll_hook.is_some())
            .field("completion_hook", &self.completion_hook.is_some())
            .finish()
    }
}

impl From<SessionBuilder> for SessionConfig {
    fn from(builder: SessionBuilder) -> Self {
        builder.build()
    }
}

/// Ready-made configurations for common children.
pub struct QuickSession;

impl QuickSession {
    /// Create a session config for gdb debugging `target`.
    #[must_use]
    pub fn gdb(target: impl Into<PathBuf>) -> SessionConfig {
        SessionBuilder::new().target(target).build()
    }

    /// Create a session config for a program with a custom prompt and no
    /// handshake.
    #[must_use]
    pub fn repl(
        executable: impl Into<String>,
        args: impl Into<String>,
        prompt: impl Into<String>,
    ) -> SessionConfig {
        SessionBuilder::new()
            .executable(executable)
            .args(args)
            .prompt(prompt)
            .no_handshake()
            .build()
    }
}

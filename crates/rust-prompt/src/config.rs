//! Configuration types for rust-prompt.
//!
//! [`SessionConfig`] is the concrete, fully-populated configuration of a
//! session. [`ConfigOverrides`] is its all-optional counterpart read from
//! files and the environment and merged with [`SessionConfig::apply`].
//!
//! Layering, lowest to highest precedence: built-in defaults, a config file,
//! `RUST_PROMPT_*` environment variables, explicit builder calls.

mod env;
mod file;

use std::collections::HashMap;
use std::path::PathBuf;

use rust_pipe::{PipeConfig, SignalMap};
use serde::Deserialize;

pub use env::{DEFAULT_PREFIX, EnvConfig};
pub use file::ConfigFormat;

use crate::prompt::{DEFAULT_PROMPT, DEFAULT_SEARCH_DEPTH};

/// Default executable.
pub const DEFAULT_EXECUTABLE: &str = "gdb";

/// Default argument string: quiet, no init file, no GUI.
pub const DEFAULT_ARGS: &str = "-q -nx -nw";

/// Default round-trip timeout in seconds. Effectively unbounded, but still
/// polled once per second.
pub const DEFAULT_TIMEOUT_SECS: u64 = 99_999_999;

/// Default timeout for loading the target file.
pub const DEFAULT_LOAD_TIMEOUT_SECS: u64 = 300;

/// Timeouts at or above this value are absolute Unix timestamps.
pub const ABSOLUTE_TIMEOUT_THRESHOLD: u64 = 1_000_000_000;

/// Default number of reads when draining stale output.
pub const DEFAULT_DRAIN_ITERATIONS: usize = 100;

/// Setup commands sent after spawn, in order.
pub const DEFAULT_SETUP_COMMANDS: &[&str] = &[
    "set confirm off",
    "set pagination off",
    "set width 0",
    "set height 0",
];

/// Configuration for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// File loaded (`file <path>`) after the setup commands.
    pub target: Option<PathBuf>,

    /// The program to run.
    pub executable: String,

    /// Argument string, split on whitespace.
    pub args: String,

    /// Default round-trip timeout in seconds.
    pub timeout_secs: u64,

    /// Timeout for loading the target file.
    pub load_timeout_secs: u64,

    /// Default prompt regex.
    pub prompt: String,

    /// Commands sent, in order, while opening the session.
    pub setup_commands: Vec<String>,

    /// Wait for the child's first prompt before the setup commands.
    pub await_startup_prompt: bool,

    /// Discard stale stdout before writing each command.
    pub drain_before_send: bool,

    /// Read budget for each drain.
    pub drain_iterations: usize,

    /// Trailing bytes searched for the prompt.
    pub search_depth: usize,

    /// Log command and response traffic at `info` level.
    pub verbose: bool,

    /// Route the child's stderr into its stdout pipe.
    pub merge_stderr: bool,

    /// OS numbers for logical signals.
    pub signals: SignalMap,

    /// Environment variables added to the inherited environment.
    pub env: HashMap<String, String>,

    /// Working directory for the child.
    pub working_dir: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            target: None,
            executable: DEFAULT_EXECUTABLE.to_string(),
            args: DEFAULT_ARGS.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            load_timeout_secs: DEFAULT_LOAD_TIMEOUT_SECS,
            prompt: DEFAULT_PROMPT.to_string(),
            setup_commands: DEFAULT_SETUP_COMMANDS
                .iter()
                .map(|cmd| (*cmd).to_string())
                .collect(),
            await_startup_prompt: true,
            drain_before_send: true,
            drain_iterations: DEFAULT_DRAIN_ITERATIONS,
            search_depth: DEFAULT_SEARCH_DEPTH,
            verbose: false,
            merge_stderr: false,
            signals: SignalMap::default(),
            env: HashMap::new(),
            working_dir: None,
        }
    }
}

impl SessionConfig {
    /// Create a configuration running `executable` with `args`.
    #[must_use]
    pub fn new(executable: impl Into<String>, args: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            args: args.into(),
            ..Default::default()
        }
    }

    /// Set the target file.
    #[must_use]
    pub fn target(mut self, path: impl Into<PathBuf>) -> Self {
        self.target = Some(path.into());
        self
    }

    /// Set the default timeout in seconds.
    #[must_use]
    pub const fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the default prompt regex.
    #[must_use]
    pub fn prompt(mut self, pattern: impl Into<String>) -> Self {
        self.prompt = pattern.into();
        self
    }

    /// Replace the setup commands.
    #[must_use]
    pub fn setup_commands<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.setup_commands = commands.into_iter().map(Into::into).collect();
        self
    }

    /// Skip the startup prompt and all setup commands.
    #[must_use]
    pub fn no_handshake(mut self) -> Self {
        self.await_startup_prompt = false;
        self.setup_commands.clear();
        self
    }

    /// Enable verbose traffic logging.
    #[must_use]
    pub const fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// The argument string split on whitespace.
    #[must_use]
    pub fn arg_list(&self) -> Vec<&str> {
        self.args.split_whitespace().collect()
    }

    /// Merge `overrides` over this configuration.
    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        if let Some(ref target) = overrides.target {
            self.target = Some(target.clone());
        }
        if let Some(ref executable) = overrides.executable {
            self.executable.clone_from(executable);
        }
        if let Some(ref args) = overrides.args {
            self.args.clone_from(args);
        }
        if let Some(secs) = overrides.timeout_secs {
            self.timeout_secs = secs;
        }
        if let Some(secs) = overrides.load_timeout_secs {
            self.load_timeout_secs = secs;
        }
        if let Some(ref prompt) = overrides.prompt {
            self.prompt.clone_from(prompt);
        }
        if let Some(ref commands) = overrides.setup_commands {
            self.setup_commands.clone_from(commands);
        }
        if let Some(value) = overrides.await_startup_prompt {
            self.await_startup_prompt = value;
        }
        if let Some(value) = overrides.drain_before_send {
            self.drain_before_send = value;
        }
        if let Some(value) = overrides.drain_iterations {
            self.drain_iterations = value;
        }
        if let Some(value) = overrides.search_depth {
            self.search_depth = value;
        }
        if let Some(value) = overrides.verbose {
            self.verbose = value;
        }
        if let Some(value) = overrides.merge_stderr {
            self.merge_stderr = value;
        }
        if let Some(signal) = overrides.interrupt_signal {
            self.signals.interrupt = signal;
        }
        if let Some(signal) = overrides.terminate_signal {
            self.signals.terminate = signal;
        }
        if let Some(signal) = overrides.kill_signal {
            self.signals.kill = signal;
        }
        if let Some(ref env) = overrides.env {
            self.env
                .extend(env.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        if let Some(ref dir) = overrides.working_dir {
            self.working_dir = Some(dir.clone());
        }
    }

    /// Pipe-layer configuration for spawning.
    #[must_use]
    pub fn pipe_config(&self) -> PipeConfig {
        let mut builder = PipeConfig::builder().merge_stderr(self.merge_stderr);
        for (key, value) in &self.env {
            builder = builder.env(key, value);
        }
        if let Some(ref dir) = self.working_dir {
            builder = builder.cwd(dir);
        }
        builder.build()
    }
}

/// Optional configuration values, as read from a file or the environment.
///
/// Field names are the configuration keys, e.g. in TOML:
///
/// ```toml
/// executable = "gdb"
/// args = "-q -nx"
/// timeout_secs = 30
/// setup_commands = ["set pagination off"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigOverrides {
    /// Target file.
    pub target: Option<PathBuf>,
    /// Executable.
    pub executable: Option<String>,
    /// Argument string.
    pub args: Option<String>,
    /// Default timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Target load timeout in seconds.
    pub load_timeout_secs: Option<u64>,
    /// Default prompt regex.
    pub prompt: Option<String>,
    /// Setup commands.
    pub setup_commands: Option<Vec<String>>,
    /// Wait for the startup prompt.
    pub await_startup_prompt: Option<bool>,
    /// Drain stale output before each command.
    pub drain_before_send: Option<bool>,
    /// Drain read budget.
    pub drain_iterations: Option<usize>,
    /// Prompt search depth.
    pub search_depth: Option<usize>,
    /// Verbose traffic logging.
    pub verbose: Option<bool>,
    /// Merge stderr into stdout.
    pub merge_stderr: Option<bool>,
    /// Interrupt signal number.
    pub interrupt_signal: Option<i32>,
    /// Terminate signal number.
    pub terminate_signal: Option<i32>,
    /// Kill signal number.
    pub kill_signal: Option<i32>,
    /// Extra environment variables.
    pub env: Option<HashMap<String, String>>,
    /// Working directory.
    pub working_dir: Option<PathBuf>,
}

impl ConfigOverrides {
    /// Layer `other` over `self`; values set in `other` win.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        let env = match (self.env, other.env) {
            (Some(mut base), Some(top)) => {
                base.extend(top);
                Some(base)
            }
            (base, top) => top.or(base),
        };
        Self {
            target: other.target.or(self.target),
            executable: other.executable.or(self.executable),
            args: other.args.or(self.args),
            timeout_secs: other.timeout_secs.or(self.timeout_secs),
            load_timeout_secs: other.load_timeout_secs.or(self.load_timeout_secs),
            prompt: other.prompt.or(self.prompt),
            setup_commands: other.setup_commands.or(self.setup_commands),
            await_startup_prompt: other.await_startup_prompt.or(self.await_startup_prompt),
            drain_before_send: other.drain_before_send.or(self.drain_before_send),
            drain_iterations: other.drain_iterations.or(self.drain_iterations),
            search_depth: other.search_depth.or(self.search_depth),
            verbose: other.verbose.or(self.verbose),
            merge_stderr: other.merge_stderr.or(self.merge_stderr),
            interrupt_signal: other.interrupt_signal.or(self.interrupt_signal),
            terminate_signal: other.terminate_signal.or(self.terminate_signal),
            kill_signal: other.kill_signal.or(self.kill_signal),
            env,
            working_dir: other.working_dir.or(self.working_dir),
        }
    }

    /// Whether no value is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

//! Environment-based configuration.

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

use super::ConfigOverrides;
use crate::error::{PromptError, Result};

/// Environment configuration prefix.
pub const DEFAULT_PREFIX: &str = "RUST_PROMPT";

/// Environment variable reader.
///
/// Values are captured when the reader is created; later changes to the
/// process environment are not observed.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// Prefix for environment variables.
    prefix: String,
    /// Captured values.
    vars: HashMap<String, String>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl EnvConfig {
    /// Capture the process environment under `prefix`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)));
        Self::from_vars(prefix, vars)
    }

    /// Build a reader over an explicit set of variables.
    #[must_use]
    pub fn from_vars<I, K, V>(prefix: impl Into<String>, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            prefix: prefix.into(),
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Build the full environment variable name.
    fn var_name(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_uppercase()
        } else {
            format!("{}_{}", self.prefix, name.to_uppercase())
        }
    }

    /// Get a string value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(&self.var_name(name)).map(String::as_str)
    }

    /// Get a parsed value.
    ///
    /// A set but unparsable variable is a configuration error rather than
    /// being silently ignored.
    pub fn parse<T: FromStr>(&self, name: &str) -> Result<Option<T>> {
        match self.get(name) {
            None => Ok(None),
            Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
                PromptError::config(format!(
                    "{} has invalid value '{raw}'",
                    self.var_name(name)
                ))
            }),
        }
    }

    /// Get a boolean value.
    #[must_use]
    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).map(|v| {
            matches!(
                v.to_lowercase().as_str(),
                "1" | "true" | "yes" | "on" | "enabled"
            )
        })
    }

    /// Check if a variable is set.
    #[must_use]
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Read every recognized variable into overrides.
    ///
    /// Verbose logging is deliberately absent: it is only ever enabled
    /// explicitly.
    pub fn overrides(&self) -> Result<ConfigOverrides> {
        Ok(ConfigOverrides {
            target: self.get(vars::TARGET).map(PathBuf::from),
            executable: self.get(vars::EXECUTABLE).map(str::to_string),
            args: self.get(vars::ARGS).map(str::to_string),
            timeout_secs: self.parse(vars::TIMEOUT)?,
            load_timeout_secs: self.parse(vars::LOAD_TIMEOUT)?,
            prompt: self.get(vars::PROMPT).map(str::to_string),
            setup_commands: self.get(vars::SETUP_COMMANDS).map(split_commands),
            await_startup_prompt: self.bool(vars::AWAIT_STARTUP_PROMPT),
            drain_before_send: self.bool(vars::DRAIN_BEFORE_SEND),
            drain_iterations: self.parse(vars::DRAIN_ITERATIONS)?,
            search_depth: self.parse(vars::SEARCH_DEPTH)?,
            verbose: None,
            merge_stderr: self.bool(vars::MERGE_STDERR),
            interrupt_signal: self.parse(vars::INTERRUPT_SIGNAL)?,
            terminate_signal: None,
            kill_signal: None,
            env: None,
            working_dir: self.get(vars::WORKING_DIR).map(PathBuf::from),
        })
    }
}

/// Split a `;`-separated command list, dropping empty entries.
fn split_commands(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|cmd| !cmd.is_empty())
        .map(str::to_string)
        .collect()
}

/// Recognized variable names (without prefix).
pub mod vars {
    /// Target file.
    pub const TARGET: &str = "TARGET";
    /// Executable.
    pub const EXECUTABLE: &str = "EXECUTABLE";
    /// Argument string.
    pub const ARGS: &str = "ARGS";
    /// Default timeout in seconds.
    pub const TIMEOUT: &str = "TIMEOUT";
    /// Target load timeout in seconds.
    pub const LOAD_TIMEOUT: &str = "LOAD_TIMEOUT";
    /// Prompt regex.
    pub const PROMPT: &str = "PROMPT";
    /// `;`-separated setup commands.
    pub const SETUP_COMMANDS: &str = "SETUP_COMMANDS";
    /// Wait for the startup prompt.
    pub const AWAIT_STARTUP_PROMPT: &str = "AWAIT_STARTUP_PROMPT";
    /// Drain before send.
    pub const DRAIN_BEFORE_SEND: &str = "DRAIN_BEFORE_SEND";
    /// Drain read budget.
    pub const DRAIN_ITERATIONS: &str = "DRAIN_ITERATIONS";
    /// Prompt search depth.
    pub const SEARCH_DEPTH: &str = "SEARCH_DEPTH";
    /// Merge stderr into stdout.
    pub const MERGE_STDERR: &str = "MERGE_STDERR";
    /// Interrupt signal number.
    pub const INTERRUPT_SIGNAL: &str = "INTERRUPT_SIGNAL";
    /// Working directory.
    pub const WORKING_DIR: &str = "WORKING_DIR";
}

impl ConfigOverrides {
    /// Read overrides from `RUST_PROMPT_*` environment variables.
    pub fn from_env() -> Result<Self> {
        EnvConfig::default().overrides()
    }
}

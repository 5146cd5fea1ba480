//! Configuration types for spawning piped child processes.
//!
//! This module provides [`PipeConfig`] for configuring how a child is
//! spawned, and [`PipeSignal`] / [`SignalMap`] for mapping logical signals
//! to OS signal numbers.

use std::collections::{BTreeMap, HashMap};
use std::ffi::OsString;
use std::path::PathBuf;

/// How a child with piped stdio is spawned.
///
/// # Example
///
/// ```
/// use rust_pipe::PipeConfig;
///
/// let config = PipeConfig::builder()
///     .cwd("/tmp")
///     .env("LANG", "C")
///     .merge_stderr(true)
///     .build();
///
/// assert!(config.merge_stderr);
/// ```
#[derive(Debug, Clone)]
pub struct PipeConfig {
    /// Directory the child starts in; the parent's when unset.
    pub cwd: Option<PathBuf>,

    /// Start from the parent's environment.
    pub inherit_env: bool,

    /// Environment edits applied on top of the base. `None` unsets the key.
    pub env: BTreeMap<OsString, Option<OsString>>,

    /// Route the child's stderr into the stdout pipe.
    ///
    /// When set, the stderr reader of the spawned pipes is always at EOF.
    pub merge_stderr: bool,

    /// Place the child in its own process group.
    pub new_process_group: bool,
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            cwd: None,
            inherit_env: true,
            env: BTreeMap::new(),
            merge_stderr: false,
            new_process_group: true,
        }
    }
}

impl PipeConfig {
    /// Start building a `PipeConfig`.
    #[must_use]
    pub fn builder() -> PipeConfigBuilder {
        PipeConfigBuilder::default()
    }

    /// The default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The environment the child will see.
    #[must_use]
    pub fn effective_env(&self) -> HashMap<OsString, OsString> {
        let mut env: HashMap<OsString, OsString> = if self.inherit_env {
            std::env::vars_os().collect()
        } else {
            HashMap::new()
        };

        for (key, value) in &self.env {
            match value {
                Some(value) => env.insert(key.clone(), value.clone()),
                None => env.remove(key),
            };
        }

        env
    }
}

/// Builder for [`PipeConfig`].
#[derive(Debug, Clone, Default)]
pub struct PipeConfigBuilder {
    config: PipeConfig,
}

impl PipeConfigBuilder {
    /// Set the child's starting directory.
    #[must_use]
    pub fn cwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.cwd = Some(path.into());
        self
    }

    /// Don't inherit the parent's environment.
    #[must_use]
    pub const fn env_clear(mut self) -> Self {
        self.config.inherit_env = false;
        self
    }

    /// Set `key` in the child's environment.
    #[must_use]
    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.config.env.insert(key.into(), Some(value.into()));
        self
    }

    /// Unset `key` in the child's environment.
    #[must_use]
    pub fn env_remove(mut self, key: impl Into<OsString>) -> Self {
        self.config.env.insert(key.into(), None);
        self
    }

    /// Route stderr into the stdout pipe.
    #[must_use]
    pub const fn merge_stderr(mut self, value: bool) -> Self {
        self.config.merge_stderr = value;
        self
    }

    /// Give the child its own process group.
    #[must_use]
    pub const fn new_process_group(mut self, value: bool) -> Self {
        self.config.new_process_group = value;
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> PipeConfig {
        self.config
    }
}

/// Logical signals that can be delivered to a child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipeSignal {
    /// Existence check; delivers nothing (signal 0 on Unix).
    Probe,

    /// Interrupt the child's current operation.
    ///
    /// What number this maps to depends on the driven tool; see [`SignalMap`].
    Interrupt,

    /// Polite termination request.
    Terminate,

    /// Uncatchable termination.
    Kill,

    /// A raw OS signal number.
    Raw(i32),
}

/// Maps logical [`PipeSignal`]s to OS signal numbers.
///
/// The default interrupt is signal 0. Debuggers driven over pipes treat the
/// probe as their interrupt convention; tools that expect `SIGINT` should
/// override [`SignalMap::interrupt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalMap {
    /// Number sent for [`PipeSignal::Interrupt`].
    pub interrupt: i32,
    /// Number sent for [`PipeSignal::Terminate`].
    pub terminate: i32,
    /// Number sent for [`PipeSignal::Kill`].
    pub kill: i32,
}

impl Default for SignalMap {
    fn default() -> Self {
        Self {
            interrupt: 0,
            terminate: libc::SIGTERM,
            kill: libc::SIGKILL,
        }
    }
}

impl SignalMap {
    /// Create a map whose interrupt is `SIGINT`.
    #[must_use]
    pub fn sigint() -> Self {
        Self {
            interrupt: libc::SIGINT,
            ..Self::default()
        }
    }

    /// Resolve a logical signal to its OS number.
    #[must_use]
    pub const fn resolve(&self, signal: PipeSignal) -> i32 {
        match signal {
            PipeSignal::Probe => 0,
            PipeSignal::Interrupt => self.interrupt,
            PipeSignal::Terminate => self.terminate,
            PipeSignal::Kill => self.kill,
            PipeSignal::Raw(n) => n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let config = PipeConfig::builder()
            .cwd("/tmp")
            .env("FOO", "bar")
            .merge_stderr(true)
            .new_process_group(false)
            .build();

        assert_eq!(config.cwd.as_deref(), Some(std::path::Path::new("/tmp")));
        assert_eq!(
            config.env.get(&OsString::from("FOO")),
            Some(&Some(OsString::from("bar")))
        );
        assert!(config.merge_stderr);
        assert!(!config.new_process_group);
    }

    #[test]
    fn later_edit_to_a_key_wins() {
        let config = PipeConfig::builder()
            .env_clear()
            .env("KEEP", "1")
            .env("DROP", "2")
            .env_remove("DROP")
            .build();

        let env = config.effective_env();
        assert_eq!(env.len(), 1);
        assert_eq!(env.get(&OsString::from("KEEP")), Some(&OsString::from("1")));
    }

    #[test]
    fn inherited_env_can_be_unset() {
        let config = PipeConfig::builder().env_remove("PATH").build();
        assert!(!config.effective_env().contains_key(&OsString::from("PATH")));
    }

    #[test]
    fn signal_map_defaults() {
        let map = SignalMap::default();
        assert_eq!(map.resolve(PipeSignal::Probe), 0);
        assert_eq!(map.resolve(PipeSignal::Interrupt), 0);
        assert_eq!(map.resolve(PipeSignal::Kill), 9);
        assert_eq!(map.resolve(PipeSignal::Terminate), libc::SIGTERM);
        assert_eq!(map.resolve(PipeSignal::Raw(17)), 17);
    }

    #[test]
    fn signal_map_sigint() {
        assert_eq!(
            SignalMap::sigint().resolve(PipeSignal::Interrupt),
            libc::SIGINT
        );
    }
}

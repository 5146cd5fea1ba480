//! Common types for rust-prompt.
//!
//! This module defines the outcome of a round trip: the captured output and
//! the [`ErrorKind`] classifying how the exchange ended.

use std::fmt;

/// How a round trip ended.
///
/// Round trips never raise; every outcome is reported through this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ErrorKind {
    /// The prompt was matched.
    #[default]
    None,

    /// No prompt arrived within the timeout.
    Timeout,

    /// The poll hook asked to stop waiting.
    Stopped,

    /// The child's stdout reached end-of-file, or writing to it failed.
    Eof,

    /// An empty command drained pending output instead of writing.
    Cleared,
}

impl ErrorKind {
    /// The textual tag of this outcome.
    ///
    /// `None` renders as the empty string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Timeout => "TIMEOUT",
            Self::Stopped => "STOPPED",
            Self::Eof => "EOF",
            Self::Cleared => "(clear)",
        }
    }

    /// Whether the prompt was matched.
    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }

    /// Whether this outcome denotes a failed exchange.
    ///
    /// `Cleared` is informational and does not count as a failure.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::Timeout | Self::Stopped | Self::Eof)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of one command/response exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundTripResult {
    /// Stdout received before the prompt, with the prompt itself excluded.
    /// On failure, everything received so far.
    pub output: String,

    /// How the exchange ended.
    pub error: ErrorKind,

    /// The text that matched the prompt pattern, if any.
    pub prompt: String,

    /// Stderr drained at the end of the exchange.
    pub stderr: String,
}

impl RoundTripResult {
    /// Create a result with the given output and outcome.
    #[must_use]
    pub fn new(output: impl Into<String>, error: ErrorKind) -> Self {
        Self {
            output: output.into(),
            error,
            prompt: String::new(),
            stderr: String::new(),
        }
    }

    /// Whether the prompt was matched.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Consume the result, returning only the output text.
    #[must_use]
    pub fn into_output(self) -> String {
        self.output
    }
}

impl fmt::Display for RoundTripResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.output)
    }
}

/// Normalize a command for writing.
///
/// Returns `None` for a blank command. Otherwise trailing line terminators
/// are replaced by exactly one `\n`.
#[must_use]
pub fn normalize_command(command: &str) -> Option<String> {
    if command.trim().is_empty() {
        return None;
    }
    let mut line = command.trim_end_matches(['\n', '\r']).to_string();
    line.push('\n');
    Some(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_tags() {
        assert_eq!(ErrorKind::None.as_str(), "");
        assert_eq!(ErrorKind::Timeout.to_string(), "TIMEOUT");
        assert_eq!(ErrorKind::Stopped.to_string(), "STOPPED");
        assert_eq!(ErrorKind::Eof.to_string(), "EOF");
        assert_eq!(ErrorKind::Cleared.to_string(), "(clear)");
    }

    #[test]
    fn cleared_is_not_a_failure() {
        assert!(!ErrorKind::Cleared.is_failure());
        assert!(!ErrorKind::None.is_failure());
        assert!(ErrorKind::Eof.is_failure());
    }

    #[test]
    fn normalize_appends_single_newline() {
        assert_eq!(normalize_command("info frame").as_deref(), Some("info frame\n"));
        assert_eq!(normalize_command("bt\n").as_deref(), Some("bt\n"));
        assert_eq!(normalize_command("bt\r\n\n").as_deref(), Some("bt\n"));
    }

    #[test]
    fn normalize_blank_is_none() {
        assert_eq!(normalize_command(""), None);
        assert_eq!(normalize_command("  \n"), None);
    }

    #[test]
    fn result_helpers() {
        let result = RoundTripResult::new("42", ErrorKind::None);
        assert!(result.is_ok());
        assert_eq!(result.into_output(), "42");
        assert!(!RoundTripResult::new("", ErrorKind::Timeout).is_ok());
    }
}

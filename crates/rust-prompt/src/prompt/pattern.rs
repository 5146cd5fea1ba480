//! Tail-anchored prompt patterns.

use std::fmt;
use std::ops::Range;

use regex::bytes::Regex;

/// Default prompt: the gdb prompt, a `>` continuation prompt at the start
/// of a line, or a yes/no query.
pub const DEFAULT_PROMPT: &str = r"\(gdb\)|(?m:^)>|\(y or n\)";

/// A compiled prompt pattern.
///
/// A prompt only counts when it ends the output: unless the pattern already
/// ends in `$` or `\z`, it is compiled as `(?:PATTERN)\s*\z` so trailing
/// whitespace after the prompt is tolerated but nothing else is.
#[derive(Clone)]
pub struct PromptPattern {
    source: String,
    regex: Regex,
}

impl PromptPattern {
    /// Compile a prompt regex.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let anchored = if is_end_anchored(pattern) {
            pattern.to_string()
        } else {
            format!(r"(?:{pattern})\s*\z")
        };
        Ok(Self {
            source: pattern.to_string(),
            regex: Regex::new(&anchored)?,
        })
    }

    /// Compile a prompt that matches `text` literally.
    pub fn literal(text: &str) -> Result<Self, regex::Error> {
        Self::new(&regex::escape(text))
    }

    /// Compile [`DEFAULT_PROMPT`].
    pub fn default_prompt() -> Result<Self, regex::Error> {
        Self::new(DEFAULT_PROMPT)
    }

    /// The pattern as given, before anchoring.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The compiled, anchored regex.
    #[must_use]
    pub const fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Find the prompt in `haystack`, scanning from byte `start`.
    ///
    /// Bytes before `start` still provide context for `^` and word
    /// boundaries. Returns the byte range of the match in `haystack`.
    #[must_use]
    pub fn find_from(&self, haystack: &[u8], start: usize) -> Option<Range<usize>> {
        let start = start.min(haystack.len());
        self.regex.find_at(haystack, start).map(|m| m.range())
    }

    /// Whether `haystack` ends with this prompt.
    #[must_use]
    pub fn ends(&self, haystack: &[u8]) -> bool {
        self.find_from(haystack, 0).is_some()
    }
}

impl fmt::Debug for PromptPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PromptPattern").field(&self.source).finish()
    }
}

impl PartialEq for PromptPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for PromptPattern {}

fn is_end_anchored(pattern: &str) -> bool {
    pattern.ends_with(r"\z") || (pattern.ends_with('$') && !pattern.ends_with(r"\$"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default() -> PromptPattern {
        PromptPattern::default_prompt().expect("default prompt compiles")
    }

    #[test]
    fn default_matches_gdb_prompt() {
        let prompt = default();
        assert!(prompt.ends(b"$1 = 42\n(gdb) "));
        assert!(prompt.ends(b"(gdb)"));
        assert!(!prompt.ends(b"(gdb) print x\n"));
    }

    #[test]
    fn default_matches_continuation_and_query() {
        let prompt = default();
        assert!(prompt.ends(b"Type commands for breakpoint(s) 1\n>"));
        assert!(prompt.ends(b"Make breakpoint pending? (y or n) "));
        assert!(!prompt.ends(b"x -> y"));
    }

    #[test]
    fn match_range_covers_trailing_whitespace() {
        let prompt = default();
        let text = b"done\n(gdb) ";
        let range = prompt.find_from(text, 0).expect("match");
        assert_eq!(&text[range.start..range.end], b"(gdb) ");
        assert_eq!(range.start, 5);
    }

    #[test]
    fn find_from_keeps_line_context() {
        let prompt = default();
        // '>' mid-line must not match even when the scan starts right at it.
        let text = b"a->";
        assert_eq!(prompt.find_from(text, 2), None);
        let text = b"a\n>";
        assert_eq!(prompt.find_from(text, 2), Some(2..3));
    }

    #[test]
    fn explicit_anchor_is_kept() {
        let prompt = PromptPattern::new(r"\$ $").expect("compile");
        assert!(prompt.ends(b"user$ "));
        assert!(!prompt.ends(b"user$  \n"));
    }

    #[test]
    fn literal_escapes_metacharacters() {
        let prompt = PromptPattern::literal("[db]>").expect("compile");
        assert!(prompt.ends(b"[db]> "));
        assert!(!prompt.ends(b"d>"));
        assert_eq!(prompt.as_str(), r"\[db\]>");
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        assert!(PromptPattern::new("(unclosed").is_err());
    }
}

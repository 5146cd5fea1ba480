//! Response buffer with tail-limited prompt search.
//!
//! Only the last `search_depth` bytes are scanned for the prompt, so long
//! outputs (full backtraces, memory dumps) don't turn each chunk into a
//! rescan of everything received so far.

use std::borrow::Cow;
use std::ops::Range;

use super::pattern::PromptPattern;

/// Default number of trailing bytes searched for the prompt.
pub const DEFAULT_SEARCH_DEPTH: usize = 1000;

/// Accumulates stdout for one round trip.
#[derive(Debug, Clone)]
pub struct ResponseBuffer {
    data: Vec<u8>,
    search_depth: usize,
}

impl ResponseBuffer {
    /// Create an empty buffer that searches the last `search_depth` bytes.
    #[must_use]
    pub fn new(search_depth: usize) -> Self {
        Self {
            data: Vec::with_capacity(4096),
            search_depth: search_depth.max(1),
        }
    }

    /// Append a chunk.
    pub fn extend(&mut self, chunk: &[u8]) {
        self.data.extend_from_slice(chunk);
    }

    /// Search the tail for `prompt`, returning the match range in the
    /// whole buffer.
    #[must_use]
    pub fn search_tail(&self, prompt: &PromptPattern) -> Option<Range<usize>> {
        let start = self.data.len().saturating_sub(self.search_depth);
        prompt.find_from(&self.data, start)
    }

    /// Split off the prompt at `range`, consuming the buffer.
    ///
    /// Returns every byte before the prompt, and the prompt text itself
    /// including any trailing whitespace.
    #[must_use]
    pub fn split_prompt(self, range: Range<usize>) -> (String, String) {
        let output = String::from_utf8_lossy(&self.data[..range.start]).into_owned();
        let prompt = String::from_utf8_lossy(&self.data[range]).into_owned();
        (output, prompt)
    }

    /// Everything received, decoded lossily.
    #[must_use]
    pub fn as_str_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }

    /// Consume the buffer, returning everything received as text.
    #[must_use]
    pub fn into_string(self) -> String {
        match String::from_utf8(self.data) {
            Ok(text) => text,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        }
    }

    /// Raw buffer contents.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Number of bytes buffered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether nothing has been buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The configured search depth.
    #[must_use]
    pub const fn search_depth(&self) -> usize {
        self.search_depth
    }
}

impl Default for ResponseBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gdb_prompt() -> PromptPattern {
        PromptPattern::new(r"\(gdb\)").expect("compile")
    }

    #[test]
    fn split_excludes_only_the_prompt() {
        let mut buffer = ResponseBuffer::default();
        buffer.extend(b"$1 = 42\n");
        buffer.extend(b"(gdb) ");
        let range = buffer.search_tail(&gdb_prompt()).expect("prompt");
        let (output, prompt) = buffer.split_prompt(range);
        assert_eq!(output, "$1 = 42\n");
        assert_eq!(prompt, "(gdb) ");
    }

    #[test]
    fn prompt_split_across_chunks() {
        let mut buffer = ResponseBuffer::default();
        buffer.extend(b"ok\n(gd");
        assert!(buffer.search_tail(&gdb_prompt()).is_none());
        buffer.extend(b"b) ");
        assert!(buffer.search_tail(&gdb_prompt()).is_some());
    }

    #[test]
    fn tail_search_finds_prompt_after_large_output() {
        let mut buffer = ResponseBuffer::new(20);
        buffer.extend(&[b'x'; 10_000]);
        buffer.extend(b"\n(gdb) ");
        let range = buffer.search_tail(&gdb_prompt()).expect("prompt");
        assert_eq!(range.start, 10_001);
    }

    #[test]
    fn prompt_not_at_end_is_ignored() {
        let mut buffer = ResponseBuffer::default();
        buffer.extend(b"(gdb) echo\nstill running\n");
        assert!(buffer.search_tail(&gdb_prompt()).is_none());
        assert_eq!(buffer.into_string(), "(gdb) echo\nstill running\n");
    }

    #[test]
    fn invalid_utf8_is_decoded_lossily() {
        let mut buffer = ResponseBuffer::default();
        buffer.extend(b"bad \xff byte");
        assert_eq!(buffer.as_str_lossy(), "bad \u{fffd} byte");
        assert_eq!(buffer.into_string(), "bad \u{fffd} byte");
    }
}

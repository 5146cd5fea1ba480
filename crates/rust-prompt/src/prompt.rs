//! Prompt detection.
//!
//! This module recognizes the end of a response: a prompt pattern anchored
//! to the tail of the accumulated output, and the buffer it is searched in.

mod buffer;
mod pattern;

pub use buffer::{DEFAULT_SEARCH_DEPTH, ResponseBuffer};
pub use pattern::{DEFAULT_PROMPT, PromptPattern};

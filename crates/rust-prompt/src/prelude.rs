//! Convenient re-exports for common rust-prompt usage.
//!
//! ```ignore
//! use rust_prompt::prelude::*;
//! ```

pub use crate::config::{ConfigOverrides, SessionConfig};
pub use crate::error::{PromptError, Result, SpawnError};
pub use crate::hooks::{CompletionHook, PollHook};
pub use crate::prompt::PromptPattern;
pub use crate::session::{QuickSession, RoundTrip, Session, SessionBuilder};
pub use crate::signal::SignalTarget;
pub use crate::sync::SyncSession;
pub use crate::types::{ErrorKind, RoundTripResult};
pub use rust_pipe::SignalMap;

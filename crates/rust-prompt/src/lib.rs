//! rust-prompt: Drive prompt-oriented interactive programs over pipes
//!
//! This crate automates line-oriented programs that print a prompt when
//! they are ready for input, such as `gdb`. Each round trip writes one
//! command and collects output until the prompt reappears at its end,
//! classifying the result instead of raising on timeouts or end-of-file.
//!
//! # Features
//!
//! - **Async-first design** with Tokio, plus a blocking [`SyncSession`]
//! - **Three independent pipes** via `rust-pipe` (or stdout+stderr merged)
//! - **Tail-anchored prompt matching** with `regex`
//! - **Layered configuration** from defaults, TOML/JSON files and the
//!   environment
//! - **Deterministic teardown** on [`Session::dispose`] and drop
//!
//! Unix only.
//!
//! # Example
//!
//! ```ignore
//! use rust_prompt::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut session = SessionBuilder::new().target("./a.out").open().await?;
//!     for warning in session.warnings() {
//!         eprintln!("warning: {warning}");
//!     }
//!
//!     let value = session.get("print sizeof(int)").await;
//!     if session.last_error().is_none() {
//!         println!("{value}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod hooks;
pub mod prelude;
pub mod prompt;
pub mod session;
pub mod signal;
pub mod sync;
pub mod types;

pub use config::{ConfigFormat, ConfigOverrides, EnvConfig, SessionConfig};
pub use error::{PromptError, Result, SpawnError};
pub use hooks::{CompletionHook, PollHook, completion_hook, poll_hook};
pub use prompt::{DEFAULT_PROMPT, PromptPattern, ResponseBuffer};
pub use rust_pipe::{PipeSignal, SignalMap};
pub use session::{QuickSession, RoundTrip, Session, SessionBuilder};
pub use signal::{SignalTarget, probe, signal, try_signal};
pub use sync::SyncSession;
pub use types::{ErrorKind, RoundTripResult};

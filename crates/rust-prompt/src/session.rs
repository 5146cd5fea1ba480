//! Session module for driving prompt-oriented child processes.
//!
//! This module provides the session handle, the round-trip engine, the
//! builder, and lifecycle management (handshake and teardown).
//!
//! # Overview
//!
//! A [`Session`] owns a child whose stdin, stdout and stderr are pipes. Each
//! [`Session::round_trip`] writes one command and reads until the prompt
//! reappears at the end of the output:
//!
//! ```ignore
//! use rust_prompt::{RoundTrip, SessionBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), rust_prompt::PromptError> {
//!     let mut session = SessionBuilder::new().target("./a.out").open().await?;
//!
//!     let result = session.round_trip(RoundTrip::new("info functions").timeout_secs(10)).await;
//!     if result.is_ok() {
//!         println!("{}", result.output);
//!     } else {
//!         eprintln!("round trip ended with {}", result.error);
//!     }
//!
//!     session.dispose();
//!     Ok(())
//! }
//! ```

mod builder;
mod handle;
mod lifecycle;
mod round_trip;

pub use builder::{QuickSession, SessionBuilder};
pub use handle::Session;
pub use lifecycle::STARTUP_COMMAND;
pub use round_trip::{POLL_INTERVAL, RoundTrip, effective_timeout};

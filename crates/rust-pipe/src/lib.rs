//! rust-pipe: Async child processes over anonymous pipes
//!
//! This crate spawns a child process whose stdin, stdout and stderr are
//! connected to three independent anonymous pipes, and provides polling,
//! chunked reads and signal delivery on top of them.
//!
//! # Platform Support
//!
//! - **Unix**: Uses `tokio::process` for spawning and `rustix` for pipes and signals
//!
//! # Quick Start
//!
//! ```ignore
//! use std::time::Duration;
//! use rust_pipe::{PipeChild, PipeConfig, Readable, UnixPipeSystem, Writable};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipeConfig::default();
//!     let mut pipes = UnixPipeSystem::spawn("cat", ["-u"], &config)?;
//!
//!     pipes.stdin.write_all(b"hello\n").await?;
//!
//!     if pipes.stdout.poll(Duration::from_secs(1)).await? {
//!         let (chunk, _eof) = pipes.stdout.read_chunk(1024).await?;
//!         println!("{}", String::from_utf8_lossy(&chunk));
//!     }
//!
//!     pipes.child.kill()?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod traits;

#[cfg(unix)]
pub mod unix;

// Re-export primary types
pub use config::{PipeConfig, PipeConfigBuilder, PipeSignal, SignalMap};
pub use error::{PipeError, Result};
pub use traits::{ExitStatus, PipeChild, Readable, Writable};

// Platform-specific re-exports
#[cfg(unix)]
pub use unix::{
    ChildPipes, DEFAULT_CHUNK_SIZE, DRAIN_POLL_INTERVAL, NativePipeSystem, PipeWriter,
    StreamReader, UnixPipeChild, UnixPipeSystem, is_alive, send_signal,
};

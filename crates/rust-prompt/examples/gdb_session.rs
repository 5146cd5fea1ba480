//! Drive gdb against a binary.
//!
//! Run with: `cargo run --example gdb_session -- ./a.out`
//!
//! Set `RUST_LOG=rust_prompt=debug` to see the handshake.

use rust_prompt::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let target = std::env::args().nth(1).unwrap_or_else(|| "/bin/true".to_string());

    let mut session = SessionBuilder::new()
        .with_env()?
        .target(&target)
        .timeout_secs(30)
        .completion_hook(|result| {
            if result.error.is_failure() {
                eprintln!("round trip ended with {}", result.error);
            }
        })
        .open()
        .await?;

    for warning in session.warnings() {
        eprintln!("warning: {warning}");
    }

    let functions = session
        .round_trip(RoundTrip::new("info functions main").timeout_secs(10))
        .await;
    println!("{}", functions.output);

    let size = session.get("print sizeof(void *)").await;
    println!("pointer size: {}", size.trim());
    println!("last error: {:?}", session.last_error());

    session.dispose();
    Ok(())
}

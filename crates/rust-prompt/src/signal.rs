//! Signal delivery to sessions and raw process ids.
//!
//! Signal 0 delivers nothing and only checks that the process exists. It is
//! also the default interrupt of a [`SignalMap`](rust_pipe::SignalMap),
//! following the convention of the debuggers this crate drives by default.

use crate::error::{PromptError, Result};
use crate::session::Session;

/// The liveness probe.
pub const PROBE: i32 = 0;

/// Something that resolves to a process id.
pub trait SignalTarget {
    /// The process to signal, or `None` if there is none to signal.
    fn signal_pid(&self) -> Option<u32>;
}

impl SignalTarget for u32 {
    fn signal_pid(&self) -> Option<u32> {
        Some(*self)
    }
}

impl SignalTarget for Session {
    fn signal_pid(&self) -> Option<u32> {
        (!self.is_disposed() && self.exit_status().is_none()).then_some(self.pid())
    }
}

/// Send `signal` to `target`, returning whether delivery succeeded.
pub fn signal<T: SignalTarget + ?Sized>(target: &T, signal: i32) -> bool {
    match try_signal(target, signal) {
        Ok(()) => true,
        Err(err) => {
            tracing::debug!(signal, error = %err, "signal not delivered");
            false
        }
    }
}

/// Probe whether `target` is alive.
pub fn probe<T: SignalTarget + ?Sized>(target: &T) -> bool {
    signal(target, PROBE)
}

/// Send `signal` to `target`.
///
/// # Errors
///
/// Returns [`PromptError::SessionClosed`] if the target is a disposed or
/// exited session, and [`PromptError::Signal`] if the OS rejects delivery.
pub fn try_signal<T: SignalTarget + ?Sized>(target: &T, signal: i32) -> Result<()> {
    let pid = target.signal_pid().ok_or(PromptError::SessionClosed)?;
    rust_pipe::send_signal(pid, signal).map_err(|e| PromptError::signal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_own_process() {
        assert!(probe(&std::process::id()));
    }

    #[test]
    fn probe_invalid_pid_fails() {
        // pid 0 would address the whole process group.
        assert!(!probe(&0_u32));
        assert!(matches!(try_signal(&0_u32, PROBE), Err(PromptError::Signal { .. })));
    }

    #[test]
    fn unknown_signal_number_fails() {
        assert!(!signal(&std::process::id(), 4096));
    }
}

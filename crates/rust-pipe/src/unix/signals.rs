//! Signal delivery by process id.
//!
//! Signal 0 is treated as a probe: nothing is delivered, but the call
//! reports whether the process exists and may be signalled.

use std::io;

use rustix::process::{Pid, Signal, kill_process, test_kill_process};

use crate::error::{PipeError, Result};

/// Send OS signal `signal` to process `pid`.
///
/// # Errors
///
/// Returns [`PipeError::Signal`] if the pid or signal number is invalid,
/// the process does not exist, or permission is denied.
pub fn send_signal(pid: u32, signal: i32) -> Result<()> {
    let target = Pid::from_raw(pid as i32).ok_or_else(|| {
        PipeError::signal(
            signal,
            io::Error::new(io::ErrorKind::InvalidInput, "invalid pid"),
        )
    })?;

    let result = if signal == 0 {
        test_kill_process(target)
    } else {
        let sig = Signal::from_named_raw(signal).ok_or_else(|| {
            PipeError::signal(
                signal,
                io::Error::new(io::ErrorKind::Unsupported, "unsupported signal"),
            )
        })?;
        kill_process(target, sig)
    };

    result.map_err(|e| PipeError::signal(signal, io::Error::from_raw_os_error(e.raw_os_error())))?;
    tracing::debug!(pid, signal, "delivered signal");
    Ok(())
}

/// Check whether process `pid` exists (signal 0 probe).
#[must_use]
pub fn is_alive(pid: u32) -> bool {
    send_signal(pid, 0).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn own_process_is_alive() {
        assert!(is_alive(std::process::id()));
    }

    #[test]
    fn pid_zero_is_rejected() {
        let err = send_signal(0, 0).unwrap_err();
        assert!(matches!(err, PipeError::Signal { signal: 0, .. }));
    }

    #[test]
    fn unknown_signal_is_rejected() {
        let err = send_signal(std::process::id(), 4096).unwrap_err();
        assert!(matches!(err, PipeError::Signal { signal: 4096, .. }));
    }
}

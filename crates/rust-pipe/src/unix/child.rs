//! Unix child process management for piped children.
//!
//! The handle caches the exit status once observed so that no signal is
//! ever sent to a pid that may since have been reused.

use std::io;
use std::process::ExitStatus as StdExitStatus;

use tokio::process::Child as TokioChild;

use super::signals::send_signal;
use crate::error::{PipeError, Result};
use crate::traits::{ExitStatus, PipeChild};

/// A spawned piped child. The exit status is cached once observed.
pub struct UnixPipeChild {
    /// The underlying tokio child process.
    child: TokioChild,
    /// The process ID, captured at spawn.
    pid: u32,
    /// Cached exit status.
    exit_status: Option<ExitStatus>,
}

impl std::fmt::Debug for UnixPipeChild {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnixPipeChild")
            .field("pid", &self.pid)
            .field("exit_status", &self.exit_status)
            .finish()
    }
}

impl UnixPipeChild {
    /// Wrap a spawned tokio child.
    ///
    /// # Errors
    ///
    /// Fails if the child has already been reaped and has no pid.
    pub fn new(child: TokioChild) -> Result<Self> {
        let pid = child
            .id()
            .ok_or_else(|| PipeError::Spawn(io::Error::other("child has no pid")))?;
        Ok(Self {
            child,
            pid,
            exit_status: None,
        })
    }

    /// The cached exit status, if the child has been observed to exit.
    #[must_use]
    pub const fn exit_status(&self) -> Option<ExitStatus> {
        self.exit_status
    }
}

impl PipeChild for UnixPipeChild {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn is_running(&mut self) -> bool {
        matches!(self.try_wait(), Ok(None))
    }

    async fn wait(&mut self) -> Result<ExitStatus> {
        if let Some(status) = self.exit_status {
            return Ok(status);
        }

        let status = convert_exit_status(self.child.wait().await.map_err(PipeError::Wait)?);
        self.exit_status = Some(status);
        Ok(status)
    }

    fn try_wait(&mut self) -> Result<Option<ExitStatus>> {
        if let Some(status) = self.exit_status {
            return Ok(Some(status));
        }

        let status = self
            .child
            .try_wait()
            .map_err(PipeError::Wait)?
            .map(convert_exit_status);
        self.exit_status = status;
        Ok(status)
    }

    fn signal(&self, signal: i32) -> Result<()> {
        if let Some(status) = self.exit_status {
            return Err(PipeError::ProcessExited(status.code().unwrap_or(-1)));
        }
        send_signal(self.pid, signal)
    }

    fn kill(&mut self) -> Result<()> {
        if self.exit_status.is_some() {
            return Ok(());
        }
        self.child
            .start_kill()
            .map_err(|e| PipeError::signal(libc::SIGKILL, e))
    }
}

/// Map a std exit status; a status with neither code nor signal becomes `-1`.
fn convert_exit_status(status: StdExitStatus) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    if let Some(code) = status.code() {
        ExitStatus::Exited(code)
    } else if let Some(signal) = status.signal() {
        ExitStatus::Signaled(signal)
    } else {
        ExitStatus::Exited(-1)
    }
}

#[cfg(test)]
mod tests {
    use std::process::Stdio;

    use tokio::process::Command;

    use super::*;

    fn spawn(program: &str, args: &[&str]) -> UnixPipeChild {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .spawn()
            .expect("spawn");
        UnixPipeChild::new(child).expect("pid")
    }

    #[tokio::test]
    async fn wait_reports_exit_code() {
        let mut child = spawn("sh", &["-c", "exit 3"]);
        let status = child.wait().await.unwrap();
        assert_eq!(status, ExitStatus::Exited(3));
        assert!(!child.is_running());
    }

    #[tokio::test]
    async fn kill_terminates_sleeper() {
        let mut child = spawn("sleep", &["30"]);
        assert!(child.is_running());
        assert!(child.signal(0).is_ok());

        child.kill().unwrap();
        let status = child.wait().await.unwrap();
        assert_eq!(status, ExitStatus::Signaled(libc::SIGKILL));
    }

    #[tokio::test]
    async fn signal_after_exit_is_refused() {
        let mut child = spawn("true", &[]);
        child.wait().await.unwrap();
        assert!(matches!(child.signal(0), Err(PipeError::ProcessExited(0))));
        assert!(child.kill().is_ok());
    }
}

//! The round-trip engine: write one command, read until the prompt.

use std::fmt;
use std::ops::Range;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::time::Instant;

use rust_pipe::{DEFAULT_CHUNK_SIZE, PipeSignal, Readable, StreamReader, Writable};

use super::handle::Session;
use crate::config::ABSOLUTE_TIMEOUT_THRESHOLD;
use crate::hooks::{CompletionHook, PollHook};
use crate::prompt::{PromptPattern, ResponseBuffer};
use crate::types::{ErrorKind, RoundTripResult, normalize_command};

/// How long each readiness poll waits; the timeout countdown ticks once
/// per interval.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Parameters of one round trip.
///
/// Every field left unset falls back to the session's default.
#[derive(Default)]
pub struct RoundTrip {
    command: Option<String>,
    timeout_secs: Option<u64>,
    prompt: Option<PromptPattern>,
    poll_hook: Option<PollHook>,
    completion_hook: Option<CompletionHook>,
}

impl RoundTrip {
    /// A round trip sending `command`.
    ///
    /// A blank command drains pending output instead of writing.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: Some(command.into()),
            ..Default::default()
        }
    }

    /// A round trip that writes nothing and drains pending output.
    #[must_use]
    pub fn clear() -> Self {
        Self::default()
    }

    /// Override the timeout, in seconds.
    ///
    /// Values of at least 1 000 000 000 are absolute Unix timestamps.
    #[must_use]
    pub const fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Override the prompt pattern.
    #[must_use]
    pub fn prompt(mut self, prompt: PromptPattern) -> Self {
        self.prompt = Some(prompt);
        self
    }

    /// Override the poll hook.
    ///
    /// The hook runs after each idle second with the seconds remaining and
    /// returns `true` to stop waiting. On the final second (remaining 0)
    /// the countdown is already spent, so the round trip ends as a timeout
    /// whatever the hook returns.
    #[must_use]
    pub fn poll_hook<F>(mut self, hook: F) -> Self
    where
        F: FnMut(u64) -> bool + Send + 'static,
    {
        self.poll_hook = Some(Box::new(hook));
        self
    }

    /// Override the completion hook.
    #[must_use]
    pub fn completion_hook<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&RoundTripResult) + Send + 'static,
    {
        self.completion_hook = Some(Box::new(hook));
        self
    }

    /// The command, as given.
    #[must_use]
    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }
}

impl From<&str> for RoundTrip {
    fn from(command: &str) -> Self {
        Self::new(command)
    }
}

impl From<String> for RoundTrip {
    fn from(command: String) -> Self {
        Self::new(command)
    }
}

impl fmt::Debug for RoundTrip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoundTrip")
            .field("command", &self.command)
            .field("timeout_secs", &self.timeout_secs)
            .field("prompt", &self.prompt)
            .field("poll_hook", &self.poll_hook.is_some())
            .field("completion_hook", &self.completion_hook.is_some())
            .finish()
    }
}

/// Convert a timeout to a relative countdown in seconds.
///
/// Values at or above [`ABSOLUTE_TIMEOUT_THRESHOLD`] are deadlines in Unix
/// seconds; a deadline in the past yields 0.
#[must_use]
pub fn effective_timeout(secs: u64) -> u64 {
    if secs < ABSOLUTE_TIMEOUT_THRESHOLD {
        return secs;
    }
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs());
    secs.saturating_sub(now)
}

/// How writing the command ended.
enum Write {
    Sent,
    Closed,
    Stalled,
}

/// How the waiting loop ended.
enum Wait {
    Matched(Range<usize>),
    Timeout,
    Stopped,
    Eof,
}

impl Session {
    /// Write one command and read until the prompt reappears.
    ///
    /// Never fails: timeouts, hook stops and end-of-file are reported in
    /// [`RoundTripResult::error`] along with whatever output arrived. The
    /// outcome is also kept as [`Session::last_error`].
    pub async fn round_trip(&mut self, request: RoundTrip) -> RoundTripResult {
        let RoundTrip {
            command,
            timeout_secs,
            prompt,
            mut poll_hook,
            mut completion_hook,
        } = request;

        let result = if self.eof || self.disposed {
            RoundTripResult::new("", ErrorKind::Eof)
        } else {
            match command.as_deref().and_then(normalize_command) {
                None => self.clear_pending().await,
                Some(line) => match self.write_line(&line, timeout_secs).await {
                    Write::Sent => {
                        self.collect(timeout_secs, prompt.as_ref(), poll_hook.as_mut())
                            .await
                    }
                    Write::Closed => {
                        self.eof = true;
                        let mut result = RoundTripResult::new("", ErrorKind::Eof);
                        result.stderr = self.drain_stderr(Vec::new()).await;
                        result
                    }
                    Write::Stalled => {
                        tracing::warn!(pid = self.pid, "child stopped reading stdin");
                        let mut result = RoundTripResult::new("", ErrorKind::Timeout);
                        result.stderr = self.drain_stderr(Vec::new()).await;
                        result
                    }
                },
            }
        };

        self.finish(result, completion_hook.as_mut())
    }

    /// Wait for the prompt without writing anything.
    ///
    /// The request's command is ignored; its timeout, prompt and hooks
    /// apply as for [`Session::round_trip`].
    pub async fn await_prompt(&mut self, request: RoundTrip) -> RoundTripResult {
        let RoundTrip {
            timeout_secs,
            prompt,
            mut poll_hook,
            mut completion_hook,
            ..
        } = request;

        let result = if self.eof || self.disposed {
            RoundTripResult::new("", ErrorKind::Eof)
        } else {
            self.collect(timeout_secs, prompt.as_ref(), poll_hook.as_mut())
                .await
        };

        self.finish(result, completion_hook.as_mut())
    }

    /// Run `command` with the session defaults.
    pub async fn execute(&mut self, command: &str) -> RoundTripResult {
        self.round_trip(RoundTrip::new(command)).await
    }

    /// Run `command` and return only its output.
    ///
    /// The outcome is available afterwards from [`Session::last_error`].
    pub async fn get(&mut self, command: &str) -> String {
        self.execute(command).await.into_output()
    }

    /// Drain both streams without writing.
    async fn clear_pending(&mut self) -> RoundTripResult {
        let budget = self.config.drain_iterations;
        let output = drain_lossy(&mut self.stdout, budget).await;
        let stderr = drain_lossy(&mut self.stderr, budget).await;
        if self.stdout.is_eof() {
            self.eof = true;
        }
        RoundTripResult {
            output,
            error: ErrorKind::Cleared,
            prompt: String::new(),
            stderr,
        }
    }

    /// Write a normalized command line.
    ///
    /// The write shares the round trip's timeout budget, so a child that
    /// stopped reading stdin cannot block the caller indefinitely.
    async fn write_line(&mut self, line: &str, timeout_secs: Option<u64>) -> Write {
        if self.config.drain_before_send {
            let stale = drain_lossy(&mut self.stdout, self.config.drain_iterations).await;
            if !stale.is_empty() {
                tracing::debug!(pid = self.pid, stale = %stale, "discarding stale output");
            }
            if self.stdout.is_eof() {
                tracing::debug!(pid = self.pid, "stdout closed before write");
                return Write::Closed;
            }
        }

        self.log_traffic("send", line.trim_end());
        let budget = effective_timeout(timeout_secs.unwrap_or(self.defaults.timeout_secs)).max(1);
        let write = self.stdin.write_all(line.as_bytes());
        match tokio::time::timeout(Duration::from_secs(budget), write).await {
            Ok(Ok(())) => Write::Sent,
            Ok(Err(err)) => {
                tracing::debug!(pid = self.pid, error = %err, "write failed; treating as EOF");
                Write::Closed
            }
            Err(_elapsed) => Write::Stalled,
        }
    }

    /// Read until the prompt, a timeout, a stop request or end-of-file.
    async fn collect(
        &mut self,
        timeout_secs: Option<u64>,
        prompt: Option<&PromptPattern>,
        poll_hook: Option<&mut PollHook>,
    ) -> RoundTripResult {
        let timeout = effective_timeout(timeout_secs.unwrap_or(self.defaults.timeout_secs));
        let prompt = prompt.unwrap_or(&self.defaults.prompt);
        let poll_hook = poll_hook.or(self.defaults.poll_hook.as_mut());
        let mut buffer = ResponseBuffer::new(self.config.search_depth);
        let mut stderr = StderrCapture::new(&mut self.stderr);

        let outcome = wait_for_prompt(
            &mut self.stdout,
            &mut stderr,
            &mut buffer,
            prompt,
            timeout,
            poll_hook,
        )
        .await;
        let stderr = stderr.into_bytes();

        let mut result = match outcome {
            Wait::Matched(range) => {
                let (output, prompt) = buffer.split_prompt(range);
                RoundTripResult {
                    output,
                    error: ErrorKind::None,
                    prompt,
                    stderr: String::new(),
                }
            }
            Wait::Timeout => {
                tracing::warn!(pid = self.pid, timeout_secs = timeout, "timed out waiting for prompt");
                let signal = self.config.signals.resolve(PipeSignal::Interrupt);
                if !self.signal(signal) {
                    tracing::warn!(pid = self.pid, signal, "interrupt after timeout was not delivered");
                }
                RoundTripResult::new(buffer.into_string(), ErrorKind::Timeout)
            }
            Wait::Stopped => {
                tracing::debug!(pid = self.pid, "poll hook stopped the wait");
                RoundTripResult::new(buffer.into_string(), ErrorKind::Stopped)
            }
            Wait::Eof => {
                tracing::debug!(pid = self.pid, "stdout reached EOF");
                self.eof = true;
                RoundTripResult::new(buffer.into_string(), ErrorKind::Eof)
            }
        };

        result.stderr = self.drain_stderr(stderr).await;
        result
    }

    /// Append whatever stderr is still pending to `captured` and decode it.
    async fn drain_stderr(&mut self, mut captured: Vec<u8>) -> String {
        match self.stderr.drain(self.config.drain_iterations).await {
            Ok(bytes) => captured.extend_from_slice(&bytes),
            Err(err) => tracing::debug!(pid = self.pid, error = %err, "stderr drain failed"),
        }
        match String::from_utf8(captured) {
            Ok(text) => text,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        }
    }

    fn finish(
        &mut self,
        result: RoundTripResult,
        completion_hook: Option<&mut CompletionHook>,
    ) -> RoundTripResult {
        self.last_error = result.error;
        self.log_traffic("recv", &result.output);
        if !result.stderr.is_empty() {
            self.log_traffic("stderr", &result.stderr);
        }
        if let Some(hook) = completion_hook.or(self.defaults.completion_hook.as_mut()) {
            hook(&result);
        }
        result
    }
}

/// Stderr read while waiting on stdout, so a chatty child never blocks on a
/// full stderr pipe before it can print its prompt.
struct StderrCapture<'a> {
    reader: &'a mut StreamReader,
    bytes: Vec<u8>,
    open: bool,
}

impl<'a> StderrCapture<'a> {
    fn new(reader: &'a mut StreamReader) -> Self {
        let open = !reader.is_eof();
        Self {
            reader,
            bytes: Vec::new(),
            open,
        }
    }

    async fn read(&mut self) {
        match self.reader.read_chunk(DEFAULT_CHUNK_SIZE).await {
            Ok((chunk, false)) => self.bytes.extend_from_slice(&chunk),
            Ok((_, true)) => self.open = false,
            Err(err) => {
                tracing::debug!(error = %err, "stderr read failed");
                self.open = false;
            }
        }
    }

    fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Wait up to one [`POLL_INTERVAL`] for stdout, reading stderr meanwhile.
async fn poll_tick(
    stdout: &mut StreamReader,
    stderr: &mut StderrCapture<'_>,
) -> rust_pipe::Result<bool> {
    let deadline = Instant::now() + POLL_INTERVAL;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let stderr_open = stderr.open;
        tokio::select! {
            biased;
            ready = stdout.poll(remaining) => return ready,
            () = stderr.read(), if stderr_open => {}
        }
    }
}

async fn wait_for_prompt(
    stdout: &mut StreamReader,
    stderr: &mut StderrCapture<'_>,
    buffer: &mut ResponseBuffer,
    prompt: &PromptPattern,
    timeout_secs: u64,
    mut poll_hook: Option<&mut PollHook>,
) -> Wait {
    loop {
        // The countdown restarts after every chunk.
        let mut ready = false;
        for elapsed in 1..=timeout_secs {
            match poll_tick(stdout, stderr).await {
                Ok(true) => {
                    ready = true;
                    break;
                }
                Ok(false) => {}
                Err(err) => {
                    tracing::debug!(error = %err, "stdout poll failed");
                    return Wait::Eof;
                }
            }
            // The hook still sees the last tick, but an exhausted countdown
            // always ends as a timeout.
            if let Some(hook) = poll_hook.as_deref_mut() {
                if hook(timeout_secs - elapsed) && elapsed < timeout_secs {
                    return Wait::Stopped;
                }
            }
        }
        if !ready {
            return Wait::Timeout;
        }

        match stdout.read_chunk(DEFAULT_CHUNK_SIZE).await {
            Ok((_, true)) => return Wait::Eof,
            Ok((chunk, false)) => {
                tracing::trace!(bytes = chunk.len(), buffered = buffer.len(), "read chunk");
                buffer.extend(&chunk);
            }
            Err(err) => {
                tracing::debug!(error = %err, "stdout read failed");
                return Wait::Eof;
            }
        }

        if let Some(range) = buffer.search_tail(prompt) {
            return Wait::Matched(range);
        }
    }
}

async fn drain_lossy(reader: &mut StreamReader, max_iterations: usize) -> String {
    match reader.drain(max_iterations).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(err) => {
            tracing::debug!(stream = reader.label(), error = %err, "drain failed");
            String::new()
        }
    }
}

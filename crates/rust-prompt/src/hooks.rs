//! Callbacks invoked by the round-trip engine.

use crate::types::RoundTripResult;

/// Called once per second of waiting with the remaining countdown in
/// seconds. Returning `true` stops the wait with
/// [`ErrorKind::Stopped`](crate::ErrorKind::Stopped); the child is left
/// running.
pub type PollHook = Box<dyn FnMut(u64) -> bool + Send>;

/// Called exactly once at the end of every round trip, whatever its
/// outcome.
pub type CompletionHook = Box<dyn FnMut(&RoundTripResult) + Send>;

/// Box a closure as a [`PollHook`].
pub fn poll_hook<F>(hook: F) -> PollHook
where
    F: FnMut(u64) -> bool + Send + 'static,
{
    Box::new(hook)
}

/// Box a closure as a [`CompletionHook`].
pub fn completion_hook<F>(hook: F) -> CompletionHook
where
    F: FnMut(&RoundTripResult) + Send + 'static,
{
    Box::new(hook)
}

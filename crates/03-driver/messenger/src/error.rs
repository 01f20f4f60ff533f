use std::time::Duration;

use channel::RequestKind;
use thiserror::Error;

pub type MessengerResult<T> = Result<T, MessengerError>;

/// Errors surfaced to callers awaiting a reply.
///
/// Every variant means "this operation did not complete"; none are retried
/// automatically. [`MessengerError::is_channel_fault`] separates faults that
/// call for reinitialising the worker from per-call faults worth a plain
/// retry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MessengerError {
    /// `send` was called with no live channel endpoint attached. Fails fast:
    /// no table entry is created and no timer is started.
    #[error("channel endpoint is not ready")]
    ChannelNotReady,

    /// No terminal envelope arrived within the deadline. The request entry is
    /// gone; an eventual late reply is discarded as a no-op.
    #[error("request {kind} timed out after {}s", .after.as_secs())]
    Timeout { kind: RequestKind, after: Duration },

    /// The engine reported an explicit failure; the text is propagated
    /// verbatim.
    #[error("engine error: {0}")]
    Engine(String),

    /// The channel was torn down while the request was outstanding.
    #[error("channel terminated: {0}")]
    Terminated(String),
}

impl MessengerError {
    /// Channel-level faults call for reinitialising the worker lifecycle
    /// controller; everything else is scoped to the single call.
    pub fn is_channel_fault(&self) -> bool {
        matches!(
            self,
            MessengerError::ChannelNotReady | MessengerError::Terminated(_)
        )
    }
}

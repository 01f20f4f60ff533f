use channel::RequestKind;
use messenger::MessengerError;
use thiserror::Error;

/// Errors surfaced by the driver's typed capability calls.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Transport-level failure from the messenger.
    #[error(transparent)]
    Messenger(#[from] MessengerError),

    /// The call's input failed shape validation; the channel was not touched.
    #[error("invalid {capability} request: {reason}")]
    InvalidRequest {
        capability: &'static str,
        reason: String,
    },

    /// The engine reported success but its payload did not match the shape
    /// this capability expects.
    #[error("invalid {capability} response: {reason}")]
    InvalidResponse {
        capability: &'static str,
        reason: String,
    },
}

impl DriverError {
    pub(crate) fn invalid_request(kind: RequestKind, reason: impl Into<String>) -> Self {
        DriverError::InvalidRequest {
            capability: kind.label(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_response(kind: RequestKind, reason: impl Into<String>) -> Self {
        DriverError::InvalidResponse {
            capability: kind.label(),
            reason: reason.into(),
        }
    }

    /// Fatal channel faults call for `init()` again; everything else is
    /// scoped to the single call and worth a plain retry.
    pub fn is_channel_fault(&self) -> bool {
        matches!(self, DriverError::Messenger(err) if err.is_channel_fault())
    }
}

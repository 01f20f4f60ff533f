use thiserror::Error;

/// Convenience result alias for fallible channel operations.
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Errors surfaced by channel endpoints and the envelope codec.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The peer endpoint has been dropped; no further envelopes can travel.
    #[error("channel endpoint disconnected")]
    Disconnected,

    /// An envelope failed to encode or decode.
    #[error("codec error: {0}")]
    Codec(String),
}

impl ChannelError {
    pub fn codec(msg: impl Into<String>) -> Self {
        ChannelError::Codec(msg.into())
    }
}

//! Paired channel endpoints connecting the driver and engine sides.
//!
//! Requests flow driver→engine and responses engine→driver over unbounded
//! in-process channels, mirroring the post-message queue the engine is
//! reached through in deployment. The driver half splits into a cloneable
//! sender (held by the messenger while attached) and a receiver owned by the
//! driver's pump thread.

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::schema::{RequestEnvelope, ResponseEnvelope};
use crate::{ChannelError, ChannelResult};

/// Creates a connected endpoint pair.
pub fn endpoint_pair() -> (DriverEndpoint, EngineEndpoint) {
    let (request_tx, request_rx) = unbounded();
    let (response_tx, response_rx) = unbounded();
    (
        DriverEndpoint {
            requests: RequestSender { tx: request_tx },
            responses: ResponseReceiver { rx: response_rx },
        },
        EngineEndpoint {
            requests: RequestReceiver { rx: request_rx },
            responses: ResponseSender { tx: response_tx },
        },
    )
}

/// Driver-side endpoint half.
pub struct DriverEndpoint {
    pub requests: RequestSender,
    pub responses: ResponseReceiver,
}

/// Engine-side endpoint half.
pub struct EngineEndpoint {
    pub requests: RequestReceiver,
    pub responses: ResponseSender,
}

/// Writes request envelopes toward the engine. Cheap to clone.
#[derive(Clone)]
pub struct RequestSender {
    tx: Sender<RequestEnvelope>,
}

impl RequestSender {
    /// Never blocks; fails only when the engine half is gone.
    pub fn send(&self, envelope: RequestEnvelope) -> ChannelResult<()> {
        self.tx.send(envelope).map_err(|_| ChannelError::Disconnected)
    }
}

/// Reads request envelopes on the engine side.
pub struct RequestReceiver {
    rx: Receiver<RequestEnvelope>,
}

impl RequestReceiver {
    /// Blocks until a request arrives or every driver-side sender is dropped.
    pub fn recv(&self) -> ChannelResult<RequestEnvelope> {
        self.rx.recv().map_err(|_| ChannelError::Disconnected)
    }

    pub fn try_recv(&self) -> Option<RequestEnvelope> {
        self.rx.try_recv().ok()
    }
}

/// Writes response envelopes back toward the driver. Cheap to clone.
#[derive(Clone)]
pub struct ResponseSender {
    tx: Sender<ResponseEnvelope>,
}

impl ResponseSender {
    /// Never blocks; fails only when the driver half is gone.
    pub fn send(&self, envelope: ResponseEnvelope) -> ChannelResult<()> {
        self.tx.send(envelope).map_err(|_| ChannelError::Disconnected)
    }
}

/// Reads response envelopes on the driver side.
pub struct ResponseReceiver {
    rx: Receiver<ResponseEnvelope>,
}

impl ResponseReceiver {
    /// Blocks until a response arrives or the engine half is dropped.
    pub fn recv(&self) -> ChannelResult<ResponseEnvelope> {
        self.rx.recv().map_err(|_| ChannelError::Disconnected)
    }

    pub fn try_recv(&self) -> Option<ResponseEnvelope> {
        self.rx.try_recv().ok()
    }
}

//! Wire schema and channel endpoints shared by the driver and engine sides.
//!
//! This crate pins the contract both halves of the compute channel agree on:
//! * [`schema`] – request/response envelopes and capability payload types.
//! * [`relay`] – message shapes carried by the external pub/sub relay.
//! * [`endpoint_pair`] – paired endpoints over in-process channels.
//! * [`codec`] – NDJSON encoding of envelopes for inspection and goldens.
//! * [`ChannelError`] – endpoint and codec failure surface.

pub mod codec;
mod endpoint;
mod error;
pub mod relay;
pub mod schema;

pub use endpoint::{
    endpoint_pair, DriverEndpoint, EngineEndpoint, RequestReceiver, RequestSender,
    ResponseReceiver, ResponseSender,
};
pub use error::{ChannelError, ChannelResult};
pub use schema::*;

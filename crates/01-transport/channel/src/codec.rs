//! NDJSON codec for channel envelopes.
//!
//! One envelope per line, no trailing newline; writers append their own. The
//! CLI inspector prints these lines and the golden tests below freeze the
//! wire shape.

use crate::schema::{RequestEnvelope, ResponseEnvelope};
use crate::{ChannelError, ChannelResult};

pub fn encode_request_line(envelope: &RequestEnvelope) -> ChannelResult<String> {
    serde_json::to_string(envelope).map_err(|err| ChannelError::codec(err.to_string()))
}

pub fn encode_response_line(envelope: &ResponseEnvelope) -> ChannelResult<String> {
    serde_json::to_string(envelope).map_err(|err| ChannelError::codec(err.to_string()))
}

pub fn decode_request_line(line: &str) -> ChannelResult<RequestEnvelope> {
    serde_json::from_str(line.trim_end()).map_err(|err| ChannelError::codec(err.to_string()))
}

pub fn decode_response_line(line: &str) -> ChannelResult<ResponseEnvelope> {
    serde_json::from_str(line.trim_end()).map_err(|err| ChannelError::codec(err.to_string()))
}

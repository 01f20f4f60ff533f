//! Worker lifecycle controller and typed capability calls for the compute
//! engine.
//!
//! [`EngineDriver`] owns exactly one live engine channel at a time: `init`
//! creates the endpoint pair, spawns the engine, and wires its inbound stream
//! to the messenger; `terminate` tears everything down and rejects any
//! in-flight callers. Each engine capability gets one thin typed wrapper that
//! validates its own input shape before touching the channel and its response
//! shape before returning to the caller.

mod capabilities;
mod driver;
mod error;
mod reply;


pub use driver::{DriverConfig, EngineDriver, EngineDriverBuilder};
pub use error::DriverError;
pub use reply::TypedReply;

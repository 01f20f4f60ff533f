#![deny(missing_docs)]
//! Native host for compute engines reached over channel endpoints.
//!
//! An engine implements [`EngineService`] and never touches the channel
//! directly: the host pumps requests off the endpoint and hands the engine a
//! [`ReplySink`] for progress and terminal replies. Drivers stay
//! engine-agnostic through the [`EngineSpawner`] seam.

mod host;
mod service;

pub use host::{spawn_engine, EngineHandle};
pub use service::{EngineService, EngineSpawner, ReplySink, ThreadSpawner};

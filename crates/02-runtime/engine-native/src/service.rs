//! Service seam implemented by compute engines.

use channel::{EngineEndpoint, RequestEnvelope};
use serde_json::Value;

use crate::host::{spawn_engine, EngineHandle};

/// Sink handed to an engine for replying to a single request.
///
/// Terminal calls are first-wins: once `done` or `error` has been emitted for
/// the request, further calls on the sink are ignored.
pub trait ReplySink {
    /// Emits a progress report: percentage complete and a short stage label.
    fn progress(&mut self, percent: f32, message: &str);

    /// Emits the terminal success payload.
    fn done(&mut self, results: Value);

    /// Emits the terminal failure description.
    fn error(&mut self, message: &str);
}

/// Compute engine behind the channel.
pub trait EngineService: Send {
    /// Short name used for thread naming and logs.
    fn name(&self) -> &'static str;

    /// Handles one request, replying through `sink`.
    ///
    /// Returning without a terminal reply is allowed; the caller's timeout
    /// policy owns that case. `handle` must not block indefinitely, or the
    /// driver cannot join the engine thread on teardown.
    fn handle(&mut self, request: RequestEnvelope, sink: &mut dyn ReplySink);
}

/// Factory seam letting drivers spawn a fresh engine per channel instance.
pub trait EngineSpawner: Send + Sync {
    /// Starts an engine serving `endpoint` and returns its handle.
    fn spawn(&self, endpoint: EngineEndpoint) -> EngineHandle;
}

/// Spawner backed by a plain thread and an engine factory.
pub struct ThreadSpawner<F> {
    factory: F,
}

impl<F> ThreadSpawner<F>
where
    F: Fn() -> Box<dyn EngineService> + Send + Sync,
{
    /// Wraps `factory`, which is invoked once per spawn.
    pub fn new(factory: F) -> Self {
        Self { factory }
    }
}

impl<F> EngineSpawner for ThreadSpawner<F>
where
    F: Fn() -> Box<dyn EngineService> + Send + Sync,
{
    fn spawn(&self, endpoint: EngineEndpoint) -> EngineHandle {
        spawn_engine((self.factory)(), endpoint)
    }
}

//! Engine thread host: request pump and reply sink wiring.

use std::thread;

use channel::{
    EngineEndpoint, RequestId, ResponseEnvelope, ResponseKind, ResponseSender,
};
use log::{debug, trace, warn};
use serde_json::Value;

use crate::service::{EngineService, ReplySink};

/// Handle for a spawned engine thread.
pub struct EngineHandle {
    name: &'static str,
    join: thread::JoinHandle<()>,
}

impl EngineHandle {
    /// Engine name the handle was spawned with.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Waits for the engine thread to exit. Call after dropping every
    /// driver-side request sender, or the thread never leaves its pump loop.
    pub fn join(self) {
        if self.join.join().is_err() {
            warn!("engine thread '{}' panicked", self.name);
        }
    }
}

/// Spawns `service` on a named thread, pumping requests until the driver
/// side of the endpoint disconnects.
pub fn spawn_engine(mut service: Box<dyn EngineService>, endpoint: EngineEndpoint) -> EngineHandle {
    let name = service.name();
    let join = thread::Builder::new()
        .name(format!("engine-{name}"))
        .spawn(move || {
            let EngineEndpoint {
                requests,
                responses,
            } = endpoint;
            while let Ok(request) = requests.recv() {
                trace!("engine {name}: request {} ({})", request.id, request.kind);
                let mut sink = ChannelReplySink {
                    replies: &responses,
                    id: request.id,
                    success_kind: request.kind.success_kind(),
                    terminated: false,
                };
                service.handle(request, &mut sink);
            }
            debug!("engine {name}: request channel closed, exiting");
        })
        .expect("spawn engine thread");
    EngineHandle { name, join }
}

/// Sink writing replies for one request back onto the endpoint.
struct ChannelReplySink<'a> {
    replies: &'a ResponseSender,
    id: RequestId,
    success_kind: ResponseKind,
    terminated: bool,
}

impl ReplySink for ChannelReplySink<'_> {
    fn progress(&mut self, percent: f32, message: &str) {
        if self.terminated {
            return;
        }
        let _ = self
            .replies
            .send(ResponseEnvelope::progress(self.id, percent, message));
    }

    fn done(&mut self, results: Value) {
        if self.terminated {
            return;
        }
        self.terminated = true;
        let _ = self
            .replies
            .send(ResponseEnvelope::done(self.success_kind, self.id, results));
    }

    fn error(&mut self, message: &str) {
        if self.terminated {
            return;
        }
        self.terminated = true;
        let _ = self.replies.send(ResponseEnvelope::error(self.id, message));
    }
}

//! Request/response core demultiplexing engine replies onto pending callers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;
use channel::{
    RequestEnvelope, RequestId, RequestKind, RequestSender, ResponseEnvelope, ResponseKind,
};
use futures::channel::oneshot;
use log::debug;
use parking_lot::Mutex;
use serde_json::Value;

use crate::hooks::LifecycleHooks;
use crate::pending::{Pending, ProgressFn};
use crate::reply::PendingReply;
use crate::timer::TimerHandle;
use crate::MessengerError;

/// Fallback text when the engine reports an error without a description.
const UNKNOWN_ENGINE_ERROR: &str = "unknown error";

/// Tuning knobs for the messenger.
#[derive(Clone, Copy, Debug)]
pub struct MessengerConfig {
    /// Deadline applied independently to every request.
    pub request_timeout: Duration,
}

impl MessengerConfig {
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
}

impl Default for MessengerConfig {
    fn default() -> Self {
        Self {
            request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// RPC core between the control thread and the compute engine.
///
/// Accepts typed requests, forwards them as envelopes across the attached
/// endpoint, and routes inbound envelopes back to the pending caller by id.
/// One messenger serves one logical engine; constructing several gives fully
/// independent request tables and timers.
pub struct Messenger {
    inner: Arc<Inner>,
    timer: TimerHandle,
}

struct Inner {
    table: Mutex<HashMap<RequestId, Pending>>,
    endpoint: ArcSwapOption<RequestSender>,
    hooks: Arc<dyn LifecycleHooks>,
    next_id: AtomicU64,
    timeout: Duration,
}

impl Messenger {
    pub fn new(config: MessengerConfig, hooks: Arc<dyn LifecycleHooks>) -> Self {
        let inner = Arc::new(Inner {
            table: Mutex::new(HashMap::new()),
            endpoint: ArcSwapOption::empty(),
            hooks,
            next_id: AtomicU64::new(1),
            timeout: config.request_timeout,
        });
        let weak: Weak<Inner> = Arc::downgrade(&inner);
        let timer = TimerHandle::spawn(move |id| {
            if let Some(inner) = weak.upgrade() {
                inner.expire(id);
            }
        });
        Self { inner, timer }
    }

    /// Attaches the live endpoint; subsequent `send` calls write to it.
    pub fn attach(&self, endpoint: RequestSender) {
        self.inner.endpoint.store(Some(Arc::new(endpoint)));
    }

    /// Detaches the endpoint; `send` fails fast until a new one is attached.
    pub fn detach(&self) {
        self.inner.endpoint.store(None);
    }

    pub fn is_attached(&self) -> bool {
        self.inner.endpoint.load().is_some()
    }

    /// Number of requests currently awaiting a terminal envelope.
    pub fn pending_requests(&self) -> usize {
        self.inner.table.lock().len()
    }

    /// Issues one request and returns its reply future.
    ///
    /// Never blocks. The id is fresh and unique among in-flight requests; the
    /// entry is registered before the envelope is written so a reply can
    /// never outrun the table.
    pub fn send(
        &self,
        kind: RequestKind,
        data: Value,
        on_progress: Option<ProgressFn>,
    ) -> PendingReply {
        let Some(endpoint) = self.inner.endpoint.load_full() else {
            return PendingReply::failed(MessengerError::ChannelNotReady);
        };

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (complete, reply) = oneshot::channel();

        self.inner.hooks.on_processing_start(kind);

        self.inner.table.lock().insert(
            id,
            Pending {
                kind,
                complete,
                on_progress,
            },
        );
        self.timer.arm(id, Instant::now() + self.inner.timeout);

        if endpoint.send(RequestEnvelope { kind, id, data }).is_err() {
            // Endpoint died underneath us: roll the entry back so the failed
            // send leaves no trace.
            self.inner.table.lock().remove(&id);
            return PendingReply::failed(MessengerError::ChannelNotReady);
        }

        PendingReply::waiting(reply)
    }

    /// Routes one inbound envelope to its pending request.
    ///
    /// Envelopes whose id is unknown (already resolved, timed out, or left
    /// over from a previous channel instance) are discarded. That is
    /// steady-state behavior, not an error.
    pub fn handle_message(&self, envelope: ResponseEnvelope) {
        match envelope.kind {
            ResponseKind::Progress => self.inner.handle_progress(envelope),
            ResponseKind::Error => self.inner.handle_error(envelope),
            _ => self.inner.handle_success(envelope),
        }
    }

    /// Rejects every pending request with `reason` and clears the table.
    /// Safe to call when nothing is pending.
    pub fn cleanup(&self, reason: &str) {
        self.inner.cleanup(reason);
    }
}

impl Inner {
    fn handle_progress(&self, envelope: ResponseEnvelope) {
        let id = envelope.id;
        // Take the callback out so it runs without the table lock held; a
        // terminal may land meanwhile, in which case the callback is dropped
        // instead of reinstated.
        let mut callback = match self.table.lock().get_mut(&id) {
            Some(pending) => pending.on_progress.take(),
            None => {
                debug!("progress for unknown request {id}, discarding");
                return;
            }
        };

        let percent = envelope.progress.unwrap_or(0.0);
        let message = envelope.message.as_deref();
        self.hooks.on_progress(percent, message);
        if let Some(cb) = callback.as_mut() {
            cb(percent, message);
        }

        if let Some(cb) = callback {
            if let Some(pending) = self.table.lock().get_mut(&id) {
                pending.on_progress = Some(cb);
            }
        }
    }

    fn handle_success(&self, envelope: ResponseEnvelope) {
        let mut envelope = envelope;
        let Some(pending) = self.table.lock().remove(&envelope.id) else {
            debug!(
                "terminal {} for unknown request {}, discarding",
                envelope.kind, envelope.id
            );
            return;
        };
        self.hooks.on_complete();
        // When the engine omitted `results`, hand back the whole envelope so
        // nothing is silently dropped.
        let payload = match envelope.results.take() {
            Some(results) => results,
            None => serde_json::to_value(&envelope).unwrap_or(Value::Null),
        };
        let _ = pending.complete.send(Ok(payload));
    }

    fn handle_error(&self, envelope: ResponseEnvelope) {
        let Some(pending) = self.table.lock().remove(&envelope.id) else {
            debug!("error for unknown request {}, discarding", envelope.id);
            return;
        };
        let text = envelope
            .error
            .unwrap_or_else(|| UNKNOWN_ENGINE_ERROR.to_string());
        self.hooks.on_error(&text);
        let _ = pending.complete.send(Err(MessengerError::Engine(text)));
    }

    /// Runs on the timer thread when a deadline lapses. An id no longer in
    /// the table was cancelled by a terminal envelope or a cleanup; nothing
    /// to do.
    fn expire(&self, id: RequestId) {
        let Some(pending) = self.table.lock().remove(&id) else {
            return;
        };
        self.hooks.on_timeout(pending.kind);
        let _ = pending.complete.send(Err(MessengerError::Timeout {
            kind: pending.kind,
            after: self.timeout,
        }));
    }

    fn cleanup(&self, reason: &str) {
        let drained: Vec<Pending> = {
            let mut table = self.table.lock();
            table.drain().map(|(_, pending)| pending).collect()
        };
        if !drained.is_empty() {
            debug!(
                "cleanup: rejecting {} pending request(s): {reason}",
                drained.len()
            );
        }
        for pending in drained {
            let _ = pending
                .complete
                .send(Err(MessengerError::Terminated(reason.to_string())));
        }
    }
}

//! Correlation, termination, and teardown semantics of the messenger,
//! exercised with hand-delivered envelopes and a live scripted engine.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use channel::{endpoint_pair, RequestKind, ResponseEnvelope, ResponseKind};
use engine_native::spawn_engine;
use engine_scenarios::{progress_then_done, ScriptedEngine};
use messenger::{LifecycleHooks, Messenger, MessengerConfig, MessengerError, NoopHooks, ProgressFn};
use parking_lot::Mutex;
use serde_json::json;

#[derive(Default)]
struct RecordingHooks {
    events: Mutex<Vec<String>>,
}

impl RecordingHooks {
    fn push(&self, event: impl Into<String>) {
        self.events.lock().push(event.into());
    }

    fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }
}

impl LifecycleHooks for RecordingHooks {
    fn on_processing_start(&self, kind: RequestKind) {
        self.push(format!("start:{kind}"));
    }

    fn on_progress(&self, percent: f32, _message: Option<&str>) {
        self.push(format!("progress:{percent}"));
    }

    fn on_complete(&self) {
        self.push("complete");
    }

    fn on_error(&self, error: &str) {
        self.push(format!("error:{error}"));
    }

    fn on_timeout(&self, kind: RequestKind) {
        self.push(format!("timeout:{kind}"));
    }

    fn on_channel_error(&self, reason: &str) {
        self.push(format!("channel:{reason}"));
    }
}

fn default_messenger() -> Messenger {
    Messenger::new(MessengerConfig::default(), Arc::new(NoopHooks))
}

#[test]
fn correlation_survives_permuted_delivery() {
    let messenger = default_messenger();
    let (driver, engine) = endpoint_pair();
    messenger.attach(driver.requests);

    let replies: Vec<_> = (0..3)
        .map(|n| messenger.send(RequestKind::ProcessTrack, json!({ "n": n }), None))
        .collect();
    let requests: Vec<_> = (0..3)
        .map(|_| engine.requests.recv().expect("request"))
        .collect();

    // Deliver the terminals in reverse send order.
    for request in requests.iter().rev() {
        messenger.handle_message(ResponseEnvelope::done(
            ResponseKind::TrackSummary,
            request.id,
            json!({ "echo": request.data["n"] }),
        ));
    }

    for (n, reply) in replies.into_iter().enumerate() {
        let payload = reply.wait().expect("resolved");
        assert_eq!(payload, json!({ "echo": n }), "reply {n} cross-wired");
    }
    assert_eq!(messenger.pending_requests(), 0);
}

#[test]
fn duplicate_terminal_resolves_exactly_once() {
    let messenger = default_messenger();
    let (driver, engine) = endpoint_pair();
    messenger.attach(driver.requests);

    let reply = messenger.send(RequestKind::ProcessTrack, json!({}), None);
    let request = engine.requests.recv().expect("request");

    let done = ResponseEnvelope::done(ResponseKind::TrackSummary, request.id, json!({ "ok": true }));
    messenger.handle_message(done.clone());
    // Second delivery is a no-op: the entry is already gone.
    messenger.handle_message(done);

    assert_eq!(reply.wait().expect("resolved"), json!({ "ok": true }));
    assert_eq!(messenger.pending_requests(), 0);
}

#[test]
fn progress_callbacks_fire_in_order_before_the_terminal() {
    let hooks = Arc::new(RecordingHooks::default());
    let messenger = Messenger::new(MessengerConfig::default(), hooks.clone());
    let (driver, engine) = endpoint_pair();
    messenger.attach(driver.requests);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder: ProgressFn = {
        let seen = Arc::clone(&seen);
        Box::new(move |percent, message| {
            seen.lock()
                .push((percent, message.unwrap_or_default().to_string()));
        })
    };
    let reply = messenger.send(RequestKind::ProcessTrack, json!({}), Some(recorder));
    let request = engine.requests.recv().expect("request");

    messenger.handle_message(ResponseEnvelope::progress(request.id, 25.0, "simplifying"));
    messenger.handle_message(ResponseEnvelope::progress(request.id, 75.0, "integrating"));
    messenger.handle_message(ResponseEnvelope::done(
        ResponseKind::TrackSummary,
        request.id,
        json!({ "ok": true }),
    ));
    reply.wait().expect("resolved");

    assert_eq!(
        *seen.lock(),
        vec![(25.0, "simplifying".to_string()), (75.0, "integrating".to_string())]
    );
    let expected: Vec<String> = ["start:PROCESS_TRACK", "progress:25", "progress:75", "complete"]
        .iter()
        .map(|event| event.to_string())
        .collect();
    assert_eq!(hooks.events(), expected);

    // A stray post-terminal progress envelope is a no-op.
    messenger.handle_message(ResponseEnvelope::progress(request.id, 99.0, "late"));
    assert_eq!(seen.lock().len(), 2);
}

#[test]
fn timeout_fires_exactly_once_and_late_terminal_is_dropped() {
    let hooks = Arc::new(RecordingHooks::default());
    let messenger = Messenger::new(
        MessengerConfig {
            request_timeout: Duration::from_millis(25),
        },
        hooks.clone(),
    );
    let (driver, engine) = endpoint_pair();
    messenger.attach(driver.requests);

    let reply = messenger.send(RequestKind::ProcessSections, json!({}), None);
    let request = engine.requests.recv().expect("request");

    let err = reply.wait().unwrap_err();
    assert_eq!(
        err,
        MessengerError::Timeout {
            kind: RequestKind::ProcessSections,
            after: Duration::from_millis(25),
        }
    );
    assert!(err.to_string().contains("PROCESS_SECTIONS"));
    assert_eq!(messenger.pending_requests(), 0);
    let expected: Vec<String> = ["start:PROCESS_SECTIONS", "timeout:PROCESS_SECTIONS"]
        .iter()
        .map(|event| event.to_string())
        .collect();
    assert_eq!(hooks.events(), expected);

    // The engine's eventual reply arrives into an empty table.
    messenger.handle_message(ResponseEnvelope::done(
        ResponseKind::SectionSummaries,
        request.id,
        json!({ "sections": [] }),
    ));
    assert_eq!(messenger.pending_requests(), 0);
    assert_eq!(hooks.events().len(), 2, "late terminal must not re-fire hooks");
}

#[test]
fn teardown_rejects_every_pending_request() {
    let messenger = default_messenger();
    let (driver, _engine) = endpoint_pair();
    messenger.attach(driver.requests);

    let a = messenger.send(RequestKind::ProcessTrack, json!({ "req": "a" }), None);
    let b = messenger.send(RequestKind::FindNearestPoint, json!({ "req": "b" }), None);
    assert_eq!(messenger.pending_requests(), 2);

    messenger.cleanup("terminated");

    for reply in [a, b] {
        assert_eq!(
            reply.wait().unwrap_err(),
            MessengerError::Terminated("terminated".into())
        );
    }
    assert_eq!(messenger.pending_requests(), 0);

    // Safe on an already-empty table.
    messenger.cleanup("terminated");
}

#[test]
fn unknown_id_envelopes_are_silently_discarded() {
    let hooks = Arc::new(RecordingHooks::default());
    let messenger = Messenger::new(MessengerConfig::default(), hooks.clone());

    messenger.handle_message(ResponseEnvelope::progress(999, 10.0, "ghost"));
    messenger.handle_message(ResponseEnvelope::done(
        ResponseKind::TrackSummary,
        999,
        json!({}),
    ));
    messenger.handle_message(ResponseEnvelope::error(999, "ghost"));

    assert!(hooks.events().is_empty());
    assert_eq!(messenger.pending_requests(), 0);
}

/// The canonical exchange, run against a live engine thread: two progress
/// reports, one terminal, a late duplicate ignored.
#[test]
fn end_to_end_progress_then_done_over_a_live_engine() {
    let _ = env_logger::builder().is_test(true).try_init();

    let messenger = Arc::new(default_messenger());
    let (driver, engine_endpoint) = endpoint_pair();
    let engine = spawn_engine(
        Box::new(ScriptedEngine::new([progress_then_done(
            &[(25.0, "simplifying"), (75.0, "integrating")],
            json!({ "ok": true }),
        )])),
        engine_endpoint,
    );
    messenger.attach(driver.requests);
    let pump = {
        let messenger = Arc::clone(&messenger);
        let responses = driver.responses;
        thread::spawn(move || {
            while let Ok(envelope) = responses.recv() {
                messenger.handle_message(envelope);
            }
        })
    };

    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder: ProgressFn = {
        let seen = Arc::clone(&seen);
        Box::new(move |percent, _message| seen.lock().push(percent))
    };
    let payload = messenger
        .send(RequestKind::ProcessTrack, json!({}), Some(recorder))
        .wait()
        .expect("resolved");

    assert_eq!(payload, json!({ "ok": true }));
    assert_eq!(*seen.lock(), vec![25.0, 75.0]);
    assert_eq!(messenger.pending_requests(), 0);

    messenger.detach();
    engine.join();
    let _ = pump.join();
}

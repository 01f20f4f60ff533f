//! End-to-end driver scenarios over live scripted engines.

use std::sync::Arc;
use std::time::Duration;

use channel::{
    NearestPointRequest, NearestPointResult, ProcessSectionsRequest, ProcessTrackRequest,
    SectionSummaries, SectionSummary, TrackPoint, TrackSummary,
};
use engine_scenarios::{progress_then_done, CrashEngine, Script, ScriptStep, ScriptedEngine};
use engine_native::{EngineService, ThreadSpawner};
use messenger::{LifecycleHooks, MessengerError, ProgressFn};
use parking_lot::Mutex;
use serde_json::{json, Value};
use track_driver::{DriverConfig, DriverError, EngineDriver};

fn summary_fixture() -> TrackSummary {
    TrackSummary {
        points: testdata::sample_track_points(),
        total_distance_m: 2400.0,
        elevation_gain_m: 845.0,
        elevation_loss_m: 13.0,
    }
}

fn sections_fixture() -> SectionSummaries {
    SectionSummaries {
        sections: vec![
            SectionSummary {
                start_index: 0,
                end_index: 3,
                distance_m: 640.0,
                ascent_m: 196.0,
                descent_m: 0.0,
            },
            SectionSummary {
                start_index: 4,
                end_index: 7,
                distance_m: 860.0,
                ascent_m: 140.0,
                descent_m: 13.0,
            },
            SectionSummary {
                start_index: 8,
                end_index: 11,
                distance_m: 900.0,
                ascent_m: 469.0,
                descent_m: 0.0,
            },
        ],
    }
}

fn nearest_fixture(points: &[TrackPoint]) -> NearestPointResult {
    NearestPointResult {
        point: points[6],
        index: 6,
    }
}

fn json_fixture<T: serde::Serialize>(fixture: &T) -> Value {
    serde_json::to_value(fixture).expect("serialize fixture")
}

fn scripted_driver(scripts: Vec<Script>, timeout: Duration) -> EngineDriver {
    let spawner = Arc::new(ThreadSpawner::new(move || {
        Box::new(ScriptedEngine::new(scripts.clone())) as Box<dyn EngineService>
    }));
    EngineDriver::builder()
        .spawner(spawner)
        .config(DriverConfig {
            request_timeout: timeout,
        })
        .build()
        .expect("build driver")
}

fn track_request() -> ProcessTrackRequest {
    ProcessTrackRequest {
        bytes: testdata::sample_track_bytes(),
    }
}

#[test]
fn typed_happy_path_covers_all_capabilities() {
    let _ = env_logger::builder().is_test(true).try_init();

    let points = testdata::sample_track_points();
    let driver = scripted_driver(
        vec![
            progress_then_done(
                &[(25.0, "simplifying"), (75.0, "integrating elevation")],
                json_fixture(&summary_fixture()),
            ),
            progress_then_done(&[(50.0, "sectioning")], json_fixture(&sections_fixture())),
            progress_then_done(&[], json_fixture(&nearest_fixture(&points))),
        ],
        Duration::from_secs(5),
    );
    driver.init();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder: ProgressFn = {
        let seen = Arc::clone(&seen);
        Box::new(move |percent, _message| seen.lock().push(percent))
    };
    let summary = driver
        .process_track(track_request(), Some(recorder))
        .wait()
        .expect("track summary");
    assert_eq!(summary.total_distance_m, 2400.0);
    assert_eq!(summary.points.len(), points.len());
    assert_eq!(*seen.lock(), vec![25.0, 75.0]);

    let sections = driver
        .process_sections(
            ProcessSectionsRequest {
                points: points.clone(),
                boundaries: testdata::sample_section_boundaries(),
            },
            None,
        )
        .wait()
        .expect("sections");
    assert_eq!(sections.sections.len(), 3);

    // The typed reply is a plain future; drive it through an executor.
    let nearest = futures::executor::block_on(driver.find_nearest_point(
        NearestPointRequest {
            points,
            target: testdata::sample_target(),
        },
        None,
    ))
    .expect("nearest");
    assert_eq!(nearest.index, 6);

    assert_eq!(driver.pending_requests(), 0);
    driver.terminate();
}

#[test]
fn engine_reported_error_rejects_the_call() {
    let driver = scripted_driver(
        vec![Script::from_iter([ScriptStep::fail(
            "simplification failed",
        )])],
        Duration::from_secs(5),
    );
    driver.init();

    let err = driver.process_track(track_request(), None).wait().unwrap_err();
    match &err {
        DriverError::Messenger(MessengerError::Engine(text)) => {
            assert_eq!(text, "simplification failed");
        }
        other => panic!("expected engine error, got {other:?}"),
    }
    assert!(!err.is_channel_fault());
    driver.terminate();
}

#[test]
fn malformed_success_payload_is_an_invalid_response() {
    let driver = scripted_driver(
        vec![Script::from_iter([ScriptStep::done(json!({ "nope": true }))])],
        Duration::from_secs(5),
    );
    driver.init();

    let err = driver.process_track(track_request(), None).wait().unwrap_err();
    assert!(matches!(err, DriverError::InvalidResponse { .. }));
    assert!(err.to_string().contains("PROCESS_TRACK"));
    assert!(!err.is_channel_fault());
    driver.terminate();
}

#[test]
fn cross_field_validation_checks_section_count() {
    // Engine answers with one section where three were requested.
    let short = SectionSummaries {
        sections: vec![SectionSummary {
            start_index: 0,
            end_index: 3,
            distance_m: 640.0,
            ascent_m: 196.0,
            descent_m: 0.0,
        }],
    };
    let driver = scripted_driver(
        vec![Script::from_iter([ScriptStep::done(json_fixture(&short))])],
        Duration::from_secs(5),
    );
    driver.init();

    let err = driver
        .process_sections(
            ProcessSectionsRequest {
                points: testdata::sample_track_points(),
                boundaries: testdata::sample_section_boundaries(),
            },
            None,
        )
        .wait()
        .unwrap_err();
    assert!(err.to_string().contains("expected 3 sections"));
    driver.terminate();
}

#[test]
fn stalled_engine_times_out_and_the_channel_survives() {
    let driver = scripted_driver(
        vec![
            Script::from_iter([ScriptStep::progress(10.0, "thinking"), ScriptStep::stall()]),
            progress_then_done(&[], json_fixture(&summary_fixture())),
        ],
        Duration::from_millis(30),
    );
    driver.init();

    let err = driver.process_track(track_request(), None).wait().unwrap_err();
    assert!(matches!(
        err,
        DriverError::Messenger(MessengerError::Timeout { .. })
    ));
    assert!(driver.is_ready(), "a per-call timeout is not a channel fault");

    // The channel keeps serving subsequent calls.
    let summary = driver
        .process_track(track_request(), None)
        .wait()
        .expect("second call succeeds");
    assert_eq!(summary.total_distance_m, 2400.0);
    driver.terminate();
}

#[test]
fn terminate_rejects_in_flight_calls() {
    let driver = scripted_driver(
        vec![Script::from_iter([ScriptStep::stall()])],
        Duration::from_secs(30),
    );
    driver.init();

    let reply = driver.process_track(track_request(), None);
    driver.terminate();

    let err = reply.wait().unwrap_err();
    assert_eq!(
        err.to_string(),
        MessengerError::Terminated("terminated".into()).to_string()
    );
    assert!(err.is_channel_fault());
    assert_eq!(driver.pending_requests(), 0);
    assert!(!driver.is_ready());
}

#[test]
fn init_is_idempotent_and_reinit_recovers_after_terminate() {
    let driver = scripted_driver(
        vec![progress_then_done(&[], json_fixture(&summary_fixture()))],
        Duration::from_secs(5),
    );
    driver.init();
    driver.init();
    assert!(driver.is_ready());

    driver.terminate();
    assert!(!driver.is_ready());
    // Safe when nothing is live.
    driver.terminate();

    driver.init();
    assert!(driver.is_ready());
    let summary = driver
        .process_track(track_request(), None)
        .wait()
        .expect("call after reinit");
    assert_eq!(summary.elevation_gain_m, 845.0);
    driver.terminate();
}

#[test]
fn crashed_engine_rejects_pending_and_marks_not_ready() {
    let hooks = Arc::new(ChannelErrorHooks::default());
    let spawner = Arc::new(ThreadSpawner::new(|| {
        Box::new(CrashEngine) as Box<dyn EngineService>
    }));
    let driver = EngineDriver::builder()
        .spawner(spawner)
        .hooks(hooks.clone())
        .build()
        .expect("build driver");
    driver.init();

    let err = driver.process_track(track_request(), None).wait().unwrap_err();
    assert!(err.is_channel_fault());
    assert!(err.to_string().contains("engine channel closed"));
    assert!(!driver.is_ready());
    assert_eq!(driver.pending_requests(), 0);

    driver.terminate();
    assert_eq!(
        *hooks.reasons.lock(),
        vec!["engine channel closed".to_string()]
    );

    // Reinitialising restores a live endpoint.
    driver.init();
    assert!(driver.is_ready());
    driver.terminate();
}

#[derive(Default)]
struct ChannelErrorHooks {
    reasons: Mutex<Vec<String>>,
}

impl LifecycleHooks for ChannelErrorHooks {
    fn on_channel_error(&self, reason: &str) {
        self.reasons.lock().push(reason.to_string());
    }
}

//! Command-line exerciser for the wayline messaging stack.
//!
//! Drives the engine channel end to end with deterministic scenario engines
//! and prints one NDJSON event per line, mirroring what the UI layer would
//! observe.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use channel::{
    endpoint_pair, NearestPointRequest, ProcessSectionsRequest, ProcessTrackRequest, RequestKind,
    SectionSummaries, SectionSummary, TrackPoint, TrackSummary,
};
use clap::{Parser, Subcommand};
use engine_native::{spawn_engine, EngineService, ThreadSpawner};
use engine_scenarios::{progress_then_done, EchoEngine, ScriptedEngine};
use messenger::{Messenger, MessengerConfig, NoopHooks, ProgressFn};
use serde_json::{json, Value};
use track_driver::{DriverConfig, EngineDriver};

#[derive(Parser)]
#[command(name = "wayline-cli", about = "Exercise the engine channel end to end", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the three track capabilities over a scripted engine.
    Exercise {
        /// Per-request timeout in milliseconds.
        #[arg(long, default_value_t = 60_000)]
        timeout_ms: u64,
    },
    /// Round-trip a JSON payload through the echo engine.
    Echo {
        /// JSON value to echo.
        #[arg(long)]
        data: String,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Exercise { timeout_ms } => run_exercise(timeout_ms),
        Command::Echo { data } => run_echo(&data),
    }
}

fn run_exercise(timeout_ms: u64) -> Result<()> {
    let points = testdata::sample_track_points();
    let boundaries = testdata::sample_section_boundaries();

    let scripts = vec![
        progress_then_done(
            &[(25.0, "simplifying"), (75.0, "integrating elevation")],
            serde_json::to_value(track_summary_fixture(&points))?,
        ),
        progress_then_done(
            &[(50.0, "sectioning")],
            serde_json::to_value(section_fixture())?,
        ),
        progress_then_done(&[], serde_json::to_value(nearest_fixture(&points))?),
    ];
    let spawner = Arc::new(ThreadSpawner::new(move || {
        Box::new(ScriptedEngine::new(scripts.clone())) as Box<dyn EngineService>
    }));
    let driver = EngineDriver::builder()
        .spawner(spawner)
        .config(DriverConfig {
            request_timeout: Duration::from_millis(timeout_ms),
        })
        .build()?;
    driver.init();

    let summary = driver
        .process_track(
            ProcessTrackRequest {
                bytes: testdata::sample_track_bytes(),
            },
            Some(progress_printer("PROCESS_TRACK")),
        )
        .wait()?;
    emit("PROCESS_TRACK", serde_json::to_value(&summary)?);

    let sections = driver
        .process_sections(
            ProcessSectionsRequest {
                points: points.clone(),
                boundaries,
            },
            Some(progress_printer("PROCESS_SECTIONS")),
        )
        .wait()?;
    emit("PROCESS_SECTIONS", serde_json::to_value(&sections)?);

    let nearest = driver
        .find_nearest_point(
            NearestPointRequest {
                points,
                target: testdata::sample_target(),
            },
            None,
        )
        .wait()?;
    emit("FIND_NEAREST_POINT", serde_json::to_value(&nearest)?);

    driver.terminate();
    Ok(())
}

fn run_echo(data: &str) -> Result<()> {
    let value: Value = serde_json::from_str(data)?;

    let (driver_endpoint, engine_endpoint) = endpoint_pair();
    let engine = spawn_engine(Box::new(EchoEngine), engine_endpoint);
    let messenger = Arc::new(Messenger::new(
        MessengerConfig::default(),
        Arc::new(NoopHooks),
    ));
    messenger.attach(driver_endpoint.requests);
    let pump = {
        let messenger = Arc::clone(&messenger);
        let responses = driver_endpoint.responses;
        thread::spawn(move || {
            while let Ok(envelope) = responses.recv() {
                messenger.handle_message(envelope);
            }
        })
    };

    let results = messenger
        .send(RequestKind::ProcessTrack, value, None)
        .wait()?;
    println!("{}", json!({ "event": "result", "results": results }));

    messenger.detach();
    engine.join();
    let _ = pump.join();
    Ok(())
}

fn progress_printer(capability: &'static str) -> ProgressFn {
    Box::new(move |percent, message| {
        println!(
            "{}",
            json!({
                "event": "progress",
                "capability": capability,
                "percent": percent,
                "message": message,
            })
        );
    })
}

fn emit(capability: &str, results: Value) {
    println!(
        "{}",
        json!({ "event": "result", "capability": capability, "results": results })
    );
}

/// Canned summary matching the sample ridge; the real engine would compute
/// this from the raw bytes.
fn track_summary_fixture(points: &[TrackPoint]) -> TrackSummary {
    TrackSummary {
        points: points.to_vec(),
        total_distance_m: 2400.0,
        elevation_gain_m: 845.0,
        elevation_loss_m: 13.0,
    }
}

fn section_fixture() -> SectionSummaries {
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

fn nearest_fixture(points: &[TrackPoint]) -> channel::NearestPointResult {
    channel::NearestPointResult {
        point: points[6],
        index: 6,
    }
}

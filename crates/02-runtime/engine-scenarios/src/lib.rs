//! Deterministic engines used by tests and the CLI exerciser.
//!
//! None of these compute geometry; they fake the engine side of the channel
//! contract so the messaging layers can be exercised end to end with known
//! reply sequences.

use std::collections::VecDeque;

use channel::RequestEnvelope;
use engine_native::{EngineService, ReplySink};
use serde_json::Value;
use smallvec::SmallVec;

/// Replies with the request's own payload as the terminal result.
#[derive(Debug, Default)]
pub struct EchoEngine;

impl EngineService for EchoEngine {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn handle(&mut self, request: RequestEnvelope, sink: &mut dyn ReplySink) {
        sink.done(request.data);
    }
}

/// Aborts its thread on the first request, exercising channel-death recovery
/// in the driver.
#[derive(Debug, Default)]
pub struct CrashEngine;

impl EngineService for CrashEngine {
    fn name(&self) -> &'static str {
        "crash"
    }

    fn handle(&mut self, _request: RequestEnvelope, _sink: &mut dyn ReplySink) {
        panic!("crash engine: simulated engine failure");
    }
}

/// Single reply step of a scripted exchange.
#[derive(Clone, Debug)]
pub enum ScriptStep {
    /// Progress report with a stage description.
    Progress { percent: f32, message: String },
    /// Terminal success payload; ends the script for this request.
    Done(Value),
    /// Terminal failure description; ends the script for this request.
    Fail(String),
    /// Produce no further replies; the caller's timeout owns the request.
    Stall,
}

impl ScriptStep {
    pub fn progress(percent: f32, message: impl Into<String>) -> Self {
        ScriptStep::Progress {
            percent,
            message: message.into(),
        }
    }

    pub fn done(results: Value) -> Self {
        ScriptStep::Done(results)
    }

    pub fn fail(message: impl Into<String>) -> Self {
        ScriptStep::Fail(message.into())
    }

    pub fn stall() -> Self {
        ScriptStep::Stall
    }
}

/// Reply sequence for one request.
pub type Script = SmallVec<[ScriptStep; 4]>;

/// Script for the common progress→success exchange.
pub fn progress_then_done(stages: &[(f32, &str)], results: Value) -> Script {
    let mut script = Script::new();
    for (percent, message) in stages {
        script.push(ScriptStep::progress(*percent, *message));
    }
    script.push(ScriptStep::Done(results));
    script
}

/// Replays pre-authored scripts in request-arrival order.
///
/// Each incoming request consumes the next script; requests beyond the last
/// script fall back to echoing their payload.
#[derive(Clone, Debug, Default)]
pub struct ScriptedEngine {
    scripts: VecDeque<Script>,
}

impl ScriptedEngine {
    pub fn new(scripts: impl IntoIterator<Item = Script>) -> Self {
        Self {
            scripts: scripts.into_iter().collect(),
        }
    }

    /// Number of scripts not yet consumed.
    pub fn remaining(&self) -> usize {
        self.scripts.len()
    }
}

impl EngineService for ScriptedEngine {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn handle(&mut self, request: RequestEnvelope, sink: &mut dyn ReplySink) {
        let Some(script) = self.scripts.pop_front() else {
            sink.done(request.data);
            return;
        };
        for step in script {
            match step {
                ScriptStep::Progress { percent, message } => sink.progress(percent, &message),
                ScriptStep::Done(results) => {
                    sink.done(results);
                    return;
                }
                ScriptStep::Fail(message) => {
                    sink.error(&message);
                    return;
                }
                ScriptStep::Stall => return,
            }
        }
    }
}

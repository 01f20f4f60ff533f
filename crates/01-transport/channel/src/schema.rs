//! Channel-visible message schema frozen for JSON serialization.
//!
//! Types in this module define the stable wire representation of requests and
//! responses exchanged with the compute engine. Any backward-incompatible
//! change must bump the schema version and update the golden strings in
//! `src/codec.rs`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Schema version for channel-visible messages.
pub const SCHEMA_VERSION_V1: u8 = 1;

/// Correlation key matching a response envelope to the request that caused it.
///
/// Ids are caller-generated from a monotonic counter and echoed verbatim by
/// the engine on every related response; an id is never reused while its
/// request is still in flight.
pub type RequestId = u64;

/// Operation selector carried in the request direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestKind {
    /// Process a raw track into a summary polyline.
    #[serde(rename = "PROCESS_TRACK")]
    ProcessTrack,
    /// Summarise per-section statistics for an already-processed track.
    #[serde(rename = "PROCESS_SECTIONS")]
    ProcessSections,
    /// Locate the track point nearest to a geographic target.
    #[serde(rename = "FIND_NEAREST_POINT")]
    FindNearestPoint,
}

impl RequestKind {
    /// Success tag the engine answers this request with.
    pub const fn success_kind(self) -> ResponseKind {
        match self {
            RequestKind::ProcessTrack => ResponseKind::TrackSummary,
            RequestKind::ProcessSections => ResponseKind::SectionSummaries,
            RequestKind::FindNearestPoint => ResponseKind::NearestPoint,
        }
    }

    /// Stable wire label, used in error messages and logs.
    pub const fn label(self) -> &'static str {
        match self {
            RequestKind::ProcessTrack => "PROCESS_TRACK",
            RequestKind::ProcessSections => "PROCESS_SECTIONS",
            RequestKind::FindNearestPoint => "FIND_NEAREST_POINT",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Response tag: progress, one success tag per capability, or error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseKind {
    /// Intermediate progress report; zero or more precede the terminal.
    #[serde(rename = "PROGRESS")]
    Progress,
    /// Terminal success for [`RequestKind::ProcessTrack`].
    #[serde(rename = "TRACK_SUMMARY")]
    TrackSummary,
    /// Terminal success for [`RequestKind::ProcessSections`].
    #[serde(rename = "SECTION_SUMMARIES")]
    SectionSummaries,
    /// Terminal success for [`RequestKind::FindNearestPoint`].
    #[serde(rename = "NEAREST_POINT")]
    NearestPoint,
    /// Terminal failure reported by the engine.
    #[serde(rename = "ERROR")]
    Error,
}

impl ResponseKind {
    /// Whether this tag ends a request's lifecycle.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, ResponseKind::Progress)
    }

    /// Stable wire label, used in error messages and logs.
    pub const fn label(self) -> &'static str {
        match self {
            ResponseKind::Progress => "PROGRESS",
            ResponseKind::TrackSummary => "TRACK_SUMMARY",
            ResponseKind::SectionSummaries => "SECTION_SUMMARIES",
            ResponseKind::NearestPoint => "NEAREST_POINT",
            ResponseKind::Error => "ERROR",
        }
    }
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Request-direction envelope.
///
/// `data` stays opaque at this level; typing happens in the driver's
/// capability wrappers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    #[serde(rename = "type")]
    pub kind: RequestKind,
    pub id: RequestId,
    pub data: Value,
}

/// Response-direction envelope.
///
/// `results`, `progress`+`message`, and `error` are mutually exclusive per
/// envelope; which one is populated follows from `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(rename = "type")]
    pub kind: ResponseKind,
    pub id: RequestId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResponseEnvelope {
    /// Builds a progress envelope for `id`.
    pub fn progress(id: RequestId, percent: f32, message: impl Into<String>) -> Self {
        Self {
            kind: ResponseKind::Progress,
            id,
            results: None,
            progress: Some(percent),
            message: Some(message.into()),
            error: None,
        }
    }

    /// Builds a terminal success envelope for `id`.
    pub fn done(kind: ResponseKind, id: RequestId, results: Value) -> Self {
        Self {
            kind,
            id,
            results: Some(results),
            progress: None,
            message: None,
            error: None,
        }
    }

    /// Builds a terminal error envelope for `id`.
    pub fn error(id: RequestId, message: impl Into<String>) -> Self {
        Self {
            kind: ResponseKind::Error,
            id,
            results: None,
            progress: None,
            message: None,
            error: Some(message.into()),
        }
    }
}

/// Single point of a processed track polyline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub lat: f64,
    pub lon: f64,
    /// Elevation above sea level in metres.
    pub elevation_m: f64,
    /// Cumulative distance from the track start in metres.
    pub distance_m: f64,
}

/// Geographic target used by nearest-point queries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Payload for [`RequestKind::ProcessTrack`]: raw track bytes as exported by
/// the recording device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessTrackRequest {
    pub bytes: Vec<u8>,
}

/// Terminal payload for [`RequestKind::ProcessTrack`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSummary {
    /// Simplified polyline, ordered from start to finish.
    pub points: Vec<TrackPoint>,
    pub total_distance_m: f64,
    pub elevation_gain_m: f64,
    pub elevation_loss_m: f64,
}

/// Payload for [`RequestKind::ProcessSections`].
///
/// `boundaries[i]` is the inclusive end index of section `i`; boundaries are
/// strictly increasing and every index refers into `points`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessSectionsRequest {
    pub points: Vec<TrackPoint>,
    pub boundaries: Vec<usize>,
}

/// Per-section statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionSummary {
    pub start_index: usize,
    pub end_index: usize,
    pub distance_m: f64,
    pub ascent_m: f64,
    pub descent_m: f64,
}

/// Terminal payload for [`RequestKind::ProcessSections`]; one entry per
/// requested boundary, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSummaries {
    pub sections: Vec<SectionSummary>,
}

/// Payload for [`RequestKind::FindNearestPoint`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestPointRequest {
    pub points: Vec<TrackPoint>,
    pub target: GeoPoint,
}

/// Terminal payload for [`RequestKind::FindNearestPoint`]; `index` refers
/// into the request's `points`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NearestPointResult {
    pub point: TrackPoint,
    pub index: usize,
}

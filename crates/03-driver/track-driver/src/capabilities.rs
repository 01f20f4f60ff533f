//! Typed capability wrappers, thin over `Messenger::send`.
//!
//! Validation lives entirely at this seam: inputs are checked before the
//! channel is touched, and terminal payloads are checked before the caller
//! sees them. The messenger below stays untyped.

use channel::{
    GeoPoint, NearestPointRequest, NearestPointResult, ProcessSectionsRequest,
    ProcessTrackRequest, RequestKind, SectionSummaries, TrackSummary,
};
use messenger::ProgressFn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::driver::EngineDriver;
use crate::reply::TypedReply;
use crate::DriverError;

impl EngineDriver {
    /// Full-track processing: raw track bytes in, summary polyline out.
    pub fn process_track(
        &self,
        request: ProcessTrackRequest,
        on_progress: Option<ProgressFn>,
    ) -> TypedReply<TrackSummary> {
        let kind = RequestKind::ProcessTrack;
        if request.bytes.is_empty() {
            return TypedReply::failed(DriverError::invalid_request(kind, "track bytes are empty"));
        }
        self.call(kind, &request, on_progress, validate_track_summary)
    }

    /// Per-section statistics for an already-processed track.
    pub fn process_sections(
        &self,
        request: ProcessSectionsRequest,
        on_progress: Option<ProgressFn>,
    ) -> TypedReply<SectionSummaries> {
        let kind = RequestKind::ProcessSections;
        if request.points.is_empty() {
            return TypedReply::failed(DriverError::invalid_request(kind, "no track points"));
        }
        if request.boundaries.is_empty() {
            return TypedReply::failed(DriverError::invalid_request(kind, "no section boundaries"));
        }
        if !request.boundaries.windows(2).all(|pair| pair[0] < pair[1]) {
            return TypedReply::failed(DriverError::invalid_request(
                kind,
                "section boundaries must be strictly increasing",
            ));
        }
        let last = *request.boundaries.last().unwrap_or(&0);
        if last >= request.points.len() {
            return TypedReply::failed(DriverError::invalid_request(
                kind,
                format!(
                    "boundary {last} is outside the track ({} points)",
                    request.points.len()
                ),
            ));
        }

        let expected_sections = request.boundaries.len();
        let point_count = request.points.len();
        self.call(kind, &request, on_progress, move |value| {
            validate_section_summaries(value, expected_sections, point_count)
        })
    }

    /// Locates the track point nearest to a geographic target.
    pub fn find_nearest_point(
        &self,
        request: NearestPointRequest,
        on_progress: Option<ProgressFn>,
    ) -> TypedReply<NearestPointResult> {
        let kind = RequestKind::FindNearestPoint;
        if request.points.is_empty() {
            return TypedReply::failed(DriverError::invalid_request(kind, "no track points"));
        }
        if let Err(reason) = validate_target(&request.target) {
            return TypedReply::failed(DriverError::invalid_request(kind, reason));
        }

        let point_count = request.points.len();
        self.call(kind, &request, on_progress, move |value| {
            validate_nearest_point(value, point_count)
        })
    }

    fn call<T, R>(
        &self,
        kind: RequestKind,
        request: &R,
        on_progress: Option<ProgressFn>,
        validate: impl FnOnce(Value) -> Result<T, String> + Send + 'static,
    ) -> TypedReply<T>
    where
        R: Serialize,
    {
        let data = match serde_json::to_value(request) {
            Ok(data) => data,
            Err(err) => {
                return TypedReply::failed(DriverError::invalid_request(kind, err.to_string()))
            }
        };
        let reply = self.messenger.send(kind, data, on_progress);
        TypedReply::waiting(reply, kind, Box::new(validate))
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, String> {
    serde_json::from_value(value).map_err(|err| err.to_string())
}

fn validate_target(target: &GeoPoint) -> Result<(), String> {
    if !target.lat.is_finite() || !(-90.0..=90.0).contains(&target.lat) {
        return Err(format!("target latitude {} is out of range", target.lat));
    }
    if !target.lon.is_finite() || !(-180.0..=180.0).contains(&target.lon) {
        return Err(format!("target longitude {} is out of range", target.lon));
    }
    Ok(())
}

fn validate_track_summary(value: Value) -> Result<TrackSummary, String> {
    let summary: TrackSummary = decode(value)?;
    if summary.points.is_empty() {
        return Err("summary contains no points".into());
    }
    if !summary.total_distance_m.is_finite() || summary.total_distance_m < 0.0 {
        return Err(format!(
            "total distance {} is not a non-negative number",
            summary.total_distance_m
        ));
    }
    for (label, metres) in [
        ("elevation gain", summary.elevation_gain_m),
        ("elevation loss", summary.elevation_loss_m),
    ] {
        if !metres.is_finite() || metres < 0.0 {
            return Err(format!("{label} {metres} is not a non-negative number"));
        }
    }
    Ok(summary)
}

fn validate_section_summaries(
    value: Value,
    expected_sections: usize,
    point_count: usize,
) -> Result<SectionSummaries, String> {
    let summaries: SectionSummaries = decode(value)?;
    if summaries.sections.len() != expected_sections {
        return Err(format!(
            "expected {expected_sections} sections, engine returned {}",
            summaries.sections.len()
        ));
    }
    for (idx, section) in summaries.sections.iter().enumerate() {
        if section.start_index > section.end_index || section.end_index >= point_count {
            return Err(format!(
                "section {idx} spans {}..={} outside the track ({point_count} points)",
                section.start_index, section.end_index
            ));
        }
        if !section.distance_m.is_finite() || section.distance_m < 0.0 {
            return Err(format!("section {idx} has invalid distance"));
        }
    }
    Ok(summaries)
}

fn validate_nearest_point(value: Value, point_count: usize) -> Result<NearestPointResult, String> {
    let nearest: NearestPointResult = decode(value)?;
    if nearest.index >= point_count {
        return Err(format!(
            "nearest index {} is outside the track ({point_count} points)",
            nearest.index
        ));
    }
    Ok(nearest)
}

//! Deterministic track and position fixtures shared by tests and the CLI.
//!
//! Everything here is authored data, no I/O: a short ridge climb with a
//! saddle before the final push, plus a run along it sampled as position
//! fixes.

use channel::relay::PositionFix;
use channel::{GeoPoint, TrackPoint};
use once_cell::sync::Lazy;

/// (lat, lon, elevation m, cumulative distance m) along the sample ridge.
const RIDGE_PROFILE: &[(f64, f64, f64, f64)] = &[
    (45.9237, 6.8694, 1035.0, 0.0),
    (45.9251, 6.8707, 1092.0, 210.0),
    (45.9264, 6.8719, 1158.0, 420.0),
    (45.9278, 6.8731, 1231.0, 640.0),
    (45.9291, 6.8744, 1305.0, 860.0),
    (45.9304, 6.8756, 1352.0, 1080.0),
    (45.9317, 6.8769, 1339.0, 1290.0),
    (45.9330, 6.8781, 1398.0, 1500.0),
    (45.9344, 6.8794, 1489.0, 1720.0),
    (45.9357, 6.8806, 1603.0, 1950.0),
    (45.9371, 6.8819, 1742.0, 2180.0),
    (45.9384, 6.8832, 1867.0, 2400.0),
];

static TRACK: Lazy<Vec<TrackPoint>> = Lazy::new(|| {
    RIDGE_PROFILE
        .iter()
        .map(|&(lat, lon, elevation_m, distance_m)| TrackPoint {
            lat,
            lon,
            elevation_m,
            distance_m,
        })
        .collect()
});

/// The sample track as a polyline, start to summit.
pub fn sample_track_points() -> Vec<TrackPoint> {
    TRACK.clone()
}

/// The JSON byte payload the full-track capability carries.
pub fn sample_track_bytes() -> Vec<u8> {
    serde_json::to_vec(&*TRACK).expect("serialize sample track")
}

/// Section boundaries valid for the sample track: approach, saddle, summit
/// push.
pub fn sample_section_boundaries() -> Vec<usize> {
    vec![3, 7, 11]
}

/// A target just off the saddle, nearest to point index 6.
pub fn sample_target() -> GeoPoint {
    GeoPoint {
        lat: 45.9318,
        lon: 6.8770,
    }
}

/// A run along the sample track sampled at one fix per point, ten seconds
/// apart.
pub fn sample_fixes() -> Vec<PositionFix> {
    TRACK
        .iter()
        .enumerate()
        .map(|(idx, point)| PositionFix {
            lat: point.lat,
            lon: point.lon,
            elevation_m: point.elevation_m,
            timestamp_ms: 1_700_000_000_000 + idx as u64 * 10_000,
        })
        .collect()
}

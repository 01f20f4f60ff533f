//! Message shapes carried by the external pub/sub relay.
//!
//! The relay transport itself lives outside this workspace; these types pin
//! the JSON a runner broadcasts and followers consume so both ends stay in
//! lockstep with the live-session state.

use serde::{Deserialize, Serialize};

/// One observed GPS position sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    pub lat: f64,
    pub lon: f64,
    /// Elevation above sea level in metres.
    pub elevation_m: f64,
    /// Wall-clock capture time, milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
}

/// Envelope a runner publishes for every recorded fix.
///
/// `seq` increases strictly per session; followers drop stale or duplicate
/// sequence numbers so out-of-order relay delivery cannot rewind the trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    /// Session identifier shared by the runner and their followers.
    pub session: String,
    pub seq: u64,
    pub fix: PositionFix,
}

//! Live position session shared between a runner and their followers.
//!
//! One [`LiveSession`] is the single writer of its position history ring.
//! The runner side records fixes and produces relay updates; the follower
//! side applies relayed updates, filtering foreign sessions and stale
//! sequence numbers so out-of-order delivery cannot rewind the trail.

use channel::relay::{PositionFix, PositionUpdate};
use history::{HistoryResult, HistoryRing};
use log::debug;


/// Which side of the relay this session plays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Publishes its own fixes to the relay.
    Runner,
    /// Mirrors a runner's fixes received from the relay.
    Follower,
}

/// Default number of retained fixes.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Bounded view of one participant's recent positions.
pub struct LiveSession {
    role: Role,
    session_id: String,
    ring: HistoryRing<PositionFix>,
    /// Last sequence number broadcast (runner) or accepted (follower).
    seq: u64,
}

impl LiveSession {
    pub fn new(role: Role, session_id: impl Into<String>, capacity: usize) -> HistoryResult<Self> {
        Ok(Self {
            role,
            session_id: session_id.into(),
            ring: HistoryRing::new(capacity)?,
            seq: 0,
        })
    }

    /// Rehydrates a session from persisted history. The seed is truncated to
    /// the most recent `capacity` fixes.
    pub fn from_snapshot(
        role: Role,
        session_id: impl Into<String>,
        capacity: usize,
        fixes: Vec<PositionFix>,
        seq: u64,
    ) -> HistoryResult<Self> {
        Ok(Self {
            role,
            session_id: session_id.into(),
            ring: HistoryRing::with_seed(capacity, fixes)?,
            seq,
        })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Last sequence number this session has seen.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Number of retained fixes.
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Most recent fix, if any.
    pub fn latest(&self) -> Option<&PositionFix> {
        self.ring.peek()
    }

    /// Runner side: records a fix and returns the update to hand to the
    /// relay. Sequence numbers increase strictly per recorded fix.
    pub fn record_fix(&mut self, fix: PositionFix) -> PositionUpdate {
        self.seq += 1;
        self.ring.push(fix);
        PositionUpdate {
            session: self.session_id.clone(),
            seq: self.seq,
            fix,
        }
    }

    /// Follower side: applies a relayed update. Returns whether the fix was
    /// accepted; foreign sessions and stale or duplicate sequence numbers are
    /// ignored.
    pub fn apply_update(&mut self, update: &PositionUpdate) -> bool {
        if update.session != self.session_id {
            debug!(
                "ignoring update for session '{}' (this is '{}')",
                update.session, self.session_id
            );
            return false;
        }
        if update.seq <= self.seq {
            debug!("ignoring stale update seq {} (have {})", update.seq, self.seq);
            return false;
        }
        self.seq = update.seq;
        self.ring.push(update.fix);
        true
    }

    /// Retained fixes, oldest first.
    pub fn trail(&self) -> impl Iterator<Item = &PositionFix> {
        self.ring.iter()
    }

    /// Clones the retained fixes, oldest first, into `dst` for persistence.
    pub fn snapshot_into(&self, dst: &mut Vec<PositionFix>) {
        self.ring.dump_into(dst);
    }

    /// Moves the scrub cursor one step back through history.
    pub fn scrub_back(&mut self) -> Option<&PositionFix> {
        self.ring.prev()
    }

    /// Moves the scrub cursor one step forward through history.
    pub fn scrub_forward(&mut self) -> Option<&PositionFix> {
        self.ring.next()
    }

    /// Drops retained history. The sequence counter is kept so relay
    /// ordering survives a local clear.
    pub fn clear(&mut self) {
        self.ring.flush();
    }
}

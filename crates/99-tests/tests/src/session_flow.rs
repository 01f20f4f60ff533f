//! Runner→follower relay flow over the sample track.

use session::{LiveSession, Role, DEFAULT_HISTORY_CAPACITY};

#[test]
fn follower_tracks_a_full_run_within_capacity() {
    let fixes = testdata::sample_fixes();
    let mut runner =
        LiveSession::new(Role::Runner, "ridge-17", DEFAULT_HISTORY_CAPACITY).expect("runner");
    let mut follower =
        LiveSession::new(Role::Follower, "ridge-17", DEFAULT_HISTORY_CAPACITY).expect("follower");

    for fix in &fixes {
        let update = runner.record_fix(*fix);
        // Relay redelivery: every update arrives twice; duplicates are dropped.
        assert!(follower.apply_update(&update));
        assert!(!follower.apply_update(&update));
    }

    assert_eq!(follower.len(), DEFAULT_HISTORY_CAPACITY);
    assert_eq!(follower.latest(), fixes.last());
    let runner_trail: Vec<_> = runner.trail().copied().collect();
    let follower_trail: Vec<_> = follower.trail().copied().collect();
    assert_eq!(runner_trail, follower_trail);
}

#[test]
fn snapshot_survives_a_restart_mid_run() {
    let fixes = testdata::sample_fixes();
    let mut runner =
        LiveSession::new(Role::Runner, "ridge-17", DEFAULT_HISTORY_CAPACITY).expect("runner");
    let mut updates = Vec::new();
    for fix in &fixes[..8] {
        updates.push(runner.record_fix(*fix));
    }

    let mut snapshot = Vec::new();
    runner.snapshot_into(&mut snapshot);
    let mut restored = LiveSession::from_snapshot(
        Role::Runner,
        "ridge-17",
        DEFAULT_HISTORY_CAPACITY,
        snapshot,
        runner.seq(),
    )
    .expect("restore");

    // Recording continues with monotonic sequence numbers.
    let next = restored.record_fix(fixes[8]);
    assert_eq!(next.seq, 9);
    assert_eq!(restored.len(), 9);
}

#[test]
fn scrubbing_walks_the_recent_trail() {
    let fixes = testdata::sample_fixes();
    let mut follower =
        LiveSession::new(Role::Follower, "ridge-17", DEFAULT_HISTORY_CAPACITY).expect("follower");
    let mut runner =
        LiveSession::new(Role::Runner, "ridge-17", DEFAULT_HISTORY_CAPACITY).expect("runner");
    for fix in &fixes {
        let update = runner.record_fix(*fix);
        follower.apply_update(&update);
    }

    let newest = *follower.latest().expect("latest");
    let one_back = *follower.scrub_back().expect("previous fix");
    assert_eq!(one_back.timestamp_ms + 10_000, newest.timestamp_ms);
    let back_to_newest = *follower.scrub_forward().expect("next fix");
    assert_eq!(back_to_newest, newest);
}

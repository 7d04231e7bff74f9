// Unit tests for the edge-triggered state tracker

use crate::link::{ConnectionState, StateTracker};

fn reported(sequence: &[bool]) -> Vec<bool> {
    let mut tracker = StateTracker::default();
    sequence
        .iter()
        .filter_map(|&alive| tracker.observe(alive))
        .collect()
}

/// **VALUE**: Verifies that only transitions are reported.
///
/// **WHY THIS MATTERS**: Subscribers drive UI indicators from these events. Repeated
/// identical reports would cause flicker and duplicate status messages.
///
/// **BUG THIS CATCHES**: Would catch if the tracker forgot to compare against the
/// last reported value and published every probe result.
#[test]
fn given_probe_sequence_when_observed_then_reports_only_changes() {
    // GIVEN: A sequence of probe results with repeats
    let sequence = [false, false, true, true, true, false, true, true];

    // WHEN: Feeding them through the tracker
    let events = reported(&sequence);

    // THEN: Only the edges are reported
    assert_eq!(events, vec![false, true, false, true]);
}

/// **VALUE**: Verifies that the first observation is always reported.
///
/// **BUG THIS CATCHES**: Would catch if the tracker started out as "disconnected",
/// which would swallow the initial Disconnected report for an unreachable server.
#[test]
fn given_fresh_tracker_when_first_probe_fails_then_reports_disconnected() {
    // GIVEN: A fresh tracker
    let mut tracker = StateTracker::default();
    assert_eq!(tracker.current(), None, "Should start unknown");

    // WHEN: Observing a failed probe
    let event = tracker.observe(false);

    // THEN: Disconnected is reported once
    assert_eq!(event, Some(false));
    assert_eq!(tracker.observe(false), None, "Repeat should be suppressed");
}

/// **VALUE**: Verifies that reset forgets the last value silently.
///
/// **BUG THIS CATCHES**: Would catch if a restart after stop kept the stale
/// Connected value and never re-announced the state.
#[test]
fn given_reported_state_when_reset_then_next_observation_reported_again() {
    // GIVEN: A tracker that reported Connected
    let mut tracker = StateTracker::default();
    assert_eq!(tracker.observe(true), Some(true));

    // WHEN: Resetting and observing the same value
    tracker.reset();

    // THEN: The value is reported again
    assert_eq!(tracker.current(), None);
    assert_eq!(tracker.observe(true), Some(true));
}

#[test]
fn given_bool_when_converted_then_maps_to_connection_state() {
    assert_eq!(ConnectionState::from(true), ConnectionState::Connected);
    assert_eq!(ConnectionState::from(false), ConnectionState::Disconnected);
    assert!(ConnectionState::Connected.is_connected());
    assert_eq!(ConnectionState::Disconnected.to_string(), "Disconnected");
}

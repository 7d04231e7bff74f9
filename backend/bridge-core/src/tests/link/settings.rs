// Unit tests for monitor settings

use crate::error::LinkError;
use crate::link::{LineTerminator, MonitorSettings};

use std::time::Duration;

#[test]
fn given_default_settings_when_inspected_then_match_documented_timings() {
    let settings = MonitorSettings::default();

    assert_eq!(settings.probe_interval, Duration::from_millis(1000));
    assert_eq!(settings.probe_timeout, Duration::from_millis(300));
    assert_eq!(settings.reconnect_backoff, Duration::from_millis(2000));
    assert_eq!(settings.reconnect_retry_delay, Duration::from_millis(1000));
    assert_eq!(settings.read_timeout, Duration::from_millis(100));
    assert_eq!(settings.terminator, LineTerminator::None);
    assert!(settings.validate().is_ok());
}

/// **VALUE**: Verifies that zero durations are rejected.
///
/// **BUG THIS CATCHES**: Would catch a zero probe interval turning the liveness loop
/// into a busy loop, or a zero read timeout making the socket call fail.
#[test]
fn given_zero_duration_when_validating_then_returns_settings_error() {
    // GIVEN: Settings with a zero read timeout
    let settings = MonitorSettings::new().read_timeout(Duration::ZERO);

    // WHEN: Validating
    let result = settings.validate();

    // THEN: Should name the offending field
    match result {
        Err(LinkError::Settings { message, .. }) => {
            assert!(message.contains("read_timeout"), "Got: {message}")
        }
        other => panic!("Expected settings error, got {other:?}"),
    }
}

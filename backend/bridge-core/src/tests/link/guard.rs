// Unit tests for the pending-reconnect guard

use crate::link::ReconnectFlag;

/// **VALUE**: Verifies that a second reconnect cannot start while one is pending.
///
/// **WHY THIS MATTERS**: Two overlapping reconnects would each close the other's
/// fresh socket, producing a reconnect storm.
///
/// **BUG THIS CATCHES**: Would catch a non-atomic check-then-set on the flag.
#[test]
fn given_pending_reconnect_when_second_begins_then_refused() {
    // GIVEN: A claimed flag
    let flag = ReconnectFlag::default();
    let first = flag.try_begin();
    assert!(first.is_some(), "First claim should succeed");

    // WHEN: Claiming again
    let second = flag.try_begin();

    // THEN: Refused while the first guard lives
    assert!(second.is_none(), "Second claim should be refused");
    assert!(flag.is_pending());
}

/// **VALUE**: Verifies that dropping the guard releases the flag.
///
/// **BUG THIS CATCHES**: Would catch an early return that leaves the flag set,
/// which would disable reconnects forever.
#[test]
fn given_guard_dropped_when_begin_again_then_succeeds() {
    let flag = ReconnectFlag::default();
    drop(flag.try_begin());

    assert!(!flag.is_pending());
    assert!(flag.try_begin().is_some());
}

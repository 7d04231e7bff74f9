// Unit tests for shared link state: stop-aware socket install and the
// bounded liveness check

use crate::link::{Endpoint, LinkShared, MonitorSettings, StateEvent};
use crate::tests::link::connected_pair;

use std::io::Read;
use std::thread;
use std::time::{Duration, Instant};

use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};
use tokio::sync::watch;

struct Harness {
    shared: LinkShared,
    _events: UnboundedReceiver<StateEvent>,
}

fn harness(settings: MonitorSettings) -> Harness {
    let endpoint = Endpoint::new("127.0.0.1", 6677).unwrap();
    let (epoch_tx, _) = watch::channel(0u64);
    let (events_tx, events_rx) = unbounded_channel();

    Harness {
        shared: LinkShared::new(endpoint, settings, epoch_tx, events_tx),
        _events: events_rx,
    }
}

fn stop(shared: &LinkShared) {
    shared.epoch.send_modify(|epoch| *epoch += 1);
}

// ============================================================================
// Install Tests
// ============================================================================

#[test]
fn given_current_epoch_when_installing_then_socket_is_kept() {
    let Harness { shared, .. } = harness(MonitorSettings::default());
    let (client, _server) = connected_pair();

    let installed = shared.install_if_current(client, shared.current_epoch());

    assert!(installed);
    assert!(shared.socket().is_some());
}

/// **VALUE**: Verifies that a socket opened across a stop never lands in the slot.
///
/// **WHY THIS MATTERS**: A reconnect can finish its connect after stop already
/// closed an empty slot. Installing it would leave a live socket on a stopped
/// monitor.
///
/// **BUG THIS CATCHES**: Would catch the epoch being compared outside the slot
/// lock, or the stale stream being left open instead of shut down.
#[test]
fn given_stopped_epoch_when_installing_then_stream_is_closed_and_slot_empty() {
    // GIVEN: A connection opened during epoch 0, then a stop
    let Harness { shared, .. } = harness(MonitorSettings::default());
    let (client, mut server) = connected_pair();
    let opened_in = shared.current_epoch();
    stop(&shared);

    // WHEN: Installing on behalf of the stopped epoch
    let installed = shared.install_if_current(client, opened_in);

    // THEN: Rejected, slot empty, peer sees the close
    assert!(!installed);
    assert!(shared.socket().is_none());
    server
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    let mut buf = [0u8; 4];
    assert_eq!(server.read(&mut buf).unwrap(), 0, "Stale stream should be shut down");
}

#[test]
fn given_installed_socket_when_replaced_then_previous_is_closed() {
    let Harness { shared, .. } = harness(MonitorSettings::default());
    let (first, mut first_server) = connected_pair();
    let (second, _second_server) = connected_pair();
    let epoch = shared.current_epoch();

    assert!(shared.install_if_current(first, epoch));
    assert!(shared.install_if_current(second, epoch));

    first_server
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    let mut buf = [0u8; 4];
    assert_eq!(first_server.read(&mut buf).unwrap(), 0);
}

// ============================================================================
// Bounded Liveness Tests
// ============================================================================

/// **VALUE**: Verifies that the liveness check gives up after `probe_timeout`
/// when session I/O holds the socket.
///
/// **WHY THIS MATTERS**: A write stuck in the kernel would otherwise stall the
/// monitoring loop and no Disconnected would ever be reported.
///
/// **BUG THIS CATCHES**: Would catch the I/O lock being taken with a plain
/// `lock()`, or the timeout being ignored.
#[test]
fn given_io_lock_held_when_checking_liveness_then_dead_within_timeout() {
    // GIVEN: A healthy socket and a short timeout
    let timeout = Duration::from_millis(100);
    let Harness { shared, .. } = harness(MonitorSettings::new().probe_timeout(timeout));
    let (client, _server) = connected_pair();
    assert!(shared.install_if_current(client, shared.current_epoch()));

    // WHEN: Another holder keeps the I/O lock far longer than the timeout
    let io = shared.io.lock();
    let started = Instant::now();
    let alive = thread::scope(|scope| scope.spawn(|| shared.probe_blocking()).join().unwrap());
    let elapsed = started.elapsed();
    drop(io);

    // THEN: Dead, after roughly the timeout and well before the holder lets go
    assert!(!alive, "Blocked check should count as dead");
    assert!(elapsed >= timeout - Duration::from_millis(10), "Gave up too early: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(1), "Not bounded: {elapsed:?}");
}

#[test]
fn given_free_io_lock_when_checking_liveness_then_alive() {
    let Harness { shared, .. } = harness(MonitorSettings::default());
    let (client, _server) = connected_pair();
    assert!(shared.install_if_current(client, shared.current_epoch()));

    assert!(shared.probe_blocking());
}

#[test]
fn given_no_socket_when_checking_liveness_then_dead() {
    let Harness { shared, .. } = harness(MonitorSettings::default());

    assert!(!shared.probe_blocking());
}

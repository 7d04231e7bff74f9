use crate::link::helpers::{
    WAIT, accept_within, assert_quiet, bind_server, fast_settings, monitor_for, next_event,
    unused_port,
};

use bridge_core::error::LinkError;
use bridge_core::link::{
    ConnectionMonitor, ConnectionState, Endpoint, MonitorSettings, ReconnectOutcome,
};

use std::io::Read;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

// ============================================================================
// Lifecycle Tests
// ============================================================================

/// **VALUE**: Verifies the unreachable-server scenario end to end.
///
/// **WHY THIS MATTERS**: The bridge is usually started before the server. It must
/// announce Disconnected once, keep retrying quietly, and never crash.
///
/// **BUG THIS CATCHES**: Would catch:
/// - The initial Disconnected being swallowed
/// - Every failed retry re-announcing Disconnected
/// - The loop giving up after the first failed reconnect
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_unreachable_server_when_monitoring_then_reports_down_once_and_keeps_retrying() {
    // GIVEN: A port nobody listens on
    let (monitor, mut events) = monitor_for(unused_port(), fast_settings());

    // WHEN: Monitoring starts
    monitor.start_monitoring();

    // THEN: Exactly one Disconnected, then silence across several retry cycles
    assert_eq!(next_event(&mut events, WAIT).await, Some(false));
    assert_quiet(&mut events, Duration::from_millis(600)).await;
    assert!(monitor.is_monitoring(), "Loop should still be running");
    assert_eq!(monitor.state(), ConnectionState::Disconnected);
}

/// **VALUE**: Verifies the half-open scenario: remote close, detection, reconnect.
///
/// **WHY THIS MATTERS**: This is the core resilience path. The server restarting
/// must show up as exactly one Disconnected and one Connected.
///
/// **BUG THIS CATCHES**: Would catch:
/// - The probe missing a FIN from the peer
/// - Duplicate notifications around the reconnect
/// - Reconnect not reporting Connected
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_healthy_link_when_remote_closes_then_reports_down_once_and_up_once() {
    // GIVEN: A connected and monitored link
    let (listener, port) = bind_server();
    let (monitor, mut events) = monitor_for(port, fast_settings());
    assert!(monitor.connect(), "Initial connect should succeed");
    assert_eq!(next_event(&mut events, WAIT).await, Some(true));
    let server_side = accept_within(&listener, WAIT)
        .await
        .expect("Server should accept the connection");

    monitor.start_monitoring();
    assert_quiet(&mut events, Duration::from_millis(200)).await;

    // WHEN: The server closes its end
    drop(server_side);

    // THEN: Down once, then up once after the reconnect
    assert_eq!(next_event(&mut events, WAIT).await, Some(false));
    assert_eq!(next_event(&mut events, WAIT).await, Some(true));
    let _reconnected = accept_within(&listener, WAIT)
        .await
        .expect("Reconnect should reach the server");
    assert_quiet(&mut events, Duration::from_millis(300)).await;
    assert!(monitor.is_connected());
}

/// **VALUE**: Verifies that nothing is published after stop.
///
/// **WHY THIS MATTERS**: The UI tears down its indicator on stop. A late event
/// would flip it back on for a link nobody is watching.
///
/// **BUG THIS CATCHES**: Would catch:
/// - The loop publishing one more probe result after stop
/// - Stop leaving the socket open
/// - Stop keeping the stale Connected state as a send gate
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_monitoring_when_stopped_then_no_further_notifications_and_socket_closed() {
    // GIVEN: A connected and monitored link
    let (listener, port) = bind_server();
    let (monitor, mut events) = monitor_for(port, fast_settings());
    assert!(monitor.connect());
    assert_eq!(next_event(&mut events, WAIT).await, Some(true));
    let mut server_side = accept_within(&listener, WAIT).await.expect("accept");
    monitor.start_monitoring();

    // WHEN: Stopping
    monitor.stop_monitoring();

    // THEN: The server sees the close
    server_side
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    let mut buf = [0u8; 8];
    assert_eq!(server_side.read(&mut buf).unwrap(), 0, "Socket should be closed");

    // THEN: No transition is delivered and the state is no longer Connected
    assert_quiet(&mut events, Duration::from_millis(400)).await;
    assert!(!monitor.is_monitoring());
    assert!(!monitor.is_connected());
    assert!(!monitor.send("late"), "Send should be gated after stop");
}

/// **VALUE**: Verifies that a stop landing mid-delivery silences the remaining sinks.
///
/// **WHY THIS MATTERS**: One slow subscriber must not let a transition leak to the
/// others after the caller has already stopped monitoring.
///
/// **BUG THIS CATCHES**: Would catch the dispatcher checking for a stop once per
/// event instead of before each sink.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_slow_sink_when_stopped_during_delivery_then_later_sinks_not_called() {
    // GIVEN: A channel sink, a slow sink, and a sink counting calls after stop
    let (listener, port) = bind_server();
    let (monitor, mut events) = monitor_for(port, fast_settings());
    monitor.subscribe(|_: bool| std::thread::sleep(Duration::from_millis(300)));

    let stopped = Arc::new(AtomicBool::new(false));
    let late_deliveries = Arc::new(AtomicUsize::new(0));
    let (stopped_flag, late) = (Arc::clone(&stopped), Arc::clone(&late_deliveries));
    monitor.subscribe(move |_: bool| {
        if stopped_flag.load(Ordering::SeqCst) {
            late.fetch_add(1, Ordering::SeqCst);
        }
    });

    // WHEN: Stopping while the slow sink is still handling Connected
    assert!(monitor.connect());
    assert_eq!(next_event(&mut events, WAIT).await, Some(true));
    monitor.start_monitoring();
    monitor.stop_monitoring();
    stopped.store(true, Ordering::SeqCst);

    // THEN: The sink after the slow one never hears about it
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(late_deliveries.load(Ordering::SeqCst), 0);
    drop(listener);
}

/// **VALUE**: Verifies that stop closes a socket opened by a bare connect.
///
/// **BUG THIS CATCHES**: Would catch stop returning early when the loop was
/// never started, leaving the socket open and sends still going through.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_connect_without_monitoring_when_stopped_then_socket_closed() {
    // GIVEN: Connected, but monitoring never started
    let (listener, port) = bind_server();
    let (monitor, mut events) = monitor_for(port, fast_settings());
    assert!(monitor.connect());
    assert_eq!(next_event(&mut events, WAIT).await, Some(true));
    let mut server_side = accept_within(&listener, WAIT).await.expect("accept");

    // WHEN: Stopping
    monitor.stop_monitoring();

    // THEN: The server sees EOF and the link is gated off
    server_side
        .set_read_timeout(Some(Duration::from_millis(500)))
        .unwrap();
    let mut buf = [0u8; 8];
    assert_eq!(server_side.read(&mut buf).unwrap(), 0, "Socket should be closed");
    assert!(!monitor.is_connected());
    assert!(!monitor.send("late"));
    assert_quiet(&mut events, Duration::from_millis(200)).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_running_monitor_when_started_again_then_no_op() {
    // GIVEN: A running monitor against an unreachable server
    let (monitor, mut events) = monitor_for(unused_port(), fast_settings());
    monitor.start_monitoring();

    // WHEN: Starting again
    monitor.start_monitoring();

    // THEN: Still a single Disconnected report
    assert_eq!(next_event(&mut events, WAIT).await, Some(false));
    assert_quiet(&mut events, Duration::from_millis(300)).await;

    // Stop is idempotent too
    monitor.stop_monitoring();
    monitor.stop_monitoring();
    assert!(!monitor.is_monitoring());
}

/// **VALUE**: Verifies that a restarted monitor re-announces the link state.
///
/// **BUG THIS CATCHES**: Would catch the tracker keeping its pre-stop value, so the
/// restarted session never tells the UI it is connected again.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_stopped_monitor_when_restarted_then_reconnects_and_reports() {
    // GIVEN: A monitor that was connected, then stopped
    let (listener, port) = bind_server();
    let (monitor, mut events) = monitor_for(port, fast_settings());
    assert!(monitor.connect());
    assert_eq!(next_event(&mut events, WAIT).await, Some(true));
    monitor.start_monitoring();
    monitor.stop_monitoring();

    // WHEN: Monitoring restarts
    monitor.start_monitoring();

    // THEN: Down (no socket), then up after reconnecting
    assert_eq!(next_event(&mut events, WAIT).await, Some(false));
    assert_eq!(next_event(&mut events, WAIT).await, Some(true));
    assert!(accept_within(&listener, WAIT).await.is_some());
}

/// **VALUE**: Verifies that per-session timings override the configured ones.
///
/// **BUG THIS CATCHES**: Would catch the loop ignoring the timings passed at start
/// and waiting out the multi-second defaults.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_explicit_timings_when_remote_closes_then_recovers_on_those_timings() {
    // GIVEN: Default (slow) settings, started with fast per-session timings
    let (listener, port) = bind_server();
    let (monitor, mut events) = monitor_for(port, MonitorSettings::default());
    assert!(monitor.connect());
    assert_eq!(next_event(&mut events, WAIT).await, Some(true));
    let server_side = accept_within(&listener, WAIT).await.expect("accept");
    monitor.start_monitoring_with(Duration::from_millis(50), Duration::from_millis(50));

    // WHEN: The server closes its end
    drop(server_side);

    // THEN: Down and back up well inside the 2s default backoff
    let fast = Duration::from_millis(1500);
    assert_eq!(next_event(&mut events, fast).await, Some(false));
    assert_eq!(next_event(&mut events, fast).await, Some(true));
}

// ============================================================================
// Reconnect Tests
// ============================================================================

/// **VALUE**: Verifies that reconnect attempts never overlap.
///
/// **WHY THIS MATTERS**: An external trigger racing the probe loop must not open a
/// second socket that closes the first one.
///
/// **BUG THIS CATCHES**: Would catch the pending flag being checked without being
/// claimed atomically, or released before the retry delay ends.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_pending_reconnect_when_second_requested_then_no_op() {
    // GIVEN: An unreachable server so the first attempt sits in its retry delay
    let (monitor, _events) = monitor_for(unused_port(), fast_settings());

    // WHEN: Two reconnects run concurrently
    let (first, second) = tokio::join!(monitor.reconnect(), monitor.reconnect());

    // THEN: One ran and failed, the other was skipped
    let mut outcomes = vec![first, second];
    outcomes.sort_by_key(|outcome| format!("{outcome:?}"));
    assert_eq!(
        outcomes,
        vec![ReconnectOutcome::AlreadyPending, ReconnectOutcome::Failed]
    );
    assert!(!monitor.is_reconnect_pending(), "Flag should be released");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_reachable_server_when_reconnect_requested_then_connected() {
    // GIVEN: A listening server
    let (listener, port) = bind_server();
    let (monitor, mut events) = monitor_for(port, fast_settings());

    // WHEN: Triggering a reconnect by hand
    let outcome = monitor.reconnect().await;

    // THEN: Connected is installed and reported
    assert_eq!(outcome, ReconnectOutcome::Connected);
    assert_eq!(next_event(&mut events, WAIT).await, Some(true));
    assert!(accept_within(&listener, WAIT).await.is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_unreachable_server_when_connect_then_reports_disconnected() {
    let (monitor, mut events) = monitor_for(unused_port(), fast_settings());

    assert!(!monitor.connect());

    assert_eq!(next_event(&mut events, WAIT).await, Some(false));
    assert!(!monitor.is_connected());
}

// ============================================================================
// Suspend Tests
// ============================================================================

/// **VALUE**: Verifies that probing pauses while suspended and resumes after.
///
/// **WHY THIS MATTERS**: The host window stalls while being dragged; probes during
/// that time produce bogus timeouts.
///
/// **BUG THIS CATCHES**: Would catch the loop ignoring the suspend flag, or never
/// leaving the suspended state.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_suspended_probing_when_resumed_then_probing_continues() {
    // GIVEN: A suspended monitor against an unreachable server
    let (monitor, mut events) = monitor_for(unused_port(), fast_settings());
    monitor.suspend_probing();
    assert!(monitor.is_probing_suspended());

    // WHEN: Monitoring starts while suspended
    monitor.start_monitoring();

    // THEN: Nothing is probed
    assert_quiet(&mut events, Duration::from_millis(300)).await;

    // WHEN: Resumed
    monitor.resume_probing();

    // THEN: The first probe reports Disconnected
    assert_eq!(next_event(&mut events, WAIT).await, Some(false));
}

// ============================================================================
// Subscription Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_extra_subscriber_when_state_changes_then_all_sinks_notified() {
    // GIVEN: A monitor with a second, closure-based sink
    let (listener, port) = bind_server();
    let (monitor, mut events) = monitor_for(port, fast_settings());
    let connected_count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&connected_count);
    monitor.subscribe(move |connected: bool| {
        if connected {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    // WHEN: Connecting
    assert!(monitor.connect());

    // THEN: Both sinks see the transition
    assert_eq!(next_event(&mut events, WAIT).await, Some(true));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(connected_count.load(Ordering::SeqCst), 1);
    drop(listener);
}

// ============================================================================
// Construction Tests
// ============================================================================

#[test]
fn given_no_runtime_when_building_monitor_then_returns_runtime_error() {
    // GIVEN: A plain thread without a tokio runtime
    let endpoint = Endpoint::new("127.0.0.1", 6677).unwrap();

    // WHEN: Building a monitor on the ambient runtime
    let result = ConnectionMonitor::new(endpoint, MonitorSettings::default(), |_: bool| {});

    // THEN: Fails cleanly instead of panicking
    assert!(matches!(result, Err(LinkError::Runtime { .. })));
}

#[test]
fn given_explicit_runtime_when_building_monitor_then_succeeds_from_plain_thread() {
    // GIVEN: A runtime owned by the caller
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let endpoint = Endpoint::new("127.0.0.1", 6677).unwrap();

    // WHEN: Building with its handle
    let monitor = ConnectionMonitor::with_runtime(
        endpoint,
        MonitorSettings::default(),
        |_: bool| {},
        runtime.handle().clone(),
    )
    .unwrap();

    // THEN: Starts out disconnected and idle
    assert_eq!(monitor.state(), ConnectionState::Disconnected);
    assert!(!monitor.is_monitoring());
    assert_eq!(monitor.endpoint().port(), 6677);
}

#[test]
fn given_invalid_settings_when_building_monitor_then_returns_settings_error() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let endpoint = Endpoint::new("127.0.0.1", 6677).unwrap();
    let settings = MonitorSettings::new().probe_interval(Duration::ZERO);

    let result =
        ConnectionMonitor::with_runtime(endpoint, settings, |_: bool| {}, runtime.handle().clone());

    assert!(matches!(result, Err(LinkError::Settings { .. })));
}

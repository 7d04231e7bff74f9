//! Test helpers for link integration tests.
//!
//! This module provides utilities for exercising the monitor against real
//! loopback sockets:
//! - Ephemeral listeners and guaranteed-closed ports
//! - Fast monitor timings
//! - Waiting for (or for the absence of) state transitions

use bridge_core::link::{ChannelSink, ConnectionMonitor, Endpoint, MonitorSettings};

use std::io::ErrorKind;
use std::net::{TcpListener, TcpStream};
use std::time::{Duration, Instant};

use tokio::sync::mpsc::UnboundedReceiver;

/// Upper bound for anything that should happen "soon".
pub const WAIT: Duration = Duration::from_secs(5);

/// Test helper: Bind a listener on an ephemeral loopback port.
pub fn bind_server() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind test listener");
    let port = listener.local_addr().expect("No local address").port();
    (listener, port)
}

/// Test helper: A loopback port with nothing listening on it.
pub fn unused_port() -> u16 {
    let (listener, port) = bind_server();
    drop(listener);
    port
}

/// Test helper: Timings short enough for tests, ordered like the defaults.
pub fn fast_settings() -> MonitorSettings {
    MonitorSettings::new()
        .probe_interval(Duration::from_millis(50))
        .probe_timeout(Duration::from_millis(100))
        .reconnect_backoff(Duration::from_millis(50))
        .reconnect_retry_delay(Duration::from_millis(100))
        .read_timeout(Duration::from_millis(50))
        .suspend_poll(Duration::from_millis(50))
}

/// Test helper: Monitor on the ambient runtime with a channel sink.
pub fn monitor_for(
    port: u16,
    settings: MonitorSettings,
) -> (ConnectionMonitor, UnboundedReceiver<bool>) {
    let endpoint = Endpoint::new("127.0.0.1", port).expect("Invalid test endpoint");
    let (sink, events) = ChannelSink::channel();
    let monitor =
        ConnectionMonitor::new(endpoint, settings, sink).expect("Failed to build monitor");
    (monitor, events)
}

/// Test helper: Accept one connection without blocking the runtime.
pub async fn accept_within(listener: &TcpListener, timeout: Duration) -> Option<TcpStream> {
    listener
        .set_nonblocking(true)
        .expect("Failed to make listener non-blocking");
    let deadline = Instant::now() + timeout;

    while Instant::now() < deadline {
        match listener.accept() {
            Ok((stream, _)) => {
                stream
                    .set_nonblocking(false)
                    .expect("Failed to make stream blocking");
                return Some(stream);
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            Err(e) => panic!("Accept failed: {e}"),
        }
    }

    None
}

/// Test helper: Next state transition, or `None` if none arrives in time.
pub async fn next_event(events: &mut UnboundedReceiver<bool>, within: Duration) -> Option<bool> {
    tokio::time::timeout(within, events.recv())
        .await
        .ok()
        .flatten()
}

/// Test helper: Assert that no transition arrives during `window`.
pub async fn assert_quiet(events: &mut UnboundedReceiver<bool>, window: Duration) {
    if let Ok(Some(connected)) = tokio::time::timeout(window, events.recv()).await {
        panic!("Unexpected state change: connected={connected}");
    }
}

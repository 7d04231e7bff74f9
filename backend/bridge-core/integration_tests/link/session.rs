use crate::link::helpers::{
    WAIT, accept_within, bind_server, fast_settings, monitor_for, next_event, unused_port,
};

use bridge_core::link::{LineTerminator, ReadOutcome};

use std::io::{Read, Write};
use std::time::{Duration, Instant};

// ============================================================================
// Send Tests
// ============================================================================

/// **VALUE**: Verifies that sends are gated on the reported state.
///
/// **BUG THIS CATCHES**: Would catch send touching a socket that was never opened,
/// or reporting success while disconnected.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_disconnected_link_when_sending_then_returns_false() {
    // GIVEN: A monitor that never connected
    let (monitor, _events) = monitor_for(unused_port(), fast_settings());

    // WHEN: Sending
    let sent = monitor.send("CHECK");

    // THEN: Nothing is attempted
    assert!(!sent);
}

/// **VALUE**: Verifies the reset scenario on the wire.
///
/// **WHY THIS MATTERS**: Line-oriented servers only act on complete lines; a
/// missing or doubled terminator breaks the command.
///
/// **BUG THIS CATCHES**: Would catch:
/// - The terminator being dropped or sent twice
/// - The message being written more than once
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_crlf_terminator_when_sending_reset_then_server_reads_exact_line() {
    // GIVEN: A connected link configured for CR LF
    let (listener, port) = bind_server();
    let (monitor, mut events) =
        monitor_for(port, fast_settings().terminator(LineTerminator::CrLf));
    assert!(monitor.connect());
    assert_eq!(next_event(&mut events, WAIT).await, Some(true));
    let mut server_side = accept_within(&listener, WAIT).await.expect("accept");

    // WHEN: Sending RESET
    assert!(monitor.send("RESET"));
    monitor.disconnect();

    // THEN: The server reads exactly one line, then EOF
    server_side
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    let mut received = Vec::new();
    server_side.read_to_end(&mut received).unwrap();
    assert_eq!(received, b"RESET\r\n");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_non_ascii_text_when_sending_then_server_reads_question_marks() {
    // GIVEN: A connected link without terminator
    let (listener, port) = bind_server();
    let (monitor, mut events) = monitor_for(port, fast_settings());
    assert!(monitor.connect());
    assert_eq!(next_event(&mut events, WAIT).await, Some(true));
    let mut server_side = accept_within(&listener, WAIT).await.expect("accept");

    // WHEN: Sending text with non-ASCII characters
    assert!(monitor.send("héllo"));
    monitor.disconnect();

    // THEN: Each non-ASCII character became one '?'
    server_side
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    let mut received = Vec::new();
    server_side.read_to_end(&mut received).unwrap();
    assert_eq!(received, b"h?llo");
}

/// **VALUE**: Verifies that disconnect leaves the reported state to the probe.
///
/// **BUG THIS CATCHES**: Would catch send panicking on a closed socket, or
/// disconnect publishing a transition on its own.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_closed_socket_when_sending_then_fails_gracefully() {
    // GIVEN: A connected link whose socket is then closed locally
    let (listener, port) = bind_server();
    let (monitor, mut events) = monitor_for(port, fast_settings());
    assert!(monitor.connect());
    assert_eq!(next_event(&mut events, WAIT).await, Some(true));
    let _server_side = accept_within(&listener, WAIT).await.expect("accept");

    // WHEN: Disconnecting and sending
    monitor.disconnect();
    monitor.disconnect();
    let sent = monitor.send("CHECK");

    // THEN: Send fails and the state is untouched until a probe runs
    assert!(!sent);
    assert!(monitor.is_connected());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_session_clone_when_sending_from_blocking_thread_then_server_receives() {
    // GIVEN: A connected link and a session handle moved to another thread
    let (listener, port) = bind_server();
    let (monitor, mut events) = monitor_for(port, fast_settings());
    assert!(monitor.connect());
    assert_eq!(next_event(&mut events, WAIT).await, Some(true));
    let mut server_side = accept_within(&listener, WAIT).await.expect("accept");
    let session = monitor.session();

    // WHEN: Sending from a blocking task
    let sent = tokio::task::spawn_blocking(move || session.send("CHECK"))
        .await
        .unwrap();

    // THEN: The bytes arrive
    assert!(sent);
    server_side
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    let mut buf = [0u8; 5];
    server_side.read_exact(&mut buf).unwrap();
    assert_eq!(&buf, b"CHECK");
}

// ============================================================================
// Receive Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_disconnected_link_when_receiving_then_unavailable() {
    let (monitor, _events) = monitor_for(unused_port(), fast_settings());

    assert_eq!(
        monitor.session().try_receive(Duration::from_millis(10)),
        ReadOutcome::Unavailable
    );
    assert_eq!(monitor.receive(Duration::from_millis(10)), (false, String::new()));
}

/// **VALUE**: Verifies that an idle link returns quickly with no data.
///
/// **WHY THIS MATTERS**: The receive poller runs in a loop; blocking past its
/// timeout would starve the send path that shares the I/O lock.
///
/// **BUG THIS CATCHES**: Would catch the read timeout not being applied, or a
/// timeout being mistaken for a closed stream.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_idle_link_when_receiving_then_returns_empty_within_timeout() {
    // GIVEN: A connected link where the server sends nothing
    let (listener, port) = bind_server();
    let (monitor, mut events) = monitor_for(port, fast_settings());
    assert!(monitor.connect());
    assert_eq!(next_event(&mut events, WAIT).await, Some(true));
    let _server_side = accept_within(&listener, WAIT).await.expect("accept");

    // WHEN: Receiving with a short timeout
    let started = Instant::now();
    let outcome = monitor.session().try_receive(Duration::from_millis(50));

    // THEN: Empty, and well before the outer bound
    assert_eq!(outcome, ReadOutcome::Empty);
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_server_data_when_receiving_then_returns_decoded_text() {
    // GIVEN: A connected link and a server that writes one line
    let (listener, port) = bind_server();
    let (monitor, mut events) = monitor_for(port, fast_settings());
    assert!(monitor.connect());
    assert_eq!(next_event(&mut events, WAIT).await, Some(true));
    let mut server_side = accept_within(&listener, WAIT).await.expect("accept");
    server_side.write_all(b"HELLO\r\n").unwrap();
    server_side.flush().unwrap();

    // WHEN: Receiving until data shows up
    let session = monitor.session();
    let deadline = Instant::now() + WAIT;
    let mut received = (false, String::new());
    while Instant::now() < deadline {
        received = session.receive(Duration::from_millis(100));
        if received.0 {
            break;
        }
    }

    // THEN: The line arrives intact
    assert_eq!(received, (true, "HELLO\r\n".to_string()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn given_remote_close_when_receiving_then_reports_closed() {
    // GIVEN: A connected link whose server closes without sending
    let (listener, port) = bind_server();
    let (monitor, mut events) = monitor_for(port, fast_settings());
    assert!(monitor.connect());
    assert_eq!(next_event(&mut events, WAIT).await, Some(true));
    let server_side = accept_within(&listener, WAIT).await.expect("accept");
    drop(server_side);

    // WHEN: Receiving
    let outcome = monitor.session().try_receive(Duration::from_secs(1));

    // THEN: Closed, and the pair form is a plain failure
    assert_eq!(outcome, ReadOutcome::Closed);
    assert!(!outcome.is_data());
    assert_eq!(outcome.into_parts(), (false, String::new()));
}

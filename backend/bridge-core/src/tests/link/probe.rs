// Unit tests for the socket-level liveness probe

use crate::link::probe_stream;
use crate::tests::link::connected_pair;

use std::io::Write;
use std::thread::sleep;
use std::time::Duration;

#[test]
fn given_open_connection_when_probed_then_alive() {
    let (client, _server) = connected_pair();

    assert!(probe_stream(&client));
}

/// **VALUE**: Verifies that pending application data does not count as a close.
///
/// **BUG THIS CATCHES**: Would catch a probe that treats "readable" alone as dead, or
/// one that consumes the data it peeks.
#[test]
fn given_unread_data_when_probed_then_alive_and_data_kept() {
    // GIVEN: The server sent bytes the client has not read
    let (client, mut server) = connected_pair();
    server.write_all(b"OK").unwrap();
    sleep(Duration::from_millis(50));

    // WHEN: Probing
    let alive = probe_stream(&client);

    // THEN: Alive, and the bytes are still there
    assert!(alive);
    let mut buf = [0u8; 2];
    assert_eq!(client.peek(&mut buf).unwrap(), 2);
    assert_eq!(&buf, b"OK");
}

/// **VALUE**: Verifies half-open detection: readable with zero bytes means dead.
///
/// **WHY THIS MATTERS**: A peer that closed its socket leaves ours looking healthy to
/// writes for a while. The peek is the only early signal.
///
/// **BUG THIS CATCHES**: Would catch a probe relying on the zero-length write alone,
/// which succeeds on a half-closed socket.
#[test]
fn given_peer_closed_when_probed_then_dead() {
    // GIVEN: The server side closed
    let (client, server) = connected_pair();
    drop(server);
    sleep(Duration::from_millis(50));

    // WHEN/THEN: Probe reports dead
    assert!(!probe_stream(&client));
}

#[test]
fn given_probe_when_finished_then_socket_back_in_blocking_mode() {
    // GIVEN: A probed socket
    let (client, mut server) = connected_pair();
    assert!(probe_stream(&client));

    // WHEN: Reading with a timeout after the server writes
    client
        .set_read_timeout(Some(Duration::from_millis(500)))
        .unwrap();
    server.write_all(b"X").unwrap();

    // THEN: The read waits for data instead of failing with WouldBlock
    let mut buf = [0u8; 1];
    let mut reader = &client;
    assert_eq!(std::io::Read::read(&mut reader, &mut buf).unwrap(), 1);
}

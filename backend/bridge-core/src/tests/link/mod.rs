mod codec;
mod endpoint;
mod guard;
mod probe;
mod settings;
mod shared;
mod state;

use std::net::{TcpListener, TcpStream};

/// Test helper: A connected loopback pair, client first.
pub(crate) fn connected_pair() -> (TcpStream, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
    let (server, _) = listener.accept().unwrap();
    (client, server)
}

//! Synchronous send/receive against the monitor's socket.

use crate::link::codec::{decode_bytes, encode_message};
use crate::link::shared::LinkShared;

use std::io::{ErrorKind, Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, trace, warn};

/// Largest chunk returned by one receive.
pub const READ_BUFFER_SIZE: usize = 1024;

/// Socket read timeouts cannot be zero.
const MIN_READ_TIMEOUT: Duration = Duration::from_millis(1);

/// What a single receive observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Bytes arrived within the timeout.
    Data(String),
    /// Nothing arrived within the timeout.
    Empty,
    /// The peer closed the stream (zero-byte read).
    Closed,
    /// The read failed with a socket error.
    Failed,
    /// Not connected, nothing was attempted.
    Unavailable,
}

impl ReadOutcome {
    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data(_))
    }

    /// Collapse into the `(success, data)` pair.
    pub fn into_parts(self) -> (bool, String) {
        match self {
            Self::Data(data) => (true, data),
            _ => (false, String::new()),
        }
    }
}

/// Send/receive handle borrowed from a
/// [`ConnectionMonitor`](crate::link::ConnectionMonitor).
///
/// Both operations are gated on the last reported state: while it is not
/// Connected they return failure without touching the socket. They never
/// probe and never change the reported state; a broken socket shows up on
/// the next probe. The handle never closes the socket.
#[derive(Clone)]
pub struct SessionIo {
    shared: Arc<LinkShared>,
}

impl SessionIo {
    pub(crate) fn new(shared: Arc<LinkShared>) -> Self {
        Self { shared }
    }

    pub fn is_connected(&self) -> bool {
        self.shared.is_connected()
    }

    /// Write `message` plus the configured terminator.
    ///
    /// Returns `false` without I/O when not connected, and `false` on any
    /// write error.
    pub fn send(&self, message: &str) -> bool {
        let Some(stream) = self.gated_socket("Send") else {
            return false;
        };

        let payload = encode_message(message, self.shared.settings.terminator);
        let _io = self.shared.io.lock();

        let mut writer: &TcpStream = &stream;
        match writer.write_all(&payload).and_then(|()| writer.flush()) {
            Ok(()) => {
                debug!("Sent {} bytes to {}", payload.len(), self.shared.endpoint);
                true
            }
            Err(e) => {
                warn!("Send to {} failed: {e}", self.shared.endpoint);
                false
            }
        }
    }

    /// Read whatever arrives within `timeout`.
    ///
    /// `(false, "")` covers both "no data yet" and failures; use
    /// [`try_receive`](Self::try_receive) to tell them apart.
    pub fn receive(&self, timeout: Duration) -> (bool, String) {
        self.try_receive(timeout).into_parts()
    }

    /// [`receive`](Self::receive) with the configured read timeout.
    pub fn receive_default(&self) -> (bool, String) {
        self.receive(self.shared.settings.read_timeout)
    }

    pub fn try_receive(&self, timeout: Duration) -> ReadOutcome {
        let Some(stream) = self.gated_socket("Receive") else {
            return ReadOutcome::Unavailable;
        };

        let _io = self.shared.io.lock();

        if let Err(e) = stream.set_read_timeout(Some(timeout.max(MIN_READ_TIMEOUT))) {
            warn!("Cannot set read timeout on {}: {e}", self.shared.endpoint);
            return ReadOutcome::Failed;
        }

        let mut buf = [0u8; READ_BUFFER_SIZE];
        let mut reader: &TcpStream = &stream;

        match reader.read(&mut buf) {
            Ok(0) => {
                warn!("{} closed the connection mid-read", self.shared.endpoint);
                ReadOutcome::Closed
            }
            Ok(n) => {
                trace!("Received {n} bytes from {}", self.shared.endpoint);
                ReadOutcome::Data(decode_bytes(&buf[..n]))
            }
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                ) =>
            {
                ReadOutcome::Empty
            }
            Err(e) => {
                warn!("Receive from {} failed: {e}", self.shared.endpoint);
                ReadOutcome::Failed
            }
        }
    }

    fn gated_socket(&self, operation: &str) -> Option<Arc<TcpStream>> {
        if !self.shared.is_connected() {
            debug!("{operation} skipped: {} not connected", self.shared.endpoint);
            return None;
        }

        let stream = self.shared.socket();
        if stream.is_none() {
            debug!("{operation} skipped: socket to {} closed", self.shared.endpoint);
        }
        stream
    }
}

impl std::fmt::Debug for SessionIo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionIo")
            .field("endpoint", &self.shared.endpoint.address())
            .field("connected", &self.is_connected())
            .finish()
    }
}

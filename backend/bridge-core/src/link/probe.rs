//! Non-consuming liveness probe.
//!
//! The probe never reads application data: it peeks one byte in
//! non-blocking mode to spot a remote close, then issues a zero-length
//! write. Any socket error counts as dead.

use crate::link::shared::LinkShared;

use std::io::{ErrorKind, Write};
use std::net::TcpStream;
use std::sync::Arc;

use log::{debug, trace, warn};

impl LinkShared {
    /// Probe the current socket from the runtime's blocking pool.
    pub(crate) async fn probe(self: &Arc<Self>) -> bool {
        let shared = Arc::clone(self);

        match tokio::task::spawn_blocking(move || shared.probe_blocking()).await {
            Ok(alive) => alive,
            Err(e) => {
                warn!("Liveness probe task failed: {e}");
                false
            }
        }
    }

    pub(crate) fn probe_blocking(&self) -> bool {
        let Some(stream) = self.socket() else {
            trace!("No socket to {}", self.endpoint);
            return false;
        };

        // An application write holding the socket past the timeout counts
        // as a probe that did not complete.
        let Some(_io) = self.io.try_lock_for(self.settings.probe_timeout) else {
            debug!(
                "Probe of {} timed out after {:?}",
                self.endpoint, self.settings.probe_timeout
            );
            return false;
        };

        probe_stream(&stream)
    }
}

/// Probe a connected stream. Callers must hold the I/O lock.
pub(crate) fn probe_stream(stream: &TcpStream) -> bool {
    match stream.take_error() {
        Ok(None) => {}
        Ok(Some(e)) => {
            debug!("Pending socket error: {e}");
            return false;
        }
        Err(e) => {
            debug!("Cannot read socket error state: {e}");
            return false;
        }
    }

    match remote_closed(stream) {
        Ok(false) => {}
        Ok(true) => {
            debug!("Remote end closed the connection");
            return false;
        }
        Err(e) => {
            debug!("Readability check failed: {e}");
            return false;
        }
    }

    let mut writer = stream;
    match writer.write(&[]) {
        Ok(_) => true,
        Err(e) => {
            debug!("Zero-length write probe failed: {e}");
            false
        }
    }
}

/// Readable with zero bytes available means the peer sent FIN.
fn remote_closed(stream: &TcpStream) -> std::io::Result<bool> {
    stream.set_nonblocking(true)?;

    let mut buf = [0u8; 1];
    let result = match stream.peek(&mut buf) {
        Ok(0) => Ok(true),
        Ok(_) => Ok(false),
        Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(false),
        Err(e) => Err(e),
    };

    stream.set_nonblocking(false)?;
    result
}

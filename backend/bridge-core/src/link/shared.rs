//! State shared by the monitor handle, its background loop and session I/O.

use crate::link::endpoint::Endpoint;
use crate::link::guard::ReconnectFlag;
use crate::link::notify::StateEvent;
use crate::link::settings::MonitorSettings;
use crate::link::state::{ConnectionState, StateTracker};

use std::io;
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use log::{debug, info, trace};
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};

/// Result of one reconnect cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReconnectOutcome {
    /// A fresh connection was installed and reported.
    Connected,
    /// The connect attempt failed; the monitor will retry.
    Failed,
    /// Another reconnect was already running, nothing was done.
    AlreadyPending,
    /// Monitoring stopped while connecting; the new socket was discarded.
    Superseded,
}

pub(crate) struct LinkShared {
    pub(crate) endpoint: Endpoint,
    pub(crate) settings: MonitorSettings,
    /// Current socket. Locked only to swap or clone the handle, never
    /// across I/O.
    slot: Mutex<Option<Arc<TcpStream>>>,
    /// Serializes the liveness probe with session reads and writes.
    pub(crate) io: Mutex<()>,
    tracker: Mutex<StateTracker>,
    pub(crate) reconnect: ReconnectFlag,
    pub(crate) monitoring: AtomicBool,
    pub(crate) suspended: AtomicBool,
    /// Bumped by every stop; stale work compares against it.
    pub(crate) epoch: watch::Sender<u64>,
    events: mpsc::UnboundedSender<StateEvent>,
}

impl LinkShared {
    pub(crate) fn new(
        endpoint: Endpoint,
        settings: MonitorSettings,
        epoch: watch::Sender<u64>,
        events: mpsc::UnboundedSender<StateEvent>,
    ) -> Self {
        Self {
            endpoint,
            settings,
            slot: Mutex::new(None),
            io: Mutex::new(()),
            tracker: Mutex::new(StateTracker::default()),
            reconnect: ReconnectFlag::default(),
            monitoring: AtomicBool::new(false),
            suspended: AtomicBool::new(false),
            epoch,
            events,
        }
    }

    pub(crate) fn current_epoch(&self) -> u64 {
        *self.epoch.borrow()
    }

    /// Borrow the current socket for the duration of one operation.
    pub(crate) fn socket(&self) -> Option<Arc<TcpStream>> {
        self.slot.lock().clone()
    }

    /// Install `stream` unless `epoch` was stopped, checked under the slot
    /// lock. A stale stream is shut down and `false` returned.
    pub(crate) fn install_if_current(&self, stream: TcpStream, epoch: u64) -> bool {
        let previous = {
            let mut slot = self.slot.lock();
            if epoch != self.current_epoch() {
                drop(slot);
                shutdown_quietly(&stream);
                return false;
            }
            slot.replace(Arc::new(stream))
        };

        if let Some(previous) = previous {
            shutdown_quietly(&previous);
        }
        true
    }

    /// Close the socket if there is one. Never fails.
    pub(crate) fn close_socket(&self) {
        let taken = self.slot.lock().take();
        if let Some(stream) = taken {
            shutdown_quietly(&stream);
            debug!("Closed socket to {}", self.endpoint);
        }
    }

    pub(crate) fn state(&self) -> ConnectionState {
        ConnectionState::from(self.is_connected())
    }

    /// `true` only when the last report was Connected.
    pub(crate) fn is_connected(&self) -> bool {
        self.tracker.lock().current() == Some(true)
    }

    pub(crate) fn forget_state(&self) {
        self.tracker.lock().reset();
    }

    /// Record a liveness result observed during `epoch`.
    ///
    /// Results from a stopped epoch are dropped. Changes are queued for the
    /// dispatcher while the tracker lock is held so ordering is preserved;
    /// subscribers run later on the dispatcher task.
    pub(crate) fn publish(&self, alive: bool, epoch: u64) {
        let mut tracker = self.tracker.lock();

        if epoch != self.current_epoch() {
            trace!("Ignoring liveness result from stopped session");
            return;
        }

        if let Some(connected) = tracker.observe(alive) {
            if self.events.send(StateEvent { connected, epoch }).is_err() {
                debug!(
                    "State dispatcher gone, {} not delivered",
                    ConnectionState::from(connected)
                );
            }
        }
    }

    /// One guarded reconnect cycle on behalf of `epoch`.
    pub(crate) async fn reconnect_cycle(&self, epoch: u64) -> ReconnectOutcome {
        let Some(_guard) = self.reconnect.try_begin() else {
            debug!("Reconnect to {} already pending", self.endpoint);
            return ReconnectOutcome::AlreadyPending;
        };

        self.close_socket();

        let address = self.endpoint.address();
        debug!("Reconnecting to {address}");

        match open_stream(&address).await {
            Ok(stream) => {
                if !self.install_if_current(stream, epoch) {
                    debug!("Discarding connection to {address} opened after stop");
                    return ReconnectOutcome::Superseded;
                }

                info!("Reconnected to {}", self.endpoint);
                self.publish(true, epoch);
                ReconnectOutcome::Connected
            }
            Err(e) => {
                debug!("Reconnect to {address} failed: {e}");
                let mut stop = self.epoch.subscribe();
                wait_unless_stopped(&mut stop, epoch, self.settings.reconnect_retry_delay).await;
                ReconnectOutcome::Failed
            }
        }
    }
}

/// Connect without a timeout beyond the OS default and hand back a
/// blocking std socket.
async fn open_stream(address: &str) -> io::Result<TcpStream> {
    let stream = tokio::net::TcpStream::connect(address).await?.into_std()?;
    stream.set_nonblocking(false)?;
    Ok(stream)
}

pub(crate) fn shutdown_quietly(stream: &TcpStream) {
    if let Err(e) = stream.shutdown(Shutdown::Both) {
        trace!("Socket already closed: {e}");
    }
}

/// Sleep for `delay` unless `epoch` gets stopped first.
///
/// Returns `true` if the session is still current afterwards.
pub(crate) async fn wait_unless_stopped(
    stop: &mut watch::Receiver<u64>,
    epoch: u64,
    delay: Duration,
) -> bool {
    if *stop.borrow() != epoch {
        return false;
    }

    tokio::select! {
        _ = tokio::time::sleep(delay) => {}
        changed = stop.changed() => {
            if changed.is_err() {
                return false;
            }
        }
    }

    *stop.borrow() == epoch
}

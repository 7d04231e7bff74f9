//! Connection monitor: socket ownership, liveness loop and reconnects.

use crate::error::link::LinkError;
use crate::link::endpoint::Endpoint;
use crate::link::notify::{SinkList, StateSink, dispatch_events};
use crate::link::session::SessionIo;
use crate::link::settings::MonitorSettings;
use crate::link::shared::{LinkShared, ReconnectOutcome, wait_unless_stopped};
use crate::link::state::ConnectionState;

use common::ErrorLocation;

use std::net::TcpStream;
use std::panic::Location;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use log::{debug, info, trace, warn};
use parking_lot::RwLock;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};

/// Keeps a TCP connection to one endpoint alive and reports its state.
///
/// The monitor owns the socket. A background task probes it every
/// [`probe_interval`](MonitorSettings::probe_interval), reconnects when it
/// is dead and publishes each Connected/Disconnected transition to the
/// registered [`StateSink`]s. Socket faults never escape: they become
/// state transitions or `false` results.
///
/// Send and receive go through [`SessionIo`], which is gated on the last
/// reported state and never probes on its own.
///
/// # Example
///
/// ```no_run
/// use bridge_core::link::{ChannelSink, ConnectionMonitor, Endpoint, MonitorSettings};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let endpoint = Endpoint::new("127.0.0.1", 6677)?;
///     let (sink, mut states) = ChannelSink::channel();
///     let monitor = ConnectionMonitor::new(endpoint, MonitorSettings::default(), sink)?;
///
///     monitor.start_monitoring();
///     while let Some(connected) = states.recv().await {
///         println!("connected: {connected}");
///     }
///     Ok(())
/// }
/// ```
pub struct ConnectionMonitor {
    shared: Arc<LinkShared>,
    sinks: SinkList,
    runtime: Handle,
}

impl ConnectionMonitor {
    /// Build a monitor on the ambient tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Runtime`] outside a tokio runtime and
    /// [`LinkError::Settings`] for invalid settings.
    #[track_caller]
    pub fn new(
        endpoint: Endpoint,
        settings: MonitorSettings,
        sink: impl StateSink,
    ) -> Result<Self, LinkError> {
        let runtime = Handle::try_current().map_err(|e| LinkError::Runtime {
            message: format!("No tokio runtime available: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Self::with_runtime(endpoint, settings, sink, runtime)
    }

    /// Build a monitor whose background tasks run on `runtime`.
    ///
    /// Use this when the caller lives on a plain thread (a UI loop, stdin
    /// reader) and owns the runtime elsewhere.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Settings`] for invalid settings.
    #[track_caller]
    pub fn with_runtime(
        endpoint: Endpoint,
        settings: MonitorSettings,
        sink: impl StateSink,
        runtime: Handle,
    ) -> Result<Self, LinkError> {
        settings.validate()?;

        let (epoch_tx, epoch_rx) = watch::channel(0u64);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let sink: Arc<dyn StateSink> = Arc::new(sink);
        let sinks: SinkList = Arc::new(RwLock::new(vec![sink]));

        runtime.spawn(dispatch_events(events_rx, Arc::clone(&sinks), epoch_rx));

        debug!("Connection monitor created for {endpoint}");

        Ok(Self {
            shared: Arc::new(LinkShared::new(endpoint, settings, epoch_tx, events_tx)),
            sinks,
            runtime,
        })
    }

    /// Register an additional state sink.
    pub fn subscribe(&self, sink: impl StateSink) {
        self.sinks.write().push(Arc::new(sink));
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.shared.endpoint
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.shared.settings
    }

    /// Last reported state. Unknown counts as Disconnected.
    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    pub fn is_connected(&self) -> bool {
        self.shared.is_connected()
    }

    pub fn is_monitoring(&self) -> bool {
        self.shared.monitoring.load(Ordering::Acquire)
    }

    pub fn is_reconnect_pending(&self) -> bool {
        self.shared.reconnect.is_pending()
    }

    /// Start the background liveness loop with the configured timings.
    /// No-op if already running.
    pub fn start_monitoring(&self) {
        self.start_monitoring_with(
            self.shared.settings.probe_interval,
            self.shared.settings.reconnect_backoff,
        );
    }

    /// Start the loop with timings for this session only.
    ///
    /// A zero duration falls back to the configured value.
    pub fn start_monitoring_with(&self, probe_interval: Duration, reconnect_backoff: Duration) {
        if self.shared.monitoring.swap(true, Ordering::AcqRel) {
            debug!("Monitoring of {} already running", self.shared.endpoint);
            return;
        }

        let timings = LoopTimings {
            probe_interval: nonzero_or(probe_interval, self.shared.settings.probe_interval),
            reconnect_backoff: nonzero_or(
                reconnect_backoff,
                self.shared.settings.reconnect_backoff,
            ),
        };

        let epoch = self.shared.current_epoch();
        self.runtime
            .spawn(run_probe_loop(Arc::clone(&self.shared), epoch, timings));
    }

    /// Stop the loop, close the socket and forget the reported state.
    ///
    /// Idempotent, and also closes a socket opened by [`connect`](Self::connect)
    /// without monitoring. Returns immediately: the loop exits at its next
    /// checkpoint and an in-flight connect is left to finish, its result
    /// discarded. No state change is delivered after this returns.
    pub fn stop_monitoring(&self) {
        let was_running = self.shared.monitoring.swap(false, Ordering::AcqRel);

        // Epoch before the slot: a racing reconnect checks it under the slot lock
        self.shared.epoch.send_modify(|epoch| *epoch += 1);
        self.shared.forget_state();
        self.shared.close_socket();

        if was_running {
            info!("Monitoring of {} stopped", self.shared.endpoint);
        }
    }

    /// Pause probing, e.g. while the host window is being dragged.
    pub fn suspend_probing(&self) {
        if !self.shared.suspended.swap(true, Ordering::AcqRel) {
            debug!("Probing of {} suspended", self.shared.endpoint);
        }
    }

    pub fn resume_probing(&self) {
        if self.shared.suspended.swap(false, Ordering::AcqRel) {
            debug!("Probing of {} resumed", self.shared.endpoint);
        }
    }

    pub fn is_probing_suspended(&self) -> bool {
        self.shared.suspended.load(Ordering::Acquire)
    }

    /// One synchronous connection attempt for initial bring-up.
    ///
    /// Blocks for at most the OS connect timeout and reports the result.
    /// If a reconnect is already pending this does nothing and returns the
    /// current state.
    pub fn connect(&self) -> bool {
        let Some(_guard) = self.shared.reconnect.try_begin() else {
            debug!("Connect skipped, reconnect to {} pending", self.shared.endpoint);
            return self.is_connected();
        };

        let epoch = self.shared.current_epoch();

        match TcpStream::connect(self.shared.endpoint.address()) {
            Ok(stream) => {
                if !self.shared.install_if_current(stream, epoch) {
                    debug!("Connect to {} superseded by stop", self.shared.endpoint);
                    return false;
                }
                info!("Connected to {}", self.shared.endpoint);
                self.shared.publish(true, epoch);
                true
            }
            Err(e) => {
                warn!("Connect to {} failed: {e}", self.shared.endpoint);
                self.shared.publish(false, epoch);
                false
            }
        }
    }

    /// Close the socket. Safe to call when already closed.
    ///
    /// The reported state is left to the next probe.
    pub fn disconnect(&self) {
        self.shared.close_socket();
    }

    /// Run one reconnect cycle now, unless one is already pending.
    pub async fn reconnect(&self) -> ReconnectOutcome {
        let epoch = self.shared.current_epoch();
        self.shared.reconnect_cycle(epoch).await
    }

    /// Session handle for send/receive, cheap to clone across threads.
    pub fn session(&self) -> SessionIo {
        SessionIo::new(Arc::clone(&self.shared))
    }

    /// Shorthand for [`SessionIo::send`].
    pub fn send(&self, message: &str) -> bool {
        self.session().send(message)
    }

    /// Shorthand for [`SessionIo::receive`].
    pub fn receive(&self, timeout: Duration) -> (bool, String) {
        self.session().receive(timeout)
    }
}

impl Drop for ConnectionMonitor {
    fn drop(&mut self) {
        self.stop_monitoring();
    }
}

impl std::fmt::Debug for ConnectionMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionMonitor")
            .field("endpoint", &self.shared.endpoint.address())
            .field("state", &self.state())
            .field("monitoring", &self.is_monitoring())
            .finish()
    }
}

#[derive(Clone, Copy, Debug)]
struct LoopTimings {
    probe_interval: Duration,
    reconnect_backoff: Duration,
}

fn nonzero_or(requested: Duration, fallback: Duration) -> Duration {
    if requested.is_zero() {
        warn!("Zero monitoring interval requested, using {fallback:?}");
        fallback
    } else {
        requested
    }
}

/// Liveness loop for one monitoring session.
///
/// Every iteration: probe, report, and on failure back off then try one
/// reconnect. Exits once `epoch` is stopped.
async fn run_probe_loop(shared: Arc<LinkShared>, epoch: u64, timings: LoopTimings) {
    let mut stop = shared.epoch.subscribe();
    let suspend_poll = shared.settings.suspend_poll;

    info!(
        "Monitoring {} every {:?}",
        shared.endpoint, timings.probe_interval
    );

    loop {
        if shared.suspended.load(Ordering::Acquire) {
            trace!("Probing suspended");
            if !wait_unless_stopped(&mut stop, epoch, suspend_poll).await {
                break;
            }
            continue;
        }

        let alive = shared.probe().await;
        trace!("Probe of {}: alive={alive}", shared.endpoint);
        shared.publish(alive, epoch);

        if !alive {
            if !wait_unless_stopped(&mut stop, epoch, timings.reconnect_backoff).await {
                break;
            }

            let outcome = shared.reconnect_cycle(epoch).await;
            trace!("Reconnect cycle for {}: {outcome:?}", shared.endpoint);
        }

        if !wait_unless_stopped(&mut stop, epoch, timings.probe_interval).await {
            break;
        }
    }

    debug!("Probe loop for {} exited", shared.endpoint);
}

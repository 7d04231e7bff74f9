//! State-change notification plumbing.
//!
//! The monitor never calls subscribers itself. Observed transitions are
//! queued as [`StateEvent`]s and a dispatcher task hands them to every
//! registered [`StateSink`], outside of any monitor lock. Marshaling onto a
//! UI thread is up to the sink.

use crate::link::state::ConnectionState;

use std::sync::Arc;

use log::{debug, info, trace};
use parking_lot::RwLock;
use tokio::sync::{mpsc, watch};

/// Receiver of connection state transitions.
pub trait StateSink: Send + Sync + 'static {
    fn on_state_changed(&self, connected: bool);
}

impl<F> StateSink for F
where
    F: Fn(bool) + Send + Sync + 'static,
{
    fn on_state_changed(&self, connected: bool) {
        (self)(connected)
    }
}

/// Sink forwarding transitions into a tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<bool>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<bool>) -> Self {
        Self { tx }
    }

    /// Create a sink together with the receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<bool>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl StateSink for ChannelSink {
    fn on_state_changed(&self, connected: bool) {
        if self.tx.send(connected).is_err() {
            trace!("State receiver dropped, discarding transition");
        }
    }
}

pub(crate) type SinkList = Arc<RwLock<Vec<Arc<dyn StateSink>>>>;

/// A transition tagged with the monitoring epoch it was observed in.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StateEvent {
    pub(crate) connected: bool,
    pub(crate) epoch: u64,
}

/// Dispatcher task.
///
/// Delivers events in order until the monitor drops its sender. Events
/// from an epoch that has since been stopped are discarded.
pub(crate) async fn dispatch_events(
    mut events: mpsc::UnboundedReceiver<StateEvent>,
    sinks: SinkList,
    epoch: watch::Receiver<u64>,
) {
    while let Some(event) = events.recv().await {
        if event.epoch != *epoch.borrow() {
            debug!(
                "Dropping {} transition from stopped session",
                ConnectionState::from(event.connected)
            );
            continue;
        }

        info!(
            "Connection state changed: {}",
            ConnectionState::from(event.connected)
        );

        let targets: Vec<Arc<dyn StateSink>> = sinks.read().clone();
        for sink in targets {
            // Stop may land while an earlier sink runs
            if event.epoch != *epoch.borrow() {
                debug!("Monitoring stopped mid-delivery, skipping remaining sinks");
                break;
            }
            sink.on_state_changed(event.connected);
        }
    }

    debug!("State dispatcher stopped");
}

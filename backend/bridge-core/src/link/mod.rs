//! Resilient TCP link to a single server.
//!
//! This module keeps one client connection alive and exposes:
//!
//! - [`ConnectionMonitor`]: owns the socket, probes liveness in the
//!   background, reconnects and publishes Connected/Disconnected transitions
//! - [`SessionIo`]: synchronous send/receive gated on the last reported state
//! - [`StateSink`]: subscriber interface, implemented for closures and
//!   [`ChannelSink`]
//!
//! # Liveness
//!
//! The probe is non-consuming: a non-blocking one-byte peek detects a peer
//! that already sent FIN (readable with zero bytes), then a zero-length write
//! catches resets. Any socket fault means Disconnected. Only transitions are
//! published; repeated identical results are suppressed.
//!
//! # Threading
//!
//! The probe loop and the notification dispatcher run as tokio tasks.
//! Send/receive run on the caller's thread and share one I/O lock with the
//! probe, so probe writes never interleave with application writes.
//!
//! # Wire format
//!
//! Raw ASCII bytes plus an optional [`LineTerminator`]. No framing.

mod codec;
mod endpoint;
mod guard;
mod monitor;
mod notify;
mod probe;
mod session;
mod settings;
mod shared;
mod state;

pub use codec::{LineTerminator, decode_bytes, encode_message};
pub use endpoint::Endpoint;
pub use monitor::ConnectionMonitor;
pub use notify::{ChannelSink, StateSink};
pub use session::{READ_BUFFER_SIZE, ReadOutcome, SessionIo};
pub use settings::{
    DEFAULT_PROBE_INTERVAL, DEFAULT_PROBE_TIMEOUT, DEFAULT_READ_TIMEOUT,
    DEFAULT_RECONNECT_BACKOFF, DEFAULT_RECONNECT_RETRY_DELAY, DEFAULT_SUSPEND_POLL,
    MonitorSettings,
};
pub use shared::ReconnectOutcome;
pub use state::ConnectionState;

#[cfg(test)]
pub(crate) use guard::ReconnectFlag;
#[cfg(test)]
pub(crate) use notify::StateEvent;
#[cfg(test)]
pub(crate) use probe::probe_stream;
#[cfg(test)]
pub(crate) use shared::LinkShared;
#[cfg(test)]
pub(crate) use state::StateTracker;

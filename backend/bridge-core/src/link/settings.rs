//! Timing and framing options for a connection monitor.

use crate::error::link::LinkError;
use crate::link::codec::LineTerminator;

use common::ErrorLocation;

use std::panic::Location;
use std::time::Duration;

pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_millis(1000);
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(300);
pub const DEFAULT_RECONNECT_BACKOFF: Duration = Duration::from_millis(2000);
pub const DEFAULT_RECONNECT_RETRY_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);
pub const DEFAULT_SUSPEND_POLL: Duration = Duration::from_millis(2000);

/// Behavioral configuration of a [`ConnectionMonitor`](crate::link::ConnectionMonitor).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonitorSettings {
    /// Delay between two liveness probes.
    pub probe_interval: Duration,
    /// Upper bound for the zero-length write probe.
    pub probe_timeout: Duration,
    /// Wait between a failed probe and the reconnect attempt.
    pub reconnect_backoff: Duration,
    /// Wait after a failed reconnect attempt.
    pub reconnect_retry_delay: Duration,
    /// Default bound for [`SessionIo::receive`](crate::link::SessionIo::receive).
    pub read_timeout: Duration,
    /// Re-check interval while probing is suspended.
    pub suspend_poll: Duration,
    /// Suffix appended to every sent message.
    pub terminator: LineTerminator,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            probe_interval: DEFAULT_PROBE_INTERVAL,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            reconnect_backoff: DEFAULT_RECONNECT_BACKOFF,
            reconnect_retry_delay: DEFAULT_RECONNECT_RETRY_DELAY,
            read_timeout: DEFAULT_READ_TIMEOUT,
            suspend_poll: DEFAULT_SUSPEND_POLL,
            terminator: LineTerminator::default(),
        }
    }
}

impl MonitorSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn probe_interval(mut self, interval: Duration) -> Self {
        self.probe_interval = interval;
        self
    }

    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn reconnect_backoff(mut self, backoff: Duration) -> Self {
        self.reconnect_backoff = backoff;
        self
    }

    pub fn reconnect_retry_delay(mut self, delay: Duration) -> Self {
        self.reconnect_retry_delay = delay;
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn suspend_poll(mut self, poll: Duration) -> Self {
        self.suspend_poll = poll;
        self
    }

    pub fn terminator(mut self, terminator: LineTerminator) -> Self {
        self.terminator = terminator;
        self
    }

    /// Reject zero durations.
    ///
    /// Socket timeouts cannot be zero and a zero interval would turn the
    /// probe loop into a busy loop.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Settings`] naming the first zero field.
    #[track_caller]
    pub fn validate(&self) -> Result<(), LinkError> {
        let fields = [
            ("probe_interval", self.probe_interval),
            ("probe_timeout", self.probe_timeout),
            ("reconnect_backoff", self.reconnect_backoff),
            ("reconnect_retry_delay", self.reconnect_retry_delay),
            ("read_timeout", self.read_timeout),
            ("suspend_poll", self.suspend_poll),
        ];

        if let Some((name, _)) = fields.iter().find(|(_, value)| value.is_zero()) {
            return Err(LinkError::Settings {
                message: format!("{name} must be greater than zero"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(())
    }
}

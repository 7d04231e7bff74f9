//! Connection state and the edge-triggered tracker behind notifications.

use std::fmt::{Display, Formatter, Result as FormatResult};

/// Last known liveness of the link.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Disconnected,
}

impl ConnectionState {
    pub fn is_connected(self) -> bool {
        self == Self::Connected
    }
}

impl From<bool> for ConnectionState {
    fn from(connected: bool) -> Self {
        if connected {
            Self::Connected
        } else {
            Self::Disconnected
        }
    }
}

impl Display for ConnectionState {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        match self {
            Self::Connected => write!(formatter, "Connected"),
            Self::Disconnected => write!(formatter, "Disconnected"),
        }
    }
}

/// Remembers the last reported liveness and suppresses repeats.
///
/// Starts out unknown, so the very first observation is always reported.
#[derive(Debug, Default)]
pub(crate) struct StateTracker {
    last_reported: Option<bool>,
}

impl StateTracker {
    /// Record a probe result. Returns the value to publish, if it changed.
    pub(crate) fn observe(&mut self, alive: bool) -> Option<bool> {
        if self.last_reported == Some(alive) {
            return None;
        }
        self.last_reported = Some(alive);
        Some(alive)
    }

    /// Last reported value, `None` while unknown.
    pub(crate) fn current(&self) -> Option<bool> {
        self.last_reported
    }

    /// Forget the last value without reporting anything.
    pub(crate) fn reset(&mut self) {
        self.last_reported = None;
    }
}

//! Server endpoint a monitor is bound to.

use crate::error::link::LinkError;

use common::ErrorLocation;

use std::fmt::{Display, Formatter, Result as FormatResult};
use std::panic::Location;

/// Host and port of the remote server.
///
/// Immutable once built: pointing a monitor at another server means
/// constructing a new monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    /// Build an endpoint, rejecting an empty host or port 0.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Endpoint`] if the host is blank or the port is 0.
    #[track_caller]
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self, LinkError> {
        let host = host.into().trim().to_string();

        if host.is_empty() {
            return Err(LinkError::Endpoint {
                message: "Host cannot be empty".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if port == 0 {
            return Err(LinkError::Endpoint {
                message: format!("Invalid port 0 for host {host} (expected 1-65535)"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(Self { host, port })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Address string suitable for `connect`.
    ///
    /// IPv6 literals are bracketed.
    pub fn address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        write!(formatter, "{}", self.address())
    }
}

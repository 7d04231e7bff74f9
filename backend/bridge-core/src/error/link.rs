use common::ErrorLocation;

use thiserror::Error as ThisError;

/// Errors raised while building a connection monitor.
///
/// Socket faults never surface here; they become state transitions or
/// boolean failures on the I/O path.
#[derive(Debug, ThisError)]
pub enum LinkError {
    #[error("Endpoint Error: {message} {location}")]
    Endpoint {
        message: String,
        location: ErrorLocation,
    },

    #[error("Settings Error: {message} {location}")]
    Settings {
        message: String,
        location: ErrorLocation,
    },

    #[error("Runtime Error: {message} {location}")]
    Runtime {
        message: String,
        location: ErrorLocation,
    },
}

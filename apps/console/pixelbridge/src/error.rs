use bridge_core::error::CoreError;

use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error;

/// Errors that stop the console front end from starting.
///
/// Runtime link faults never end up here; the monitor turns them into
/// state changes.
#[derive(Debug, Error)]
pub enum PixelBridgeError {
    /// Error from this App
    #[error("PixelBridge Error: {message} {location}")]
    PixelBridge {
        message: String,
        location: ErrorLocation,
    },

    /// Error from bridge-core (config, endpoint, monitor construction)
    #[error("Core Error: {message} {location}")]
    Core {
        message: String,
        location: ErrorLocation,
    },

    /// Console input or output failed
    #[error("Console Error: {message} {location}")]
    Console {
        message: String,
        location: ErrorLocation,
    },
}

impl From<CoreError> for PixelBridgeError {
    #[track_caller]
    fn from(error: CoreError) -> Self {
        Self::Core {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum InputError {
    #[error("Input Rejected Error: {message} {location}")]
    Rejected {
        message: String,
        location: ErrorLocation,
    },
}

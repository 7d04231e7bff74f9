//! Turning user input into outgoing messages.

use crate::config::{InputConfig, SendMode};
use crate::error::input::InputError;

use common::ErrorLocation;

use std::panic::Location;

use log::debug;

/// Decide what to send for one Enter press.
///
/// In [`SendMode::FixedString`] the typed text is ignored. In
/// [`SendMode::TextInput`] empty text sends nothing, and non-empty text
/// must pass the configured substring and length rules.
///
/// # Errors
///
/// Returns [`InputError::Rejected`] when typed text breaks a rule.
#[track_caller]
pub fn prepare_outgoing(config: &InputConfig, typed: &str) -> Result<Option<String>, InputError> {
    if config.send_mode == SendMode::FixedString {
        return Ok(Some(config.fixed_string.clone()));
    }

    if typed.is_empty() {
        return Ok(None);
    }

    if let Some(required) = config.required_substring.as_deref()
        && !required.is_empty()
        && !typed.contains(required)
    {
        debug!("Input rejected: missing '{required}'");
        return Err(InputError::Rejected {
            message: format!("Input must contain '{required}'"),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    if let Some(length) = config.required_length
        && length > 0
        && typed.chars().count() != length
    {
        debug!("Input rejected: expected {length} characters");
        return Err(InputError::Rejected {
            message: format!(
                "Input must be {length} characters long, got {}",
                typed.chars().count()
            ),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    Ok(Some(typed.to_string()))
}

/// Message sent by the reset command, if enabled.
pub fn reset_message(config: &InputConfig) -> Option<String> {
    (config.reset_enabled && !config.reset_string.is_empty()).then(|| config.reset_string.clone())
}

/// Message sent by the quick-send key, if enabled.
pub fn space_message(config: &InputConfig) -> Option<String> {
    (config.space_enabled && !config.space_string.is_empty()).then(|| config.space_string.clone())
}

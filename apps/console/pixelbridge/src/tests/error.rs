// Unit tests for error module

use crate::error::PixelBridgeError;

use bridge_core::error::{CoreError, LinkError};

use common::ErrorLocation;

use std::panic::Location;

/// **VALUE**: Verifies that core errors keep their message when wrapped.
///
/// **WHY THIS MATTERS**: Startup failures are printed once and the process exits;
/// losing the core message leaves the user with no idea what to fix.
///
/// **BUG THIS CATCHES**: Would catch the `From<CoreError>` impl dropping the
/// inner message or mapping to the wrong variant.
#[test]
fn given_core_error_when_converted_then_keeps_message() {
    // GIVEN: An endpoint error from bridge-core
    let core = CoreError::from(LinkError::Endpoint {
        message: String::from("Port must be non-zero"),
        location: ErrorLocation::from(Location::caller()),
    });

    // WHEN: Converting to the app error
    let err = PixelBridgeError::from(core);

    // THEN: Core variant with the original text
    assert!(matches!(err, PixelBridgeError::Core { .. }));
    assert!(
        err.to_string().contains("Port must be non-zero"),
        "Message should survive conversion"
    );
}

#[test]
fn given_app_error_when_displayed_then_includes_location() {
    let err = PixelBridgeError::Console {
        message: String::from("stdin closed"),
        location: ErrorLocation::from(Location::caller()),
    };

    let text = err.to_string();

    assert!(text.starts_with("Console Error: stdin closed"));
    assert!(text.contains(file!()), "Display should carry the call site");
}

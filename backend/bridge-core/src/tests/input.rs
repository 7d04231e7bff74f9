// Unit tests for input rules

use crate::config::{InputConfig, SendMode};
use crate::error::InputError;
use crate::input::{prepare_outgoing, reset_message, space_message};

#[test]
fn given_text_mode_when_typed_text_then_sends_it() {
    let config = InputConfig::default();

    let outgoing = prepare_outgoing(&config, "A2-0001").unwrap();

    assert_eq!(outgoing.as_deref(), Some("A2-0001"));
}

#[test]
fn given_text_mode_when_empty_then_sends_nothing() {
    let config = InputConfig::default();

    assert_eq!(prepare_outgoing(&config, "").unwrap(), None);
}

/// **VALUE**: Verifies that fixed-string mode ignores what was typed.
///
/// **BUG THIS CATCHES**: Would catch the typed text leaking through when the station
/// is configured to always send the same trigger.
#[test]
fn given_fixed_mode_when_anything_typed_then_sends_fixed_string() {
    let config = InputConfig {
        send_mode: SendMode::FixedString,
        ..InputConfig::default()
    };

    assert_eq!(prepare_outgoing(&config, "ignored").unwrap().as_deref(), Some("CHECK"));
    assert_eq!(prepare_outgoing(&config, "").unwrap().as_deref(), Some("CHECK"));
}

/// **VALUE**: Verifies substring and length rules reject bad scans.
///
/// **WHY THIS MATTERS**: A mis-scanned barcode sent to the server can trigger the
/// wrong downstream action.
#[test]
fn given_rules_when_input_breaks_them_then_rejected() {
    // GIVEN: Rules requiring "A2" and 13 characters
    let config = InputConfig {
        required_substring: Some("A2".to_string()),
        required_length: Some(13),
        ..InputConfig::default()
    };

    // WHEN/THEN: Missing substring
    assert!(matches!(
        prepare_outgoing(&config, "XX00000000000"),
        Err(InputError::Rejected { .. })
    ));

    // WHEN/THEN: Wrong length
    assert!(matches!(
        prepare_outgoing(&config, "A2000"),
        Err(InputError::Rejected { .. })
    ));

    // WHEN/THEN: Both satisfied
    assert_eq!(
        prepare_outgoing(&config, "A200000000000").unwrap().as_deref(),
        Some("A200000000000")
    );
}

#[test]
fn given_empty_or_zero_rules_when_checked_then_ignored() {
    let config = InputConfig {
        required_substring: Some(String::new()),
        required_length: Some(0),
        ..InputConfig::default()
    };

    assert!(prepare_outgoing(&config, "anything").is_ok());
}

#[test]
fn given_reset_config_when_asked_then_returns_reset_string_if_enabled() {
    let mut config = InputConfig::default();
    assert_eq!(reset_message(&config).as_deref(), Some("RESET"));

    config.reset_enabled = false;
    assert_eq!(reset_message(&config), None);

    config.reset_enabled = true;
    config.reset_string.clear();
    assert_eq!(reset_message(&config), None);
}

/// **VALUE**: Verifies the quick-send string is opt-in.
///
/// **BUG THIS CATCHES**: Would catch a default config sending an empty or
/// unexpected string when the quick-send key is pressed.
#[test]
fn given_space_config_when_asked_then_sends_only_when_enabled_and_set() {
    // GIVEN: Default input config
    let mut config = InputConfig::default();

    // THEN: Disabled out of the box
    assert_eq!(space_message(&config), None);

    // WHEN: Enabled without a string
    config.space_enabled = true;
    assert_eq!(space_message(&config), None);

    // WHEN: Enabled with a string
    config.space_string = "NEXT".to_string();
    assert_eq!(space_message(&config).as_deref(), Some("NEXT"));

    // WHEN: String set but disabled
    config.space_enabled = false;
    assert_eq!(space_message(&config), None);
}

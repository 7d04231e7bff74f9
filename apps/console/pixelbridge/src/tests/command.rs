use crate::command::Command;

/// **VALUE**: Verifies that plain text is never mistaken for a command.
///
/// **BUG THIS CATCHES**: Would catch the parser trimming or lowercasing text that
/// is about to be sent to the server.
#[test]
fn given_plain_text_when_parsed_then_sent_verbatim() {
    // GIVEN: Mixed-case text with surrounding spaces
    let line = "  Hello :reset ";

    // WHEN: Parsing
    let command = Command::parse(line);

    // THEN: Sent exactly as typed
    assert_eq!(command, Command::Send(line.to_string()));
}

#[test]
fn given_empty_line_when_parsed_then_sends_empty_text() {
    assert_eq!(Command::parse(""), Command::Send(String::new()));
}

#[test]
fn given_colon_words_when_parsed_then_maps_to_commands() {
    assert_eq!(Command::parse(":reset"), Command::Reset);
    assert_eq!(Command::parse(":space"), Command::Space);
    assert_eq!(Command::parse(":PAUSE"), Command::Pause);
    assert_eq!(Command::parse(":resume "), Command::Resume);
    assert_eq!(Command::parse(":status"), Command::Status);
    assert_eq!(Command::parse(":quit"), Command::Quit);
    assert_eq!(Command::parse(":q"), Command::Quit);
}

#[test]
fn given_double_colon_when_parsed_then_sends_escaped_text() {
    assert_eq!(Command::parse("::reset"), Command::Send(":reset".to_string()));
}

#[test]
fn given_unknown_word_when_parsed_then_reports_unknown() {
    assert_eq!(Command::parse(":bogus"), Command::Unknown("bogus".to_string()));
}

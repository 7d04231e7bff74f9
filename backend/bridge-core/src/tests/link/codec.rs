// Unit tests for the single-byte codec and terminators

use crate::link::{LineTerminator, decode_bytes, encode_message};

/// **VALUE**: Verifies each terminator's exact byte suffix.
///
/// **WHY THIS MATTERS**: Line-oriented servers split messages on these bytes. A wrong
/// terminator means the server never sees a complete message.
///
/// **BUG THIS CATCHES**: Would catch swapped CR/LF or a missing terminator.
#[test]
fn given_each_terminator_when_encoding_then_appends_expected_bytes() {
    // GIVEN: The reset message
    let message = "RESET";

    // WHEN/THEN: Each terminator produces its suffix
    assert_eq!(encode_message(message, LineTerminator::None), b"RESET");
    assert_eq!(encode_message(message, LineTerminator::Cr), b"RESET\r");
    assert_eq!(encode_message(message, LineTerminator::Lf), b"RESET\n");
    assert_eq!(encode_message(message, LineTerminator::CrLf), b"RESET\r\n");
}

/// **VALUE**: Verifies that non-ASCII characters become a single `?` byte.
///
/// **BUG THIS CATCHES**: Would catch UTF-8 leaking onto the wire, which would make
/// the byte count differ from the character count the server expects.
#[test]
fn given_non_ascii_text_when_encoding_then_each_char_is_one_byte() {
    // GIVEN: Text with multi-byte characters
    let message = "Ñ1é";

    // WHEN: Encoding it
    let bytes = encode_message(message, LineTerminator::None);

    // THEN: One byte per character, replacements for non-ASCII
    assert_eq!(bytes, b"?1?");
}

#[test]
fn given_high_bytes_when_decoding_then_replaced() {
    assert_eq!(decode_bytes(b"OK\r\n"), "OK\r\n");
    assert_eq!(decode_bytes(&[b'A', 0xC3, 0xA9, b'B']), "A??B");
}

#[test]
fn given_terminator_when_displayed_then_uses_label() {
    assert_eq!(LineTerminator::CrLf.to_string(), "<CR><LF>");
    assert_eq!(LineTerminator::default(), LineTerminator::None);
}

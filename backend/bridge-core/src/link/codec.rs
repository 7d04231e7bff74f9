//! Single-byte text encoding and message terminators.
//!
//! Payloads are plain ASCII on the wire. Characters outside ASCII are
//! replaced with `?` when encoding and bytes above 0x7F decode to `?`,
//! so every character maps to exactly one byte.

use serde::{Deserialize, Serialize};

use std::fmt::{Display, Formatter, Result as FormatResult};

const REPLACEMENT: u8 = b'?';

/// Suffix appended to every outgoing message.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum LineTerminator {
    #[default]
    None,
    Cr,
    Lf,
    CrLf,
}

impl LineTerminator {
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            Self::None => b"",
            Self::Cr => b"\r",
            Self::Lf => b"\n",
            Self::CrLf => b"\r\n",
        }
    }
}

impl Display for LineTerminator {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        match self {
            Self::None => write!(formatter, "None"),
            Self::Cr => write!(formatter, "<CR>"),
            Self::Lf => write!(formatter, "<LF>"),
            Self::CrLf => write!(formatter, "<CR><LF>"),
        }
    }
}

/// Encode a message and append the terminator.
pub fn encode_message(message: &str, terminator: LineTerminator) -> Vec<u8> {
    let suffix = terminator.as_bytes();
    let mut bytes = Vec::with_capacity(message.len() + suffix.len());

    bytes.extend(
        message
            .chars()
            .map(|c| if c.is_ascii() { c as u8 } else { REPLACEMENT }),
    );
    bytes.extend_from_slice(suffix);
    bytes
}

/// Decode received bytes with the same single-byte mapping.
pub fn decode_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| if b.is_ascii() { b as char } else { REPLACEMENT as char })
        .collect()
}

//! Console line parsing.

/// One line typed at the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text, handed to the input rules and then sent.
    Send(String),
    /// `:reset` sends the configured reset string.
    Reset,
    /// `:space` sends the configured quick-send string.
    Space,
    /// `:pause` suspends probing.
    Pause,
    /// `:resume` resumes probing.
    Resume,
    /// `:status` prints the current link state.
    Status,
    /// `:quit` stops monitoring and exits.
    Quit,
    /// Any other `:`-prefixed word.
    Unknown(String),
}

impl Command {
    /// Parse a line with its trailing newline already removed.
    ///
    /// Only a leading `:` marks a command; `::text` sends `:text`.
    pub fn parse(line: &str) -> Self {
        let Some(rest) = line.strip_prefix(':') else {
            return Self::Send(line.to_string());
        };

        if let Some(escaped) = rest.strip_prefix(':') {
            return Self::Send(format!(":{escaped}"));
        }

        match rest.trim().to_ascii_lowercase().as_str() {
            "reset" => Self::Reset,
            "space" => Self::Space,
            "pause" => Self::Pause,
            "resume" => Self::Resume,
            "status" => Self::Status,
            "quit" | "q" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        }
    }
}

pub const HELP: &str =
    "Commands: :reset  :space  :pause  :resume  :status  :quit  (::text sends ':text')";

//! Line-based command console on stdin.
//!
//! # Design
//!
//! The operator drives the pipeline with single-letter commands followed by
//! Enter:
//!
//! | key | command      | effect                                   |
//! |-----|--------------|------------------------------------------|
//! | `s` | [`Command::Start`]      | begin a recording session     |
//! | `q` | [`Command::Stop`]       | end the session, save the WAV |
//! | `m` | [`Command::ToggleMute`] | mute / unmute the monitor     |
//! | `x` | [`Command::Quit`]       | save if recording, then exit  |
//!
//! Reading stdin line by line is a blocking call, so [`KeyListener::start`]
//! runs it on a dedicated OS thread and forwards parsed commands over a
//! `tokio::sync::mpsc` channel.  End-of-file on stdin is treated as a quit,
//! which makes piped input shut the pipeline down cleanly.
//!
//! # Usage
//!
//! ```no_run
//! use tokio::sync::mpsc;
//! use micloop::keys::{Command, KeyListener};
//!
//! let (tx, mut rx) = mpsc::channel::<Command>(16);
//! let _listener = KeyListener::start(tx);
//!
//! // In your async loop:
//! // while let Some(command) = rx.recv().await { ... }
//! ```

pub mod listener;

pub use listener::KeyListener;

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// Commands emitted by the key listener thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Open a recording session (no-op while one is already open).
    Start,
    /// Close the session and persist it.
    Stop,
    /// Mute or unmute the live monitor; recording is untouched.
    ToggleMute,
    /// Shut the pipeline down, saving any session still open.
    Quit,
}

// ---------------------------------------------------------------------------
// parse_command
// ---------------------------------------------------------------------------

/// Parse one stdin line into a [`Command`].
///
/// Surrounding whitespace (including the trailing newline from `read_line`)
/// is ignored and letters match case-insensitively.  Returns `None` for
/// anything else so callers can ignore stray input without acting on it.
///
/// # Examples
///
/// ```
/// use micloop::keys::{parse_command, Command};
///
/// assert_eq!(parse_command("s\n"), Some(Command::Start));
/// assert_eq!(parse_command("  Q "), Some(Command::Stop));
/// assert_eq!(parse_command("m"),   Some(Command::ToggleMute));
/// assert_eq!(parse_command("stop"), None);
/// ```
pub fn parse_command(line: &str) -> Option<Command> {
    match line.trim() {
        "s" | "S" => Some(Command::Start),
        "q" | "Q" => Some(Command::Stop),
        "m" | "M" => Some(Command::ToggleMute),
        "x" | "X" => Some(Command::Quit),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_all_commands() {
        assert_eq!(parse_command("s"), Some(Command::Start));
        assert_eq!(parse_command("q"), Some(Command::Stop));
        assert_eq!(parse_command("m"), Some(Command::ToggleMute));
        assert_eq!(parse_command("x"), Some(Command::Quit));
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(parse_command("S"), Some(Command::Start));
        assert_eq!(parse_command("Q"), Some(Command::Stop));
        assert_eq!(parse_command("M"), Some(Command::ToggleMute));
        assert_eq!(parse_command("X"), Some(Command::Quit));
    }

    #[test]
    fn parse_trims_whitespace_and_newlines() {
        assert_eq!(parse_command("s\n"), Some(Command::Start));
        assert_eq!(parse_command("  x  "), Some(Command::Quit));
        assert_eq!(parse_command("\tq\r\n"), Some(Command::Stop));
    }

    #[test]
    fn parse_unknown_input_returns_none() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("\n"), None);
        assert_eq!(parse_command("start"), None);
        assert_eq!(parse_command("sx"), None);
        assert_eq!(parse_command("?"), None);
    }
}

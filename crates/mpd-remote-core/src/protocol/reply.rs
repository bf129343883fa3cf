//! Daemon reply parsing.
//!
//! A successful reply is zero or more `key: value` lines; the terminating
//! `OK`/`ACK` line is consumed by the transport and never reaches these
//! parsers. Error replies are a single line of the form:
//!
//! ```text
//! ACK [50@0] {seekcur} Not playing
//! ```
//!
//! where `50` is the numeric error code, `0` the index of the offending
//! command in a command list, `seekcur` the command name, and the rest a
//! human-readable message.

use thiserror::Error;

/// A structured daemon error reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("daemon error {code} at {command:?}: {message}")]
pub struct AckError {
    /// Numeric daemon error code.
    pub code: u16,
    /// Index of the failing command within a command list.
    pub command_index: u16,
    /// Name of the command the daemon was executing.
    pub command: String,
    /// Human-readable message; for logging only.
    pub message: String,
}

/// Parses one `ACK …` error line into its structured form.
///
/// Returns `None` when the line is not an ACK line or deviates from the
/// `ACK [code@index] {command} message` shape — callers fall back to logging
/// the raw line.
pub fn parse_ack(line: &str) -> Option<AckError> {
    let rest = line.strip_prefix("ACK ")?;

    let rest = rest.strip_prefix('[')?;
    let (code_part, rest) = rest.split_once(']')?;
    let (code, command_index) = code_part.split_once('@')?;
    let code = code.parse().ok()?;
    let command_index = command_index.parse().ok()?;

    let rest = rest.trim_start();
    let rest = rest.strip_prefix('{')?;
    let (command, message) = rest.split_once('}')?;

    Some(AckError {
        code,
        command_index,
        command: command.to_string(),
        message: message.trim().to_string(),
    })
}

/// Splits one reply line into its `key: value` pair.
///
/// Returns `None` for lines without a `: ` separator; such lines are
/// skipped, not fatal.
pub fn parse_key_value_line(line: &str) -> Option<(&str, &str)> {
    line.split_once(": ")
}

/// Parses the `key: value` lines of a reply body, skipping malformed lines.
pub fn parse_key_value_lines<'a, I>(lines: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .filter_map(parse_key_value_line)
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_line_parses_into_structured_fields() {
        // Arrange
        let line = "ACK [50@0] {seekcur} Not playing";

        // Act
        let ack = parse_ack(line).expect("well-formed ACK must parse");

        // Assert
        assert_eq!(ack.code, 50);
        assert_eq!(ack.command_index, 0);
        assert_eq!(ack.command, "seekcur");
        assert_eq!(ack.message, "Not playing");
    }

    #[test]
    fn test_ack_with_empty_command_name_parses() {
        // The daemon reports an empty command name for unknown commands.
        let ack = parse_ack(r#"ACK [5@0] {} unknown command "bogus""#).expect("parse");
        assert_eq!(ack.command, "");
        assert_eq!(ack.message, r#"unknown command "bogus""#);
    }

    #[test]
    fn test_non_ack_line_is_not_an_error() {
        assert_eq!(parse_ack("volume: 90"), None);
        assert_eq!(parse_ack("OK"), None);
    }

    #[test]
    fn test_truncated_ack_line_returns_none() {
        // A garbled error line must degrade to raw-line logging, not panic.
        assert_eq!(parse_ack("ACK [50@0 {seekcur} Not playing"), None);
        assert_eq!(parse_ack("ACK [x@y] {p} msg"), None);
    }

    #[test]
    fn test_key_value_lines_parse_and_skip_malformed() {
        // Arrange: a status body with one malformed line in the middle
        let lines = ["volume: 90", "not a pair", "state: play"];

        // Act
        let pairs = parse_key_value_lines(lines);

        // Assert
        assert_eq!(
            pairs,
            vec![
                ("volume".to_string(), "90".to_string()),
                ("state".to_string(), "play".to_string()),
            ]
        );
    }

    #[test]
    fn test_value_may_contain_separator() {
        // "Artist: Name: Subtitle" style values split only at the first ": ".
        let (key, value) = parse_key_value_line("Title: Song: The Sequel").expect("pair");
        assert_eq!(key, "Title");
        assert_eq!(value, "Song: The Sequel");
    }
}

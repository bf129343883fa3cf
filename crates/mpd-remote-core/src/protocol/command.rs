//! Commands the agent sends to the music player daemon.

use std::fmt;

/// All daemon commands the remote issues, discriminated by type.
///
/// The wire rendering is a single line: the command name followed by its
/// arguments, space separated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCommand {
    /// Stop playback.
    Stop,
    /// Start (or resume) playback.
    Play,
    /// Pause playback. Recognized by the daemon; no remote key binds it.
    Pause,
    /// Jump to the previous track.
    Previous,
    /// Jump to the next track.
    Next,
    /// Set the mixer volume to an absolute level, 0–100.
    SetVolume(i32),
    /// Seek relative to the current position by a signed number of seconds.
    SeekBy(i32),
    /// Query the full daemon status.
    Status,
}

impl PlayerCommand {
    /// The daemon command name for this variant.
    pub fn name(&self) -> &'static str {
        match self {
            PlayerCommand::Stop => "stop",
            PlayerCommand::Play => "play",
            PlayerCommand::Pause => "pause",
            PlayerCommand::Previous => "previous",
            PlayerCommand::Next => "next",
            PlayerCommand::SetVolume(_) => "setvol",
            PlayerCommand::SeekBy(_) => "seekcur",
            PlayerCommand::Status => "status",
        }
    }

    /// Renders the complete command line, without the trailing newline.
    ///
    /// Seek offsets carry an explicit sign (`seekcur +10`, `seekcur -10`)
    /// so the daemon treats them as relative.
    pub fn wire_line(&self) -> String {
        match self {
            PlayerCommand::SetVolume(volume) => format!("setvol {volume}"),
            PlayerCommand::SeekBy(seconds) => format!("seekcur {seconds:+}"),
            _ => self.name().to_string(),
        }
    }

    /// Status queries are routine background traffic; callers log them at
    /// debug rather than info.
    pub fn is_status(&self) -> bool {
        matches!(self, PlayerCommand::Status)
    }
}

impl fmt::Display for PlayerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.wire_line())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

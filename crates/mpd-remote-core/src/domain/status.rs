//! Cached daemon status.
//!
//! [`StatusCache`] is the process-wide snapshot of the last known daemon
//! state. It is owned by the session and passed by reference to the
//! dispatcher's handlers (readers + one optimistic writer) and to the
//! reply-processing path (the replace-wholesale writer). It is never
//! cleared; stale values are overwritten by the next successful reply.

use std::fmt;

/// Playback state as reported by the daemon's `state:` status field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Play,
    Stop,
    Pause,
}

impl PlaybackState {
    /// Parses the daemon's `state:` field value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "play" => Some(PlaybackState::Play),
            "stop" => Some(PlaybackState::Stop),
            "pause" => Some(PlaybackState::Pause),
            _ => None,
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlaybackState::Play => "play",
            PlaybackState::Stop => "stop",
            PlaybackState::Pause => "pause",
        };
        f.write_str(s)
    }
}

/// A parsed daemon status snapshot.
///
/// Fields the remote does not act on are dropped at parse time; unknown or
/// unparsable field values leave the corresponding field unset rather than
/// failing the whole snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerStatus {
    /// Mixer volume, 0–100. Unset until the daemon has reported one.
    pub volume: Option<i32>,
    /// Current playback state.
    pub state: Option<PlaybackState>,
}

impl PlayerStatus {
    /// Builds a snapshot from the key/value pairs of a daemon reply.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut status = Self::default();
        for (key, value) in pairs {
            match key {
                "volume" => status.volume = value.parse().ok(),
                "state" => status.state = PlaybackState::parse(value),
                _ => {}
            }
        }
        status
    }

    /// Returns `true` when no field of the snapshot is set.
    pub fn is_empty(&self) -> bool {
        self.volume.is_none() && self.state.is_none()
    }
}

/// Mutable cache of the last known daemon status.
///
/// Exactly two mutation paths exist:
/// - [`StatusCache::replace`] – wholesale replacement from a parsed reply.
/// - [`StatusCache::set_volume`] – the volume handler's optimistic write,
///   corrected by the next resync if the daemon disagrees.
#[derive(Debug, Default)]
pub struct StatusCache {
    status: PlayerStatus,
}

impl StatusCache {
    /// Creates an empty cache; all fields unknown until the first reply.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last known mixer volume, if any reply has reported one.
    pub fn volume(&self) -> Option<i32> {
        self.status.volume
    }

    /// Last known playback state.
    pub fn playback_state(&self) -> Option<PlaybackState> {
        self.status.state
    }

    /// Replaces the cached snapshot wholesale.
    pub fn replace(&mut self, status: PlayerStatus) {
        self.status = status;
    }

    /// Optimistically records a volume the agent has just asked the daemon
    /// to set, so repeated volume keys do not need a round trip each.
    pub fn set_volume(&mut self, volume: i32) {
        self.status.volume = Some(volume);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

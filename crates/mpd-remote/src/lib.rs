//! mpd-remote library entry point.
//!
//! Re-exports the public modules so that integration tests in `tests/` and
//! the binary entry point in `main.rs` share the same module tree.
//!
//! The agent turns physical remote-control key presses into playback
//! commands for a music player daemon:
//!
//! 1. A reader thread consumes the kernel input device and forwards discrete
//!    key events over a channel.
//! 2. The dispatcher resolves each event against the remote's key map and
//!    invokes the bound command handler (volume step, mute toggle,
//!    seek/track-skip, stop/play).
//! 3. Handlers queue daemon commands on the link, which owns the TCP
//!    connection; replies and daemon-originated change notifications flow
//!    back as session events that refresh the cached player status.
//! 4. Optionally, each recognized key paints its icon onto a small pixel
//!    display.

/// Application layer: dispatch, command handlers, and session lifecycle.
pub mod application;

/// Infrastructure layer: input device, daemon link, display, and storage.
pub mod infrastructure;

//! # mpd-remote-core
//!
//! Shared library for mpd-remote containing the key-event domain model, the
//! remote key-mapping and icon tables, and the daemon wire-protocol types.
//!
//! This crate is used by the agent binary and by its integration tests.
//! It has zero dependencies on OS APIs, the async runtime, or network sockets.
//!
//! The crate defines:
//!
//! - **`domain`** – Key events as delivered by the input device, the typed
//!   [`Trigger`] lookup key, and the cached daemon status snapshot.
//!
//! - **`keymap`** – The remote's key-mapping table: logical button names
//!   (`"VOLUME_UP"`) to numeric key codes, with the reverse table used for
//!   logging and icon lookups.
//!
//! - **`icons`** – Optional 8×8 icon bitmaps keyed by logical button name,
//!   painted onto a small pixel display when a key is pressed.
//!
//! - **`protocol`** – The daemon's text-line command set and reply parsing
//!   (key/value lines terminated by `OK`, or an `ACK …` error line).

pub mod domain;
pub mod icons;
pub mod keymap;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `mpd_remote_core::Trigger` instead of `mpd_remote_core::domain::event::Trigger`.
pub use domain::event::{KeyEvent, KeyEventKind, Trigger};
pub use domain::status::{PlaybackState, PlayerStatus, StatusCache};
pub use icons::{IconBitmap, IconError, IconTable, ICON_SIZE};
pub use keymap::{KeyMap, KeymapError};
pub use protocol::command::PlayerCommand;
pub use protocol::reply::{parse_ack, parse_key_value_lines, AckError};

//! Key-event dispatch: the command table and its stateful handlers.
//!
//! The command table is built once at startup by composing the remote's key
//! map with the fixed binding policy below, and is owned exclusively by the
//! [`Dispatcher`]. Each binding is a small struct implementing [`KeyAction`];
//! bindings that need state (the mute toggle's saved volume, the per-direction
//! scrub flag) own it, so nothing here is global.
//!
//! | Trigger              | Action                           |
//! |----------------------|----------------------------------|
//! | Press STOP           | `stop`                           |
//! | Press PLAY           | `play`                           |
//! | Press VOLUME_DOWN/UP | volume ∓ large step              |
//! | Down  VOLUME_DOWN/UP | volume ∓ small step (autorepeat) |
//! | Press MUTE           | mute toggle                      |
//! | Down  PREVIOUS/NEXT  | `seekcur` ∓ seek step            |
//! | Up    PREVIOUS/NEXT  | `previous`/`next` unless held    |
//!
//! # Architecture
//!
//! Actions depend only on the [`CommandSink`] trait and the shared
//! [`StatusCache`]; the production sink queues onto the daemon link's
//! channel, test sinks record calls. Sends are fire-and-forget — the reply
//! arrives later as a session event.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use mpd_remote_core::{
    IconTable, KeyEvent, KeyEventKind, KeyMap, KeymapError, PlayerCommand, StatusCache, Trigger,
};

use crate::infrastructure::display::PixelDisplay;

/// Inclusive mixer volume range accepted by the daemon.
const VOLUME_MIN: i32 = 0;
const VOLUME_MAX: i32 = 100;

/// Error type for command submission.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The daemon command queue is gone; the process is shutting down.
    #[error("daemon command queue is closed")]
    Closed,
}

/// Seam between key handlers and the daemon link.
///
/// Sends are fire-and-forget: implementations queue the command and return
/// immediately. The infrastructure implementation feeds the link's command
/// channel; test implementations record calls.
#[async_trait]
pub trait CommandSink: Send + Sync {
    /// Queues a command for delivery to the daemon.
    async fn send(&self, command: PlayerCommand) -> Result<(), SinkError>;
}

/// Step sizes for the volume and seek bindings.
#[derive(Debug, Clone)]
pub struct StepConfig {
    /// Volume delta for a discrete press.
    pub volume_large: i32,
    /// Volume delta per autorepeat tick while held.
    pub volume_small: i32,
    /// Relative seek distance in seconds per autorepeat tick.
    pub seek_secs: i32,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            volume_large: 10,
            volume_small: 5,
            seek_secs: 10,
        }
    }
}

// ── Handler state ─────────────────────────────────────────────────────────────

/// Shared held-key marker for one seek direction.
///
/// The Down action of a direction marks it; the Up action takes it. Cloned
/// into exactly the two actions of that direction, never global.
#[derive(Debug, Clone, Default)]
struct ScrubFlag(Arc<AtomicBool>);

impl ScrubFlag {
    fn mark(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns the current value and clears it.
    fn take(&self) -> bool {
        self.0.swap(false, Ordering::Relaxed)
    }
}

// ── Actions ───────────────────────────────────────────────────────────────────

/// One key binding. Implementations own any per-binding state.
#[async_trait]
trait KeyAction: Send {
    async fn run(&mut self, state: &mut StatusCache, sink: &dyn CommandSink)
        -> Result<(), SinkError>;
}

/// Sends the same fixed command on every trigger (stop, play).
struct SendAction {
    command: PlayerCommand,
}

#[async_trait]
impl KeyAction for SendAction {
    async fn run(
        &mut self,
        _state: &mut StatusCache,
        sink: &dyn CommandSink,
    ) -> Result<(), SinkError> {
        sink.send(self.command.clone()).await
    }
}

/// Applies a relative volume delta, clamped to the daemon's mixer range.
///
/// The cache is updated optimistically so repeated presses do not need a
/// round trip each; the next status resync corrects any drift. A candidate
/// outside 0–100 is a normal boundary: nothing is sent and nothing changes.
struct VolumeStepAction {
    delta: i32,
}

#[async_trait]
impl KeyAction for VolumeStepAction {
    async fn run(
        &mut self,
        state: &mut StatusCache,
        sink: &dyn CommandSink,
    ) -> Result<(), SinkError> {
        let Some(volume) = state.volume() else {
            debug!("volume step ignored; no cached volume yet");
            return Ok(());
        };
        let candidate = volume + self.delta;
        if (VOLUME_MIN..=VOLUME_MAX).contains(&candidate) {
            state.set_volume(candidate);
            sink.send(PlayerCommand::SetVolume(candidate)).await?;
        }
        Ok(())
    }
}

/// Volume-restore toggle.
///
/// Each press sends the previously saved level and captures the current one,
/// so the first press silences (saved starts at 0) and the next restores.
/// Best effort after external volume changes between presses.
struct MuteToggleAction {
    saved: i32,
}

#[async_trait]
impl KeyAction for MuteToggleAction {
    async fn run(
        &mut self,
        state: &mut StatusCache,
        sink: &dyn CommandSink,
    ) -> Result<(), SinkError> {
        let stored = state.volume();
        sink.send(PlayerCommand::SetVolume(self.saved)).await?;
        // Only re-capture when the cache actually knows a volume; an unknown
        // level must not poison the saved value.
        if let Some(volume) = stored {
            self.saved = volume;
        }
        Ok(())
    }
}

/// Relative seek while the key is held (autorepeat).
///
/// Marks the direction as scrubbing so the matching release does not also
/// skip tracks.
struct SeekAction {
    offset_secs: i32,
    scrubbing: ScrubFlag,
}

#[async_trait]
impl KeyAction for SeekAction {
    async fn run(
        &mut self,
        _state: &mut StatusCache,
        sink: &dyn CommandSink,
    ) -> Result<(), SinkError> {
        self.scrubbing.mark();
        sink.send(PlayerCommand::SeekBy(self.offset_secs)).await
    }
}

/// Track skip on key release, suppressed when the key was held for scrubbing.
///
/// The flag is always cleared on release, so the next tap starts idle.
struct TrackSkipAction {
    command: PlayerCommand,
    scrubbing: ScrubFlag,
}

#[async_trait]
impl KeyAction for TrackSkipAction {
    async fn run(
        &mut self,
        _state: &mut StatusCache,
        sink: &dyn CommandSink,
    ) -> Result<(), SinkError> {
        if !self.scrubbing.take() {
            sink.send(self.command.clone()).await?;
        }
        Ok(())
    }
}

// ── Command table ─────────────────────────────────────────────────────────────

/// The fixed binding policy, composed with a key map at startup.
///
/// Immutable after construction apart from the private state inside the
/// actions it owns.
pub struct CommandTable {
    actions: HashMap<Trigger, Box<dyn KeyAction>>,
}

impl CommandTable {
    /// Builds the table from a validated key map and the configured steps.
    ///
    /// # Errors
    ///
    /// Returns [`KeymapError::MissingKey`] if the map lacks a required name;
    /// unreachable for maps produced by [`KeyMap::from_json`], which
    /// validates the same set.
    pub fn build(keymap: &KeyMap, steps: &StepConfig) -> Result<Self, KeymapError> {
        let code = |name: &str| {
            keymap
                .code(name)
                .ok_or_else(|| KeymapError::MissingKey(name.to_string()))
        };
        let stop = code("STOP")?;
        let play = code("PLAY")?;
        let volume_down = code("VOLUME_DOWN")?;
        let volume_up = code("VOLUME_UP")?;
        let mute = code("MUTE")?;
        let previous = code("PREVIOUS")?;
        let next = code("NEXT")?;

        let previous_scrub = ScrubFlag::default();
        let next_scrub = ScrubFlag::default();

        let mut actions: HashMap<Trigger, Box<dyn KeyAction>> = HashMap::new();
        actions.insert(
            Trigger::new(KeyEventKind::Press, stop),
            Box::new(SendAction {
                command: PlayerCommand::Stop,
            }),
        );
        actions.insert(
            Trigger::new(KeyEventKind::Press, play),
            Box::new(SendAction {
                command: PlayerCommand::Play,
            }),
        );
        actions.insert(
            Trigger::new(KeyEventKind::Press, volume_down),
            Box::new(VolumeStepAction {
                delta: -steps.volume_large,
            }),
        );
        actions.insert(
            Trigger::new(KeyEventKind::Press, volume_up),
            Box::new(VolumeStepAction {
                delta: steps.volume_large,
            }),
        );
        actions.insert(
            Trigger::new(KeyEventKind::Down, volume_down),
            Box::new(VolumeStepAction {
                delta: -steps.volume_small,
            }),
        );
        actions.insert(
            Trigger::new(KeyEventKind::Down, volume_up),
            Box::new(VolumeStepAction {
                delta: steps.volume_small,
            }),
        );
        actions.insert(
            Trigger::new(KeyEventKind::Press, mute),
            Box::new(MuteToggleAction { saved: 0 }),
        );
        actions.insert(
            Trigger::new(KeyEventKind::Down, previous),
            Box::new(SeekAction {
                offset_secs: -steps.seek_secs,
                scrubbing: previous_scrub.clone(),
            }),
        );
        actions.insert(
            Trigger::new(KeyEventKind::Up, previous),
            Box::new(TrackSkipAction {
                command: PlayerCommand::Previous,
                scrubbing: previous_scrub,
            }),
        );
        actions.insert(
            Trigger::new(KeyEventKind::Down, next),
            Box::new(SeekAction {
                offset_secs: steps.seek_secs,
                scrubbing: next_scrub.clone(),
            }),
        );
        actions.insert(
            Trigger::new(KeyEventKind::Up, next),
            Box::new(TrackSkipAction {
                command: PlayerCommand::Next,
                scrubbing: next_scrub,
            }),
        );

        Ok(Self { actions })
    }

    /// Number of registered bindings.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns `true` if no bindings are registered.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

// ── Dispatcher ────────────────────────────────────────────────────────────────

/// Routes raw key events to their bound actions.
///
/// For every event the dispatcher resolves the logical button name for the
/// log line (a sentinel for unknown codes), runs the display side-effect for
/// recognized names, and invokes the matching action if one exists. Unmapped
/// triggers are no-ops; action failures are logged and swallowed — a failed
/// send must never take the process down.
pub struct Dispatcher {
    table: CommandTable,
    keymap: KeyMap,
    icons: IconTable,
    display: Option<Box<dyn PixelDisplay + Send>>,
}

impl Dispatcher {
    /// Creates a dispatcher without a display.
    pub fn new(table: CommandTable, keymap: KeyMap) -> Self {
        Self {
            table,
            keymap,
            icons: IconTable::default(),
            display: None,
        }
    }

    /// Enables the display side-effect with the given icon table.
    pub fn with_display(
        mut self,
        icons: IconTable,
        display: Box<dyn PixelDisplay + Send>,
    ) -> Self {
        self.icons = icons;
        self.display = Some(display);
        self
    }

    /// Handles one key event to completion.
    pub async fn dispatch(
        &mut self,
        event: KeyEvent,
        state: &mut StatusCache,
        sink: &dyn CommandSink,
    ) {
        let name = self.keymap.name(event.code);
        info!(
            "input: {:?} {}",
            event.kind,
            name.unwrap_or("<unknown key>")
        );

        // Mirror every recognized key onto the display, independent of
        // whether a command is bound to this particular trigger.
        if let (Some(name), Some(display)) = (name, self.display.as_mut()) {
            if let Some(icon) = self.icons.get(name) {
                display.clear();
                display.set_pixels(icon);
            }
        }

        if let Some(action) = self.table.actions.get_mut(&Trigger::from(event)) {
            if let Err(e) = action.run(state, sink).await {
                warn!("command send failed: {e}");
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

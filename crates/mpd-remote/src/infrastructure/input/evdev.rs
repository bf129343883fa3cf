//! Linux key source reading a kernel input device through `evdev`.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use evdev::{Device, InputEventKind};
use tokio::sync::mpsc;
use tracing::{info, warn};

use mpd_remote_core::{KeyEvent, KeyEventKind};

use super::{InputError, KeySource};

/// Key source backed by `/dev/input/eventN`.
///
/// `start` opens the device and spawns a blocking reader thread; events are
/// forwarded over an unbounded channel so the reader never waits on the
/// consumer.
pub struct EvdevKeySource {
    path: PathBuf,
    stop: Arc<AtomicBool>,
}

impl EvdevKeySource {
    /// Creates a source for the given device path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl KeySource for EvdevKeySource {
    fn start(&self) -> Result<mpsc::UnboundedReceiver<KeyEvent>, InputError> {
        let mut device = Device::open(&self.path).map_err(|source| InputError::Open {
            path: self.path.clone(),
            source,
        })?;

        let (tx, rx) = mpsc::unbounded_channel();
        let stop = Arc::clone(&self.stop);
        stop.store(false, Ordering::Relaxed);
        let path = self.path.clone();

        std::thread::spawn(move || {
            info!("reading key events from {}", path.display());
            while !stop.load(Ordering::Relaxed) {
                let events = match device.fetch_events() {
                    Ok(events) => events,
                    Err(e) => {
                        warn!("input device read failed: {e}");
                        break;
                    }
                };
                for event in events {
                    if !matches!(event.kind(), InputEventKind::Key(_)) {
                        continue;
                    }
                    let Some(kind) = kind_from_value(event.value()) else {
                        continue;
                    };
                    if tx.send(KeyEvent::new(kind, event.code())).is_err() {
                        // Consumer gone; the session is shutting down.
                        return;
                    }
                }
            }
        });

        Ok(rx)
    }

    fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

/// Maps a kernel key-event value to the event kind.
///
/// 0 = release, 1 = initial press, 2 = autorepeat while held.
fn kind_from_value(value: i32) -> Option<KeyEventKind> {
    match value {
        0 => Some(KeyEventKind::Up),
        1 => Some(KeyEventKind::Press),
        2 => Some(KeyEventKind::Down),
        _ => None,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Mock key source for unit and integration testing.
//!
//! Allows tests to inject synthetic [`KeyEvent`]s without a physical input
//! device or a reader thread.

use std::sync::Mutex;

use tokio::sync::mpsc::{self, UnboundedSender};

use mpd_remote_core::KeyEvent;

use super::{InputError, KeySource};

/// A mock implementation of [`KeySource`] that lets tests inject events.
pub struct MockKeySource {
    sender: Mutex<Option<UnboundedSender<KeyEvent>>>,
}

impl MockKeySource {
    /// Creates a new mock key source.
    pub fn new() -> Self {
        Self {
            sender: Mutex::new(None),
        }
    }

    /// Injects a synthetic event, as if read from hardware.
    ///
    /// Panics if `start()` has not been called or `stop()` has been called.
    pub fn inject(&self, event: KeyEvent) {
        let guard = self.sender.lock().expect("lock poisoned");
        match guard.as_ref() {
            Some(sender) => sender
                .send(event)
                .expect("receiver has been dropped; call start() first"),
            None => panic!("MockKeySource::inject called before start()"),
        }
    }
}

impl Default for MockKeySource {
    fn default() -> Self {
        Self::new()
    }
}

impl KeySource for MockKeySource {
    fn start(&self) -> Result<mpsc::UnboundedReceiver<KeyEvent>, InputError> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.sender.lock().expect("lock poisoned") = Some(tx);
        Ok(rx)
    }

    fn stop(&self) {
        // Drop the sender to close the channel.
        *self.sender.lock().expect("lock poisoned") = None;
    }
}

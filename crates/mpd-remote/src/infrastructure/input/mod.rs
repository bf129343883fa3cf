//! Input-device infrastructure for the remote receiver.
//!
//! The kernel exposes the remote as a character device emitting key events.
//! Reading it is blocking, so the production implementation runs a dedicated
//! reader thread and forwards discrete [`KeyEvent`]s over a channel consumed
//! by the async session loop.
//!
//! # Testability
//!
//! The [`KeySource`] trait allows tests to inject synthetic events without a
//! physical device; see [`mock::MockKeySource`].

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tokio::sync::mpsc;

use mpd_remote_core::KeyEvent;

pub mod mock;

#[cfg(target_os = "linux")]
pub mod evdev;

/// Error type for input-source operations.
#[derive(Debug, Error)]
pub enum InputError {
    /// The input device could not be opened.
    #[error("failed to open input device {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// No key-source implementation exists for this platform.
    #[error("platform not supported: {0}")]
    UnsupportedPlatform(String),
}

/// Trait abstracting key-event production.
///
/// The production implementation reads a kernel input device; tests use
/// [`mock::MockKeySource`].
pub trait KeySource: Send {
    /// Starts the source and returns the receiver for its events.
    fn start(&self) -> Result<mpsc::UnboundedReceiver<KeyEvent>, InputError>;

    /// Stops the source and releases device resources.
    fn stop(&self);
}

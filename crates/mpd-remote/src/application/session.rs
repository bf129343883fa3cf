//! Daemon session lifecycle and status resynchronisation.
//!
//! The session is the single logical thread of control: one task selecting
//! over the input channel, the daemon event channel, and a shutdown poll.
//! All handler invocations, cache writes, and command queuing run to
//! completion without preemption relative to each other, so the stateful
//! toggles inside the command table need no locking.
//!
//! # Lifecycle
//!
//! ```text
//! Disconnected ──Connecting──▶ Connecting ──Ready──▶ Ready
//!       ▲                                              │
//!       └────────────── ConnectionLost ────────────────┘
//! ```
//!
//! On the Connecting→Ready transition the session issues one status query
//! and then attaches the input listeners, exactly once — key events arriving
//! earlier are dropped. While Ready, two independent triggers refresh the
//! cache: every command reply that carries status fields, and every
//! daemon-originated subsystem change, which re-issues an explicit status
//! query rather than trusting the notification payload.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use mpd_remote_core::{KeyEvent, PlayerCommand, PlayerStatus, StatusCache};

use crate::application::dispatch::{CommandSink, Dispatcher};
use crate::infrastructure::daemon::DaemonEvent;

/// Interval at which the run loop checks the shutdown flag.
const SHUTDOWN_POLL: Duration = Duration::from_millis(200);

/// Connection lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Disconnected,
    Connecting,
    Ready,
}

/// The daemon session: lifecycle state machine plus the dispatch loop.
pub struct Session {
    phase: SessionPhase,
    input_attached: bool,
    cache: StatusCache,
    dispatcher: Dispatcher,
    sink: Arc<dyn CommandSink>,
}

impl Session {
    /// Creates a new session in the `Disconnected` phase.
    pub fn new(dispatcher: Dispatcher, sink: Arc<dyn CommandSink>) -> Self {
        Self {
            phase: SessionPhase::Disconnected,
            input_attached: false,
            cache: StatusCache::new(),
            dispatcher,
            sink,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Read access to the cached daemon status.
    pub fn cache(&self) -> &StatusCache {
        &self.cache
    }

    /// Handles one lifecycle or reply event from the daemon link.
    pub async fn handle_daemon_event(&mut self, event: DaemonEvent) {
        match event {
            DaemonEvent::Connecting => {
                self.phase = SessionPhase::Connecting;
                info!("connecting to daemon");
            }
            DaemonEvent::Ready { version } => {
                info!("daemon ready (protocol {version})");
                self.phase = SessionPhase::Ready;
                self.resync().await;
                if !self.input_attached {
                    self.input_attached = true;
                    info!("input listeners attached");
                }
            }
            DaemonEvent::Reply(Ok(pairs)) => {
                let status =
                    PlayerStatus::from_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
                if status.is_empty() {
                    // Acknowledgement-only reply (stop/play/setvol/...); the
                    // cache keeps its last snapshot.
                    debug!("reply carried no status fields");
                } else {
                    debug!("status: {status:?}");
                    self.cache.replace(status);
                }
            }
            DaemonEvent::Reply(Err(ack)) => {
                warn!("daemon rejected command: {ack}");
            }
            DaemonEvent::SubsystemChanged(subsystem) => {
                debug!("daemon system change: {}", subsystem.as_deref().unwrap_or("-"));
                self.resync().await;
            }
            DaemonEvent::ConnectionLost => {
                self.phase = SessionPhase::Disconnected;
                warn!("daemon connection lost");
            }
        }
    }

    /// Handles one key event from the input device.
    ///
    /// Events arriving before the listeners were attached (first Ready
    /// transition) are dropped.
    pub async fn handle_key_event(&mut self, event: KeyEvent) {
        if !self.input_attached {
            debug!("dropping key event before session ready: {event:?}");
            return;
        }
        self.dispatcher
            .dispatch(event, &mut self.cache, self.sink.as_ref())
            .await;
    }

    /// Re-issues a status query to refresh the cache.
    async fn resync(&mut self) {
        if let Err(e) = self.sink.send(PlayerCommand::Status).await {
            warn!("status resync failed: {e}");
        }
    }

    /// Drives the session until shutdown or until both channels close.
    pub async fn run(
        mut self,
        mut input_rx: mpsc::UnboundedReceiver<KeyEvent>,
        mut daemon_rx: mpsc::Receiver<DaemonEvent>,
        running: Arc<AtomicBool>,
    ) {
        let mut shutdown_poll = tokio::time::interval(SHUTDOWN_POLL);
        loop {
            tokio::select! {
                maybe_event = daemon_rx.recv() => match maybe_event {
                    Some(event) => self.handle_daemon_event(event).await,
                    None => {
                        warn!("daemon event channel closed");
                        break;
                    }
                },
                maybe_key = input_rx.recv() => match maybe_key {
                    Some(event) => self.handle_key_event(event).await,
                    None => {
                        warn!("input channel closed");
                        break;
                    }
                },
                _ = shutdown_poll.tick() => {
                    if !running.load(Ordering::Relaxed) {
                        info!("shutdown requested");
                        break;
                    }
                }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

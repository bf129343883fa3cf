//! End-to-end key-sequence scenarios through the session and dispatcher.
//!
//! These tests exercise the public API the way `main` wires it: a [`Session`]
//! fed lifecycle events and key events, with a recording sink standing in
//! for the daemon link. A quick tap at the device level is a `Press`
//! followed by an `Up`; holding a key inserts `Down` autorepeats between
//! them.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use mpd_remote::application::dispatch::{
    CommandSink, CommandTable, Dispatcher, SinkError, StepConfig,
};
use mpd_remote::application::session::{Session, SessionPhase};
use mpd_remote::infrastructure::daemon::DaemonEvent;
use mpd_remote_core::{KeyEvent, KeyEventKind, KeyMap, PlayerCommand};

// ── Test doubles ──────────────────────────────────────────────────────────────

#[derive(Default)]
struct RecordingSink {
    sent: Mutex<Vec<PlayerCommand>>,
}

#[async_trait]
impl CommandSink for RecordingSink {
    async fn send(&self, command: PlayerCommand) -> Result<(), SinkError> {
        self.sent.lock().unwrap().push(command);
        Ok(())
    }
}

impl RecordingSink {
    fn sent(&self) -> Vec<PlayerCommand> {
        self.sent.lock().unwrap().clone()
    }

    /// Commands sent after the initial status query issued on Ready.
    fn sent_after_ready(&self) -> Vec<PlayerCommand> {
        self.sent().into_iter().skip(1).collect()
    }
}

const SCENARIO_MAP: &str = r#"{
    "STOP": 1, "PLAY": 2, "VOLUME_UP": 3, "VOLUME_DOWN": 4,
    "MUTE": 5, "PREVIOUS": 7, "NEXT": 8
}"#;

/// Builds a ready session with the given cached volume.
async fn ready_session(volume: i32) -> (Session, Arc<RecordingSink>) {
    let keymap = KeyMap::from_json(SCENARIO_MAP).expect("scenario map");
    let table = CommandTable::build(&keymap, &StepConfig::default()).expect("table");
    let dispatcher = Dispatcher::new(table, keymap);
    let sink = Arc::new(RecordingSink::default());
    let mut session = Session::new(dispatcher, Arc::clone(&sink) as Arc<dyn CommandSink>);

    session
        .handle_daemon_event(DaemonEvent::Ready {
            version: "0.23.5".to_string(),
        })
        .await;
    session
        .handle_daemon_event(DaemonEvent::Reply(Ok(vec![
            ("volume".to_string(), volume.to_string()),
            ("state".to_string(), "play".to_string()),
        ])))
        .await;

    (session, sink)
}

async fn key(session: &mut Session, kind: KeyEventKind, code: u16) {
    session.handle_key_event(KeyEvent::new(kind, code)).await;
}

// ── Volume clamping ───────────────────────────────────────────────────────────

/// Cached volume 90: one VOLUME_UP press raises to exactly 100; a second
/// press would overshoot and must send nothing while the cache stays put.
#[tokio::test]
async fn test_volume_up_saturates_at_one_hundred() {
    // Arrange
    let (mut session, sink) = ready_session(90).await;
    assert_eq!(session.phase(), SessionPhase::Ready);

    // Act – first press
    key(&mut session, KeyEventKind::Press, 3).await;

    // Assert
    assert_eq!(sink.sent_after_ready(), vec![PlayerCommand::SetVolume(100)]);
    assert_eq!(session.cache().volume(), Some(100));

    // Act – second press: 100 + 10 is rejected
    key(&mut session, KeyEventKind::Press, 3).await;

    // Assert – no further command, cache unchanged
    assert_eq!(sink.sent_after_ready(), vec![PlayerCommand::SetVolume(100)]);
    assert_eq!(session.cache().volume(), Some(100));
}

// ── Tap vs. hold on the seek keys ─────────────────────────────────────────────

/// A quick tap on PREVIOUS (press + release, no autorepeat) skips exactly
/// one track and never seeks.
#[tokio::test]
async fn test_previous_tap_skips_without_seeking() {
    // Arrange
    let (mut session, sink) = ready_session(50).await;

    // Act – one tap
    key(&mut session, KeyEventKind::Press, 7).await;
    key(&mut session, KeyEventKind::Up, 7).await;

    // Assert
    assert_eq!(sink.sent_after_ready(), vec![PlayerCommand::Previous]);
}

/// Holding PREVIOUS scrubs backward in 10-second steps and suppresses the
/// track skip on release.
#[tokio::test]
async fn test_previous_hold_scrubs_and_suppresses_skip() {
    // Arrange
    let (mut session, sink) = ready_session(50).await;

    // Act – press, two autorepeats, release
    key(&mut session, KeyEventKind::Press, 7).await;
    key(&mut session, KeyEventKind::Down, 7).await;
    key(&mut session, KeyEventKind::Down, 7).await;
    key(&mut session, KeyEventKind::Up, 7).await;

    // Assert
    assert_eq!(
        sink.sent_after_ready(),
        vec![PlayerCommand::SeekBy(-10), PlayerCommand::SeekBy(-10)]
    );
}

/// A tap after a hold behaves like a fresh tap; the scrub flag does not
/// leak between gestures.
#[tokio::test]
async fn test_tap_after_hold_skips_again() {
    let (mut session, sink) = ready_session(50).await;

    key(&mut session, KeyEventKind::Down, 8).await;
    key(&mut session, KeyEventKind::Up, 8).await;
    key(&mut session, KeyEventKind::Press, 8).await;
    key(&mut session, KeyEventKind::Up, 8).await;

    assert_eq!(
        sink.sent_after_ready(),
        vec![PlayerCommand::SeekBy(10), PlayerCommand::Next]
    );
}

// ── Resync ────────────────────────────────────────────────────────────────────

/// Every daemon-originated change notification triggers exactly one status
/// query, whatever its payload.
#[tokio::test]
async fn test_each_notification_triggers_one_status_query() {
    // Arrange
    let (mut session, sink) = ready_session(50).await;
    let before = sink.sent().len();

    // Act
    session
        .handle_daemon_event(DaemonEvent::SubsystemChanged(Some("mixer".to_string())))
        .await;
    session
        .handle_daemon_event(DaemonEvent::SubsystemChanged(None))
        .await;

    // Assert
    let queries: Vec<PlayerCommand> = sink.sent().into_iter().skip(before).collect();
    assert_eq!(queries, vec![PlayerCommand::Status, PlayerCommand::Status]);
}

/// A mixer change by another client lands in the cache through the resync
/// reply and corrects the optimistic value.
#[tokio::test]
async fn test_resync_reply_corrects_optimistic_volume() {
    // Arrange: the agent believes the volume is 60
    let (mut session, _sink) = ready_session(50).await;
    key(&mut session, KeyEventKind::Press, 3).await;
    assert_eq!(session.cache().volume(), Some(60));

    // Act – another client set the volume to 25; the resync reply arrives
    session
        .handle_daemon_event(DaemonEvent::Reply(Ok(vec![(
            "volume".to_string(),
            "25".to_string(),
        )])))
        .await;

    // Assert
    assert_eq!(session.cache().volume(), Some(25));
}

// ── Unmapped input ────────────────────────────────────────────────────────────

/// Unknown codes and unbound triggers fall through without commands or
/// panics.
#[tokio::test]
async fn test_unmapped_events_are_no_ops() {
    let (mut session, sink) = ready_session(50).await;

    key(&mut session, KeyEventKind::Press, 42).await;
    key(&mut session, KeyEventKind::Down, 1).await; // STOP has no Down binding
    key(&mut session, KeyEventKind::Up, 3).await; // VOLUME_UP has no Up binding

    assert!(sink.sent_after_ready().is_empty());
}

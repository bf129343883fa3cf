//! TCP link to the music player daemon.
//!
//! The daemon speaks a text-line protocol: the server greets with
//! `OK MPD <version>`, commands are single lines, and each reply is zero or
//! more `key: value` lines terminated by `OK` (or a single `ACK …` error
//! line). Spontaneous change notifications require parking the connection in
//! the `idle` command; the daemon answers with `changed: <subsystem>` lines
//! when something happens, and `noidle` interrupts the wait so a command can
//! be sent.
//!
//! The link owns the TCP stream in one spawned task. Commands arrive on an
//! unbounded channel (the [`CommandSink`] seam); lifecycle events, replies,
//! and notifications flow back to the session on an event channel.
//!
//! # Failure model
//!
//! One connection attempt is made. On failure or loss the link enters a
//! degraded mode that drains and drops queued commands with a warning — no
//! reconnection, no process exit. The next resync or key press after an
//! operator restart is the recovery path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use mpd_remote_core::{parse_ack, parse_key_value_lines, AckError, PlayerCommand};

use crate::application::dispatch::{CommandSink, SinkError};

/// Configuration for the daemon link.
#[derive(Debug, Clone)]
pub struct DaemonLinkConfig {
    /// Daemon hostname or IP address.
    pub host: String,
    /// Daemon TCP port.
    pub port: u16,
}

impl Default for DaemonLinkConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6600,
        }
    }
}

impl DaemonLinkConfig {
    /// `host:port` form accepted by [`TcpStream::connect`].
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Events emitted by the link to the session.
#[derive(Debug)]
pub enum DaemonEvent {
    /// The TCP dial has started.
    Connecting,
    /// Greeting received; the daemon accepts commands.
    Ready {
        /// Protocol version from the greeting line.
        version: String,
    },
    /// Reply to the oldest in-flight command: parsed key/value pairs, or the
    /// daemon's structured error.
    Reply(Result<Vec<(String, String)>, AckError>),
    /// A subsystem changed on the daemon's initiative (`player`, `mixer`, …).
    SubsystemChanged(Option<String>),
    /// The connection failed or dropped. The link does not reconnect.
    ConnectionLost,
}

/// Error type for link I/O.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The daemon closed the connection.
    #[error("connection closed by daemon")]
    Closed,

    /// The server did not identify itself as a music player daemon.
    #[error("unexpected greeting {0:?}")]
    BadGreeting(String),

    /// An I/O error occurred on the established connection.
    #[error("link I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// [`CommandSink`] backed by the link's command queue.
#[derive(Debug, Clone)]
pub struct ChannelCommandSink {
    tx: mpsc::UnboundedSender<PlayerCommand>,
}

impl ChannelCommandSink {
    fn new(tx: mpsc::UnboundedSender<PlayerCommand>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl CommandSink for ChannelCommandSink {
    async fn send(&self, command: PlayerCommand) -> Result<(), SinkError> {
        self.tx.send(command).map_err(|_| SinkError::Closed)
    }
}

/// Handle for starting the daemon link.
pub struct DaemonLink;

impl DaemonLink {
    /// Spawns the link task.
    ///
    /// Returns the command sink for the dispatcher's handlers and the event
    /// receiver for the session. The task runs until `running` clears and
    /// the command channel drains.
    pub fn start(
        config: DaemonLinkConfig,
        running: Arc<AtomicBool>,
    ) -> (ChannelCommandSink, mpsc::Receiver<DaemonEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel(128);
        tokio::spawn(run_link(config, cmd_rx, event_tx, running));
        (ChannelCommandSink::new(cmd_tx), event_rx)
    }
}

async fn run_link(
    config: DaemonLinkConfig,
    mut cmd_rx: mpsc::UnboundedReceiver<PlayerCommand>,
    event_tx: mpsc::Sender<DaemonEvent>,
    running: Arc<AtomicBool>,
) {
    let addr = config.addr();
    let _ = event_tx.send(DaemonEvent::Connecting).await;

    match TcpStream::connect(&addr).await {
        Ok(stream) => {
            info!("connected to daemon at {addr}");
            match drive_connection(stream, &mut cmd_rx, &event_tx).await {
                Ok(()) => info!("daemon link shut down"),
                Err(e) => warn!("daemon link failed: {e}"),
            }
        }
        Err(e) => warn!("could not connect to daemon at {addr}: {e}"),
    }

    let _ = event_tx.send(DaemonEvent::ConnectionLost).await;

    // Degraded mode: keep draining so queued sends stay fire-and-forget for
    // the rest of the process; each command is dropped with a warning.
    while running.load(Ordering::Relaxed) {
        match cmd_rx.recv().await {
            Some(command) => warn!("daemon link down; dropping {:?} command", command.name()),
            None => break,
        }
    }
}

/// Runs the connected protocol loop until the command channel closes or the
/// connection drops.
///
/// Invariant: the daemon is parked in `idle` whenever the select below runs,
/// so notifications can arrive at any time and a queued command interrupts
/// the wait with `noidle`.
async fn drive_connection(
    stream: TcpStream,
    cmd_rx: &mut mpsc::UnboundedReceiver<PlayerCommand>,
    event_tx: &mpsc::Sender<DaemonEvent>,
) -> Result<(), LinkError> {
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    let greeting = next_line(&mut lines).await?;
    let version = greeting
        .strip_prefix("OK MPD ")
        .ok_or_else(|| LinkError::BadGreeting(greeting.clone()))?
        .to_string();
    if event_tx.send(DaemonEvent::Ready { version }).await.is_err() {
        return Ok(());
    }

    write_half.write_all(b"idle\n").await?;
    loop {
        tokio::select! {
            maybe_cmd = cmd_rx.recv() => {
                let Some(command) = maybe_cmd else {
                    return Ok(());
                };
                // Leave idle. If the daemon finished the idle round on its
                // own in the meantime, `noidle` is a no-op without a reply
                // of its own, so exactly one OK terminates the drain either
                // way.
                write_half.write_all(b"noidle\n").await?;
                drain_idle_reply(&mut lines, event_tx).await?;

                send_command(&mut write_half, &command).await?;
                let reply = read_reply(&mut lines).await?;
                if event_tx.send(DaemonEvent::Reply(reply)).await.is_err() {
                    return Ok(());
                }

                write_half.write_all(b"idle\n").await?;
            }
            line = lines.next_line() => {
                match line? {
                    None => return Err(LinkError::Closed),
                    Some(l) if l == "OK" => {
                        // Idle round finished after delivering notifications;
                        // park again.
                        write_half.write_all(b"idle\n").await?;
                    }
                    Some(l) => forward_idle_line(&l, event_tx).await,
                }
            }
        }
    }
}

async fn next_line(lines: &mut Lines<BufReader<OwnedReadHalf>>) -> Result<String, LinkError> {
    lines.next_line().await?.ok_or(LinkError::Closed)
}

/// Forwards one line of an idle reply as a notification event.
async fn forward_idle_line(line: &str, event_tx: &mpsc::Sender<DaemonEvent>) {
    if let Some(subsystem) = line.strip_prefix("changed: ") {
        let _ = event_tx
            .send(DaemonEvent::SubsystemChanged(Some(subsystem.to_string())))
            .await;
    } else {
        warn!("unexpected line while idling: {line:?}");
    }
}

/// Reads the remainder of an interrupted idle reply up to its `OK`,
/// forwarding any change notifications that raced with the interruption.
async fn drain_idle_reply(
    lines: &mut Lines<BufReader<OwnedReadHalf>>,
    event_tx: &mpsc::Sender<DaemonEvent>,
) -> Result<(), LinkError> {
    loop {
        let line = next_line(lines).await?;
        if line == "OK" {
            return Ok(());
        }
        forward_idle_line(&line, event_tx).await;
    }
}

async fn send_command(
    write_half: &mut OwnedWriteHalf,
    command: &PlayerCommand,
) -> Result<(), LinkError> {
    // Status queries are routine background traffic.
    if command.is_status() {
        debug!("send: {command}");
    } else {
        info!("send: {command}");
    }
    write_half.write_all(command.wire_line().as_bytes()).await?;
    write_half.write_all(b"\n").await?;
    Ok(())
}

/// Reads one command reply: `key: value` lines up to the `OK`/`ACK`
/// terminator.
async fn read_reply(
    lines: &mut Lines<BufReader<OwnedReadHalf>>,
) -> Result<Result<Vec<(String, String)>, AckError>, LinkError> {
    let mut body: Vec<String> = Vec::new();
    loop {
        let line = next_line(lines).await?;
        if line == "OK" {
            return Ok(Ok(parse_key_value_lines(body.iter().map(String::as_str))));
        }
        if line.starts_with("ACK") {
            // Fall back to the raw line when the ACK shape is unexpected.
            let ack = parse_ack(&line).unwrap_or_else(|| AckError {
                code: 0,
                command_index: 0,
                command: String::new(),
                message: line.clone(),
            });
            return Ok(Err(ack));
        }
        body.push(line);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_config_default_matches_daemon_convention() {
        // Arrange / Act
        let cfg = DaemonLinkConfig::default();

        // Assert
        assert_eq!(cfg.host, "localhost");
        assert_eq!(cfg.port, 6600);
    }

    #[test]
    fn test_link_config_addr_joins_host_and_port() {
        let cfg = DaemonLinkConfig {
            host: "pine64.home".to_string(),
            port: 6601,
        };
        assert_eq!(cfg.addr(), "pine64.home:6601");
    }

    #[tokio::test]
    async fn test_channel_sink_queues_commands() {
        // Arrange
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = ChannelCommandSink::new(tx);

        // Act
        sink.send(PlayerCommand::Play).await.expect("queue");

        // Assert
        assert_eq!(rx.recv().await, Some(PlayerCommand::Play));
    }

    #[tokio::test]
    async fn test_channel_sink_reports_closed_queue() {
        // Arrange: receiver dropped
        let (tx, rx) = mpsc::unbounded_channel::<PlayerCommand>();
        drop(rx);
        let sink = ChannelCommandSink::new(tx);

        // Act
        let result = sink.send(PlayerCommand::Play).await;

        // Assert
        assert!(matches!(result, Err(SinkError::Closed)));
    }
}

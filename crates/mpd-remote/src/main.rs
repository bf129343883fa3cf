//! mpd-remote agent — entry point.
//!
//! Turns physical remote-control key presses into playback commands for a
//! music player daemon, optionally mirroring each key onto a small pixel
//! display.
//!
//! # Usage
//!
//! ```text
//! mpd-remote [OPTIONS]
//!
//! Options:
//!   --config <PATH>   TOML configuration file
//!   --host   <HOST>   Daemon hostname override
//!   --port   <PORT>   Daemon port override
//!   --device <PATH>   Input device override
//!   --keymap <PATH>   Key-map resource override
//!   --debug           Log at debug level
//! ```
//!
//! CLI flags override the configuration file; every flag can also come from
//! an `MPD_REMOTE_*` environment variable. `RUST_LOG` overrides the log
//! level entirely.
//!
//! # Architecture overview
//!
//! ```text
//! main()
//!  └─ load config, key map, icons
//!  └─ DaemonLink::start()    -- TCP task: commands out, events in
//!  └─ EvdevKeySource::start() -- reader thread on /dev/input/eventN
//!  └─ Session::run()          -- select loop
//!       ├─ KeyEvent       -> Dispatcher -> CommandSink
//!       ├─ Ready/changed  -> status resync
//!       └─ Reply          -> StatusCache
//! ```

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mpd_remote::application::dispatch::{CommandSink, CommandTable, Dispatcher};
use mpd_remote::application::session::Session;
use mpd_remote::infrastructure::daemon::{DaemonLink, DaemonLinkConfig};
use mpd_remote::infrastructure::display::{AsciiDisplay, PixelDisplay};
use mpd_remote::infrastructure::input::InputError;
use mpd_remote::infrastructure::storage::config::{load_config, RemoteConfig};
use mpd_remote::infrastructure::storage::resources::{load_icons, load_keymap};
use mpd_remote_core::KeyEvent;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Remote-control agent for a music player daemon.
#[derive(Debug, Parser)]
#[command(
    name = "mpd-remote",
    about = "Translate remote-control key events into music player daemon commands",
    version
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, env = "MPD_REMOTE_CONFIG")]
    config: Option<PathBuf>,

    /// Daemon hostname or IP address (overrides the config file).
    #[arg(long, env = "MPD_REMOTE_HOST")]
    host: Option<String>,

    /// Daemon TCP port (overrides the config file).
    #[arg(long, env = "MPD_REMOTE_PORT")]
    port: Option<u16>,

    /// Kernel input device to read key events from (overrides the config file).
    #[arg(long, env = "MPD_REMOTE_DEVICE")]
    device: Option<PathBuf>,

    /// Key-map resource path (overrides the config file).
    #[arg(long, env = "MPD_REMOTE_KEYMAP")]
    keymap: Option<PathBuf>,

    /// Log at debug level regardless of the configured level.
    #[arg(long)]
    debug: bool,
}

impl Cli {
    /// Folds the CLI overrides into the loaded configuration.
    fn apply_overrides(&self, mut config: RemoteConfig) -> RemoteConfig {
        if let Some(host) = &self.host {
            config.daemon.host = host.clone();
        }
        if let Some(port) = self.port {
            config.daemon.port = port;
        }
        if let Some(device) = &self.device {
            config.input.device = device.clone();
        }
        if let Some(keymap) = &self.keymap {
            config.input.keymap = keymap.clone();
        }
        if self.debug {
            config.log.level = "debug".to_string();
        }
        config
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("loading configuration")?;
    let config = cli.apply_overrides(config);

    // Initialise structured logging. `RUST_LOG` wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log.level.clone())),
        )
        .init();

    info!("mpd-remote starting");

    // ── Key map, command table, optional display ──────────────────────────────
    let keymap = load_keymap(&config.input.keymap)
        .with_context(|| format!("loading key map {}", config.input.keymap.display()))?;
    let table = CommandTable::build(&keymap, &config.playback.steps())
        .context("building command table")?;
    let mut dispatcher = Dispatcher::new(table, keymap);

    if let Some(icons_path) = &config.display.icons {
        let icons = load_icons(icons_path)
            .with_context(|| format!("loading icons {}", icons_path.display()))?;
        info!("display enabled with {} icons", icons.len());
        // Headless stand-in; a hardware build swaps in the LED-matrix driver.
        let mut display = AsciiDisplay::new();
        display.set_rotation(config.display.rotation);
        dispatcher = dispatcher.with_display(icons, Box::new(display));
    }

    // ── Graceful shutdown flag ────────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            running_clone.store(false, Ordering::Relaxed);
        }
    });

    // ── Daemon link and input device ──────────────────────────────────────────
    let link_config = DaemonLinkConfig {
        host: config.daemon.host.clone(),
        port: config.daemon.port,
    };
    let (sink, daemon_rx) = DaemonLink::start(link_config, Arc::clone(&running));

    let input_rx = start_key_source(&config)
        .with_context(|| format!("opening input device {}", config.input.device.display()))?;

    // ── Session loop ──────────────────────────────────────────────────────────
    let session = Session::new(dispatcher, Arc::new(sink) as Arc<dyn CommandSink>);
    session.run(input_rx, daemon_rx, running).await;

    info!("mpd-remote stopped");
    Ok(())
}

/// Starts the platform key source.
#[cfg(target_os = "linux")]
fn start_key_source(
    config: &RemoteConfig,
) -> Result<mpsc::UnboundedReceiver<KeyEvent>, InputError> {
    use mpd_remote::infrastructure::input::evdev::EvdevKeySource;
    use mpd_remote::infrastructure::input::KeySource;

    let source = EvdevKeySource::new(&config.input.device);
    source.start()
}

#[cfg(not(target_os = "linux"))]
fn start_key_source(
    _config: &RemoteConfig,
) -> Result<mpsc::UnboundedReceiver<KeyEvent>, InputError> {
    Err(InputError::UnsupportedPlatform(
        std::env::consts::OS.to_string(),
    ))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

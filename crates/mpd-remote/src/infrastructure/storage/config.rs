//! TOML-based configuration for the agent.
//!
//! Reads `RemoteConfig` from an explicit `--config` path, or from the
//! default location `$XDG_CONFIG_HOME/mpd-remote/config.toml`
//! (`~/.config/mpd-remote/config.toml` when `XDG_CONFIG_HOME` is unset).
//!
//! Every field has a serde default, so a partial file — or no file at all at
//! the default location — yields a working configuration. A file that exists
//! but fails to parse is a fatal startup error: the agent must not run with
//! half-applied settings.
//!
//! ```toml
//! [daemon]
//! host = "pine64.home"
//! port = 6601
//!
//! [input]
//! device = "/dev/input/event0"
//! keymap = "remotes/default.json"
//!
//! [playback]
//! volume_step_large = 10
//! volume_step_small = 5
//! seek_step_secs = 10
//!
//! [display]
//! icons = "remotes/icons.json"
//! rotation = 180
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::dispatch::StepConfig;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config base directory could not be determined.
    #[error("could not determine config directory (HOME and XDG_CONFIG_HOME unset)")]
    NoConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level agent configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RemoteConfig {
    pub log: LogConfig,
    pub daemon: DaemonConfig,
    pub input: InputConfig,
    pub playback: PlaybackConfig,
    pub display: DisplayConfig,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    pub level: String,
}

/// Daemon endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DaemonConfig {
    /// Daemon hostname or IP address.
    pub host: String,
    /// Daemon TCP port.
    pub port: u16,
}

/// Input device and key-map settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    /// Kernel input device delivering the remote's key events.
    pub device: PathBuf,
    /// JSON key-map resource: logical button names to key codes.
    pub keymap: PathBuf,
}

/// Step sizes for the volume and seek bindings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Volume delta for a discrete press.
    pub volume_step_large: i32,
    /// Volume delta per autorepeat tick while held.
    pub volume_step_small: i32,
    /// Relative seek distance in seconds per autorepeat tick.
    pub seek_step_secs: i32,
}

/// Optional pixel-display settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    /// JSON icon resource; the display is disabled when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icons: Option<PathBuf>,
    /// Display rotation in degrees.
    pub rotation: u16,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6600,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from("/dev/input/event0"),
            keymap: PathBuf::from("remotes/default.json"),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            volume_step_large: 10,
            volume_step_small: 5,
            seek_step_secs: 10,
        }
    }
}

impl PlaybackConfig {
    /// Converts the persisted step sizes into the dispatch-layer form.
    pub fn steps(&self) -> StepConfig {
        StepConfig {
            volume_large: self.volume_step_large,
            volume_small: self.volume_step_small,
            seek_secs: self.seek_step_secs,
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Resolves the default config file path.
///
/// # Errors
///
/// Returns [`ConfigError::NoConfigDir`] when neither `XDG_CONFIG_HOME` nor
/// `HOME` is set.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok_or(ConfigError::NoConfigDir)?;
    Ok(base.join("mpd-remote").join("config.toml"))
}

/// Loads the configuration.
///
/// With an explicit path, the file must exist and parse. Without one, a
/// missing file at the default location yields `RemoteConfig::default()`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors, [`ConfigError::Parse`]
/// for malformed TOML, and [`ConfigError::NoConfigDir`] when the default
/// location cannot be resolved.
pub fn load_config(explicit: Option<&Path>) -> Result<RemoteConfig, ConfigError> {
    match explicit {
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(toml::from_str(&content)?)
        }
        None => {
            let path = default_config_path()?;
            match std::fs::read_to_string(&path) {
                Ok(content) => Ok(toml::from_str(&content)?),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    Ok(RemoteConfig::default())
                }
                Err(source) => Err(ConfigError::Io { path, source }),
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Defaults ──────────────────────────────────────────────────────────────

    #[test]
    fn test_default_daemon_endpoint() {
        // Arrange / Act
        let cfg = RemoteConfig::default();

        // Assert
        assert_eq!(cfg.daemon.host, "localhost");
        assert_eq!(cfg.daemon.port, 6600);
    }

    #[test]
    fn test_default_input_paths() {
        let cfg = RemoteConfig::default();
        assert_eq!(cfg.input.device, PathBuf::from("/dev/input/event0"));
        assert_eq!(cfg.input.keymap, PathBuf::from("remotes/default.json"));
    }

    #[test]
    fn test_default_step_sizes() {
        let cfg = RemoteConfig::default();
        assert_eq!(cfg.playback.volume_step_large, 10);
        assert_eq!(cfg.playback.volume_step_small, 5);
        assert_eq!(cfg.playback.seek_step_secs, 10);
    }

    #[test]
    fn test_default_display_is_disabled() {
        let cfg = RemoteConfig::default();
        assert_eq!(cfg.display.icons, None);
        assert_eq!(cfg.display.rotation, 0);
    }

    #[test]
    fn test_default_log_level_is_info() {
        let cfg = RemoteConfig::default();
        assert_eq!(cfg.log.level, "info");
    }

    // ── TOML parsing ──────────────────────────────────────────────────────────

    #[test]
    fn test_round_trip_preserves_custom_values() {
        // Arrange
        let mut cfg = RemoteConfig::default();
        cfg.daemon.host = "pine64.home".to_string();
        cfg.daemon.port = 6601;
        cfg.display.icons = Some(PathBuf::from("remotes/icons.json"));

        // Act
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let restored: RemoteConfig = toml::from_str(&toml_str).expect("deserialize");

        // Assert
        assert_eq!(cfg, restored);
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let cfg: RemoteConfig = toml::from_str("").expect("empty config parses");
        assert_eq!(cfg, RemoteConfig::default());
    }

    #[test]
    fn test_partial_section_inherits_remaining_defaults() {
        // Arrange
        let toml_str = r#"
[daemon]
port = 6601
"#;

        // Act
        let cfg: RemoteConfig = toml::from_str(toml_str).expect("partial config parses");

        // Assert
        assert_eq!(cfg.daemon.port, 6601);
        assert_eq!(cfg.daemon.host, "localhost");
        assert_eq!(cfg.playback.volume_step_large, 10);
    }

    #[test]
    fn test_invalid_toml_is_a_parse_error() {
        let result: Result<RemoteConfig, _> = toml::from_str("[[[ not toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_unset_icons_are_omitted_from_serialization() {
        let toml_str = toml::to_string_pretty(&RemoteConfig::default()).expect("serialize");
        assert!(!toml_str.contains("icons"), "unset icons must be omitted");
    }

    // ── load_config ───────────────────────────────────────────────────────────

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        // With --config the file must exist; silent defaults would mask typos.
        let result = load_config(Some(Path::new("/nonexistent/mpd-remote.toml")));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_explicit_file_loads_and_parses() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("mpd_remote_cfg_{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("config.toml");
        std::fs::write(&path, "[daemon]\nhost = \"jukebox\"\n").expect("write");

        // Act
        let cfg = load_config(Some(&path)).expect("load");

        // Assert
        assert_eq!(cfg.daemon.host, "jukebox");
        assert_eq!(cfg.daemon.port, 6600);

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_default_config_path_ends_with_expected_file() {
        if std::env::var_os("XDG_CONFIG_HOME").is_some() || std::env::var_os("HOME").is_some() {
            let path = default_config_path().expect("resolvable");
            assert!(path.ends_with("mpd-remote/config.toml"));
        }
    }
}

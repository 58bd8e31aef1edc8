//! TOML-based daemon configuration.
//!
//! Reads `DaemonConfig` from `daemon.toml` in the platform-appropriate config
//! directory, which also holds `settings.toml` and `contacts.toml`:
//! - Windows:  `%APPDATA%\RingBoost\`
//! - Linux:    `$XDG_CONFIG_HOME/ringboost/` or `~/.config/ringboost/`
//! - macOS:    `~/Library/Application Support/RingBoost/`
//!
//! Example:
//!
//! ```toml
//! [daemon]
//! log_level = "debug"
//! contacts_path = "/home/me/contacts.toml"
//! clear_snapshot_on_restore = true
//!
//! [audio]
//! max_ring_volume = 7
//! initial_mode = "vibrate"
//! initial_volume = 2
//! ```
//!
//! Every field has a serde default, so a missing file or a file written by an
//! older version still loads.

use std::path::{Path, PathBuf};

use ringboost_core::{RingerMode, RingerSnapshot};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name of the daemon configuration.
pub const CONFIG_FILE_NAME: &str = "daemon.toml";
/// File name of the settings store.
pub const SETTINGS_FILE_NAME: &str = "settings.toml";
/// File name of the default contact book.
pub const CONTACTS_FILE_NAME: &str = "contacts.toml";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

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

/// Top-level daemon configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DaemonConfig {
    #[serde(default)]
    pub daemon: DaemonSection,
    #[serde(default)]
    pub audio: AudioSection,
}

/// General daemon behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DaemonSection {
    /// `tracing` log level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Contact book location.  Defaults to `contacts.toml` next to this file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contacts_path: Option<PathBuf>,
    /// Remove the saved ringer snapshot once it has been restored.
    #[serde(default)]
    pub clear_snapshot_on_restore: bool,
}

/// Starting state of the simulated audio device.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioSection {
    /// Highest ring-stream volume step.
    #[serde(default = "default_max_ring_volume")]
    pub max_ring_volume: u32,
    /// Ringer mode at startup.
    #[serde(default = "default_initial_mode")]
    pub initial_mode: RingerMode,
    /// Ring volume at startup.
    #[serde(default = "default_initial_volume")]
    pub initial_volume: u32,
}

impl AudioSection {
    pub fn initial_state(&self) -> RingerSnapshot {
        RingerSnapshot::new(self.initial_mode, self.initial_volume)
    }
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_max_ring_volume() -> u32 {
    7
}
fn default_initial_mode() -> RingerMode {
    RingerMode::Normal
}
fn default_initial_volume() -> u32 {
    3
}

impl Default for DaemonSection {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            contacts_path: None,
            clear_snapshot_on_restore: false,
        }
    }
}

impl Default for AudioSection {
    fn default() -> Self {
        Self {
            max_ring_volume: default_max_ring_volume(),
            initial_mode: default_initial_mode(),
            initial_volume: default_initial_volume(),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for RingBoost files.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the default path of `daemon.toml`.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Resolves the default path of `settings.toml`.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn settings_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join(SETTINGS_FILE_NAME))
}

/// Contact book path: the configured one, or `contacts.toml` beside the
/// config file.
pub fn contacts_path(config: &DaemonConfig, config_path: &Path) -> PathBuf {
    match &config.daemon.contacts_path {
        Some(path) => path.clone(),
        None => config_path
            .parent()
            .map(|dir| dir.join(CONTACTS_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(CONTACTS_FILE_NAME)),
    }
}

/// Loads `DaemonConfig` from `path`, returning the default if the file does
/// not exist yet.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<DaemonConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(DaemonConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Resolves the platform config base directory including the `RingBoost`
/// subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("RingBoost"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("ringboost"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("RingBoost")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! SettingsStore: the durable key/value store behind [`BoostSettings`].
//!
//! Each [`SettingUpdate`] writes exactly one key.  Implementations must make
//! every update durable (flushed to stable storage, not just buffered) before
//! returning, because the call state machine relies on the saved snapshot
//! surviving a process crash between ringing and idle.

use ringboost_core::{BoostSettings, FilterMode, RingerSnapshot, VolumePercent};
use thiserror::Error;

/// Error type for settings store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Settings could not be read or decoded.
    #[error("settings unavailable: {0}")]
    Read(String),
    /// An update could not be committed durably.
    #[error("settings write failed: {0}")]
    Write(String),
}

/// A single-key write to the settings store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingUpdate {
    Enabled(bool),
    FilterMode(FilterMode),
    /// `None` means "use the device maximum".
    TargetVolumePercent(Option<VolumePercent>),
    /// `None` clears the saved pre-boost state.
    Snapshot(Option<RingerSnapshot>),
}

impl SettingUpdate {
    /// Applies the update to an in-memory settings value.
    pub fn apply_to(self, settings: &mut BoostSettings) {
        match self {
            SettingUpdate::Enabled(enabled) => settings.enabled = enabled,
            SettingUpdate::FilterMode(mode) => settings.filter_mode = mode,
            SettingUpdate::TargetVolumePercent(percent) => {
                settings.target_volume_percent = percent
            }
            SettingUpdate::Snapshot(snapshot) => settings.snapshot = snapshot,
        }
    }

    /// Key name used in logs.
    pub fn key(&self) -> &'static str {
        match self {
            SettingUpdate::Enabled(_) => "enabled",
            SettingUpdate::FilterMode(_) => "filter_mode",
            SettingUpdate::TargetVolumePercent(_) => "target_volume_percent",
            SettingUpdate::Snapshot(_) => "snapshot",
        }
    }
}

/// Durable storage for [`BoostSettings`].
///
/// Passed into the state machine as a handle so tests can substitute an
/// in-memory store.
#[cfg_attr(test, mockall::automock)]
pub trait SettingsStore: Send + Sync {
    /// Reads the current settings, returning first-run defaults when nothing
    /// has been stored yet.
    fn load(&self) -> Result<BoostSettings, StoreError>;

    /// Writes one key and commits it durably before returning.
    fn update(&self, update: SettingUpdate) -> Result<(), StoreError>;
}

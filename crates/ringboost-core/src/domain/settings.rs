//! User settings and the persisted pre-boost snapshot.
//!
//! Three values are edited by the user (enabled flag, filter mode, target
//! volume percentage).  The fourth, [`BoostSettings::snapshot`], is written
//! only by the call state machine.
//!
//! # Serde defaults
//!
//! Every field has a default so that a missing or partially written settings
//! file still yields a usable configuration on first run.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::ringer::RingerSnapshot;

/// Which callers qualify for a boost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Any caller found in the contact directory.
    #[default]
    All,
    /// Only callers whose directory entry is starred as a favorite.
    FavoritesOnly,
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterMode::All => f.write_str("all"),
            FilterMode::FavoritesOnly => f.write_str("favorites_only"),
        }
    }
}

/// Error returned when a filter mode name is not recognised.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown filter mode {0:?} (expected \"all\" or \"favorites\")")]
pub struct UnknownFilterMode(pub String);

impl FromStr for FilterMode {
    type Err = UnknownFilterMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "all_contacts" => Ok(FilterMode::All),
            "favorites" | "favorites_only" | "starred" => Ok(FilterMode::FavoritesOnly),
            other => Err(UnknownFilterMode(other.to_string())),
        }
    }
}

/// A ring volume percentage, always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct VolumePercent(u8);

impl VolumePercent {
    pub const MAX: VolumePercent = VolumePercent(100);

    /// Builds a percentage, clamping out-of-range input to `0..=100`.
    pub fn clamped(value: i64) -> Self {
        // Lossless: the clamp keeps the value within u8 range.
        Self(value.clamp(0, 100) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl<'de> Deserialize<'de> for VolumePercent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = i64::deserialize(deserializer)?;
        Ok(VolumePercent::clamped(raw))
    }
}

impl fmt::Display for VolumePercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Persisted RingBoost configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoostSettings {
    /// Master switch.  When `false`, ringing calls are never boosted.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Which callers qualify.
    #[serde(default)]
    pub filter_mode: FilterMode,
    /// Target ring volume as a share of the device maximum.  `None` means
    /// "use the device maximum".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_volume_percent: Option<VolumePercent>,
    /// Ringer state saved just before the most recent boost.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<RingerSnapshot>,
}

fn default_enabled() -> bool {
    true
}

impl Default for BoostSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            filter_mode: FilterMode::default(),
            target_volume_percent: None,
            snapshot: None,
        }
    }
}

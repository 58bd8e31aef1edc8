//! Ringer state domain types.
//!
//! A phone ringer has two independent knobs: the *mode* (silent, vibrate, or
//! normal) and the *ring-stream volume* (an integer step between zero and a
//! hardware-defined maximum).  A boost touches both, so a [`RingerSnapshot`]
//! records both.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::settings::VolumePercent;

/// The ringer mode reported and accepted by the audio device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RingerMode {
    /// No sound and no vibration.
    Silent,
    /// Vibration only.
    Vibrate,
    /// Audible ringing at the ring-stream volume.
    Normal,
}

impl fmt::Display for RingerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RingerMode::Silent => "silent",
            RingerMode::Vibrate => "vibrate",
            RingerMode::Normal => "normal",
        };
        f.write_str(name)
    }
}

/// Ringer mode and ring volume captured immediately before a boost.
///
/// Also used as the *target* state handed to the audio device, since a boost
/// and a restore are both "set this mode, then this volume".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingerSnapshot {
    /// Ringer mode at capture time.
    pub mode: RingerMode,
    /// Ring-stream volume step at capture time.
    pub volume: u32,
}

impl RingerSnapshot {
    /// State restored at call end when nothing was saved: silent, volume 0.
    ///
    /// Silence is preferred over guessing a volume that might be loud.
    pub const FALLBACK: RingerSnapshot = RingerSnapshot {
        mode: RingerMode::Silent,
        volume: 0,
    };

    pub fn new(mode: RingerMode, volume: u32) -> Self {
        Self { mode, volume }
    }

    /// Boosted state: normal mode at the given volume.
    pub fn boosted(volume: u32) -> Self {
        Self {
            mode: RingerMode::Normal,
            volume,
        }
    }
}

impl Default for RingerSnapshot {
    fn default() -> Self {
        Self::FALLBACK
    }
}

impl fmt::Display for RingerSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.mode, self.volume)
    }
}

/// Computes the ring volume to apply during a boost.
///
/// Returns `max_volume` when no percentage is configured.  Otherwise returns
/// `percent / 100 * max_volume` rounded half up, which can never exceed
/// `max_volume` because [`VolumePercent`] is already clamped to `0..=100`.
pub fn compute_target_volume(max_volume: u32, percent: Option<VolumePercent>) -> u32 {
    let Some(percent) = percent else {
        return max_volume;
    };
    let scaled = (u64::from(percent.get()) * u64::from(max_volume) + 50) / 100;
    // Fits in u32: scaled <= max_volume.
    u32::try_from(scaled).map_or(max_volume, |v| v.min(max_volume))
}

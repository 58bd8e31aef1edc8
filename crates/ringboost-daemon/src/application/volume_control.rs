//! VolumeController: reads and applies ringer state on the audio device.
//!
//! This use case sits at the application layer and delegates to an
//! [`AudioDevice`] trait object.  Concrete devices live in the infrastructure
//! layer.
//!
//! Failed device calls are never retried.  Without knowing what the device
//! actually ended up in, no compensating action is safe, so the error is
//! handed back to the caller and the current event is abandoned.

use std::sync::Arc;

use ringboost_core::{compute_target_volume, RingerMode, RingerSnapshot, VolumePercent};
use thiserror::Error;
use tracing::debug;

/// Error type for audio device operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// The platform refused access (authorization not granted).
    #[error("audio access denied: {0}")]
    AccessDenied(String),
    /// Any other device-side failure.
    #[error("audio device error: {0}")]
    Device(String),
}

/// Platform-agnostic ringer control.
///
/// All volumes refer to the ring stream.
#[cfg_attr(test, mockall::automock)]
pub trait AudioDevice: Send + Sync {
    /// Highest ring-stream volume step the hardware supports.
    fn max_ring_volume(&self) -> Result<u32, AudioError>;

    /// Current ring-stream volume step.
    fn ring_volume(&self) -> Result<u32, AudioError>;

    /// Sets the ring-stream volume step.
    fn set_ring_volume(&self, volume: u32) -> Result<(), AudioError>;

    /// Current ringer mode.
    fn ringer_mode(&self) -> Result<RingerMode, AudioError>;

    /// Sets the ringer mode.
    fn set_ringer_mode(&self, mode: RingerMode) -> Result<(), AudioError>;
}

/// Reads, computes, and applies ringer state.
pub struct VolumeController {
    device: Arc<dyn AudioDevice>,
}

impl VolumeController {
    pub fn new(device: Arc<dyn AudioDevice>) -> Self {
        Self { device }
    }

    /// Ring volume to use for a boost, given the configured percentage.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError`] if the device maximum cannot be read.
    pub fn target_volume(&self, percent: Option<VolumePercent>) -> Result<u32, AudioError> {
        let max = self.device.max_ring_volume()?;
        Ok(compute_target_volume(max, percent))
    }

    /// Applies `state`: ringer mode first, then ring volume.
    ///
    /// Mode goes first because some platforms clamp or ignore the ring volume
    /// depending on the current mode.
    ///
    /// # Errors
    ///
    /// Returns the first [`AudioError`]; the volume is not touched if setting
    /// the mode failed.
    pub fn apply(&self, state: RingerSnapshot) -> Result<(), AudioError> {
        self.device.set_ringer_mode(state.mode)?;
        self.device.set_ring_volume(state.volume)?;
        debug!(%state, "ringer state applied");
        Ok(())
    }

    /// Reads the current ringer mode and ring volume.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError`] if either value cannot be read.
    pub fn read_current(&self) -> Result<RingerSnapshot, AudioError> {
        let mode = self.device.ringer_mode()?;
        let volume = self.device.ring_volume()?;
        Ok(RingerSnapshot::new(mode, volume))
    }
}

//! Audio device adapters.
//!
//! # Why a simulated device?
//!
//! Real ringer control is a platform service (and needs platform
//! authorization) that a desktop host does not have.  `SimulatedAudioDevice`
//! keeps the ringer mode and ring volume in memory and records every call,
//! which serves both the headless daemon and the tests.  A platform build
//! swaps in its own [`AudioDevice`] implementation.
//!
//! # `deny_access` flag
//!
//! Set `deny_access(true)` to make every call fail with
//! [`AudioError::AccessDenied`], the failure a device without granted
//! permissions produces.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use ringboost_core::{RingerMode, RingerSnapshot};
use tracing::info;

use crate::application::volume_control::{AudioDevice, AudioError};

/// One call made against the simulated device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCall {
    ReadMaxVolume,
    ReadVolume,
    ReadMode,
    SetVolume(u32),
    SetMode(RingerMode),
}

/// In-memory ringer with a fixed maximum volume.
pub struct SimulatedAudioDevice {
    max_volume: u32,
    state: Mutex<RingerSnapshot>,
    calls: Mutex<Vec<AudioCall>>,
    deny_access: AtomicBool,
}

impl SimulatedAudioDevice {
    /// Creates a device with the given maximum and starting state.  The
    /// starting volume is clamped to the maximum.
    pub fn new(max_volume: u32, initial: RingerSnapshot) -> Self {
        Self {
            max_volume,
            state: Mutex::new(RingerSnapshot::new(
                initial.mode,
                initial.volume.min(max_volume),
            )),
            calls: Mutex::new(Vec::new()),
            deny_access: AtomicBool::new(false),
        }
    }

    /// Current ringer mode and volume, without recording a call.
    pub fn state(&self) -> RingerSnapshot {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every call made so far, oldest first.
    pub fn calls(&self) -> Vec<AudioCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// When `true`, every call fails with [`AudioError::AccessDenied`].
    pub fn deny_access(&self, deny: bool) {
        self.deny_access.store(deny, Ordering::SeqCst);
    }

    fn record(&self, call: AudioCall) -> Result<(), AudioError> {
        if self.deny_access.load(Ordering::SeqCst) {
            return Err(AudioError::AccessDenied(format!(
                "ringer access not granted ({call:?})"
            )));
        }
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
        Ok(())
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut RingerSnapshot) -> T) -> T {
        f(&mut self.state.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl AudioDevice for SimulatedAudioDevice {
    fn max_ring_volume(&self) -> Result<u32, AudioError> {
        self.record(AudioCall::ReadMaxVolume)?;
        Ok(self.max_volume)
    }

    fn ring_volume(&self) -> Result<u32, AudioError> {
        self.record(AudioCall::ReadVolume)?;
        Ok(self.with_state(|s| s.volume))
    }

    /// Sets the volume, clamping to the device maximum like real hardware.
    fn set_ring_volume(&self, volume: u32) -> Result<(), AudioError> {
        self.record(AudioCall::SetVolume(volume))?;
        let volume = volume.min(self.max_volume);
        self.with_state(|s| s.volume = volume);
        info!(volume, "ring volume set");
        Ok(())
    }

    fn ringer_mode(&self) -> Result<RingerMode, AudioError> {
        self.record(AudioCall::ReadMode)?;
        Ok(self.with_state(|s| s.mode))
    }

    fn set_ringer_mode(&self, mode: RingerMode) -> Result<(), AudioError> {
        self.record(AudioCall::SetMode(mode))?;
        self.with_state(|s| s.mode = mode);
        info!(%mode, "ringer mode set");
        Ok(())
    }
}

//! CallStateMachine: reacts to ringing/idle events by boosting and restoring
//! the ringer.
//!
//! The machine holds no state of its own between events.  The only thing that
//! crosses from a ringing event to the following idle event is the ringer
//! snapshot, and that lives in the [`SettingsStore`] so it survives a restart.
//!
//! # Ringing
//!
//! ```text
//! enabled? ──no──► Disabled
//!    │yes
//! caller matches filter? ──no──► NotMatched
//!    │yes
//! read ringer ─► persist snapshot ─► compute target ─► apply NORMAL@target
//! ```
//!
//! The snapshot is committed before the ringer is touched.  If the process
//! dies before the commit, nothing was changed; if it dies after, the next
//! idle event restores the saved state.
//!
//! # Idle
//!
//! Restore the saved snapshot, or `SILENT@0` when none exists.
//!
//! # Errors
//!
//! [`CallStateMachine::handle`] is the single entry point for event sources.
//! It never fails: audio and storage errors abort the current event and are
//! logged with the event kind and caller id.

use std::sync::{Arc, Mutex, PoisonError};

use ringboost_core::{CallEvent, RingerSnapshot};
use thiserror::Error;
use tracing::{debug, error, info};

use super::contact_filter::ContactFilter;
use super::settings_store::{SettingUpdate, SettingsStore, StoreError};
use super::volume_control::{AudioError, VolumeController};

/// Error type for a single event transition.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CallStateError {
    #[error(transparent)]
    Audio(#[from] AudioError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What a handled event did to the ringer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Ringing while the feature is switched off; nothing touched.
    Disabled,
    /// Ringing from a caller the filter rejected; nothing touched.
    NotMatched,
    /// Ringer boosted.  `saved` is the state that idle will restore.
    Boosted {
        saved: RingerSnapshot,
        applied: RingerSnapshot,
    },
    /// Ringer restored at call end.  `from_snapshot` is `false` when the
    /// silent fallback was used.
    Restored {
        applied: RingerSnapshot,
        from_snapshot: bool,
    },
}

/// Options that change how snapshots are managed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallStateOptions {
    /// Remove the snapshot after a successful restore.
    ///
    /// With this set, a present snapshot always means "a boost is pending",
    /// and a repeated ringing event for the same call keeps the original
    /// snapshot instead of capturing the already-boosted state.
    pub clear_snapshot_on_restore: bool,
}

/// The ringing/idle state machine.
pub struct CallStateMachine {
    store: Arc<dyn SettingsStore>,
    filter: ContactFilter,
    volume: VolumeController,
    options: CallStateOptions,
    /// Serializes whole events: store and audio access from one event never
    /// interleaves with another's.
    event_lock: Mutex<()>,
}

impl CallStateMachine {
    pub fn new(
        store: Arc<dyn SettingsStore>,
        filter: ContactFilter,
        volume: VolumeController,
        options: CallStateOptions,
    ) -> Self {
        Self {
            store,
            filter,
            volume,
            options,
            event_lock: Mutex::new(()),
        }
    }

    /// Handles one event, logging and swallowing any failure.
    ///
    /// Returns `None` when the event was aborted by an error.
    pub fn handle(&self, event: &CallEvent) -> Option<Transition> {
        match self.try_handle(event) {
            Ok(transition) => Some(transition),
            Err(e) => {
                error!(
                    event = event.kind(),
                    caller_id = event.caller_id().unwrap_or("<none>"),
                    "call event aborted: {e}"
                );
                None
            }
        }
    }

    /// Handles one event and reports the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`CallStateError::Audio`] if the device refused a read or write
    /// and [`CallStateError::Store`] if settings could not be read or the
    /// snapshot could not be committed.
    pub fn try_handle(&self, event: &CallEvent) -> Result<Transition, CallStateError> {
        // A panic in a previous event leaves nothing half-written that the
        // lock protects, so a poisoned lock is still usable.
        let _guard = self.event_lock.lock().unwrap_or_else(PoisonError::into_inner);
        match event {
            CallEvent::Ringing { caller_id } => self.on_ringing(caller_id.as_deref()),
            CallEvent::Idle => self.on_idle(),
        }
    }

    fn on_ringing(&self, caller_id: Option<&str>) -> Result<Transition, CallStateError> {
        let settings = self.store.load()?;
        if !settings.enabled {
            debug!("boost disabled; ignoring ringing call");
            return Ok(Transition::Disabled);
        }

        if !self.filter.matches(caller_id, settings.filter_mode) {
            debug!(caller_id = caller_id.unwrap_or("<none>"), "caller not eligible for boost");
            return Ok(Transition::NotMatched);
        }

        let saved = match settings.snapshot {
            Some(pending) if self.options.clear_snapshot_on_restore => {
                debug!(%pending, "boost already pending; keeping saved ringer state");
                pending
            }
            _ => {
                let current = self.volume.read_current()?;
                self.store.update(SettingUpdate::Snapshot(Some(current)))?;
                current
            }
        };

        let target = self.volume.target_volume(settings.target_volume_percent)?;
        let applied = RingerSnapshot::boosted(target);
        self.volume.apply(applied)?;

        info!(
            caller_id = caller_id.unwrap_or("<none>"),
            %saved,
            %applied,
            "ringer boosted"
        );
        Ok(Transition::Boosted { saved, applied })
    }

    fn on_idle(&self) -> Result<Transition, CallStateError> {
        let settings = self.store.load()?;
        let (applied, from_snapshot) = match settings.snapshot {
            Some(snapshot) => (snapshot, true),
            None => (RingerSnapshot::FALLBACK, false),
        };

        self.volume.apply(applied)?;

        if from_snapshot && self.options.clear_snapshot_on_restore {
            self.store.update(SettingUpdate::Snapshot(None))?;
        }

        info!(%applied, from_snapshot, "ringer restored");
        Ok(Transition::Restored {
            applied,
            from_snapshot,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! UpdateSettingsUseCase: applies the user-editable settings.
//!
//! The settings surface edits exactly three values: the enabled switch, the
//! contact filter mode, and the target volume percentage.  Each change is
//! written as its own key through [`SettingsStore::update`], so a snapshot
//! committed by the call state machine in between is kept.

use std::sync::Arc;

use ringboost_core::{BoostSettings, FilterMode, VolumePercent};
use tracing::info;

use super::settings_store::{SettingUpdate, SettingsStore, StoreError};

/// A batch of user edits.  `None` fields are left unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsChange {
    pub enabled: Option<bool>,
    pub filter_mode: Option<FilterMode>,
    /// `Some(None)` resets the target to the device maximum.
    pub target_volume_percent: Option<Option<VolumePercent>>,
}

impl SettingsChange {
    pub fn is_empty(&self) -> bool {
        self.enabled.is_none()
            && self.filter_mode.is_none()
            && self.target_volume_percent.is_none()
    }

    fn updates(self) -> impl Iterator<Item = SettingUpdate> {
        [
            self.enabled.map(SettingUpdate::Enabled),
            self.filter_mode.map(SettingUpdate::FilterMode),
            self.target_volume_percent
                .map(SettingUpdate::TargetVolumePercent),
        ]
        .into_iter()
        .flatten()
    }
}

/// Reads and edits user settings through a [`SettingsStore`].
pub struct UpdateSettingsUseCase {
    store: Arc<dyn SettingsStore>,
}

impl UpdateSettingsUseCase {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    /// Returns the stored settings.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] if the store cannot be read.
    pub fn current(&self) -> Result<BoostSettings, StoreError> {
        self.store.load()
    }

    /// Writes every field present in `change`, then returns the result.
    ///
    /// # Errors
    ///
    /// Returns the first [`StoreError`]; earlier keys in the batch stay
    /// written.
    pub fn apply(&self, change: SettingsChange) -> Result<BoostSettings, StoreError> {
        for update in change.updates() {
            self.store.update(update)?;
            match update {
                SettingUpdate::Enabled(enabled) => info!(enabled, "boost switched"),
                SettingUpdate::FilterMode(mode) => info!(%mode, "contact filter set"),
                SettingUpdate::TargetVolumePercent(Some(percent)) => {
                    info!("Ringer volume set to: {percent}")
                }
                SettingUpdate::TargetVolumePercent(None) => {
                    info!("Ringer volume set to: device maximum")
                }
                SettingUpdate::Snapshot(_) => {}
            }
        }
        self.store.load()
    }
}

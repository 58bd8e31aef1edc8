//! In-memory [`SettingsStore`] for tests and dry runs.
//!
//! Records every committed update so tests can assert on exactly what was
//! persisted and in what order.  Set [`MemorySettingsStore::fail_writes`] to
//! simulate a storage failure.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use ringboost_core::BoostSettings;

use crate::application::settings_store::{SettingUpdate, SettingsStore, StoreError};

/// A settings store that never touches the disk.
#[derive(Default)]
pub struct MemorySettingsStore {
    settings: Mutex<BoostSettings>,
    writes: Mutex<Vec<SettingUpdate>>,
    fail_writes: AtomicBool,
}

impl MemorySettingsStore {
    pub fn new(settings: BoostSettings) -> Self {
        Self {
            settings: Mutex::new(settings),
            ..Self::default()
        }
    }

    /// Current in-memory settings.
    pub fn current(&self) -> BoostSettings {
        self.settings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Every successful update, oldest first.
    pub fn writes(&self) -> Vec<SettingUpdate> {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// When `true`, every update fails with [`StoreError::Write`].
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<BoostSettings, StoreError> {
        Ok(self.current())
    }

    fn update(&self, update: SettingUpdate) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Write(format!(
                "injected failure writing {}",
                update.key()
            )));
        }
        update.apply_to(&mut self.settings.lock().unwrap_or_else(PoisonError::into_inner));
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(update);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_is_visible_and_recorded() {
        let store = MemorySettingsStore::default();

        store.update(SettingUpdate::Enabled(false)).unwrap();

        assert!(!store.load().unwrap().enabled);
        assert_eq!(store.writes(), vec![SettingUpdate::Enabled(false)]);
    }

    #[test]
    fn test_failed_write_changes_nothing() {
        let store = MemorySettingsStore::default();
        store.fail_writes(true);

        let result = store.update(SettingUpdate::Enabled(false));

        assert!(matches!(result, Err(StoreError::Write(_))));
        assert!(store.current().enabled);
        assert!(store.writes().is_empty());
    }
}

//! TOML file implementation of [`SettingsStore`].
//!
//! `settings.toml` holds the three user settings and the pre-boost snapshot:
//!
//! ```toml
//! enabled = true
//! filter_mode = "favorites_only"
//! target_volume_percent = 80
//!
//! [snapshot]
//! mode = "vibrate"
//! volume = 2
//! ```
//!
//! # Why write through a temp file? (for beginners)
//!
//! Writing straight into `settings.toml` is not crash safe: if power is lost
//! halfway through `write`, the file is left half old and half new, and the
//! saved ringer state is gone.  Instead every update:
//!
//! 1. writes the whole document to a fresh sibling file
//!    (`settings.toml.<uuid>.tmp`),
//! 2. calls `fsync` so the bytes are really on disk,
//! 3. renames the temp file over `settings.toml`, which the file system does
//!    atomically,
//! 4. `fsync`s the directory (Unix) so the rename itself survives a crash.
//!
//! A reader therefore sees either the old file or the new one, never a mix.
//!
//! # Several writers
//!
//! `ringboost run` and `ringboost set` are separate processes sharing one
//! file.  Each update holds an exclusive advisory lock on
//! `settings.toml.lock` from the read until the rename, so two writers cannot
//! drop each other's key.  Temp names are unique per write, so one writer's
//! rename never consumes another's temp file.  Readers take no lock.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use fs4::fs_std::FileExt;
use ringboost_core::BoostSettings;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::application::settings_store::{SettingUpdate, SettingsStore, StoreError};

/// Error type for settings file operations.
#[derive(Debug, Error)]
pub enum SettingsFileError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse settings TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The settings could not be serialized to TOML.
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl SettingsFileError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        SettingsFileError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Settings store backed by a TOML file.
pub struct TomlSettingsStore {
    path: PathBuf,
    /// Serializes updates from threads of this process; the lock file covers
    /// other processes.
    write_lock: Mutex<()>,
}

impl TomlSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the advisory lock file guarding updates.
    pub fn lock_path(&self) -> PathBuf {
        self.sibling(".lock")
    }

    /// Reads the file, returning defaults when it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsFileError::Io`] for errors other than "not found" and
    /// [`SettingsFileError::Parse`] for malformed TOML.
    pub fn read(&self) -> Result<BoostSettings, SettingsFileError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BoostSettings::default()),
            Err(e) => Err(SettingsFileError::io(&self.path, e)),
        }
    }

    /// Durably replaces the file with `settings`.
    ///
    /// Takes no lock; [`SettingsStore::update`] is the locked path.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsFileError::Io`] for file-system failures or
    /// [`SettingsFileError::Serialize`] if serialization fails.
    pub fn write(&self, settings: &BoostSettings) -> Result<(), SettingsFileError> {
        let content = toml::to_string_pretty(settings)?;

        let dir = self.ensure_dir()?;
        let temp_path = self.sibling(&format!(".{}.tmp", Uuid::new_v4().simple()));

        if let Err(e) = write_synced(&temp_path, content.as_bytes()) {
            fs::remove_file(&temp_path).ok();
            return Err(e);
        }

        if let Err(e) = fs::rename(&temp_path, &self.path) {
            fs::remove_file(&temp_path).ok();
            return Err(SettingsFileError::io(&self.path, e));
        }

        // Persist the rename itself.
        #[cfg(unix)]
        File::open(&dir)
            .and_then(|d| d.sync_all())
            .map_err(|e| SettingsFileError::io(&dir, e))?;
        #[cfg(not(unix))]
        let _ = dir;

        Ok(())
    }

    /// Opens the lock file and blocks until this handle holds it exclusively.
    /// The lock is released when the returned file is dropped.
    fn lock_exclusive(&self) -> Result<File, SettingsFileError> {
        self.ensure_dir()?;
        let lock_path = self.lock_path();
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| SettingsFileError::io(&lock_path, e))?;
        file.lock_exclusive()
            .map_err(|e| SettingsFileError::io(&lock_path, e))?;
        Ok(file)
    }

    fn ensure_dir(&self) -> Result<PathBuf, SettingsFileError> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| SettingsFileError::io(&dir, e))?;
        Ok(dir)
    }

    /// `settings.toml` + `suffix`, in the same directory.
    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name: OsString = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("settings.toml"));
        name.push(suffix);
        self.path.with_file_name(name)
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<(), SettingsFileError> {
    let mut file = File::create(path).map_err(|e| SettingsFileError::io(path, e))?;
    file.write_all(bytes)
        .map_err(|e| SettingsFileError::io(path, e))?;
    file.sync_all().map_err(|e| SettingsFileError::io(path, e))
}

impl SettingsStore for TomlSettingsStore {
    fn load(&self) -> Result<BoostSettings, StoreError> {
        self.read().map_err(|e| StoreError::Read(e.to_string()))
    }

    fn update(&self, update: SettingUpdate) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let lock_file = self
            .lock_exclusive()
            .map_err(|e| StoreError::Write(e.to_string()))?;

        let mut settings = self.read().map_err(|e| StoreError::Read(e.to_string()))?;
        update.apply_to(&mut settings);
        self.write(&settings)
            .map_err(|e| StoreError::Write(e.to_string()))?;

        if let Err(e) = FileExt::unlock(&lock_file) {
            // Closing the handle below releases it anyway.
            warn!(path = %self.lock_path().display(), "settings lock release failed: {e}");
        }
        debug!(key = update.key(), path = %self.path.display(), "settings committed");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ringboost_core::{FilterMode, RingerMode, RingerSnapshot, VolumePercent};

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "ringboost_settings_{tag}_{}_{:?}",
            std::process::id(),
            std::thread::current().id()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let store = TomlSettingsStore::new("/nonexistent/ringboost/settings.toml");
        assert_eq!(store.load().unwrap(), BoostSettings::default());
    }

    #[test]
    fn test_snapshot_survives_a_new_store_instance() {
        // Arrange
        let dir = temp_dir("restart");
        let path = dir.join("settings.toml");
        let snapshot = RingerSnapshot::new(RingerMode::Vibrate, 2);

        // Act – write with one instance, read with a fresh one (simulated restart)
        TomlSettingsStore::new(&path)
            .update(SettingUpdate::Snapshot(Some(snapshot)))
            .unwrap();
        let reloaded = TomlSettingsStore::new(&path).load().unwrap();

        // Assert
        assert_eq!(reloaded.snapshot, Some(snapshot));
        assert!(reloaded.enabled);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_updates_preserve_other_keys() {
        // Arrange
        let dir = temp_dir("keys");
        let store = TomlSettingsStore::new(dir.join("settings.toml"));

        // Act
        store.update(SettingUpdate::Enabled(false)).unwrap();
        store
            .update(SettingUpdate::FilterMode(FilterMode::FavoritesOnly))
            .unwrap();
        store
            .update(SettingUpdate::TargetVolumePercent(Some(VolumePercent::clamped(40))))
            .unwrap();
        store
            .update(SettingUpdate::Snapshot(Some(RingerSnapshot::FALLBACK)))
            .unwrap();

        // Assert
        let settings = store.load().unwrap();
        assert!(!settings.enabled);
        assert_eq!(settings.filter_mode, FilterMode::FavoritesOnly);
        assert_eq!(settings.target_volume_percent, Some(VolumePercent::clamped(40)));
        assert_eq!(settings.snapshot, Some(RingerSnapshot::FALLBACK));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_clearing_snapshot_removes_table() {
        let dir = temp_dir("clear");
        let path = dir.join("settings.toml");
        let store = TomlSettingsStore::new(&path);

        store
            .update(SettingUpdate::Snapshot(Some(RingerSnapshot::boosted(4))))
            .unwrap();
        store.update(SettingUpdate::Snapshot(None)).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(!text.contains("[snapshot]"));
        assert_eq!(store.load().unwrap().snapshot, None);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_write_leaves_no_temp_file_behind() {
        let dir = temp_dir("temp");
        let store = TomlSettingsStore::new(dir.join("settings.toml"));

        store.update(SettingUpdate::Enabled(true)).unwrap();

        let leftovers: Vec<_> = fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
        assert!(dir.join("settings.toml").exists());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_write_creates_missing_directory() {
        let dir = temp_dir("mkdir");
        let path = dir.join("nested").join("settings.toml");
        let store = TomlSettingsStore::new(&path);

        store.update(SettingUpdate::Enabled(false)).unwrap();

        assert!(path.exists());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_corrupt_file_is_a_read_error() {
        let dir = temp_dir("corrupt");
        let path = dir.join("settings.toml");
        fs::write(&path, "enabled = \"maybe\"").unwrap();
        let store = TomlSettingsStore::new(&path);

        assert!(matches!(store.load(), Err(StoreError::Read(_))));
        assert!(matches!(
            store.update(SettingUpdate::Enabled(true)),
            Err(StoreError::Read(_))
        ));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unwritable_location_is_a_write_error() {
        let dir = temp_dir("blocked");
        // A regular file where the parent directory should be.
        let blocker = dir.join("blocker");
        fs::write(&blocker, "").unwrap();
        let store = TomlSettingsStore::new(blocker.join("settings.toml"));

        // Reading under a file path is NotADirectory, not NotFound, on most
        // platforms; only assert on the write path.
        let result = store.write(&BoostSettings::default());
        assert!(matches!(result, Err(SettingsFileError::Io { .. })));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_two_stores_on_one_file_keep_every_write() {
        // Arrange – two handles on the same path, as `run` and `set` would hold.
        let dir = temp_dir("shared");
        let path = dir.join("settings.toml");
        let daemon = std::sync::Arc::new(TomlSettingsStore::new(&path));
        let cli = std::sync::Arc::new(TomlSettingsStore::new(&path));
        const ROUNDS: u32 = 100;

        // Act
        let snapshot_writer = {
            let daemon = std::sync::Arc::clone(&daemon);
            std::thread::spawn(move || {
                (0..ROUNDS)
                    .map(|i| {
                        daemon.update(SettingUpdate::Snapshot(Some(RingerSnapshot::new(
                            RingerMode::Vibrate,
                            i,
                        ))))
                    })
                    .filter(|r| r.is_err())
                    .count()
            })
        };
        let enabled_writer = {
            let cli = std::sync::Arc::clone(&cli);
            std::thread::spawn(move || {
                (0..ROUNDS)
                    .map(|i| cli.update(SettingUpdate::Enabled(i % 2 == 0)))
                    .filter(|r| r.is_err())
                    .count()
            })
        };
        let snapshot_failures = snapshot_writer.join().unwrap();
        let enabled_failures = enabled_writer.join().unwrap();

        // Assert – no write failed and neither key lost the other's last value.
        assert_eq!(snapshot_failures, 0);
        assert_eq!(enabled_failures, 0);
        let settings = TomlSettingsStore::new(&path).load().unwrap();
        assert_eq!(
            settings.snapshot,
            Some(RingerSnapshot::new(RingerMode::Vibrate, ROUNDS - 1))
        );
        assert_eq!(settings.enabled, (ROUNDS - 1) % 2 == 0);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_update_holds_lock_file_next_to_settings() {
        let dir = temp_dir("lockfile");
        let store = TomlSettingsStore::new(dir.join("settings.toml"));

        store.update(SettingUpdate::Enabled(false)).unwrap();

        assert_eq!(store.lock_path(), dir.join("settings.toml.lock"));
        assert!(store.lock_path().exists());
        // The lock is free again once the update returns.
        let file = OpenOptions::new()
            .write(true)
            .open(store.lock_path())
            .unwrap();
        FileExt::lock_exclusive(&file).unwrap();
        FileExt::unlock(&file).unwrap();

        fs::remove_dir_all(&dir).ok();
    }
}

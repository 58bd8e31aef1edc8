//! Storage infrastructure: settings and daemon configuration persistence.
//!
//! - `config`        – `daemon.toml`: log level, contact book path, snapshot
//!   policy, and simulated audio defaults.  Also resolves the platform config
//!   directory.
//! - `settings_file` – `settings.toml`: the durable [`SettingsStore`] used by
//!   the call state machine.
//! - `memory`        – an in-memory [`SettingsStore`] for tests and dry runs.
//!
//! [`SettingsStore`]: crate::application::settings_store::SettingsStore

pub mod config;
pub mod memory;
pub mod settings_file;

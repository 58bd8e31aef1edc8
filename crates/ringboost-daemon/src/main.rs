//! RingBoost daemon entry point.
//!
//! Wires the settings store, contact directory, and audio device into the
//! call state machine, then feeds it events from stdin (or a file) until the
//! input ends or Ctrl-C is pressed.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load daemon.toml           -- log level, contacts path, snapshot policy
//!  └─ run
//!       ├─ spawn_line_source()   -- stdin/file lines -> CallEvent channel
//!       └─ pump_events()         -- CallEvent -> CallStateMachine
//!  └─ set / show                 -- edit or print settings.toml
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ringboost_core::{FilterMode, VolumePercent};
use ringboost_daemon::application::{
    call_state::{CallStateMachine, CallStateOptions},
    contact_filter::ContactFilter,
    update_settings::{SettingsChange, UpdateSettingsUseCase},
    volume_control::VolumeController,
};
use ringboost_daemon::infrastructure::{
    audio::SimulatedAudioDevice,
    contacts::TomlContactDirectory,
    storage::{
        config::{self, DaemonConfig},
        settings_file::TomlSettingsStore,
    },
    telephony::{pump_events, spawn_line_source},
};

/// Raise the ringer for calls from your contacts, and put it back afterwards.
#[derive(Debug, Parser)]
#[command(name = "ringboost", version, about)]
struct Cli {
    /// Path to daemon.toml.
    #[arg(long, global = true, env = "RINGBOOST_CONFIG")]
    config: Option<PathBuf>,

    /// Path to settings.toml (user settings and the saved ringer state).
    #[arg(long, global = true, env = "RINGBOOST_SETTINGS")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// React to call events read from stdin or a file.
    Run {
        /// Read events from this file instead of stdin.
        #[arg(long)]
        events: Option<PathBuf>,
    },
    /// Change user settings.
    Set(SetArgs),
    /// Print the current settings.
    Show,
}

#[derive(Debug, Args)]
struct SetArgs {
    /// Turn boosting on or off.
    #[arg(long)]
    enabled: Option<bool>,

    /// Which callers qualify: "all" or "favorites".
    #[arg(long)]
    filter: Option<FilterMode>,

    /// Target ring volume as a percentage of the device maximum (0-100).
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100), conflicts_with = "max")]
    volume: Option<u8>,

    /// Ring at the device maximum.
    #[arg(long)]
    max: bool,
}

impl SetArgs {
    fn into_change(self) -> SettingsChange {
        let target_volume_percent = if self.max {
            Some(None)
        } else {
            self.volume.map(|v| Some(VolumePercent::clamped(i64::from(v))))
        };
        SettingsChange {
            enabled: self.enabled,
            filter_mode: self.filter,
            target_volume_percent,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => config::config_file_path().context("resolving daemon.toml location")?,
    };
    let daemon_config = config::load_config(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    // Structured logging.  `RUST_LOG` overrides the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&daemon_config.daemon.log_level)),
        )
        .init();

    let settings_path = match cli.settings {
        Some(path) => path,
        None => config::settings_file_path().context("resolving settings.toml location")?,
    };
    let store = Arc::new(TomlSettingsStore::new(settings_path));

    match cli.command {
        Command::Run { events } => run(&daemon_config, &config_path, store, events).await,
        Command::Set(args) => {
            let change = args.into_change();
            if change.is_empty() {
                bail!("nothing to change; pass --enabled, --filter, --volume or --max");
            }
            let settings = UpdateSettingsUseCase::new(store)
                .apply(change)
                .context("saving settings")?;
            print!("{}", toml::to_string_pretty(&settings)?);
            Ok(())
        }
        Command::Show => {
            let settings = UpdateSettingsUseCase::new(store)
                .current()
                .context("reading settings")?;
            print!("{}", toml::to_string_pretty(&settings)?);
            Ok(())
        }
    }
}

async fn run(
    daemon_config: &DaemonConfig,
    config_path: &std::path::Path,
    store: Arc<TomlSettingsStore>,
    events: Option<PathBuf>,
) -> anyhow::Result<()> {
    let contacts = Arc::new(TomlContactDirectory::new(config::contacts_path(
        daemon_config,
        config_path,
    )));
    if !contacts.path().exists() {
        warn!(
            path = %contacts.path().display(),
            "contact book not found; no caller will match until it exists"
        );
    }

    let audio = &daemon_config.audio;
    // Platform builds replace the simulated device with a real ringer adapter.
    let device = Arc::new(SimulatedAudioDevice::new(
        audio.max_ring_volume,
        audio.initial_state(),
    ));

    let machine = Arc::new(CallStateMachine::new(
        store.clone(),
        ContactFilter::new(contacts.clone()),
        VolumeController::new(device),
        CallStateOptions {
            clear_snapshot_on_restore: daemon_config.daemon.clear_snapshot_on_restore,
        },
    ));

    let (rx, _reader) = match &events {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("opening event file {}", path.display()))?;
            spawn_line_source(BufReader::new(file))
        }
        None => spawn_line_source(BufReader::new(tokio::io::stdin())),
    };

    info!(
        settings = %store.path().display(),
        contacts = %contacts.path().display(),
        "RingBoost ready; waiting for call events"
    );

    tokio::select! {
        stats = pump_events(machine, rx) => {
            info!(events = stats.total(), "RingBoost stopped");
        }
        result = tokio::signal::ctrl_c() => {
            result.context("listening for Ctrl-C")?;
            info!("shutdown signal received");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_set(args: &[&str]) -> SettingsChange {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Set(args) => args.into_change(),
            other => panic!("expected set, got {other:?}"),
        }
    }

    #[test]
    fn test_set_volume_percent() {
        let change = parse_set(&["ringboost", "set", "--volume", "40"]);
        assert_eq!(
            change.target_volume_percent,
            Some(Some(VolumePercent::clamped(40)))
        );
        assert!(change.enabled.is_none());
    }

    #[test]
    fn test_set_max_clears_percent() {
        let change = parse_set(&["ringboost", "set", "--max", "--filter", "favorites"]);
        assert_eq!(change.target_volume_percent, Some(None));
        assert_eq!(change.filter_mode, Some(FilterMode::FavoritesOnly));
    }

    #[test]
    fn test_volume_and_max_conflict() {
        assert!(Cli::try_parse_from(["ringboost", "set", "--volume", "10", "--max"]).is_err());
    }

    #[test]
    fn test_volume_out_of_range_is_rejected() {
        assert!(Cli::try_parse_from(["ringboost", "set", "--volume", "101"]).is_err());
    }

    #[test]
    fn test_global_paths_after_subcommand() {
        let cli = Cli::try_parse_from([
            "ringboost",
            "run",
            "--settings",
            "/tmp/s.toml",
            "--events",
            "calls.txt",
        ])
        .unwrap();
        assert_eq!(cli.settings, Some(PathBuf::from("/tmp/s.toml")));
        assert!(matches!(cli.command, Command::Run { events: Some(_) }));
    }
}

//! Telephony event source: turns a line stream into call events.
//!
//! A reader task decodes one event per line (see
//! [`ringboost_core::protocol::call_event`]) and forwards it over a bounded
//! Tokio channel.  Malformed lines are logged and skipped; they never stop the
//! stream.
//!
//! [`pump_events`] drains the channel into the [`CallStateMachine`] one event
//! at a time.  Each event runs on the blocking pool because handling it
//! performs synchronous, fsynced file writes.

use std::sync::Arc;

use ringboost_core::{decode_event, CallEvent};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::application::call_state::{CallStateMachine, Transition};

/// Capacity of the event channel between the reader task and the pump.
pub const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Spawns a task reading events from `reader` until EOF.
///
/// Returns the receiving end of the event channel and the reader task handle.
/// The channel closes when the reader reaches EOF or hits an I/O error.
pub fn spawn_line_source<R>(reader: R) -> (mpsc::Receiver<CallEvent>, JoinHandle<()>)
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let handle = tokio::spawn(async move {
        let mut lines = reader.lines();
        let mut line_no = 0usize;
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    debug!(lines = line_no, "event source reached end of input");
                    break;
                }
                Err(e) => {
                    error!("event source read failed: {e}");
                    break;
                }
            };
            line_no += 1;

            match decode_event(&line) {
                Ok(Some(event)) => {
                    if tx.send(event).await.is_err() {
                        debug!("event receiver dropped; stopping source");
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => warn!(line = line_no, "skipping event line: {e}"),
            }
        }
    });
    (rx, handle)
}

/// Counters reported when the pump stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpStats {
    pub boosted: usize,
    pub restored: usize,
    /// Ringing events that were disabled or did not match.
    pub skipped: usize,
    /// Events aborted by an audio or storage error.
    pub failed: usize,
}

impl PumpStats {
    fn record(&mut self, outcome: Option<Transition>) {
        match outcome {
            Some(Transition::Boosted { .. }) => self.boosted += 1,
            Some(Transition::Restored { .. }) => self.restored += 1,
            Some(Transition::Disabled | Transition::NotMatched) => self.skipped += 1,
            None => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.boosted + self.restored + self.skipped + self.failed
    }
}

/// Feeds every received event to `machine`, in order, until the channel
/// closes.
pub async fn pump_events(
    machine: Arc<CallStateMachine>,
    mut rx: mpsc::Receiver<CallEvent>,
) -> PumpStats {
    let mut stats = PumpStats::default();
    while let Some(event) = rx.recv().await {
        debug!(%event, "call event received");
        let machine = Arc::clone(&machine);
        let outcome = match tokio::task::spawn_blocking(move || machine.handle(&event)).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("call event handler panicked: {e}");
                None
            }
        };
        stats.record(outcome);
    }
    info!(
        boosted = stats.boosted,
        restored = stats.restored,
        skipped = stats.skipped,
        failed = stats.failed,
        "event stream closed"
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::call_state::CallStateOptions;
    use crate::application::contact_filter::ContactFilter;
    use crate::application::volume_control::VolumeController;
    use crate::infrastructure::audio::SimulatedAudioDevice;
    use crate::infrastructure::contacts::{Contact, ContactBook};
    use crate::infrastructure::storage::memory::MemorySettingsStore;
    use ringboost_core::{BoostSettings, RingerMode, RingerSnapshot, VolumePercent};
    use std::io::Cursor;

    async fn collect(input: &str) -> Vec<CallEvent> {
        let (mut rx, handle) = spawn_line_source(Cursor::new(input.as_bytes().to_vec()));
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        handle.await.unwrap();
        events
    }

    #[tokio::test]
    async fn test_line_source_decodes_events_in_order() {
        let events = collect("RINGING 5551234567\nOFFHOOK\nIDLE\n").await;
        assert_eq!(events, vec![CallEvent::ringing("5551234567"), CallEvent::Idle]);
    }

    #[tokio::test]
    async fn test_line_source_skips_bad_lines() {
        let events = collect("# script\nHANGUP\n{not json\n\nIDLE").await;
        assert_eq!(events, vec![CallEvent::Idle]);
    }

    #[tokio::test]
    async fn test_pump_drives_state_machine() {
        // Arrange
        let store = Arc::new(MemorySettingsStore::new(BoostSettings {
            target_volume_percent: Some(VolumePercent::clamped(50)),
            ..BoostSettings::default()
        }));
        let device = Arc::new(SimulatedAudioDevice::new(
            10,
            RingerSnapshot::new(RingerMode::Normal, 3),
        ));
        let machine = Arc::new(CallStateMachine::new(
            Arc::clone(&store) as _,
            ContactFilter::new(Arc::new(ContactBook::new(vec![Contact::new(
                "Mom",
                "15551234567",
                false,
            )]))),
            VolumeController::new(Arc::clone(&device) as _),
            CallStateOptions::default(),
        ));
        let (rx, _handle) = spawn_line_source(Cursor::new(
            b"RINGING +1 (555) 123-4567\nIDLE\nRINGING 5550000000\nIDLE\n".to_vec(),
        ));

        // Act
        let stats = pump_events(machine, rx).await;

        // Assert
        assert_eq!(
            stats,
            PumpStats {
                boosted: 1,
                restored: 2,
                skipped: 1,
                failed: 0,
            }
        );
        assert_eq!(stats.total(), 4);
        // The second idle restores the (stale) snapshot again.
        assert_eq!(device.state(), RingerSnapshot::new(RingerMode::Normal, 3));
    }

    #[tokio::test]
    async fn test_pump_counts_failures() {
        let device = Arc::new(SimulatedAudioDevice::new(10, RingerSnapshot::FALLBACK));
        device.deny_access(true);
        let machine = Arc::new(CallStateMachine::new(
            Arc::new(MemorySettingsStore::default()),
            ContactFilter::new(Arc::new(ContactBook::default())),
            VolumeController::new(device),
            CallStateOptions::default(),
        ));
        let (tx, rx) = mpsc::channel(4);
        tx.send(CallEvent::Idle).await.unwrap();
        drop(tx);

        let stats = pump_events(machine, rx).await;

        assert_eq!(stats.failed, 1);
    }
}

//! Application layer use cases for the daemon.
//!
//! Use cases in this layer orchestrate domain rules from `ringboost-core` and
//! depend only on traits for the outside world (contact directory, audio
//! device, settings store).  No file system access or OS calls happen here,
//! so every use case is unit-testable with in-memory doubles.
//!
//! # Sub-modules
//!
//! - **`settings_store`**  – Trait for the durable settings/snapshot store.
//! - **`contact_filter`**  – Decides whether a caller qualifies for a boost.
//! - **`volume_control`**  – Reads and applies ringer state on the audio device.
//! - **`call_state`**      – The ringing/idle state machine tying it together.
//! - **`update_settings`** – Applies the three user-editable settings.

pub mod call_state;
pub mod contact_filter;
pub mod settings_store;
pub mod update_settings;
pub mod volume_control;

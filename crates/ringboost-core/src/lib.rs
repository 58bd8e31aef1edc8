//! # ringboost-core
//!
//! Shared library for RingBoost containing the ringer domain types, caller-id
//! matching rules, and the call-event line codec.
//!
//! This crate has zero dependencies on OS APIs, file systems, or audio stacks.
//! The daemon crate wires it to real (or simulated) collaborators.
//!
//! # Architecture overview
//!
//! RingBoost watches the phone's call state.  When a call rings from a number
//! found in the contact directory, it saves the current ringer mode and volume,
//! raises the ringer to a configured level, and puts everything back when the
//! call ends.
//!
//! - **`domain`** – Pure rules: ringer modes and snapshots, the target-volume
//!   computation, user settings, and phone-number suffix normalization.
//!
//! - **`protocol`** – How call-state events are represented and decoded from
//!   the telephony event source.

pub mod domain;
pub mod protocol;

pub use domain::phone::{caller_suffix, normalize_digits, CallerSuffix, SUFFIX_DIGITS};
pub use domain::ringer::{compute_target_volume, RingerMode, RingerSnapshot};
pub use domain::settings::{BoostSettings, FilterMode, VolumePercent};
pub use protocol::call_event::{decode_event, CallEvent, ProtocolError};

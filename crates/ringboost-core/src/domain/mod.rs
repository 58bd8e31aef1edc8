//! Domain entities for RingBoost.
//!
//! This module contains pure business logic with no infrastructure
//! dependencies.  Everything here can be compiled and tested on any platform
//! without a phone, a contact database, or an audio device.

/// Caller-id normalization and suffix matching.
pub mod phone;

/// Ringer modes, snapshots, and the target-volume computation.
pub mod ringer;

/// User-editable settings and the persisted snapshot slot.
pub mod settings;

//! ringboost-daemon library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does the daemon do?
//!
//! 1. Receives call-state events (ringing with a caller id, or idle) from a
//!    telephony event source.
//! 2. On ringing, checks the caller against the contact directory.  For a
//!    match it saves the current ringer mode and volume to the settings file,
//!    then switches the ringer to normal mode at the configured volume.
//! 3. On idle, restores the saved ringer state.
//!
//! The saved state lives on disk, so a daemon restart between ringing and
//! idle still restores the ringer correctly.

/// Application layer: the call state machine and its collaborators' traits.
pub mod application;

/// Infrastructure layer: settings file, contact directory, audio device, and
/// event source adapters.
pub mod infrastructure;

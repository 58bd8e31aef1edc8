//! Infrastructure layer for the daemon.
//!
//! Contains the adapters behind the application traits: TOML settings and
//! config files, the contact book, the simulated audio device, and the
//! line-oriented telephony event source.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `ringboost_core`, but MUST NOT be imported by the `application` layer
//! outside of tests.

pub mod audio;
pub mod contacts;
pub mod storage;
pub mod telephony;

//! Protocol module containing the call-state event type and its line codec.

pub mod call_event;

pub use call_event::{decode_event, CallEvent, ProtocolError};

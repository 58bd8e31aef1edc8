//! Call-state events and the line codec used by the telephony event source.
//!
//! Each event is one line of UTF-8 text in either of two forms:
//!
//! ```text
//! RINGING +1 (555) 123-4567
//! IDLE
//! {"state": "RINGING", "incoming_number": "+15551234567"}
//! {"state": "IDLE"}
//! ```
//!
//! The JSON form mirrors the extras carried by a platform phone-state
//! broadcast.  State names are case-insensitive and may carry the
//! `EXTRA_STATE_` prefix used by the platform constants.
//!
//! Only ringing and idle drive the state machine.  `OFFHOOK` (call answered)
//! is a valid state that decodes to `Ok(None)`, as do blank lines and `#`
//! comments.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while decoding an event line.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The state token is not a known call state.
    #[error("unknown call state: {0:?}")]
    UnknownState(String),

    /// The line looked like JSON but could not be parsed.
    #[error("malformed JSON event: {0}")]
    MalformedJson(#[from] serde_json::Error),
}

/// A call-state transition delivered by the telephony event source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallEvent {
    /// An incoming call is ringing.  `caller_id` is `None` when the number is
    /// withheld or was not delivered.
    Ringing { caller_id: Option<String> },
    /// No call is active any more.
    Idle,
}

impl CallEvent {
    /// Builds a ringing event, mapping an empty or blank caller id to `None`.
    pub fn ringing(caller_id: impl Into<String>) -> Self {
        let caller_id: String = caller_id.into();
        let trimmed = caller_id.trim();
        CallEvent::Ringing {
            caller_id: (!trimmed.is_empty()).then(|| trimmed.to_string()),
        }
    }

    /// Short lowercase name used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            CallEvent::Ringing { .. } => "ringing",
            CallEvent::Idle => "idle",
        }
    }

    /// The caller id for ringing events, if one was delivered.
    pub fn caller_id(&self) -> Option<&str> {
        match self {
            CallEvent::Ringing { caller_id } => caller_id.as_deref(),
            CallEvent::Idle => None,
        }
    }
}

impl fmt::Display for CallEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallEvent::Ringing {
                caller_id: Some(id),
            } => write!(f, "RINGING {id}"),
            CallEvent::Ringing { caller_id: None } => f.write_str("RINGING"),
            CallEvent::Idle => f.write_str("IDLE"),
        }
    }
}

/// Raw call state as named by the event source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallState {
    Ringing,
    OffHook,
    Idle,
}

fn parse_state(token: &str) -> Result<CallState, ProtocolError> {
    let upper = token.trim().to_ascii_uppercase();
    let name = upper.strip_prefix("EXTRA_STATE_").unwrap_or(&upper);
    match name {
        "RINGING" => Ok(CallState::Ringing),
        "OFFHOOK" | "OFF_HOOK" => Ok(CallState::OffHook),
        "IDLE" => Ok(CallState::Idle),
        _ => Err(ProtocolError::UnknownState(token.trim().to_string())),
    }
}

/// JSON shape of a broadcast-style event.
#[derive(Debug, Deserialize)]
struct BroadcastEvent {
    state: String,
    #[serde(default)]
    incoming_number: Option<String>,
}

fn into_event(state: CallState, number: Option<String>) -> Option<CallEvent> {
    match state {
        CallState::Ringing => Some(CallEvent::ringing(number.unwrap_or_default())),
        CallState::Idle => Some(CallEvent::Idle),
        CallState::OffHook => {
            debug!("ignoring off-hook call state");
            None
        }
    }
}

/// Decodes one event line.
///
/// Returns `Ok(None)` for blank lines, comments, and states that do not drive
/// the state machine.
///
/// # Errors
///
/// Returns [`ProtocolError::UnknownState`] for an unrecognised state token and
/// [`ProtocolError::MalformedJson`] when a `{`-prefixed line is not valid JSON.
///
/// # Examples
///
/// ```rust
/// use ringboost_core::{decode_event, CallEvent};
///
/// let event = decode_event("RINGING +1 555 123 4567").unwrap();
/// assert_eq!(event, Some(CallEvent::ringing("+1 555 123 4567")));
/// assert_eq!(decode_event("idle").unwrap(), Some(CallEvent::Idle));
/// ```
pub fn decode_event(line: &str) -> Result<Option<CallEvent>, ProtocolError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    if line.starts_with('{') {
        let raw: BroadcastEvent = serde_json::from_str(line)?;
        let state = parse_state(&raw.state)?;
        return Ok(into_event(state, raw.incoming_number));
    }

    let (token, rest) = match line.split_once(char::is_whitespace) {
        Some((token, rest)) => (token, Some(rest.to_string())),
        None => (line, None),
    };
    let state = parse_state(token)?;
    Ok(into_event(state, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain_ringing_keeps_formatted_number() {
        let event = decode_event("RINGING +1 (555) 123-4567").unwrap();
        assert_eq!(
            event,
            Some(CallEvent::Ringing {
                caller_id: Some("+1 (555) 123-4567".to_string())
            })
        );
    }

    #[test]
    fn test_decode_ringing_without_number_has_no_caller() {
        let event = decode_event("ringing").unwrap();
        assert_eq!(event, Some(CallEvent::Ringing { caller_id: None }));
    }

    #[test]
    fn test_decode_idle_is_case_insensitive() {
        assert_eq!(decode_event("IDLE").unwrap(), Some(CallEvent::Idle));
        assert_eq!(decode_event("  Idle  ").unwrap(), Some(CallEvent::Idle));
    }

    #[test]
    fn test_decode_accepts_platform_state_prefix() {
        assert_eq!(
            decode_event("EXTRA_STATE_IDLE").unwrap(),
            Some(CallEvent::Idle)
        );
    }

    #[test]
    fn test_decode_offhook_is_ignored() {
        assert_eq!(decode_event("OFFHOOK").unwrap(), None);
    }

    #[test]
    fn test_decode_blank_and_comment_lines_are_ignored() {
        assert_eq!(decode_event("").unwrap(), None);
        assert_eq!(decode_event("   ").unwrap(), None);
        assert_eq!(decode_event("# test script").unwrap(), None);
    }

    #[test]
    fn test_decode_unknown_state_is_an_error() {
        let err = decode_event("DIALING 555").unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownState(s) if s == "DIALING"));
    }

    #[test]
    fn test_decode_json_broadcast_ringing() {
        let event =
            decode_event(r#"{"state": "RINGING", "incoming_number": "+15551234567"}"#).unwrap();
        assert_eq!(event, Some(CallEvent::ringing("+15551234567")));
    }

    #[test]
    fn test_decode_json_broadcast_with_withheld_number() {
        let event = decode_event(r#"{"state": "ringing", "incoming_number": ""}"#).unwrap();
        assert_eq!(event, Some(CallEvent::Ringing { caller_id: None }));
    }

    #[test]
    fn test_decode_json_idle_ignores_number() {
        let event = decode_event(r#"{"state": "IDLE", "incoming_number": "555"}"#).unwrap();
        assert_eq!(event, Some(CallEvent::Idle));
    }

    #[test]
    fn test_decode_malformed_json_is_an_error() {
        let err = decode_event(r#"{"state": "#).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedJson(_)));
    }

    #[test]
    fn test_event_accessors() {
        let ringing = CallEvent::ringing("555");
        assert_eq!(ringing.kind(), "ringing");
        assert_eq!(ringing.caller_id(), Some("555"));
        assert_eq!(CallEvent::Idle.kind(), "idle");
        assert_eq!(CallEvent::Idle.caller_id(), None);
    }

    #[test]
    fn test_event_display_matches_line_format() {
        assert_eq!(CallEvent::ringing("555 0100").to_string(), "RINGING 555 0100");
        assert_eq!(CallEvent::Idle.to_string(), "IDLE");
        assert_eq!(decode_event(&CallEvent::Idle.to_string()).unwrap(), Some(CallEvent::Idle));
    }
}

//! ContactFilter: decides whether an incoming caller qualifies for a boost.
//!
//! The caller id is reduced to its trailing ten digits (see
//! [`ringboost_core::domain::phone`]) and looked up in the contact directory.
//! The directory returns every entry whose own normalized number shares that
//! suffix; the filter mode then decides whether any of them count.

use std::sync::Arc;

use ringboost_core::{caller_suffix, CallerSuffix, FilterMode};
use thiserror::Error;
use tracing::{debug, warn};

/// One contact-directory entry sharing the looked-up suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirectoryEntry {
    /// `true` when the contact is starred as a favorite.
    pub is_favorite: bool,
}

/// Error type for contact-directory lookups.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The directory could not be queried (missing permission, store offline,
    /// unreadable backing file, ...).
    #[error("contact directory unavailable: {0}")]
    Unavailable(String),
}

/// Read-only access to the device's contact directory.
///
/// Implementations release any query handle (cursor, file, connection) before
/// returning, on success and on error.
#[cfg_attr(test, mockall::automock)]
pub trait ContactDirectory: Send + Sync {
    /// Returns every entry whose normalized number ends with `suffix`.
    fn lookup(&self, suffix: &CallerSuffix) -> Result<Vec<DirectoryEntry>, DirectoryError>;
}

/// Matches callers against the contact directory.
pub struct ContactFilter {
    directory: Arc<dyn ContactDirectory>,
}

impl ContactFilter {
    pub fn new(directory: Arc<dyn ContactDirectory>) -> Self {
        Self { directory }
    }

    /// Returns `true` if the caller qualifies for a boost under `mode`.
    ///
    /// Withheld callers (no id, or an id without digits) never match.  A
    /// directory failure is logged and treated as "no match" so the call
    /// simply rings unboosted.
    pub fn matches(&self, caller_id: Option<&str>, mode: FilterMode) -> bool {
        let Some(suffix) = caller_id.and_then(caller_suffix) else {
            debug!("caller id withheld or without digits; not matching");
            return false;
        };

        let entries = match self.directory.lookup(&suffix) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(suffix = %suffix, "contact lookup failed, treating as no match: {e}");
                return false;
            }
        };

        let matched = match mode {
            FilterMode::All => !entries.is_empty(),
            FilterMode::FavoritesOnly => entries.iter().any(|entry| entry.is_favorite),
        };
        debug!(
            suffix = %suffix,
            candidates = entries.len(),
            %mode,
            matched,
            "contact filter evaluated"
        );
        matched
    }
}

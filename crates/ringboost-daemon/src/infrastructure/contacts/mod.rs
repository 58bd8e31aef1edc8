//! Contact directory adapters.
//!
//! The contact book is a TOML file:
//!
//! ```toml
//! [[contacts]]
//! name = "Mom"
//! number = "+1 (555) 123-4567"
//! favorite = true
//!
//! [[contacts]]
//! name = "Dentist"
//! number = "555.987.6543"
//! ```
//!
//! [`TomlContactDirectory`] re-reads the file on every lookup, the way a
//! platform contact query sees edits immediately.  The file handle is closed
//! before `lookup` returns on every path.

use std::path::{Path, PathBuf};

use ringboost_core::{caller_suffix, CallerSuffix};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::application::contact_filter::{ContactDirectory, DirectoryEntry, DirectoryError};

/// One stored contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub name: String,
    pub number: String,
    #[serde(default)]
    pub favorite: bool,
}

impl Contact {
    pub fn new(name: impl Into<String>, number: impl Into<String>, favorite: bool) -> Self {
        Self {
            name: name.into(),
            number: number.into(),
            favorite,
        }
    }
}

/// An in-memory list of contacts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactBook {
    #[serde(default)]
    pub contacts: Vec<Contact>,
}

impl ContactBook {
    pub fn new(contacts: Vec<Contact>) -> Self {
        Self { contacts }
    }

    /// Entries whose normalized number ends in `suffix`.
    pub fn entries_for(&self, suffix: &CallerSuffix) -> Vec<DirectoryEntry> {
        self.contacts
            .iter()
            .filter(|c| caller_suffix(&c.number).as_ref() == Some(suffix))
            .map(|c| DirectoryEntry {
                is_favorite: c.favorite,
            })
            .collect()
    }
}

impl ContactDirectory for ContactBook {
    fn lookup(&self, suffix: &CallerSuffix) -> Result<Vec<DirectoryEntry>, DirectoryError> {
        Ok(self.entries_for(suffix))
    }
}

/// Contact directory backed by a TOML contact book on disk.
pub struct TomlContactDirectory {
    path: PathBuf,
}

impl TomlContactDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and parses the contact book.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Unavailable`] if the file is missing,
    /// unreadable, or malformed.
    pub fn read_book(&self) -> Result<ContactBook, DirectoryError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            DirectoryError::Unavailable(format!("{}: {e}", self.path.display()))
        })?;
        toml::from_str(&content).map_err(|e| {
            warn!(path = %self.path.display(), "contact book is malformed");
            DirectoryError::Unavailable(format!("{}: {e}", self.path.display()))
        })
    }
}

impl ContactDirectory for TomlContactDirectory {
    fn lookup(&self, suffix: &CallerSuffix) -> Result<Vec<DirectoryEntry>, DirectoryError> {
        Ok(self.read_book()?.entries_for(suffix))
    }
}

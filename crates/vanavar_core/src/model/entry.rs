//! Entry domain model.
//!
//! # Responsibility
//! - Define the record shared by repository, search and sync layers.
//! - Separate replica-independent identity (`EntryId`) from the local
//!   storage position (`EntryHandle`).
//!
//! # Invariants
//! - `id` is assigned once at creation and never reassigned, including on edit.
//! - `created_at` is set once and never updated on edit.
//! - `content` is non-empty after trimming.

use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier used as the sole cross-replica key during sync.
pub type EntryId = Uuid;

/// Local position of an entry inside one repository.
///
/// Handles are never reused after delete and are never sent to another
/// repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct EntryHandle(i64);

impl EntryHandle {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for EntryHandle {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Display for EntryHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One stored unit of free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// Local storage position, valid only in the repository that returned it.
    pub handle: EntryHandle,
    pub id: EntryId,
    pub content: String,
    /// Unix epoch milliseconds of first creation.
    pub created_at: i64,
}

impl Entry {
    /// Returns the replica-independent part of this entry.
    pub fn record(&self) -> EntryRecord {
        EntryRecord {
            content: self.content.clone(),
            created_at: self.created_at,
        }
    }
}

/// Value side of a repository snapshot keyed by [`EntryId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    pub content: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Validation errors for entry content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValidationError {
    EmptyContent,
}

impl Display for EntryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyContent => write!(f, "entry content must not be empty"),
        }
    }
}

impl Error for EntryValidationError {}

/// Trims `raw` and rejects it when nothing is left.
///
/// Returns the text exactly as it will be stored.
pub fn normalize_content(raw: &str) -> Result<String, EntryValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EntryValidationError::EmptyContent);
    }
    Ok(trimmed.to_string())
}

/// Current wall clock as Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}

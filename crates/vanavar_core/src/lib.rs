//! Core of vanavar, a personal associative memory.
//!
//! Free-text entries are stored with a stable id, found again by prefix or
//! exact term match, and merged between stores by id.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod sync;

pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::entry::{Entry, EntryHandle, EntryId, EntryRecord, EntryValidationError};
pub use repo::entry_repo::{
    EntryRepository, RepoError, RepoResult, SqliteEntryRepository, DEFAULT_LIST_LIMIT,
};
pub use search::query::{translate, MatchQuery, TermMatch};
pub use service::edit::{edit_entry, resolve_edit};
pub use service::transfer::{export_lines, import_lines};
pub use service::{TransferError, TransferResult};
pub use sync::reconcile::{reconcile, sync_with_path, SyncError, SyncReport, SyncResult, SyncStage};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

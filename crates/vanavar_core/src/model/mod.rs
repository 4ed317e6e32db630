//! Entry domain model.
//!
//! # Responsibility
//! - Define the canonical stored record and its identifiers.
//! - Own content validation shared by every write path.
//!
//! # Invariants
//! - Every stored entry is identified by a stable `EntryId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod entry;

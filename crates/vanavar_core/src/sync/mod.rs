//! Store-to-store synchronization.
//!
//! # Responsibility
//! - Merge two independently edited repositories by entry id.
//! - Keep open/close of the remote store scoped to one sync call.
//!
//! # Invariants
//! - Sync only ever adds copies of entries the peer already owns.

pub mod reconcile;

//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the entry data access contract used by services and sync.
//! - Isolate SQLite query details from orchestration code.
//!
//! # Invariants
//! - Repository writes validate content before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `InvalidInput`) in
//!   addition to storage errors.

pub mod entry_repo;

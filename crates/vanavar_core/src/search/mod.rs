//! Full-text query construction.
//!
//! # Responsibility
//! - Translate user terms into FTS5 match predicates.
//! - Keep FTS5 syntax knowledge in one place; the repository only executes
//!   the resulting expression.

pub mod query;

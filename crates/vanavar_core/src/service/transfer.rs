//! Line-oriented bulk import and export.
//!
//! # Invariants
//! - Import stores every non-blank line as one entry, without dedup.
//! - Export writes content oldest first, one entry per line, unescaped.
//!   Content containing newlines therefore spans several output lines.

use super::TransferResult;
use crate::repo::entry_repo::EntryRepository;
use log::info;
use std::io::{BufRead, Write};

/// Reads `source` line by line and creates one entry per non-blank line.
///
/// Returns the number of entries created. Stops at the first failure; lines
/// stored before it stay stored.
pub fn import_lines<R, S>(repo: &R, source: S) -> TransferResult<usize>
where
    R: EntryRepository + ?Sized,
    S: BufRead,
{
    let mut imported = 0;
    for line in source.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        repo.create(&line)?;
        imported += 1;
    }

    info!("event=import module=service status=ok imported={imported}");
    Ok(imported)
}

/// Writes every entry's content to `sink`, oldest first.
///
/// Returns the number of entries written.
pub fn export_lines<R, W>(repo: &R, mut sink: W) -> TransferResult<usize>
where
    R: EntryRepository + ?Sized,
    W: Write,
{
    let contents = repo.all_for_export()?;
    for content in &contents {
        writeln!(sink, "{content}")?;
    }
    sink.flush()?;

    info!(
        "event=export module=service status=ok exported={}",
        contents.len()
    );
    Ok(contents.len())
}

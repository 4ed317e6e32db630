//! Edit-input resolution for in-place entry edits.

use crate::model::entry::EntryHandle;
use crate::repo::entry_repo::{EntryRepository, RepoError, RepoResult};

const APPEND_MARKER: char = '+';

/// Resolves user edit input against the current content.
///
/// - blank input keeps `current`
/// - `+text` appends `text` after one space
/// - anything else replaces `current`
pub fn resolve_edit(current: &str, input: &str) -> String {
    let input = input.trim();
    if input.is_empty() {
        return current.to_string();
    }

    match input.strip_prefix(APPEND_MARKER) {
        Some(tail) => format!("{current} {}", tail.trim()),
        None => input.to_string(),
    }
}

/// Applies edit input to the entry behind `handle`.
///
/// Returns `Ok(false)` when the resolved content equals the stored one and
/// nothing was written.
pub fn edit_entry<R>(repo: &R, handle: EntryHandle, input: &str) -> RepoResult<bool>
where
    R: EntryRepository + ?Sized,
{
    let entry = repo.get(handle)?.ok_or(RepoError::NotFound(handle))?;
    let next = resolve_edit(&entry.content, input);
    if next.trim() == entry.content {
        return Ok(false);
    }

    repo.update(handle, &next)?;
    Ok(true)
}

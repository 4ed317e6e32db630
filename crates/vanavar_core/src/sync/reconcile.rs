//! Two-way set-union reconciliation between entry repositories.
//!
//! # Responsibility
//! - Copy entries missing on either side, keyed by `EntryId`.
//! - Report how many entries moved in each direction.
//!
//! # Invariants
//! - Both snapshots are taken before the first write; a failure there leaves
//!   both sides untouched.
//! - Copies keep the source's id, content and creation time.
//! - Each copy commits on its own; a mid-copy failure keeps what committed.
//! - There are no tombstones. An id deleted on one side comes back from the
//!   other, and divergent content under one id is left as-is on both sides.

use crate::db::{open_db_existing, DbError};
use crate::model::entry::{EntryId, EntryRecord};
use crate::repo::entry_repo::{EntryRepository, RepoError, SqliteEntryRepository};
use log::{error, info};
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Instant;

pub type SyncResult<T> = Result<T, SyncError>;

/// Copy direction of a reconcile step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStage {
    /// Local entries copied into the remote store.
    Push,
    /// Remote entries copied into the local store.
    Pull,
}

impl Display for SyncStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Push => f.write_str("push"),
            Self::Pull => f.write_str("pull"),
        }
    }
}

/// Outcome of one reconcile call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Entries copied local -> remote.
    pub pushed: usize,
    /// Entries copied remote -> local.
    pub pulled: usize,
}

impl SyncReport {
    pub fn is_noop(&self) -> bool {
        self.pushed == 0 && self.pulled == 0
    }
}

#[derive(Debug)]
pub enum SyncError {
    /// The remote store could not be opened or read. Nothing was written.
    RemoteUnavailable {
        path: Option<PathBuf>,
        source: RepoError,
    },
    /// The local store could not be read. Nothing was written.
    Local(RepoError),
    /// A copy failed after `completed` entries had been committed.
    SyncIncomplete {
        stage: SyncStage,
        completed: SyncReport,
        source: RepoError,
    },
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RemoteUnavailable {
                path: Some(path),
                source,
            } => write!(f, "remote store `{}` unavailable: {source}", path.display()),
            Self::RemoteUnavailable { path: None, source } => {
                write!(f, "remote store unavailable: {source}")
            }
            Self::Local(err) => write!(f, "local store unavailable: {err}"),
            Self::SyncIncomplete {
                stage,
                completed,
                source,
            } => write!(
                f,
                "sync incomplete during {stage} (pushed {}, pulled {}): {source}",
                completed.pushed, completed.pulled
            ),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::RemoteUnavailable { source, .. } => Some(source),
            Self::Local(err) => Some(err),
            Self::SyncIncomplete { source, .. } => Some(source),
        }
    }
}

/// Makes `local` and `remote` hold the union of their entries by id.
///
/// Returns how many entries were pushed to `remote` and pulled into `local`.
/// Running it again without intervening writes returns `(0, 0)`.
pub fn reconcile<L, R>(local: &L, remote: &R) -> SyncResult<SyncReport>
where
    L: EntryRepository + ?Sized,
    R: EntryRepository + ?Sized,
{
    let started_at = Instant::now();
    info!("event=sync_reconcile module=sync status=start");

    let local_snapshot = local.snapshot_by_id().map_err(SyncError::Local)?;
    let remote_snapshot = remote
        .snapshot_by_id()
        .map_err(|source| SyncError::RemoteUnavailable { path: None, source })?;

    let to_push = missing_from(&local_snapshot, &remote_snapshot);
    let to_pull = missing_from(&remote_snapshot, &local_snapshot);
    info!(
        "event=sync_plan module=sync status=ok local={} remote={} to_push={} to_pull={}",
        local_snapshot.len(),
        remote_snapshot.len(),
        to_push.len(),
        to_pull.len()
    );

    let mut report = SyncReport::default();

    for (id, record) in to_push {
        copy_entry(remote, id, record, SyncStage::Push, report)?;
        report.pushed += 1;
    }

    for (id, record) in to_pull {
        copy_entry(local, id, record, SyncStage::Pull, report)?;
        report.pulled += 1;
    }

    info!(
        "event=sync_reconcile module=sync status=ok pushed={} pulled={} duration_ms={}",
        report.pushed,
        report.pulled,
        started_at.elapsed().as_millis()
    );
    Ok(report)
}

/// Opens the store at `remote_path` and reconciles `local` with it.
///
/// The remote file must already exist. When it cannot be opened or migrated
/// the call fails with [`SyncError::RemoteUnavailable`] before any write. The
/// remote connection is closed when this function returns, on every path.
pub fn sync_with_path<L>(local: &L, remote_path: impl AsRef<Path>) -> SyncResult<SyncReport>
where
    L: EntryRepository + ?Sized,
{
    let remote_path = remote_path.as_ref();
    let remote_conn = open_db_existing(remote_path).map_err(|err| {
        error!(
            "event=sync_open_remote module=sync status=error error_code=remote_unavailable error={}",
            err
        );
        remote_unavailable(remote_path, err)
    })?;
    let remote = SqliteEntryRepository::new(&remote_conn);

    reconcile(local, &remote).map_err(|err| match err {
        SyncError::RemoteUnavailable { path: None, source } => SyncError::RemoteUnavailable {
            path: Some(remote_path.to_path_buf()),
            source,
        },
        other => other,
    })
}

fn remote_unavailable(path: &Path, err: DbError) -> SyncError {
    SyncError::RemoteUnavailable {
        path: Some(path.to_path_buf()),
        source: RepoError::StorageUnavailable(err),
    }
}

fn missing_from<'a>(
    source: &'a BTreeMap<EntryId, EntryRecord>,
    target: &BTreeMap<EntryId, EntryRecord>,
) -> Vec<(EntryId, &'a EntryRecord)> {
    source
        .iter()
        .filter(|(id, _)| !target.contains_key(id))
        .map(|(id, record)| (*id, record))
        .collect()
}

fn copy_entry<T>(
    target: &T,
    id: EntryId,
    record: &EntryRecord,
    stage: SyncStage,
    completed: SyncReport,
) -> SyncResult<()>
where
    T: EntryRepository + ?Sized,
{
    target.insert_replica(id, record).map_err(|source| {
        error!(
            "event=sync_copy module=sync status=error stage={} entry_id={} pushed={} pulled={} error={}",
            stage, id, completed.pushed, completed.pulled, source
        );
        SyncError::SyncIncomplete {
            stage,
            completed,
            source,
        }
    })?;
    Ok(())
}

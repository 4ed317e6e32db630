//! Entry repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/read/update/delete over canonical `entries` storage.
//! - Execute translated match predicates against the FTS5 index.
//! - Expose the id-keyed snapshot and replica insert used by sync.
//!
//! # Invariants
//! - Write paths validate content before any SQL mutation.
//! - Each mutation is one autocommit statement; index maintenance runs in
//!   triggers inside that statement, so it is applied fully or not at all.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::entry::{
    normalize_content, now_epoch_ms, Entry, EntryHandle, EntryId, EntryRecord,
    EntryValidationError,
};
use crate::search::query::MatchQuery;
use rusqlite::{params, Connection, Row};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Listing size used when a caller does not pick one.
pub const DEFAULT_LIST_LIMIT: u32 = 50;

const ENTRY_SELECT_SQL: &str = "SELECT
    entries.seq AS seq,
    entries.id AS id,
    entries.content AS content,
    entries.created_at AS created_at
FROM entries";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for entry persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Content was empty after trimming.
    InvalidInput(EntryValidationError),
    /// The handle does not (or no longer) exist.
    NotFound(EntryHandle),
    /// Underlying storage could not be read or written.
    StorageUnavailable(DbError),
    /// SQLite rejected a match expression.
    InvalidQuery {
        query: String,
        message: String,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(err) => write!(f, "invalid input: {err}"),
            Self::NotFound(handle) => write!(f, "entry not found: #{handle}"),
            Self::StorageUnavailable(err) => write!(f, "storage unavailable: {err}"),
            Self::InvalidQuery { query, message } => {
                write!(f, "invalid full-text query `{query}`: {message}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted entry data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::StorageUnavailable(err) => Some(err),
            Self::NotFound(_) | Self::InvalidQuery { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<EntryValidationError> for RepoError {
    fn from(value: EntryValidationError) -> Self {
        Self::InvalidInput(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::StorageUnavailable(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::StorageUnavailable(DbError::Sqlite(value))
    }
}

/// Repository interface for entry storage and retrieval.
pub trait EntryRepository {
    /// Stores trimmed `content` under a fresh id and the current time.
    fn create(&self, content: &str) -> RepoResult<Entry>;
    /// Stores a copy of a peer's entry, keeping its id and creation time.
    fn insert_replica(&self, id: EntryId, record: &EntryRecord) -> RepoResult<Entry>;
    fn get(&self, handle: EntryHandle) -> RepoResult<Option<Entry>>;
    fn get_by_id(&self, id: EntryId) -> RepoResult<Option<Entry>>;
    /// Returns every entry matching `query`, in index order.
    fn get_by_predicate(&self, query: &MatchQuery) -> RepoResult<Vec<Entry>>;
    /// Returns up to `limit` entries, newest first.
    fn list_recent(&self, limit: u32) -> RepoResult<Vec<Entry>>;
    /// Replaces content in place; id and creation time stay.
    fn update(&self, handle: EntryHandle, new_content: &str) -> RepoResult<()>;
    fn delete(&self, handle: EntryHandle) -> RepoResult<()>;
    /// Deletes every entry matching `query` and returns how many went.
    fn delete_matching(&self, query: &MatchQuery) -> RepoResult<usize>;
    fn count(&self) -> RepoResult<u64>;
    /// Content strings, oldest first, read at call time.
    fn all_for_export(&self) -> RepoResult<Vec<String>>;
    /// Full id-keyed materialization for reconciliation.
    fn snapshot_by_id(&self) -> RepoResult<BTreeMap<EntryId, EntryRecord>>;
}

/// SQLite-backed entry repository.
pub struct SqliteEntryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEntryRepository<'conn> {
    /// Wraps a connection returned by [`crate::db::open_db`] (or siblings),
    /// which guarantees the schema is migrated.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn insert_row(&self, id: EntryId, content: &str, created_at: i64) -> RepoResult<Entry> {
        self.conn.execute(
            "INSERT INTO entries (id, content, created_at) VALUES (?1, ?2, ?3);",
            params![id.to_string(), content, created_at],
        )?;

        Ok(Entry {
            handle: EntryHandle::new(self.conn.last_insert_rowid()),
            id,
            content: content.to_string(),
            created_at,
        })
    }

    fn query_entries(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> RepoResult<Vec<Entry>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut entries = Vec::new();

        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }

        Ok(entries)
    }
}

impl EntryRepository for SqliteEntryRepository<'_> {
    fn create(&self, content: &str) -> RepoResult<Entry> {
        let content = normalize_content(content)?;
        self.insert_row(Uuid::new_v4(), &content, now_epoch_ms())
    }

    fn insert_replica(&self, id: EntryId, record: &EntryRecord) -> RepoResult<Entry> {
        // Content is copied verbatim; only emptiness is checked.
        normalize_content(&record.content)?;
        self.insert_row(id, &record.content, record.created_at)
    }

    fn get(&self, handle: EntryHandle) -> RepoResult<Option<Entry>> {
        let mut entries = self.query_entries(
            &format!("{ENTRY_SELECT_SQL} WHERE seq = ?1;"),
            [handle.get()],
        )?;
        Ok(entries.pop())
    }

    fn get_by_id(&self, id: EntryId) -> RepoResult<Option<Entry>> {
        let mut entries = self.query_entries(
            &format!("{ENTRY_SELECT_SQL} WHERE id = ?1;"),
            [id.to_string()],
        )?;
        Ok(entries.pop())
    }

    fn get_by_predicate(&self, query: &MatchQuery) -> RepoResult<Vec<Entry>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let expression = query.expression();
        let mut stmt = self.conn.prepare(&format!(
            "{ENTRY_SELECT_SQL}
             JOIN entries_fts ON entries_fts.rowid = entries.seq
             WHERE entries_fts MATCH ?1
             ORDER BY entries.seq ASC;"
        ))?;
        let mut rows = stmt
            .query([expression])
            .map_err(|err| map_query_error(err, expression))?;
        let mut entries = Vec::new();

        while let Some(row) = rows
            .next()
            .map_err(|err| map_query_error(err, expression))?
        {
            entries.push(parse_entry_row(row)?);
        }

        Ok(entries)
    }

    fn list_recent(&self, limit: u32) -> RepoResult<Vec<Entry>> {
        self.query_entries(
            &format!("{ENTRY_SELECT_SQL} ORDER BY created_at DESC, seq DESC LIMIT ?1;"),
            [i64::from(limit)],
        )
    }

    fn update(&self, handle: EntryHandle, new_content: &str) -> RepoResult<()> {
        let content = normalize_content(new_content)?;

        let changed = self.conn.execute(
            "UPDATE entries SET content = ?1 WHERE seq = ?2;",
            params![content, handle.get()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(handle));
        }

        Ok(())
    }

    fn delete(&self, handle: EntryHandle) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM entries WHERE seq = ?1;", [handle.get()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(handle));
        }

        Ok(())
    }

    fn delete_matching(&self, query: &MatchQuery) -> RepoResult<usize> {
        if query.is_empty() {
            return Ok(0);
        }

        let expression = query.expression();
        self.conn
            .execute(
                "DELETE FROM entries
                 WHERE seq IN (SELECT rowid FROM entries_fts WHERE entries_fts MATCH ?1);",
                [expression],
            )
            .map_err(|err| map_query_error(err, expression))
    }

    fn count(&self) -> RepoResult<u64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM entries;", [], |row| row.get::<_, i64>(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative entry count `{count}`")))
    }

    fn all_for_export(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT content FROM entries ORDER BY created_at ASC, seq ASC;")?;
        let contents = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(contents)
    }

    fn snapshot_by_id(&self) -> RepoResult<BTreeMap<EntryId, EntryRecord>> {
        let mut snapshot = BTreeMap::new();
        for entry in self.query_entries(&format!("{ENTRY_SELECT_SQL};"), [])? {
            snapshot.insert(entry.id, entry.record());
        }
        Ok(snapshot)
    }
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<Entry> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in entries.id"))
    })?;

    let content: String = row.get("content")?;
    if content.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "empty content for entry `{id_text}`"
        )));
    }

    Ok(Entry {
        handle: EntryHandle::new(row.get("seq")?),
        id,
        content,
        created_at: row.get("created_at")?,
    })
}

fn map_query_error(err: rusqlite::Error, query: &str) -> RepoError {
    if is_match_syntax_error(&err) {
        return RepoError::InvalidQuery {
            query: query.to_string(),
            message: err.to_string(),
        };
    }

    RepoError::StorageUnavailable(DbError::Sqlite(err))
}

fn is_match_syntax_error(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(_, Some(message)) => {
            let msg = message.to_lowercase();
            (msg.contains("fts5") && msg.contains("syntax"))
                || msg.contains("malformed match expression")
                || msg.contains("unterminated")
        }
        _ => false,
    }
}

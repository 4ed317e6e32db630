//! SQLite migration registry and executor.
//!
//! # Responsibility
//! - Register schema migrations in strictly increasing order.
//! - Apply pending migrations atomically.
//! - Upgrade legacy stores (no `id` column) to the identity-bearing layout.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - Applied migration version is mirrored to `PRAGMA user_version`.
//! - The identity upgrade keeps every row's content, creation time and local
//!   handle; it only adds ids.

use crate::db::{DbError, DbResult};
use log::{info, warn};
use rusqlite::{Connection, Row};
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Clone, Copy)]
struct Migration {
    version: u32,
    apply: fn(&Connection) -> DbResult<()>,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        apply: create_legacy_layout,
    },
    Migration {
        version: 2,
        apply: upgrade_entry_identity,
    },
];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Applies all pending migrations on the provided connection.
///
/// Running this on an up-to-date database is a no-op.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    let latest = latest_version();

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        (migration.apply)(&tx)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
        info!(
            "event=db_migrate module=db status=ok version={}",
            migration.version
        );
    }
    tx.commit()?;

    Ok(())
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

fn create_legacy_layout(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(include_str!("0001_init.sql"))?;
    Ok(())
}

struct LegacyRow {
    rowid: i64,
    id: Option<String>,
    content: Option<String>,
    created_at_ms: i64,
}

// Legacy `created_at` is ISO-8601 text; rows already carrying an integer are
// taken as epoch milliseconds. Unparseable values sort first as 0.
const LEGACY_CREATED_AT_MS: &str = "CASE
    WHEN typeof(created_at) = 'integer' THEN created_at
    ELSE COALESCE(
        CAST(strftime('%s', created_at) AS INTEGER) * 1000
            + CAST(substr(strftime('%f', created_at), 4) AS INTEGER),
        0
    )
END";

fn upgrade_entry_identity(conn: &Connection) -> DbResult<()> {
    let legacy_has_id = table_has_column(conn, "entries", "id")?;
    let legacy_rows = read_legacy_rows(conn, legacy_has_id)?;

    conn.execute_batch("DROP TABLE entries;")?;
    conn.execute_batch(include_str!("0002_entry_identity.sql"))?;

    let mut insert = conn.prepare(
        "INSERT INTO entries (seq, id, content, created_at) VALUES (?1, ?2, ?3, ?4);",
    )?;
    let mut seen = HashSet::new();
    let mut assigned = 0usize;
    let mut skipped = 0usize;

    for row in legacy_rows {
        let Some(content) = row.content.filter(|text| !text.trim().is_empty()) else {
            skipped += 1;
            continue;
        };

        let id = match row
            .id
            .as_deref()
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
        {
            Some(existing) if seen.insert(existing) => existing,
            _ => {
                assigned += 1;
                fresh_id(&mut seen)
            }
        };

        insert.execute(rusqlite::params![
            row.rowid,
            id.to_string(),
            content,
            row.created_at_ms
        ])?;
    }

    if skipped > 0 {
        warn!("event=db_migrate module=db status=skip version=2 empty_rows={skipped}");
    }
    info!(
        "event=db_migrate module=db status=identity_upgrade kept_ids={} assigned_ids={}",
        seen.len() - assigned,
        assigned
    );
    Ok(())
}

fn fresh_id(seen: &mut HashSet<Uuid>) -> Uuid {
    loop {
        let id = Uuid::new_v4();
        if seen.insert(id) {
            return id;
        }
    }
}

fn read_legacy_rows(conn: &Connection, with_id: bool) -> DbResult<Vec<LegacyRow>> {
    let id_column = if with_id { "id" } else { "NULL" };
    let mut stmt = conn.prepare(&format!(
        "SELECT rowid, {id_column} AS id, content, {LEGACY_CREATED_AT_MS} AS created_at_ms
         FROM entries
         ORDER BY rowid ASC;"
    ))?;

    let rows = stmt
        .query_map([], parse_legacy_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn parse_legacy_row(row: &Row<'_>) -> rusqlite::Result<LegacyRow> {
    Ok(LegacyRow {
        rowid: row.get(0)?,
        id: row.get(1)?,
        content: row.get(2)?,
        created_at_ms: row.get(3)?,
    })
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> DbResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names.iter().any(|name| name == column))
}

//! Command-line front end for the vanavar store.
//!
//! # Responsibility
//! - Resolve configuration (database path, logging) once at start.
//! - Map each subcommand onto one core use-case and print the outcome.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use log::{error, info};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::Instant;
use vanavar_core::db::open_db;
use vanavar_core::{
    default_log_level, edit_entry, export_lines, import_lines, init_logging, sync_with_path,
    Entry, EntryHandle, EntryRepository, LogLevel, MatchQuery, RepoError, SqliteEntryRepository,
    SyncError, TransferError,
};

fn main() {
    let cli = Cli::parse();

    let command = cli.command.name();
    let started_at = Instant::now();

    let code = match run(cli) {
        Ok(()) => {
            info!(
                "event=cli_command module=cli status=ok command={} duration_ms={}",
                command,
                started_at.elapsed().as_millis()
            );
            0
        }
        Err(err) => {
            let code = exit_code(&err);
            error!(
                "event=cli_command module=cli status=error command={} exit_code={} duration_ms={}",
                command,
                code,
                started_at.elapsed().as_millis()
            );
            eprintln!("Error: {err:#}");
            code
        }
    };

    // process::exit skips destructors, so buffered log lines go out here.
    log::logger().flush();
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<()> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        start_logging(log_dir, cli.log_level.as_deref())?;
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("cannot open store {}", cli.db.display()))?;
    let repo = SqliteEntryRepository::new(&conn);

    match cli.command {
        Commands::Add { text } => {
            let entry = repo.create(&text.join(" "))?;
            println!("Stored #{}.", entry.handle);
        }
        Commands::Find { terms, json } => {
            let query = MatchQuery::parse(&terms.join(" "));
            print_entries(&repo.get_by_predicate(&query)?, json, "Nothing found.")?;
        }
        Commands::List { limit, json } => {
            print_entries(&repo.list_recent(limit)?, json, "No entries yet.")?;
        }
        Commands::Edit { handle, input } => {
            if edit_entry(&repo, EntryHandle::from(handle), &input.join(" "))? {
                println!("Updated.");
            } else {
                println!("(no change)");
            }
        }
        Commands::Delete { handle } => {
            repo.delete(EntryHandle::from(handle))?;
            println!("Deleted.");
        }
        Commands::DeleteMatching { terms } => {
            let removed = repo.delete_matching(&MatchQuery::parse(&terms.join(" ")))?;
            println!("Deleted {removed} entries.");
        }
        Commands::Count => {
            println!("{} entries", repo.count()?);
        }
        Commands::Import { file } => {
            let source = File::open(&file)
                .with_context(|| format!("File not found: {}", file.display()))?;
            let imported = import_lines(&repo, BufReader::new(source))?;
            println!("Imported {imported} entries.");
        }
        Commands::Export { file } => {
            let sink = File::create(&file)
                .with_context(|| format!("cannot write {}", file.display()))?;
            let exported = export_lines(&repo, BufWriter::new(sink))?;
            println!("Exported {exported} entries to {}", file.display());
        }
        Commands::Sync { remote, json } => {
            let report = sync_with_path(&repo, &remote)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }
            println!(
                "Synced with {}: pushed {}, pulled {}.",
                remote.display(),
                report.pushed,
                report.pulled
            );
        }
    }

    Ok(())
}

fn start_logging(log_dir: &Path, level: Option<&str>) -> Result<()> {
    let level = match level {
        Some(raw) => LogLevel::parse(raw)?,
        None => default_log_level(),
    };
    let log_dir = if log_dir.is_absolute() {
        log_dir.to_path_buf()
    } else {
        std::env::current_dir()?.join(log_dir)
    };
    init_logging(level, &log_dir)?;
    Ok(())
}

fn print_entries(entries: &[Entry], json: bool, empty_message: &str) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("{empty_message}");
        return Ok(());
    }

    for entry in entries {
        println!("  #{} {}", entry.handle, entry.content);
    }
    Ok(())
}

/// Exit code for an error returned by [`run`].
fn exit_code(err: &anyhow::Error) -> i32 {
    let repo_error = err.downcast_ref::<RepoError>().or_else(|| {
        err.downcast_ref::<TransferError>().and_then(|transfer| match transfer {
            TransferError::Repo(inner) => Some(inner),
            TransferError::Io(_) => None,
        })
    });

    if let Some(repo_error) = repo_error {
        return match repo_error {
            RepoError::InvalidInput(_) => 3,
            RepoError::NotFound(_) => 4,
            _ => 1,
        };
    }

    match err.downcast_ref::<SyncError>() {
        Some(SyncError::RemoteUnavailable { .. }) => 5,
        Some(SyncError::SyncIncomplete { .. }) => 6,
        _ => 1,
    }
}

//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vanavar_core::DEFAULT_LIST_LIMIT;

/// Database file used when neither `--db` nor `VANAVAR_DB` is set.
pub const FALLBACK_DB_PATH: &str = "vanavar.db";

#[derive(Parser, Debug)]
#[command(name = "vanavar")]
#[command(about = "Associative memory: store any line, find it by any term", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database file to operate on
    #[arg(long, global = true, env = "VANAVAR_DB", default_value = FALLBACK_DB_PATH)]
    pub db: PathBuf,

    /// Directory for log files (logging is off when unset)
    #[arg(long, global = true, env = "VANAVAR_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "VANAVAR_LOG_LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store a line
    Add {
        /// Text to store (words are joined with spaces)
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        text: Vec<String>,
    },

    /// Find entries matching all terms (prefix match; end a term with $ for exact)
    Find {
        #[arg(required = true, num_args = 1..)]
        terms: Vec<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show recent entries, newest first
    List {
        #[arg(short, long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: u32,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit an entry: `+text` appends, other text replaces
    Edit {
        /// Entry number shown by find/list
        handle: i64,

        #[arg(num_args = 0.., allow_hyphen_values = true)]
        input: Vec<String>,
    },

    /// Delete one entry by number
    Delete { handle: i64 },

    /// Delete every entry matching all terms
    DeleteMatching {
        #[arg(required = true, num_args = 1..)]
        terms: Vec<String>,
    },

    /// Show the number of stored entries
    Count,

    /// Import entries from a file, one per line
    Import { file: PathBuf },

    /// Export entries to a file, one per line, oldest first
    Export { file: PathBuf },

    /// Merge entries with another store, in both directions
    Sync {
        /// Path of the other store (must already exist)
        remote: PathBuf,

        /// Print the push/pull counts as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    /// Subcommand name as typed on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Find { .. } => "find",
            Self::List { .. } => "list",
            Self::Edit { .. } => "edit",
            Self::Delete { .. } => "delete",
            Self::DeleteMatching { .. } => "delete-matching",
            Self::Count => "count",
            Self::Import { .. } => "import",
            Self::Export { .. } => "export",
            Self::Sync { .. } => "sync",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands, FALLBACK_DB_PATH};
    use clap::{CommandFactory, Parser};
    use std::path::PathBuf;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn find_collects_all_terms() {
        let cli = Cli::try_parse_from(["vanavar", "--db", "x.db", "find", "alex", "vsnt$"]).unwrap();
        assert_eq!(cli.db, PathBuf::from("x.db"));
        match cli.command {
            Commands::Find { terms, json } => {
                assert_eq!(terms, ["alex", "vsnt$"]);
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn list_uses_default_limit() {
        let cli = Cli::try_parse_from(["vanavar", "--db", FALLBACK_DB_PATH, "list"]).unwrap();
        assert!(matches!(cli.command, Commands::List { limit: 50, json: false }));
    }

    #[test]
    fn edit_accepts_append_marker() {
        let cli = Cli::try_parse_from(["vanavar", "edit", "3", "+more", "words"]).unwrap();
        match cli.command {
            Commands::Edit { handle, input } => {
                assert_eq!(handle, 3);
                assert_eq!(input.join(" "), "+more words");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn command_names_match_subcommands() {
        let cli = Cli::try_parse_from(["vanavar", "delete-matching", "old"]).unwrap();
        assert_eq!(cli.command.name(), "delete-matching");

        let cli = Cli::try_parse_from(["vanavar", "sync", "other.db", "--json"]).unwrap();
        assert_eq!(cli.command.name(), "sync");
        assert!(matches!(cli.command, Commands::Sync { json: true, .. }));
    }

    #[test]
    fn find_requires_a_term() {
        assert!(Cli::try_parse_from(["vanavar", "find"]).is_err());
    }
}

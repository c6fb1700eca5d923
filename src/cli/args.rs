//! Command line argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Catalog Importer - Bulk-import titles into your media catalog
#[derive(Parser, Debug)]
#[command(name = "catalog-importer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import titles from a CSV file
    Import {
        /// Path to the CSV file
        #[arg(value_name = "CSV_FILE")]
        csv_file: PathBuf,

        /// JSON file mapping canonical fields to CSV column headers
        #[arg(short, long, value_name = "MAPPING_FILE")]
        mapping: Option<PathBuf>,

        /// Media kind: movie or series
        #[arg(short, long, default_value = "movie")]
        kind: String,
    },

    /// Manage import sessions
    Sessions {
        #[command(subcommand)]
        action: SessionsAction,
    },

    /// Search the external catalog (raw results, no filtering)
    Search {
        /// Title to search for
        #[arg(value_name = "TITLE")]
        title: String,

        /// Release year hint
        #[arg(short, long)]
        year: Option<u16>,

        /// Media kind: movie or series
        #[arg(short, long, default_value = "movie")]
        kind: String,
    },

    /// Resolve an unmatched row with a chosen catalog entry
    Resolve {
        /// Session ID
        #[arg(value_name = "SESSION_ID")]
        session_id: String,

        /// Unmatched row title
        #[arg(value_name = "TITLE")]
        title: String,

        /// TMDB id of the chosen candidate
        #[arg(long, value_name = "TMDB_ID")]
        tmdb_id: u64,

        /// Media kind: movie or series
        #[arg(short, long, default_value = "movie")]
        kind: String,
    },

    /// Dismiss an unmatched row without importing it (cannot be undone)
    Ignore {
        /// Session ID
        #[arg(value_name = "SESSION_ID")]
        session_id: String,

        /// Unmatched row title
        #[arg(value_name = "TITLE")]
        title: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum SessionsAction {
    /// List all sessions
    List,

    /// Show details of a specific session
    Show {
        /// Session ID
        #[arg(value_name = "SESSION_ID")]
        session_id: String,
    },
}

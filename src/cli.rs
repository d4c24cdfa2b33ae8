//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Error,
}

/// Inspect and fingerprint the device media library.
#[derive(Parser, Debug)]
#[command(name = "devicesync", version)]
pub struct Cli {
    /// Path to the platform media index database.
    #[arg(long, value_name = "PATH")]
    pub index: PathBuf,

    /// Emit JSON instead of human-readable output.
    #[arg(long)]
    pub json: bool,

    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List albums with member counts.
    Albums,

    /// List the asset ids in an album.
    Ids { album_id: String },

    /// List the assets in an album.
    Assets {
        album_id: String,
        /// Only rows modified or added strictly after this epoch-seconds cursor.
        #[arg(long)]
        since: Option<i64>,
    },

    /// Count assets added to an album strictly after a timestamp.
    Count { album_id: String, since: i64 },

    /// Compute content fingerprints for the given asset ids.
    Hash { ids: Vec<String> },
}

//! CLI argument parsing for templateindex

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ti")]
#[command(author, version, about = "Template index cache inspector", long_about = None)]
pub struct Cli {
    /// Path to the index cache file (defaults to the well-known location)
    #[arg(short = 'f', long)]
    pub cache: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show cache statistics
    Stats,

    /// List indexed templates
    Show {
        /// Only templates from this repository
        #[arg(short, long)]
        repo: Option<String>,
    },

    /// Delete the cache file
    Clear,

    /// Print the cache file path
    Path,
}

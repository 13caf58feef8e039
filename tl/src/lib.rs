//! Templib - Git-backed template library manager
//!
//! Templib manages a local library of prompt and context templates spread
//! across git repositories. Repositories are registered in a small YAML
//! config, scanned into a persistent index, and queried through a weighted
//! keyword search with an optional content-level fallback.
//!
//! # Core Concepts
//!
//! - **Registered repos**: Remote clones or plain local directories
//! - **Persistent index**: Cached template metadata, rebuilt when stale
//! - **Weighted search**: Exact, substring, and subsequence matching over
//!   names, ids, labels, and summaries
//! - **Deep search**: Raw content scan for keywords the index misses
//!
//! # Modules
//!
//! - [`config`] - Configuration types and loading
//! - [`repo`] - Repository registry and git operations
//! - [`search`] - Search engine and deep content search
//! - [`output`] - Result and record formatting
//! - [`cli`] - Command-line interface
//! - [`tui`] - Interactive template picker

pub mod cli;
pub mod config;
pub mod output;
pub mod repo;
pub mod search;
pub mod tui;

// Re-export commonly used types
pub use cli::{Cli, Command, IndexCommand, OutputFormat, RepoCommand};
pub use config::{Config, RepoEntry, SearchConfig, StorageConfig};
pub use repo::{GitError, Registry, RepoStatus, clone_repo, derive_repo_name, pull_repo, repo_status};
pub use search::{
    ContentMatch, ContentScanner, DeepSearch, DeepSearchError, GrepScanner, MatchedField, SearchEngine, SearchNote,
    SearchOptions, SearchOutcome, SearchResult,
};

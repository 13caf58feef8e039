//! Repository registry - resolves config entries to local checkouts

use std::path::PathBuf;

use templateindex::RepoRef;

use crate::config::{Config, RepoEntry};

/// Resolves configured repositories to `{name, checkout path}` pairs
///
/// Entries with a `path` are used in place; entries with a `url` live
/// under the storage directory, keyed by repository name. The registry
/// is rebuilt from config on every invocation and never mutates it.
#[derive(Debug, Clone)]
pub struct Registry {
    entries: Vec<RepoEntry>,
    repos_dir: PathBuf,
}

impl Registry {
    /// Build a registry from loaded configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            entries: config.repos.clone(),
            repos_dir: config.storage.repos_dir.clone(),
        }
    }

    /// Resolve all configured repositories, in config order
    pub fn refs(&self) -> Vec<RepoRef> {
        self.entries
            .iter()
            .map(|entry| RepoRef::new(&entry.name, self.checkout_path(entry)))
            .collect()
    }

    /// Resolve the checkout path for one entry
    pub fn checkout_path(&self, entry: &RepoEntry) -> PathBuf {
        match &entry.path {
            Some(path) => expand_home(path),
            None => self.repos_dir.join(&entry.name),
        }
    }

    /// Look up an entry by repository name
    pub fn get(&self, name: &str) -> Option<&RepoEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// All configured entries, in config order
    pub fn entries(&self) -> &[RepoEntry] {
        &self.entries
    }
}

/// Derive a repository name from a git URL or local path
///
/// Takes the final path segment and strips a trailing `.git`.
pub fn derive_repo_name(source: &str) -> String {
    let trimmed = source.trim_end_matches('/');
    let last = trimmed.rsplit(['/', ':']).next().unwrap_or(trimmed);
    last.trim_end_matches(".git").to_string()
}

fn expand_home(path: &PathBuf) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    path.clone()
}

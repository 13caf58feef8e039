//! Index cache manager
//!
//! Owns the one persisted artifact of the system: a JSON file holding the
//! [`TemplateIndex`]. Decides whether the cached index still reflects the
//! configured repositories and orchestrates full rebuilds (the index is
//! never patched incrementally).
//!
//! Staleness is judged by comparing each checkout root's directory mtime
//! against the index's `lastUpdated` stamp: O(1) per repository, no tree
//! hashing. Known edge cases of the mtime proxy: a `touch` without a content
//! change (or clock skew) triggers a spurious rebuild, and a change that does
//! not bump the root directory's mtime, or lands within the filesystem's
//! mtime resolution, goes unnoticed until something else bumps it.
//!
//! Writes are atomic (temp file + rename), so concurrent invocations may
//! both rebuild but readers never observe a torn index; the last writer
//! wins. Read failures of any kind degrade to a cache miss.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use eyre::{Context, Result};
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::index::{SCHEMA_VERSION, TemplateIndex};
use crate::scanner::{self, SkippedFile};

/// A configured repository as the cache consumes it: a name plus the local
/// checkout root. Resolved per call by the caller's registry; read-only here.
#[derive(Debug, Clone, PartialEq)]
pub struct RepoRef {
    pub name: String,
    pub root: PathBuf,
}

impl RepoRef {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
        }
    }
}

/// Outcome of one full build: the index plus everything that went wrong
/// without aborting it.
#[derive(Debug)]
pub struct BuildReport {
    pub index: TemplateIndex,
    /// Per-file validation skips across all repositories
    pub skipped: Vec<SkippedFile>,
    /// Repositories that contributed zero records because their scan failed
    pub failed_repos: Vec<FailedRepo>,
}

#[derive(Debug, Clone)]
pub struct FailedRepo {
    pub name: String,
    pub error: String,
}

/// Diagnostic view of the persisted cache file. Never triggers a rebuild.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub exists: bool,
    pub size_bytes: u64,
    pub last_updated: Option<DateTime<Utc>>,
    pub template_count: usize,
    pub version: Option<u32>,
}

/// The index cache manager. Constructed with the cache file path it owns,
/// so tests and alternate configurations can run side by side.
#[derive(Debug, Clone)]
pub struct IndexCache {
    path: PathBuf,
}

impl IndexCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Well-known default location of the cache file.
    pub fn default_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("templib")
            .join("index.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return a valid index for `repos`, reusing the persisted one when it is
    /// present, version-compatible, and not stale. A rebuild that fails falls
    /// back to the last good persisted index when one exists.
    pub async fn get_index(&self, repos: &[RepoRef], force_rebuild: bool) -> Result<TemplateIndex> {
        if !force_rebuild {
            if let Some(index) = self.load().await {
                if !is_stale(&index, repos).await {
                    debug!(templates = index.len(), "Using cached index");
                    return Ok(index);
                }
                debug!("Cached index is stale, rebuilding");
            }
        }

        match self.build_index(repos).await {
            Ok(report) => Ok(report.index),
            Err(err) => match self.load().await {
                Some(index) => {
                    warn!(error = %err, "Rebuild failed, falling back to last persisted index");
                    Ok(index)
                }
                None => Err(err),
            },
        }
    }

    /// Scan every repository in order and replace the persisted index with
    /// the result. A repository whose scan fails contributes zero records
    /// and an entry in [`BuildReport::failed_repos`]; persisting is
    /// best-effort and never fails the build.
    pub async fn build_index(&self, repos: &[RepoRef]) -> Result<BuildReport> {
        let mut index = TemplateIndex::new_empty();
        let mut skipped = Vec::new();
        let mut failed_repos = Vec::new();

        for repo in repos {
            match scanner::scan_repo(&repo.name, &repo.root).await {
                Ok(outcome) => {
                    index.templates.extend(outcome.records);
                    skipped.extend(outcome.skipped);
                }
                Err(err) => {
                    warn!(repo = %repo.name, error = %err, "Repository scan failed, contributing zero records");
                    failed_repos.push(FailedRepo {
                        name: repo.name.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }

        index.version = SCHEMA_VERSION;
        index.last_updated = Utc::now();

        if let Err(err) = self.save(&index).await {
            warn!(error = %err, "Failed to persist index, returning unpersisted build");
        }

        info!(
            templates = index.len(),
            repos = repos.len(),
            failed = failed_repos.len(),
            "Template index built"
        );
        Ok(BuildReport {
            index,
            skipped,
            failed_repos,
        })
    }

    /// Staleness test: true when no usable persisted index exists, or any
    /// configured checkout is absent or modified after the last build.
    pub async fn needs_update(&self, repos: &[RepoRef]) -> bool {
        match self.load().await {
            Some(index) => is_stale(&index, repos).await,
            None => true,
        }
    }

    /// Delete the persisted index. Idempotent; a missing file is fine.
    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                info!(path = %self.path.display(), "Cleared index cache");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err)
                .with_context(|| format!("Failed to remove index cache: {}", self.path.display())),
        }
    }

    /// Diagnostic read of the cache file. Reports the raw `version` even
    /// when it mismatches the current schema.
    pub async fn stats(&self) -> CacheStats {
        let metadata = match tokio::fs::metadata(&self.path).await {
            Ok(metadata) => metadata,
            Err(_) => {
                return CacheStats {
                    exists: false,
                    size_bytes: 0,
                    last_updated: None,
                    template_count: 0,
                    version: None,
                };
            }
        };

        let parsed = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => serde_json::from_str::<TemplateIndex>(&content).ok(),
            Err(_) => None,
        };

        match parsed {
            Some(index) => CacheStats {
                exists: true,
                size_bytes: metadata.len(),
                last_updated: Some(index.last_updated),
                template_count: index.len(),
                version: Some(index.version),
            },
            None => CacheStats {
                exists: true,
                size_bytes: metadata.len(),
                last_updated: None,
                template_count: 0,
                version: None,
            },
        }
    }

    /// Load the persisted index without any staleness check. Missing,
    /// unreadable, corrupt, and version-mismatched files all degrade to
    /// `None`.
    pub async fn load(&self) -> Option<TemplateIndex> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    debug!(error = %err, "Index cache unreadable, treating as miss");
                }
                return None;
            }
        };

        let index: TemplateIndex = match serde_json::from_str(&content) {
            Ok(index) => index,
            Err(err) => {
                warn!(error = %err, "Index cache corrupt, treating as miss");
                return None;
            }
        };

        if !index.is_current_version() {
            debug!(
                found = index.version,
                current = SCHEMA_VERSION,
                "Index schema version mismatch, treating as miss"
            );
            return None;
        }

        Some(index)
    }

    /// Atomically replace the cache file: write to a temp file in the same
    /// directory, then rename over the target.
    async fn save(&self, index: &TemplateIndex) -> Result<()> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| eyre::eyre!("Invalid index cache path: {}", self.path.display()))?;
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create cache directory: {}", parent.display()))?;

        let encoded = serde_json::to_string_pretty(index).context("Failed to encode index")?;
        let mut tmp =
            NamedTempFile::new_in(parent).context("Failed to create temporary index file")?;
        tmp.write_all(encoded.as_bytes())
            .context("Failed to write temporary index file")?;
        tmp.flush().context("Failed to flush temporary index file")?;
        tmp.persist(&self.path)
            .map(|_| ())
            .with_context(|| format!("Failed to persist index cache: {}", self.path.display()))?;

        debug!(path = %self.path.display(), bytes = encoded.len(), "Persisted index cache");
        Ok(())
    }
}

async fn is_stale(index: &TemplateIndex, repos: &[RepoRef]) -> bool {
    for repo in repos {
        let modified = match tokio::fs::metadata(&repo.root).await {
            Ok(metadata) => metadata.modified().map(DateTime::<Utc>::from).ok(),
            // Absent checkout: stale until it reappears or the repository
            // is removed from configuration.
            Err(_) => {
                debug!(repo = %repo.name, "Checkout absent, index stale");
                return true;
            }
        };
        match modified {
            Some(mtime) if mtime <= index.last_updated => {}
            _ => {
                debug!(repo = %repo.name, "Checkout modified after last build, index stale");
                return true;
            }
        }
    }
    false
}

//! Template scanner
//!
//! Converts one repository checkout into template records. Candidate files
//! are `*.yml`/`*.yaml` anywhere under the checkout, hidden entries excluded.
//! A file that fails to read, parse, or validate becomes a typed skip in the
//! outcome; it never aborts the batch.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use eyre::{Context, Result};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::record::{ContextTarget, TemplateKind, TemplateRecord};

/// Why a candidate file was left out of the index.
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("unrecognized template type `{0}`")]
    UnknownType(String),
    #[error("invalid yaml: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("unreadable: {0}")]
    Unreadable(#[from] std::io::Error),
}

/// A candidate file that did not become a record.
#[derive(Debug)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Result of scanning one repository: the records that validated plus the
/// files that were skipped, so callers can assert on skip causes instead of
/// scraping logs.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub records: Vec<TemplateRecord>,
    pub skipped: Vec<SkippedFile>,
}

/// Raw YAML shape of a template file. Everything is optional here; required
/// fields are enforced during normalization so a missing field yields a
/// precise skip reason instead of a serde error.
#[derive(Debug, Deserialize)]
struct RawTemplate {
    id: Option<String>,
    #[serde(rename = "type")]
    template_type: Option<String>,
    name: Option<String>,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    summary: String,
    content: Option<String>,
    targets: Option<Vec<ContextTarget>>,
}

/// Scan a repository checkout into records.
///
/// Errors only when the checkout itself is unusable (missing or not a
/// directory); the caller decides whether that is fatal. Per-file problems
/// land in [`ScanOutcome::skipped`].
pub async fn scan_repo(repo_name: &str, root: &Path) -> Result<ScanOutcome> {
    if !root.is_dir() {
        return Err(eyre::eyre!("Repository checkout not found: {}", root.display()));
    }
    let root = tokio::fs::canonicalize(root)
        .await
        .with_context(|| format!("Failed to resolve checkout path: {}", root.display()))?;

    let candidates: Vec<PathBuf> = WalkDir::new(&root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| is_template_file(e.path()))
        .map(|e| e.path().to_path_buf())
        .collect();

    let mut outcome = ScanOutcome::default();
    for path in candidates {
        match load_template_file(repo_name, &path).await {
            Ok(record) => outcome.records.push(record),
            Err(reason) => {
                debug!(path = %path.display(), %reason, "Skipping template file");
                outcome.skipped.push(SkippedFile { path, reason });
            }
        }
    }

    debug!(
        repo = repo_name,
        records = outcome.records.len(),
        skipped = outcome.skipped.len(),
        "Repository scan complete"
    );
    Ok(outcome)
}

/// Load a single template file into a record.
///
/// Also used by deep search to synthesize records for content matches.
pub async fn load_template_file(repo_name: &str, path: &Path) -> Result<TemplateRecord, SkipReason> {
    let content = tokio::fs::read_to_string(path).await?;
    let raw: RawTemplate = serde_yaml::from_str(&content)?;

    let metadata = tokio::fs::metadata(path).await?;
    let modified = metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());

    normalize(raw, repo_name, path, modified)
}

fn normalize(
    raw: RawTemplate,
    repo_name: &str,
    path: &Path,
    modified: DateTime<Utc>,
) -> Result<TemplateRecord, SkipReason> {
    let id = required(raw.id, "id")?;
    let name = required(raw.name, "name")?;

    let kind = match raw.template_type.as_deref() {
        Some("prompt") => TemplateKind::Prompt {
            content: raw.content.unwrap_or_default(),
        },
        Some("context") => TemplateKind::Context {
            targets: raw.targets.unwrap_or_default(),
        },
        Some(other) => return Err(SkipReason::UnknownType(other.to_string())),
        None => return Err(SkipReason::MissingField("type")),
    };

    Ok(TemplateRecord {
        id,
        name,
        labels: raw.labels,
        summary: raw.summary,
        kind,
        repo_name: repo_name.to_string(),
        abs_path: path.to_path_buf(),
        last_modified: modified,
    })
}

fn required(value: Option<String>, field: &'static str) -> Result<String, SkipReason> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(SkipReason::MissingField(field))
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}

/// Candidate predicate shared with content-level search: templates are
/// the `*.yml` / `*.yaml` files of a checkout.
pub fn is_template_file(path: &Path) -> bool {
    path.extension().map(|e| e == "yml" || e == "yaml").unwrap_or(false)
}

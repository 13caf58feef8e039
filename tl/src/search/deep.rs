//! Deep search fallback - content-level search over raw template files
//!
//! When a query has to match template *content* rather than header fields,
//! deep search scans the candidate files of every checkout directly and
//! synthesizes index-shaped results from the files that matched. Content
//! matches are candidates, not ranked hits: every synthesized result gets
//! the same fixed base score.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use grep_regex::RegexMatcherBuilder;
use grep_searcher::sinks::UTF8;
use grep_searcher::{BinaryDetection, SearcherBuilder};
use tracing::debug;
use walkdir::WalkDir;

use templateindex::{RepoRef, is_template_file, load_template_file};

use super::engine::SearchResult;

/// Fixed base score for every synthesized deep-search result
pub const DEEP_MATCH_SCORE: f64 = 1.0;

/// Error types for deep search
#[derive(Debug, thiserror::Error)]
pub enum DeepSearchError {
    /// The content scanner cannot run; raised only on explicit deep-search
    /// requests, so the caller can explain the missing dependency.
    #[error("Content scanner unavailable: {0}")]
    ScannerUnavailable(String),

    #[error("Content scan failed: {0}")]
    ScanFailed(String),
}

/// One raw content match inside a checkout
#[derive(Debug, Clone)]
pub struct ContentMatch {
    pub path: PathBuf,
    pub line_number: u64,
    pub line: String,
}

/// Content-scanning collaborator seam
#[async_trait]
pub trait ContentScanner: Send + Sync {
    /// Probe whether the scanner can run at all
    async fn is_available(&self) -> bool;

    /// Literal keyword search over one checkout's candidate files
    async fn search(&self, keyword: &str, root: &Path, case_sensitive: bool)
    -> Result<Vec<ContentMatch>, DeepSearchError>;
}

/// In-process scanner built on the ripgrep crates
#[derive(Debug, Default)]
pub struct GrepScanner;

impl GrepScanner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ContentScanner for GrepScanner {
    async fn is_available(&self) -> bool {
        true
    }

    async fn search(
        &self,
        keyword: &str,
        root: &Path,
        case_sensitive: bool,
    ) -> Result<Vec<ContentMatch>, DeepSearchError> {
        let matcher = RegexMatcherBuilder::new()
            .case_insensitive(!case_sensitive)
            .build(&regex::escape(keyword))
            .map_err(|e| DeepSearchError::ScanFailed(e.to_string()))?;

        let mut searcher_builder = SearcherBuilder::new();
        searcher_builder.binary_detection(BinaryDetection::quit(b'\x00'));

        let files: Vec<PathBuf> = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !is_hidden_entry(e))
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.path().to_path_buf())
            .filter(|p| is_template_file(p))
            .collect();

        let mut matches = Vec::new();
        for file_path in files {
            let mut searcher = searcher_builder.build();

            let search_result = searcher.search_path(
                &matcher,
                &file_path,
                UTF8(|line_num, line| {
                    matches.push(ContentMatch {
                        path: file_path.clone(),
                        line_number: line_num,
                        line: line.trim_end().to_string(),
                    });
                    Ok(true)
                }),
            );

            if let Err(e) = search_result {
                // Skip files that can't be searched (binary, permissions, etc.)
                debug!(?file_path, %e, "skipping unsearchable file");
            }
        }

        Ok(matches)
    }
}

fn is_hidden_entry(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}

/// Runs the fallback: scan, dedupe, synthesize
pub struct DeepSearch<S: ContentScanner> {
    scanner: S,
}

impl<S: ContentScanner> DeepSearch<S> {
    pub fn new(scanner: S) -> Self {
        Self { scanner }
    }

    /// Scan every checkout for the keyword and synthesize results for the
    /// matched files. `known_ids` are the ids already returned by the
    /// index-based search; matches resolving to those are dropped.
    pub async fn run(
        &self,
        keyword: &str,
        repos: &[RepoRef],
        known_ids: &BTreeSet<String>,
        case_sensitive: bool,
    ) -> Result<Vec<SearchResult>, DeepSearchError> {
        if !self.scanner.is_available().await {
            return Err(DeepSearchError::ScannerUnavailable(
                "content scanner reported unavailable".to_string(),
            ));
        }

        let mut results = Vec::new();
        let mut seen_paths: BTreeSet<PathBuf> = BTreeSet::new();
        let mut seen_ids: BTreeSet<String> = known_ids.clone();

        for repo in repos {
            if !repo.root.exists() {
                debug!(repo = %repo.name, root = %repo.root.display(), "checkout absent, skipping deep scan");
                continue;
            }

            let matches = self.scanner.search(keyword, &repo.root, case_sensitive).await?;
            debug!(repo = %repo.name, count = matches.len(), "content matches");

            for content_match in matches {
                // One result per matched file, however many lines hit
                if !seen_paths.insert(content_match.path.clone()) {
                    continue;
                }

                match load_template_file(&repo.name, &content_match.path).await {
                    Ok(record) => {
                        if seen_ids.insert(record.id.clone()) {
                            results.push(SearchResult {
                                score: DEEP_MATCH_SCORE,
                                template: record,
                                matched_fields: BTreeSet::new(),
                            });
                        }
                    }
                    Err(reason) => {
                        // A matched file that isn't a loadable template is not an error
                        debug!(path = %content_match.path.display(), %reason, "skipping matched file");
                    }
                }
            }
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct OfflineScanner;

    #[async_trait]
    impl ContentScanner for OfflineScanner {
        async fn is_available(&self) -> bool {
            false
        }

        async fn search(&self, _: &str, _: &Path, _: bool) -> Result<Vec<ContentMatch>, DeepSearchError> {
            Ok(Vec::new())
        }
    }

    fn write_file(dir: &Path, rel: &str, content: &str) -> PathBuf {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    fn prompt_yaml(id: &str, body: &str) -> String {
        format!(
            "id: {id}\nname: {id} template\ntype: prompt\ncontent: |\n  {body}\n"
        )
    }

    #[tokio::test]
    async fn test_grep_scanner_finds_content_matches() {
        let repo = TempDir::new().expect("Failed to create temp dir");
        write_file(repo.path(), "deploy.yml", &prompt_yaml("deploy", "run the kubernetes rollout"));
        write_file(repo.path(), "other.yml", &prompt_yaml("other", "nothing relevant"));

        let scanner = GrepScanner::new();
        let matches = scanner
            .search("kubernetes", repo.path(), false)
            .await
            .expect("scan failed");

        assert_eq!(matches.len(), 1);
        assert!(matches[0].path.ends_with("deploy.yml"));
        assert!(matches[0].line.contains("kubernetes"));
        assert!(matches[0].line_number > 0);
    }

    #[tokio::test]
    async fn test_grep_scanner_is_case_insensitive_by_default() {
        let repo = TempDir::new().expect("Failed to create temp dir");
        write_file(repo.path(), "shout.yml", &prompt_yaml("shout", "USE KUBERNETES HERE"));

        let scanner = GrepScanner::new();
        let matches = scanner
            .search("kubernetes", repo.path(), false)
            .await
            .expect("scan failed");
        assert_eq!(matches.len(), 1);

        let matches = scanner
            .search("kubernetes", repo.path(), true)
            .await
            .expect("scan failed");
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_grep_scanner_ignores_non_template_files() {
        let repo = TempDir::new().expect("Failed to create temp dir");
        write_file(repo.path(), "notes.txt", "kubernetes kubernetes kubernetes");
        write_file(repo.path(), ".hidden/secret.yml", &prompt_yaml("secret", "kubernetes"));

        let scanner = GrepScanner::new();
        let matches = scanner
            .search("kubernetes", repo.path(), false)
            .await
            .expect("scan failed");

        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_grep_scanner_treats_keyword_as_literal() {
        let repo = TempDir::new().expect("Failed to create temp dir");
        write_file(repo.path(), "regex.yml", &prompt_yaml("regex", "matches a.b literally"));
        write_file(repo.path(), "other.yml", &prompt_yaml("other", "matches axb loosely"));

        let scanner = GrepScanner::new();
        let matches = scanner
            .search("a.b", repo.path(), false)
            .await
            .expect("scan failed");

        assert_eq!(matches.len(), 1);
        assert!(matches[0].path.ends_with("regex.yml"));
    }

    #[tokio::test]
    async fn test_run_synthesizes_and_dedupes_by_path() {
        let repo = TempDir::new().expect("Failed to create temp dir");
        // Keyword on two lines of the same file: still one result
        write_file(
            repo.path(),
            "deploy.yml",
            "id: deploy\nname: Deploy\ntype: prompt\ncontent: |\n  kubernetes rollout\n  kubernetes rollback\n",
        );

        let deep = DeepSearch::new(GrepScanner::new());
        let repos = vec![RepoRef::new("fixtures", repo.path())];
        let results = deep
            .run("kubernetes", &repos, &BTreeSet::new(), false)
            .await
            .expect("deep search failed");

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].template.id, "deploy");
        assert_eq!(results[0].score, DEEP_MATCH_SCORE);
        assert!(results[0].matched_fields.is_empty());
        assert_eq!(results[0].template.repo_name, "fixtures");
    }

    #[tokio::test]
    async fn test_run_drops_ids_already_in_index_results() {
        let repo = TempDir::new().expect("Failed to create temp dir");
        write_file(repo.path(), "deploy.yml", &prompt_yaml("deploy", "kubernetes"));
        write_file(repo.path(), "fresh.yml", &prompt_yaml("fresh", "kubernetes"));

        let deep = DeepSearch::new(GrepScanner::new());
        let repos = vec![RepoRef::new("fixtures", repo.path())];
        let known: BTreeSet<String> = ["deploy".to_string()].into();
        let results = deep
            .run("kubernetes", &repos, &known, false)
            .await
            .expect("deep search failed");

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].template.id, "fresh");
    }

    #[tokio::test]
    async fn test_run_survives_unloadable_matched_file() {
        let repo = TempDir::new().expect("Failed to create temp dir");
        write_file(repo.path(), "broken.yml", "content mentioning kubernetes\n\t: not yaml");
        write_file(repo.path(), "good.yml", &prompt_yaml("good", "kubernetes"));

        let deep = DeepSearch::new(GrepScanner::new());
        let repos = vec![RepoRef::new("fixtures", repo.path())];
        let results = deep
            .run("kubernetes", &repos, &BTreeSet::new(), false)
            .await
            .expect("deep search failed");

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].template.id, "good");
    }

    #[tokio::test]
    async fn test_run_skips_absent_checkout() {
        let repo = TempDir::new().expect("Failed to create temp dir");
        write_file(repo.path(), "here.yml", &prompt_yaml("here", "kubernetes"));

        let deep = DeepSearch::new(GrepScanner::new());
        let repos = vec![
            RepoRef::new("missing", "/nonexistent/checkout"),
            RepoRef::new("fixtures", repo.path()),
        ];
        let results = deep
            .run("kubernetes", &repos, &BTreeSet::new(), false)
            .await
            .expect("deep search failed");

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].template.repo_name, "fixtures");
    }

    #[tokio::test]
    async fn test_unavailable_scanner_fails_fast() {
        let deep = DeepSearch::new(OfflineScanner);
        let result = deep.run("anything", &[], &BTreeSet::new(), false).await;

        assert!(matches!(result, Err(DeepSearchError::ScannerUnavailable(_))));
    }
}

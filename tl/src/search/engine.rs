//! Search engine - filters, scores, and ranks index records
//!
//! Scoring is a three-tier heuristic per field: exact equality beats
//! substring containment beats subsequence ("fuzzy") matching. Field
//! weights keep a name hit above an id hit above a label hit above a
//! summary hit at the same tier. Scores are only comparable within one
//! search invocation.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::Serialize;
use templateindex::{TemplateIndex, TemplateRecord, TemplateType};
use tracing::debug;

/// Field weights, multiplied by the tier factor (2.0 / 1.0 / 0.5)
const NAME_WEIGHT: f64 = 10.0;
const ID_WEIGHT: f64 = 8.0;
const LABEL_WEIGHT: f64 = 6.0;
const SUMMARY_WEIGHT: f64 = 4.0;

/// Score assigned to every record when no keyword is given (browse mode)
const BROWSE_SCORE: f64 = 1.0;

/// A record field the query matched, for UI highlighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchedField {
    Id,
    Name,
    Summary,
    Labels,
}

/// One ranked search hit
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub score: f64,
    pub template: TemplateRecord,
    /// Fields containing the query as a substring; informational only
    pub matched_fields: BTreeSet<MatchedField>,
}

/// Caller-visible diagnostic attached to an empty result set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchNote {
    /// The requested repository has no records in the index
    UnknownRepo(String),
}

impl std::fmt::Display for SearchNote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownRepo(name) => write!(f, "no templates indexed for repository '{}'", name),
        }
    }
}

/// Search parameters
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Keyword to score against; None browses every surviving record
    pub keyword: Option<String>,

    /// Keep only records of this type
    pub kind: Option<TemplateType>,

    /// Keep only records carrying these labels
    pub labels: Vec<String>,

    /// Require all requested labels instead of at least one
    pub label_match_all: bool,

    /// Keep only records from this repository
    pub repo: Option<String>,

    /// Truncate the ranked results to this many entries
    pub max_results: usize,

    /// Skip case normalization when comparing
    pub case_sensitive: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            keyword: None,
            kind: None,
            labels: Vec::new(),
            label_match_all: false,
            repo: None,
            max_results: 20,
            case_sensitive: false,
        }
    }
}

/// Ranked results plus an optional diagnostic
#[derive(Debug, Default)]
pub struct SearchOutcome {
    pub results: Vec<SearchResult>,
    pub note: Option<SearchNote>,
}

/// Filters, scores, and ranks template records against a query
#[derive(Debug, Default)]
pub struct SearchEngine;

impl SearchEngine {
    pub fn new() -> Self {
        Self
    }

    /// Run one search over an index
    pub fn search(&self, index: &TemplateIndex, opts: &SearchOptions) -> SearchOutcome {
        // Repository filter first: an unknown or empty repository short-circuits
        // with a diagnostic instead of an error.
        if let Some(repo) = &opts.repo
            && !index.templates.iter().any(|r| &r.repo_name == repo)
        {
            debug!(%repo, "no records for requested repository");
            return SearchOutcome {
                results: Vec::new(),
                note: Some(SearchNote::UnknownRepo(repo.clone())),
            };
        }

        let keyword = opts.keyword.as_deref().filter(|k| !k.is_empty());

        let mut results: Vec<SearchResult> = index
            .templates
            .iter()
            .filter(|r| self.matches_filters(r, opts))
            .filter_map(|r| {
                let score = match keyword {
                    Some(kw) => score_record(r, kw, opts.case_sensitive),
                    None => BROWSE_SCORE,
                };
                (score > 0.0).then(|| SearchResult {
                    score,
                    matched_fields: keyword.map(|kw| matched_fields(r, kw)).unwrap_or_default(),
                    template: r.clone(),
                })
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.template.name.cmp(&b.template.name))
        });
        results.truncate(opts.max_results);

        debug!(count = results.len(), keyword = ?keyword, "search complete");
        SearchOutcome { results, note: None }
    }

    /// Hard per-record filters, applied before any scoring. Records joining
    /// the result set from outside the index (content scans) go through the
    /// same predicate.
    pub fn matches_filters(&self, record: &TemplateRecord, opts: &SearchOptions) -> bool {
        opts.repo.as_ref().is_none_or(|repo| &record.repo_name == repo)
            && opts.kind.is_none_or(|kind| record.template_type() == kind)
            && matches_labels(record, &opts.labels, opts.label_match_all)
    }
}

/// Label filter: all-of (intersection equals the request) or any-of
/// (non-empty intersection). A record without labels never matches a
/// non-empty filter.
fn matches_labels(record: &TemplateRecord, requested: &[String], match_all: bool) -> bool {
    if requested.is_empty() {
        return true;
    }
    let has = |wanted: &String| record.labels.iter().any(|l| l == wanted);
    if match_all {
        requested.iter().all(has)
    } else {
        requested.iter().any(has)
    }
}

/// Sum of per-field contributions; each field contributes its strongest tier
fn score_record(record: &TemplateRecord, keyword: &str, case_sensitive: bool) -> f64 {
    let mut score = 0.0;
    score += field_score(keyword, &record.id, ID_WEIGHT, case_sensitive);
    score += field_score(keyword, &record.name, NAME_WEIGHT, case_sensitive);
    score += field_score(keyword, &record.summary, SUMMARY_WEIGHT, case_sensitive);
    for label in &record.labels {
        score += field_score(keyword, label, LABEL_WEIGHT, case_sensitive);
    }
    score
}

/// Three-tier comparison of one query against one field
fn field_score(keyword: &str, field: &str, weight: f64, case_sensitive: bool) -> f64 {
    let (keyword, field) = if case_sensitive {
        (keyword.to_string(), field.to_string())
    } else {
        (keyword.to_lowercase(), field.to_lowercase())
    };

    if field == keyword {
        weight * 2.0
    } else if field.contains(&keyword) {
        weight
    } else if is_subsequence(&keyword, &field) {
        weight * 0.5
    } else {
        0.0
    }
}

/// Every needle char appears in the haystack in order, not necessarily adjacent
fn is_subsequence(needle: &str, haystack: &str) -> bool {
    let mut chars = haystack.chars();
    needle.chars().all(|n| chars.any(|h| h == n))
}

/// Recompute which fields contain the query as a substring
fn matched_fields(record: &TemplateRecord, keyword: &str) -> BTreeSet<MatchedField> {
    let keyword = keyword.to_lowercase();
    let mut fields = BTreeSet::new();
    if record.id.to_lowercase().contains(&keyword) {
        fields.insert(MatchedField::Id);
    }
    if record.name.to_lowercase().contains(&keyword) {
        fields.insert(MatchedField::Name);
    }
    if record.summary.to_lowercase().contains(&keyword) {
        fields.insert(MatchedField::Summary);
    }
    if record.labels.iter().any(|l| l.to_lowercase().contains(&keyword)) {
        fields.insert(MatchedField::Labels);
    }
    fields
}

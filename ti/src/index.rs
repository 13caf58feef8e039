//! Persisted index model
//!
//! The index is a flat, versioned collection of every template record across
//! the configured repositories, plus build metadata. It is a derived cache:
//! deleting it loses nothing, the repository file trees stay the source of
//! truth.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::TemplateRecord;

/// Current schema version of the persisted index. A cached index with a
/// different version is treated as absent and rebuilt from scratch.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateIndex {
    pub version: u32,
    /// Timestamp of the last successful build
    pub last_updated: DateTime<Utc>,
    /// All records, in discovery order (order carries no meaning)
    #[serde(default)]
    pub templates: Vec<TemplateRecord>,
}

impl TemplateIndex {
    pub fn new_empty() -> Self {
        Self {
            version: SCHEMA_VERSION,
            last_updated: Utc::now(),
            templates: Vec::new(),
        }
    }

    pub fn is_current_version(&self) -> bool {
        self.version == SCHEMA_VERSION
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Names of repositories that contributed at least one record.
    pub fn repo_names(&self) -> BTreeSet<&str> {
        self.templates.iter().map(|t| t.repo_name.as_str()).collect()
    }

    /// All records with the given id; more than one entry means the id is
    /// used in several repositories and needs a repo qualifier.
    pub fn find_by_id(&self, id: &str, repo: Option<&str>) -> Vec<&TemplateRecord> {
        self.templates
            .iter()
            .filter(|t| t.id == id)
            .filter(|t| repo.is_none_or(|r| t.repo_name == r))
            .collect()
    }
}

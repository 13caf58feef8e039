//! Template record model
//!
//! A template is one YAML file inside a repository checkout. Scanning
//! normalizes each file into a [`TemplateRecord`]: header fields shared by
//! every template plus a typed payload that depends on the `type` key.
//! `id` + `type` + owning repository identify a record.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A normalized template, as stored in the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRecord {
    /// Unique within the owning repository
    pub id: String,
    /// Human-readable display name
    pub name: String,
    /// Ordered labels, may be empty
    #[serde(default)]
    pub labels: Vec<String>,
    /// Short description, empty when the source file has none
    #[serde(default)]
    pub summary: String,
    /// Type-specific payload, discriminated by the `type` key
    #[serde(flatten)]
    pub kind: TemplateKind,
    /// Name of the owning repository
    pub repo_name: String,
    /// Absolute location of the source file
    pub abs_path: PathBuf,
    /// Modification time of the source file
    pub last_modified: DateTime<Utc>,
}

impl TemplateRecord {
    pub fn template_type(&self) -> TemplateType {
        self.kind.template_type()
    }

    /// The payload as displayable text: prompt content verbatim, context
    /// targets one per line.
    pub fn body(&self) -> String {
        match &self.kind {
            TemplateKind::Prompt { content } => content.clone(),
            TemplateKind::Context { targets } => targets
                .iter()
                .map(ContextTarget::to_string)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Typed template payload.
///
/// Serialized inline into the record (`#[serde(flatten)]`), so the on-disk
/// shape stays flat: `{"type": "prompt", "content": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TemplateKind {
    Prompt {
        #[serde(default)]
        content: String,
    },
    Context {
        #[serde(default)]
        targets: Vec<ContextTarget>,
    },
}

impl TemplateKind {
    pub fn template_type(&self) -> TemplateType {
        match self {
            TemplateKind::Prompt { .. } => TemplateType::Prompt,
            TemplateKind::Context { .. } => TemplateType::Context,
        }
    }
}

/// Where a context template gets installed: the assistant/tool it feeds and,
/// optionally, the destination file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextTarget {
    pub tool: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl fmt::Display for ContextTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{} -> {}", self.tool, path.display()),
            None => write!(f, "{}", self.tool),
        }
    }
}

/// Template type discriminant, used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateType {
    Prompt,
    Context,
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateType::Prompt => write!(f, "prompt"),
            TemplateType::Context => write!(f, "context"),
        }
    }
}

impl FromStr for TemplateType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "prompt" => Ok(TemplateType::Prompt),
            "context" => Ok(TemplateType::Context),
            _ => Err(format!("Unknown template type: {} (expected prompt or context)", s)),
        }
    }
}

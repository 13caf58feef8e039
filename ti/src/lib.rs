//! TemplateIndex - versioned template index cache
//!
//! Maintains a derived, disposable index of template definitions (prompts
//! and contexts) discovered across git-backed repository checkouts. The
//! index is rebuilt in full whenever it goes stale; the repository file
//! trees remain the source of truth, so the cache is always safe to delete.
//!
//! # Layout
//!
//! ```text
//! ~/.cache/templib/
//! └── index.json       # the one persisted artifact: version, lastUpdated, templates[]
//! ```
//!
//! # Example
//!
//! ```ignore
//! use templateindex::{IndexCache, RepoRef};
//!
//! let cache = IndexCache::new(IndexCache::default_path());
//! let repos = vec![RepoRef::new("main", "/home/user/template-repo")];
//! let index = cache.get_index(&repos, false).await?;
//! for template in &index.templates {
//!     println!("{} ({})", template.name, template.template_type());
//! }
//! ```

pub mod cli;
mod cache;
mod index;
mod record;
mod scanner;

pub use cache::{BuildReport, CacheStats, FailedRepo, IndexCache, RepoRef};
pub use index::{SCHEMA_VERSION, TemplateIndex};
pub use record::{ContextTarget, TemplateKind, TemplateRecord, TemplateType};
pub use scanner::{ScanOutcome, SkipReason, SkippedFile, is_template_file, load_template_file, scan_repo};

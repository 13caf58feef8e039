//! Template repository management
//!
//! Resolves configured repositories to local checkouts and wraps the
//! git operations that keep those checkouts up to date.

mod git;
mod registry;

pub use git::{GitError, RepoStatus, clone_repo, pull_repo, repo_status};
pub use registry::{Registry, derive_repo_name};

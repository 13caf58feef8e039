//! Git plumbing for template repository checkouts

use std::path::Path;

use tokio::process::Command;
use tracing::{debug, info};

/// Error types for git operations
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("Failed to clone repository: {0}")]
    CloneFailed(String),

    #[error("Failed to pull repository: {0}")]
    PullFailed(String),

    #[error("Not a git repository: {0}")]
    NotARepository(String),

    #[error("Git command failed: {0}")]
    CommandFailed(String),
}

/// Status of a local checkout
#[derive(Debug, Clone)]
pub struct RepoStatus {
    /// Current branch name
    pub branch: String,

    /// Uncommitted changes present
    pub dirty: bool,
}

/// Clone a repository to the given destination
pub async fn clone_repo(url: &str, dest: &Path, branch: Option<&str>) -> Result<(), GitError> {
    debug!(%url, ?dest, ?branch, "cloning repository");

    if let Some(parent) = dest.parent()
        && let Err(e) = tokio::fs::create_dir_all(parent).await
    {
        return Err(GitError::CloneFailed(format!("Failed to create {}: {}", parent.display(), e)));
    }

    let mut args = vec!["clone".to_string()];
    if let Some(branch) = branch {
        args.push("--branch".to_string());
        args.push(branch.to_string());
    }
    args.push(url.to_string());
    args.push(dest.to_string_lossy().into_owned());

    let output = Command::new("git")
        .args(&args)
        .output()
        .await
        .map_err(|e| GitError::CommandFailed(e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GitError::CloneFailed(stderr.trim().to_string()));
    }

    info!("Cloned {} into {}", url, dest.display());
    Ok(())
}

/// Fast-forward pull an existing checkout
pub async fn pull_repo(root: &Path) -> Result<(), GitError> {
    debug!(?root, "pulling repository");

    if !root.join(".git").exists() {
        return Err(GitError::NotARepository(root.display().to_string()));
    }

    let output = Command::new("git")
        .args(["pull", "--ff-only"])
        .current_dir(root)
        .output()
        .await
        .map_err(|e| GitError::CommandFailed(e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GitError::PullFailed(stderr.trim().to_string()));
    }

    info!("Pulled {}", root.display());
    Ok(())
}

/// Report branch and dirtiness of a checkout
pub async fn repo_status(root: &Path) -> Result<RepoStatus, GitError> {
    if !root.join(".git").exists() {
        return Err(GitError::NotARepository(root.display().to_string()));
    }

    let branch_output = Command::new("git")
        .args(["rev-parse", "--abbrev-ref", "HEAD"])
        .current_dir(root)
        .output()
        .await
        .map_err(|e| GitError::CommandFailed(e.to_string()))?;

    if !branch_output.status.success() {
        let stderr = String::from_utf8_lossy(&branch_output.stderr);
        return Err(GitError::CommandFailed(stderr.trim().to_string()));
    }

    let branch = String::from_utf8_lossy(&branch_output.stdout).trim().to_string();

    let status_output = Command::new("git")
        .args(["status", "--porcelain"])
        .current_dir(root)
        .output()
        .await
        .map_err(|e| GitError::CommandFailed(e.to_string()))?;

    if !status_output.status.success() {
        let stderr = String::from_utf8_lossy(&status_output.stderr);
        return Err(GitError::CommandFailed(stderr.trim().to_string()));
    }

    Ok(RepoStatus {
        branch,
        dirty: !status_output.stdout.is_empty(),
    })
}

//! Thin wrappers over the `git` binary for `try clone` and `try worktree`.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;

#[derive(Error, Debug)]
pub enum GitError {
    #[error("not inside a git repository: {0}")]
    NotARepository(PathBuf),

    #[error("`{command}` failed: {stderr}")]
    Failed { command: String, stderr: String },

    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Run `git <args>` in `cwd`, returning trimmed stdout.
async fn git(cwd: &Path, args: &[&str]) -> Result<String, GitError> {
    let command = format!("git {}", shell_words::join(args));
    tracing::debug!(cwd = %cwd.display(), command = %command, "running git");
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        Err(GitError::Failed {
            command,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// `git clone <url> <dest>` run from `cwd`, so relative sources resolve there.
///
/// `dest` should be absolute and its parent must exist.
pub async fn clone(cwd: &Path, url: &str, dest: &Path) -> Result<(), GitError> {
    let dest_str = dest.to_string_lossy();
    git(cwd, &["clone", url, &*dest_str]).await?;
    tracing::info!(url = %url, path = %dest.display(), "cloned");
    Ok(())
}

/// Top-level directory of the repository containing `cwd`.
pub async fn toplevel(cwd: &Path) -> Result<PathBuf, GitError> {
    match git(cwd, &["rev-parse", "--show-toplevel"]).await {
        Ok(top) if !top.is_empty() => Ok(PathBuf::from(top)),
        Ok(_) | Err(GitError::Failed { .. }) => Err(GitError::NotARepository(cwd.to_path_buf())),
        Err(e) => Err(e),
    }
}

/// `git worktree add --detach <dest>` for the repository at `repo`.
pub async fn worktree_add(repo: &Path, dest: &Path) -> Result<(), GitError> {
    let dest_str = dest.to_string_lossy();
    git(repo, &["worktree", "add", "--detach", &*dest_str]).await?;
    tracing::info!(repo = %repo.display(), path = %dest.display(), "worktree added");
    Ok(())
}

/// Repository name from a clone URL: last path segment minus a `.git` suffix.
///
/// Handles `https://host/owner/repo.git`, `git@host:owner/repo.git` and plain paths.
pub fn repo_name_from_url(url: &str) -> Option<String> {
    let trimmed = url.trim().trim_end_matches('/');
    let last = trimmed.rsplit(['/', ':']).next()?;
    let name = last.strip_suffix(".git").unwrap_or(last);
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

//! Side-channel project index.
//!
//! Some tools keep per-project state in a folder named after the project's
//! absolute path, with every `/` and `.` replaced by `-`
//! (`/home/me/src/tries/x` → `-home-me-src-tries-x`). When a directory is
//! renamed or promoted that folder can be moved along with it.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Existence check used by the selector before offering to migrate an index folder.
pub trait IndexProbe {
    fn has_index(&self, dir: &Path) -> bool;
}

/// Probe for setups without a project index.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIndex;

impl IndexProbe for NoIndex {
    fn has_index(&self, _dir: &Path) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectIndex {
    root: PathBuf,
}

impl ProjectIndex {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Index folder for `dir`.
    pub fn folder_for(&self, dir: &Path) -> PathBuf {
        self.root.join(encode_path(dir))
    }

    /// Move the index folder of `from` to the encoding of `to`.
    ///
    /// Returns `false` when there is nothing to move or the destination is
    /// already taken; an existing folder is never overwritten.
    pub fn migrate(&self, from: &Path, to: &Path) -> Result<bool> {
        let src = self.folder_for(from);
        let dst = self.folder_for(to);
        if !src.is_dir() {
            return Ok(false);
        }
        if dst.exists() {
            tracing::warn!(
                from = %src.display(),
                to = %dst.display(),
                "project index destination exists; leaving index untouched"
            );
            return Ok(false);
        }
        std::fs::rename(&src, &dst).with_context(|| {
            format!(
                "moving project index {} -> {}",
                src.display(),
                dst.display()
            )
        })?;
        tracing::info!(from = %src.display(), to = %dst.display(), "migrated project index");
        Ok(true)
    }
}

impl IndexProbe for ProjectIndex {
    fn has_index(&self, dir: &Path) -> bool {
        self.folder_for(dir).is_dir()
    }
}

fn encode_path(dir: &Path) -> String {
    dir.to_string_lossy()
        .chars()
        .map(|c| if c == '/' || c == '.' { '-' } else { c })
        .collect()
}

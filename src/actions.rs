//! Applies a selector [`Action`] to the filesystem.
//!
//! This is the only place that mutates the tries tree. It runs strictly after
//! the interactive session has ended, awaits hooks one at a time, and returns
//! the directory the caller's shell should `cd` into (if any).

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use filetime::FileTime;
use thiserror::Error;

use crate::hooks::{HookError, HookRunner};
use crate::model::types::{DirectoryEntry, HookName};
use crate::project_index::ProjectIndex;
use crate::ui::selector::Action;

#[derive(Error, Debug)]
pub enum ActionError {
    #[error("{0} already exists")]
    AlreadyExists(PathBuf),

    #[error("{0} does not exist")]
    Missing(PathBuf),

    #[error("invalid directory name: {0:?}")]
    InvalidName(String),

    #[error("delete aborted: {0}")]
    Aborted(String),

    #[error("{op} {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ActionError {
    fn io<'a>(op: &'static str, path: &'a Path) -> impl FnOnce(std::io::Error) -> Self + 'a {
        move |source| ActionError::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Where the caller should end up after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Emit a `cd` into this directory.
    ChangeDir(PathBuf),
    /// Cancelled; emit nothing.
    Nothing,
}

/// Filesystem + hook context for applying actions.
pub struct ActionContext {
    pub root: PathBuf,
    pub hooks: HookRunner,
    pub project_index: Option<ProjectIndex>,
}

impl ActionContext {
    pub fn new(root: impl Into<PathBuf>, hooks: HookRunner) -> Self {
        Self {
            root: root.into(),
            hooks,
            project_index: None,
        }
    }

    pub fn with_project_index(mut self, index: Option<ProjectIndex>) -> Self {
        self.project_index = index;
        self
    }

    pub async fn apply(&self, action: Action) -> Result<Outcome, ActionError> {
        match action {
            Action::Select(entry) => self.select(&entry).await,
            Action::Create(name) => self.create(&name).await,
            Action::Delete(entry) => self.delete(&entry).await,
            Action::Archive { entry, target } => self.archive(&entry, &target),
            Action::Promote {
                entry,
                target,
                update_index,
            } => self.promote(&entry, &target, update_index),
            Action::Rename {
                entry,
                new_name,
                update_index,
            } => self.rename(&entry, &new_name, update_index),
            Action::Cancel => {
                tracing::debug!("selection cancelled");
                Ok(Outcome::Nothing)
            }
        }
    }

    /// Bump atime/mtime so the entry ranks as recent, then notify `after_select`.
    pub async fn select(&self, entry: &DirectoryEntry) -> Result<Outcome, ActionError> {
        if !entry.path.is_dir() {
            return Err(ActionError::Missing(entry.path.clone()));
        }
        touch(&entry.path)?;
        tracing::info!(path = %entry.path.display(), "selected");
        self.hooks.notify(HookName::AfterSelect, &entry.path).await;
        Ok(Outcome::ChangeDir(entry.path.clone()))
    }

    /// Create `<root>/<name>` and notify `after_create`.
    pub async fn create(&self, name: &str) -> Result<Outcome, ActionError> {
        let path = self.child(name)?;
        std::fs::create_dir_all(&self.root).map_err(ActionError::io("creating", &self.root))?;
        match std::fs::create_dir(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(ActionError::AlreadyExists(path));
            }
            Err(e) => return Err(ActionError::io("creating", &path)(e)),
        }
        tracing::info!(path = %path.display(), "created");
        self.hooks.notify(HookName::AfterCreate, &path).await;
        Ok(Outcome::ChangeDir(path))
    }

    /// Run the `before_delete` gate, then remove the directory tree.
    pub async fn delete(&self, entry: &DirectoryEntry) -> Result<Outcome, ActionError> {
        if !entry.path.exists() {
            return Err(ActionError::Missing(entry.path.clone()));
        }
        if let Err(e) = self.hooks.gate(HookName::BeforeDelete, &entry.path).await {
            let reason = match e {
                HookError::Aborted { reason, .. } => reason,
                other => other.to_string(),
            };
            tracing::warn!(path = %entry.path.display(), reason = %reason, "delete vetoed by hook");
            return Err(ActionError::Aborted(reason));
        }
        std::fs::remove_dir_all(&entry.path).map_err(ActionError::io("deleting", &entry.path))?;
        tracing::info!(path = %entry.path.display(), "deleted");
        Ok(Outcome::ChangeDir(self.root.clone()))
    }

    pub fn archive(&self, entry: &DirectoryEntry, target: &Path) -> Result<Outcome, ActionError> {
        move_dir(&entry.path, target)?;
        tracing::info!(from = %entry.path.display(), to = %target.display(), "archived");
        Ok(Outcome::ChangeDir(self.root.clone()))
    }

    pub fn promote(
        &self,
        entry: &DirectoryEntry,
        target: &Path,
        update_index: bool,
    ) -> Result<Outcome, ActionError> {
        move_dir(&entry.path, target)?;
        tracing::info!(from = %entry.path.display(), to = %target.display(), "promoted");
        self.migrate_index(&entry.path, target, update_index);
        Ok(Outcome::ChangeDir(target.to_path_buf()))
    }

    pub fn rename(
        &self,
        entry: &DirectoryEntry,
        new_name: &str,
        update_index: bool,
    ) -> Result<Outcome, ActionError> {
        let target = self.child(new_name)?;
        move_dir(&entry.path, &target)?;
        tracing::info!(from = %entry.path.display(), to = %target.display(), "renamed");
        self.migrate_index(&entry.path, &target, update_index);
        Ok(Outcome::ChangeDir(target))
    }

    fn migrate_index(&self, from: &Path, to: &Path, requested: bool) {
        if !requested {
            return;
        }
        let Some(index) = &self.project_index else {
            return;
        };
        // The move itself already succeeded; an index hiccup is only worth a warning.
        if let Err(e) = index.migrate(from, to) {
            tracing::warn!(error = %format!("{e:#}"), "project index not updated");
        }
    }

    /// `<root>/<name>`, rejecting names that would escape the root.
    fn child(&self, name: &str) -> Result<PathBuf, ActionError> {
        let name = name.trim();
        if name.is_empty() || name == "." || name == ".." || name.contains('/') {
            return Err(ActionError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }
}

fn touch(path: &Path) -> Result<(), ActionError> {
    let now = FileTime::now();
    filetime::set_file_times(path, now, now).map_err(ActionError::io("touching", path))
}

fn move_dir(from: &Path, to: &Path) -> Result<(), ActionError> {
    if !from.exists() {
        return Err(ActionError::Missing(from.to_path_buf()));
    }
    if to.exists() {
        return Err(ActionError::AlreadyExists(to.to_path_buf()));
    }
    let created = match to.parent() {
        Some(parent) => create_parents(parent)?,
        None => None,
    };
    if let Err(e) = std::fs::rename(from, to) {
        if let Some(top) = created {
            let _ = std::fs::remove_dir_all(&top);
        }
        return Err(ActionError::io("moving", from)(e));
    }
    Ok(())
}

/// `create_dir_all(dir)`, returning the outermost directory it had to create.
fn create_parents(dir: &Path) -> Result<Option<PathBuf>, ActionError> {
    let top = dir
        .ancestors()
        .take_while(|a| !a.as_os_str().is_empty() && !a.exists())
        .last()
        .map(Path::to_path_buf);
    std::fs::create_dir_all(dir).map_err(ActionError::io("creating", dir))?;
    Ok(top)
}

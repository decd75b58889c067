//! Configuration loading.
//!
//! Configuration lives in `~/.config/try/config.toml` (or `$TRY_CONFIG`):
//!
//! ```toml
//! path = "~/src/tries"
//! archive_path = "~/src/tries/.archive"
//! project_index = "~/.claude/projects"
//!
//! [hooks]
//! shell = "bash"
//! after_create = "~/bin/try-after-create"
//! before_delete = """
//! test ! -e "$TRY_DIR/.keep"
//! """
//! ```
//!
//! Every key is optional. The loaded value is passed explicitly to the
//! components that need it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::model::types::HookName;

/// Environment variable overriding the tries root.
pub const PATH_ENV: &str = "TRY_PATH";
/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "TRY_CONFIG";

const DEFAULT_ROOT: &str = "~/src/tries";
const ARCHIVE_DIR: &str = ".archive";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tries root.
    pub path: Option<String>,
    /// Where archived entries are moved; defaults to `<root>/.archive`.
    pub archive_path: Option<String>,
    /// Root of the side-channel project index, if any.
    pub project_index: Option<String>,
    pub hooks: HookConfig,
}

/// Commands bound to lifecycle points.
///
/// A value is either a path to an executable (`~/bin/x`, `/abs/x`, `./x`) or an
/// inline script body run through `shell`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HookConfig {
    /// Interpreter for inline scripts (default `sh`).
    pub shell: Option<String>,
    pub after_create: Option<String>,
    pub after_clone: Option<String>,
    pub after_worktree: Option<String>,
    pub after_select: Option<String>,
    pub before_delete: Option<String>,
}

impl HookConfig {
    /// The configured command for `hook`, ignoring blank values.
    pub fn command(&self, hook: HookName) -> Option<&str> {
        let value = match hook {
            HookName::AfterCreate => &self.after_create,
            HookName::AfterClone => &self.after_clone,
            HookName::AfterWorktree => &self.after_worktree,
            HookName::AfterSelect => &self.after_select,
            HookName::BeforeDelete => &self.before_delete,
        };
        value.as_deref().filter(|v| !v.trim().is_empty())
    }

    pub fn with(mut self, hook: HookName, command: impl Into<String>) -> Self {
        let slot = match hook {
            HookName::AfterCreate => &mut self.after_create,
            HookName::AfterClone => &mut self.after_clone,
            HookName::AfterWorktree => &mut self.after_worktree,
            HookName::AfterSelect => &mut self.after_select,
            HookName::BeforeDelete => &mut self.before_delete,
        };
        *slot = Some(command.into());
        self
    }
}

impl Config {
    /// Load from an explicit file, `$TRY_CONFIG`, or the default location.
    ///
    /// A missing file yields defaults; a malformed one is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path(),
        };
        let Some(path) = path else {
            return Ok(Self::default());
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let body = match std::fs::read_to_string(path) {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file; using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("reading config {}", path.display()));
            }
        };
        let config: Config =
            toml::from_str(&body).with_context(|| format!("parsing config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Resolve the tries root: flag, then `$TRY_PATH`, then `path`, then `~/src/tries`.
    pub fn tries_root(&self, flag: Option<&Path>) -> PathBuf {
        let raw = match flag {
            Some(p) => p.to_path_buf(),
            None => dotenvy::var(PATH_ENV)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .or_else(|| self.path.clone())
                .map(|s| expand_tilde(&s))
                .unwrap_or_else(|| expand_tilde(DEFAULT_ROOT)),
        };
        absolutize(&expand_tilde(&raw.to_string_lossy()))
    }

    pub fn archive_root(&self, tries_root: &Path) -> PathBuf {
        match &self.archive_path {
            Some(p) => absolutize(&expand_tilde(p)),
            None => tries_root.join(ARCHIVE_DIR),
        }
    }

    pub fn project_index_root(&self) -> Option<PathBuf> {
        self.project_index
            .as_deref()
            .map(|p| absolutize(&expand_tilde(p)))
    }
}

/// `$TRY_CONFIG`, else `<config_dir>/try/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(p) = dotenvy::var(CONFIG_ENV)
        && !p.trim().is_empty()
    {
        return Some(expand_tilde(&p));
    }
    dirs::config_dir().map(|d| d.join("try").join("config.toml"))
}

/// Expand a leading `~` or `~/` against the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        return dirs::home_dir().unwrap_or_else(|| PathBuf::from(path));
    }
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

fn absolutize(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

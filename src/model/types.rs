//! Normalized entity structs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// One candidate directory under the tries root.
///
/// Built fresh on every listing pass and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Absolute path of the directory.
    pub path: PathBuf,
    /// Raw folder name.
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub accessed_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    /// Leading `YYYY-MM-DD` parsed from the name, if any.
    pub date_prefix: Option<NaiveDate>,
    /// Name with the date prefix stripped; equals `name` when nothing is left to strip.
    pub base_name: String,
}

/// A [`DirectoryEntry`] annotated with scoring output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    #[serde(flatten)]
    pub entry: DirectoryEntry,
    /// Final ranking key in `0..=1`.
    pub score: f64,
    /// Normalized fuzzy match quality in `0..=1` (fixed at 1 for an empty query).
    pub fuzzy_score: f64,
    /// Recency component in `0..=1`.
    pub time_score: f64,
    /// Char indices into `entry.name` that took part in the match (highlighting only).
    pub positions: Vec<usize>,
}

impl RankedEntry {
    pub fn name(&self) -> &str {
        &self.entry.name
    }
}

/// Lifecycle points at which a user-configured command may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookName {
    AfterCreate,
    AfterClone,
    AfterWorktree,
    AfterSelect,
    BeforeDelete,
}

impl HookName {
    pub const ALL: [HookName; 5] = [
        HookName::AfterCreate,
        HookName::AfterClone,
        HookName::AfterWorktree,
        HookName::AfterSelect,
        HookName::BeforeDelete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HookName::AfterCreate => "after_create",
            HookName::AfterClone => "after_clone",
            HookName::AfterWorktree => "after_worktree",
            HookName::AfterSelect => "after_select",
            HookName::BeforeDelete => "before_delete",
        }
    }
}

impl fmt::Display for HookName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

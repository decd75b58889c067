//! Entry repository: lists candidate directories under the tries root.
//!
//! Listing is shallow (first-level children only), skips hidden names and
//! non-directories, and treats a missing root as an empty listing. Name
//! parsing is pure and independent of the filesystem.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::SystemTime;

use crate::model::types::DirectoryEntry;

static DATE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})-?(.*)$").expect("valid date prefix regex"));

/// List the non-hidden subdirectories of `root`.
///
/// Entries come back in directory-read order; ranking is the scoring engine's job.
pub fn list(root: &Path) -> Result<Vec<DirectoryEntry>> {
    let read_dir = match fs::read_dir(root) {
        Ok(rd) => rd,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(root = %root.display(), "tries root missing; empty listing");
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("reading tries root {}", root.display()));
        }
    };

    let mut entries = Vec::new();
    for item in read_dir {
        let item = match item {
            Ok(item) => item,
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        let name = item.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let path = item.path();
        // fs::metadata follows symlinks so linked project dirs still show up.
        let meta = match fs::metadata(&path) {
            Ok(meta) if meta.is_dir() => meta,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "skipping entry without metadata");
                continue;
            }
        };

        let modified_at = to_utc(meta.modified().ok());
        let created_at = meta.created().ok().map(|t| to_utc(Some(t))).unwrap_or(modified_at);
        let accessed_at = meta.accessed().ok().map(|t| to_utc(Some(t))).unwrap_or(modified_at);
        let (date_prefix, base_name) = parse_name(&name);

        entries.push(DirectoryEntry {
            path,
            name,
            created_at,
            accessed_at,
            modified_at,
            date_prefix,
            base_name,
        });
    }

    tracing::debug!(root = %root.display(), count = entries.len(), "listed entries");
    Ok(entries)
}

/// Split a leading `YYYY-MM-DD` (optionally followed by `-`) off `name`.
///
/// Returns the parsed date and the remaining base name. When there is no valid
/// date prefix, or nothing remains after stripping it, the base name is the full name.
pub fn parse_name(name: &str) -> (Option<NaiveDate>, String) {
    let Some(caps) = DATE_PREFIX.captures(name) else {
        return (None, name.to_string());
    };
    let Ok(date) = NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d") else {
        return (None, name.to_string());
    };
    let rest = caps.get(2).map_or("", |m| m.as_str());
    if rest.is_empty() {
        (Some(date), name.to_string())
    } else {
        (Some(date), rest.to_string())
    }
}

/// Turn free text into a dated directory name for `today`.
///
/// Lower-cases, collapses runs of non-alphanumerics into a single `-`, trims
/// hyphens at both ends, then prefixes `YYYY-MM-DD-`. An empty slug yields the bare date.
pub fn create_dir_name_on(query: &str, today: NaiveDate) -> String {
    let slug = slugify(query);
    let date = today.format("%Y-%m-%d");
    if slug.is_empty() {
        date.to_string()
    } else {
        format!("{date}-{slug}")
    }
}

/// [`create_dir_name_on`] for the local calendar date.
pub fn create_dir_name(query: &str) -> String {
    create_dir_name_on(query, chrono::Local::now().date_naive())
}

fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    out
}

fn to_utc(time: Option<SystemTime>) -> DateTime<Utc> {
    time.map(DateTime::<Utc>::from).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_name_strips_date_prefix() {
        assert_eq!(
            parse_name("2025-01-02-api"),
            (Some(date(2025, 1, 2)), "api".to_string())
        );
        assert_eq!(
            parse_name("2025-01-02api"),
            (Some(date(2025, 1, 2)), "api".to_string())
        );
    }

    #[test]
    fn parse_name_without_prefix_keeps_name() {
        assert_eq!(parse_name("scratch"), (None, "scratch".to_string()));
        assert_eq!(parse_name("2025-1-2-x"), (None, "2025-1-2-x".to_string()));
    }

    #[test]
    fn parse_name_rejects_impossible_dates() {
        assert_eq!(parse_name("2025-13-40-x"), (None, "2025-13-40-x".to_string()));
    }

    #[test]
    fn bare_date_keeps_full_name_as_base() {
        assert_eq!(
            parse_name("2025-01-01"),
            (Some(date(2025, 1, 1)), "2025-01-01".to_string())
        );
        assert_eq!(
            parse_name("2025-01-01-"),
            (Some(date(2025, 1, 1)), "2025-01-01-".to_string())
        );
    }

    #[test]
    fn create_dir_name_normalizes_query() {
        let today = date(2026, 3, 9);
        assert_eq!(
            create_dir_name_on("My Cool Project!", today),
            "2026-03-09-my-cool-project"
        );
        assert_eq!(create_dir_name_on("  --foo__bar--  ", today), "2026-03-09-foo-bar");
        assert_eq!(create_dir_name_on("", today), "2026-03-09");
        assert_eq!(create_dir_name_on("!!!", today), "2026-03-09");
    }

    #[test]
    fn create_dir_name_uses_local_date_shape() {
        let re = Regex::new(r"^\d{4}-\d{2}-\d{2}-my-cool-project$").unwrap();
        assert!(re.is_match(&create_dir_name("My Cool Project!")));
        let bare = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
        assert!(bare.is_match(&create_dir_name("")));
    }

    #[test]
    fn list_missing_root_is_empty() {
        let dir = TempDir::new().unwrap();
        let entries = list(&dir.path().join("does-not-exist")).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn list_skips_hidden_and_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("2025-01-01-alpha")).unwrap();
        fs::create_dir(dir.path().join("plain")).unwrap();
        fs::create_dir(dir.path().join(".archive")).unwrap();
        fs::create_dir_all(dir.path().join("plain/nested")).unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let mut names: Vec<String> = list(dir.path())
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["2025-01-01-alpha", "plain"]);
    }

    #[test]
    fn list_fills_parsed_metadata() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("2025-01-01-alpha")).unwrap();
        let entries = list(dir.path()).unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.base_name, "alpha");
        assert_eq!(entry.date_prefix, Some(date(2025, 1, 1)));
        assert!(entry.path.is_absolute());
        assert!(entry.modified_at > DateTime::<Utc>::UNIX_EPOCH);
    }
}

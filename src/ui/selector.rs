//! Selection state machine.
//!
//! A [`SelectorSession`] owns the query, the cursor, the ranked snapshot and
//! the current [`Mode`]. [`SelectorSession::handle_key`] is a synchronous
//! reducer: each key either mutates the session in place or yields exactly one
//! terminal [`Action`]. Unrecognized keys are ignored. Nothing here touches
//! the filesystem; index lookups go through [`IndexProbe`].

use chrono::{DateTime, NaiveDate, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::path::{Path, PathBuf};

use crate::config::expand_tilde;
use crate::entries::create_dir_name_on;
use crate::model::types::{DirectoryEntry, RankedEntry};
use crate::project_index::{IndexProbe, NoIndex};
use crate::search::ScoringEngine;

/// Queries that quit instead of selecting when confirmed on a normal row.
pub const EXIT_KEYWORDS: [&str; 2] = ["exit", "q"];

/// The single decision a session ends with.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Select(DirectoryEntry),
    /// Create a new directory with this (already dated and normalized) name.
    Create(String),
    Delete(DirectoryEntry),
    Archive {
        entry: DirectoryEntry,
        target: PathBuf,
    },
    Promote {
        entry: DirectoryEntry,
        target: PathBuf,
        update_index: bool,
    },
    Rename {
        entry: DirectoryEntry,
        new_name: String,
        update_index: bool,
    },
    Cancel,
}

/// Single-line editor with a char cursor, used by the path/name prompts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineEditor {
    chars: Vec<char>,
    cursor: usize,
}

impl LineEditor {
    /// Pre-filled editor with the cursor at the end.
    pub fn new(initial: &str) -> Self {
        let chars: Vec<char> = initial.chars().collect();
        let cursor = chars.len();
        Self { chars, cursor }
    }

    pub fn value(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn insert(&mut self, c: char) {
        self.chars.insert(self.cursor, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.chars.remove(self.cursor);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.chars.len() {
            self.chars.remove(self.cursor);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.chars.len());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.chars.len();
    }

    pub fn kill_to_end(&mut self) {
        self.chars.truncate(self.cursor);
    }

    pub fn kill_to_start(&mut self) {
        self.chars.drain(..self.cursor);
        self.cursor = 0;
    }

    /// Apply a line-editing key; returns `false` if the key is not an editing key.
    fn apply(&mut self, key: &KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('a') if ctrl => self.home(),
            KeyCode::Char('e') if ctrl => self.end(),
            KeyCode::Char('k') if ctrl => self.kill_to_end(),
            KeyCode::Char('u') if ctrl => self.kill_to_start(),
            KeyCode::Char(c) if is_plain(key) => self.insert(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.left(),
            KeyCode::Right => self.right(),
            KeyCode::Home => self.home(),
            KeyCode::End => self.end(),
            _ => return false,
        }
        true
    }
}

/// Current modal state. Each confirm mode carries only what it needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Search,
    /// The user must retype `target.name` exactly.
    DeleteConfirm {
        target: DirectoryEntry,
        typed: String,
    },
    ArchiveConfirm {
        target: DirectoryEntry,
        input: LineEditor,
    },
    /// `index_prompt` is set once the edit is accepted and a project index
    /// folder exists, while waiting for the y/n answer.
    PromoteConfirm {
        target: DirectoryEntry,
        input: LineEditor,
        index_prompt: bool,
    },
    RenameConfirm {
        target: DirectoryEntry,
        input: LineEditor,
        index_prompt: bool,
    },
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Search => "search",
            Mode::DeleteConfirm { .. } => "delete",
            Mode::ArchiveConfirm { .. } => "archive",
            Mode::PromoteConfirm { .. } => "promote",
            Mode::RenameConfirm { .. } => "rename",
        }
    }
}

/// One selectable row: a ranked entry or the trailing "create new" slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Row<'a> {
    Entry(&'a RankedEntry),
    Create,
}

/// Fixed inputs for a session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub root: PathBuf,
    pub archive_root: PathBuf,
    /// Clock reading used for every scoring pass in this session.
    pub now: DateTime<Utc>,
    /// Date used to prefix newly created directory names.
    pub today: NaiveDate,
}

impl SessionOptions {
    pub fn new(root: impl Into<PathBuf>, archive_root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            archive_root: archive_root.into(),
            now: Utc::now(),
            today: chrono::Local::now().date_naive(),
        }
    }
}

pub struct SelectorSession {
    entries: Vec<DirectoryEntry>,
    engine: ScoringEngine,
    index: Box<dyn IndexProbe>,
    options: SessionOptions,
    query: String,
    ranked: Vec<RankedEntry>,
    cursor: usize,
    mode: Mode,
    notice: Option<String>,
}

impl SelectorSession {
    pub fn new(entries: Vec<DirectoryEntry>, engine: ScoringEngine, options: SessionOptions) -> Self {
        let mut session = Self {
            entries,
            engine,
            index: Box::new(NoIndex),
            options,
            query: String::new(),
            ranked: Vec::new(),
            cursor: 0,
            mode: Mode::Search,
            notice: None,
        };
        session.refresh();
        session
    }

    pub fn with_index(mut self, index: Box<dyn IndexProbe>) -> Self {
        self.index = index;
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self.refresh();
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn ranked(&self) -> &[RankedEntry] {
        &self.ranked
    }

    pub fn root(&self) -> &Path {
        &self.options.root
    }

    /// Feedback from the last rejected confirm, cleared by the next key.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    fn has_create_slot(&self) -> bool {
        !self.query.trim().is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.ranked.len() + usize::from(self.has_create_slot())
    }

    pub fn row(&self, idx: usize) -> Option<Row<'_>> {
        if let Some(entry) = self.ranked.get(idx) {
            Some(Row::Entry(entry))
        } else if idx == self.ranked.len() && self.has_create_slot() {
            Some(Row::Create)
        } else {
            None
        }
    }

    pub fn selected_row(&self) -> Option<Row<'_>> {
        self.row(self.cursor)
    }

    /// Name the create slot would produce for the current query.
    pub fn create_name(&self) -> String {
        create_dir_name_on(&self.query, self.options.today)
    }

    /// Feed one key event. Returns the terminal action, if this key produced one.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        self.notice = None;
        match self.mode {
            Mode::Search => self.handle_search(&key),
            Mode::DeleteConfirm { .. } => self.handle_delete(&key),
            Mode::ArchiveConfirm { .. }
            | Mode::PromoteConfirm { .. }
            | Mode::RenameConfirm { .. } => self.handle_edit(&key),
        }
    }

    fn refresh(&mut self) {
        self.ranked = self.engine.score(&self.entries, &self.query, self.options.now);
        self.cursor = 0;
    }

    fn handle_search(&mut self, key: &KeyEvent) -> Option<Action> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return Some(Action::Cancel),
            KeyCode::Char('c') if ctrl => return Some(Action::Cancel),
            KeyCode::Enter => return self.confirm_search(),
            KeyCode::Up => self.move_cursor(false),
            KeyCode::Down => self.move_cursor(true),
            KeyCode::Char('p' | 'k') if ctrl => self.move_cursor(false),
            KeyCode::Char('n' | 'j') if ctrl => self.move_cursor(true),
            KeyCode::Char('d') if ctrl => self.begin_delete(),
            KeyCode::Char('x') if ctrl => self.begin_archive(),
            KeyCode::Char('t') if ctrl => self.begin_promote(),
            KeyCode::Char('r') if ctrl => self.begin_rename(),
            KeyCode::Char('w') if ctrl => {
                let trimmed = self.query.trim_end();
                let cut = trimmed
                    .rfind(|c: char| c.is_whitespace() || c == '-')
                    .map_or(0, |i| i + 1);
                self.query.truncate(cut);
                self.refresh();
            }
            KeyCode::Char('u') if ctrl => {
                self.query.clear();
                self.refresh();
            }
            KeyCode::Char(c) if is_plain(key) => {
                self.query.push(c);
                self.refresh();
            }
            KeyCode::Backspace => {
                if self.query.pop().is_some() {
                    self.refresh();
                }
            }
            _ => {}
        }
        None
    }

    fn move_cursor(&mut self, forward: bool) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        self.cursor = if forward {
            (self.cursor + 1) % len
        } else {
            (self.cursor + len - 1) % len
        };
    }

    fn confirm_search(&mut self) -> Option<Action> {
        if is_exit_keyword(&self.query) {
            return Some(Action::Cancel);
        }
        let action = match self.selected_row()? {
            Row::Create => Action::Create(self.create_name()),
            Row::Entry(ranked) => Action::Select(ranked.entry.clone()),
        };
        Some(action)
    }

    fn selected_entry(&self) -> Option<DirectoryEntry> {
        match self.selected_row()? {
            Row::Entry(ranked) => Some(ranked.entry.clone()),
            Row::Create => None,
        }
    }

    fn begin_delete(&mut self) {
        if let Some(target) = self.selected_entry() {
            self.mode = Mode::DeleteConfirm {
                target,
                typed: String::new(),
            };
        }
    }

    fn begin_archive(&mut self) {
        if let Some(target) = self.selected_entry() {
            let default = self.options.archive_root.join(&target.name);
            self.mode = Mode::ArchiveConfirm {
                target,
                input: LineEditor::new(&default.to_string_lossy()),
            };
        }
    }

    fn begin_promote(&mut self) {
        if let Some(target) = self.selected_entry() {
            let parent = self.options.root.parent().unwrap_or(&self.options.root);
            let default = parent.join(&target.base_name);
            self.mode = Mode::PromoteConfirm {
                target,
                input: LineEditor::new(&default.to_string_lossy()),
                index_prompt: false,
            };
        }
    }

    fn begin_rename(&mut self) {
        if let Some(target) = self.selected_entry() {
            let input = LineEditor::new(&target.name);
            self.mode = Mode::RenameConfirm {
                target,
                input,
                index_prompt: false,
            };
        }
    }

    fn back_to_search(&mut self) {
        self.mode = Mode::Search;
    }

    fn handle_delete(&mut self, key: &KeyEvent) -> Option<Action> {
        let Mode::DeleteConfirm { target, typed } = &mut self.mode else {
            return None;
        };
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => self.back_to_search(),
            KeyCode::Char('c') if ctrl => self.back_to_search(),
            KeyCode::Char('u') if ctrl => typed.clear(),
            KeyCode::Enter => {
                if *typed == target.name {
                    return Some(Action::Delete(target.clone()));
                }
                self.notice = Some("type the exact directory name to delete".into());
            }
            KeyCode::Backspace => {
                typed.pop();
            }
            KeyCode::Char(c) if is_plain(key) => typed.push(c),
            _ => {}
        }
        None
    }

    fn handle_edit(&mut self, key: &KeyEvent) -> Option<Action> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if key.code == KeyCode::Esc || (ctrl && key.code == KeyCode::Char('c')) {
            self.back_to_search();
            return None;
        }
        if self.awaiting_index_answer() {
            return self.answer_index_prompt(key);
        }
        if key.code == KeyCode::Enter {
            return self.submit_edit();
        }
        if let Some(input) = self.editor_mut() {
            input.apply(key);
        }
        None
    }

    fn editor_mut(&mut self) -> Option<&mut LineEditor> {
        match &mut self.mode {
            Mode::ArchiveConfirm { input, .. }
            | Mode::PromoteConfirm { input, .. }
            | Mode::RenameConfirm { input, .. } => Some(input),
            _ => None,
        }
    }

    fn awaiting_index_answer(&self) -> bool {
        matches!(
            self.mode,
            Mode::PromoteConfirm {
                index_prompt: true,
                ..
            } | Mode::RenameConfirm {
                index_prompt: true,
                ..
            }
        )
    }

    fn answer_index_prompt(&mut self, key: &KeyEvent) -> Option<Action> {
        let update_index = match key.code {
            KeyCode::Char('y' | 'Y') => true,
            KeyCode::Char('n' | 'N') | KeyCode::Enter => false,
            _ => return None,
        };
        self.finish_edit(update_index)
    }

    fn submit_edit(&mut self) -> Option<Action> {
        let rejection = match &self.mode {
            Mode::ArchiveConfirm { input, .. } => {
                (input.value().trim().is_empty()).then_some("archive path cannot be empty")
            }
            Mode::PromoteConfirm { target, input, .. } => {
                let value = input.value();
                if value.trim().is_empty() {
                    Some("target path cannot be empty")
                } else if expand_tilde(value.trim()) == target.path {
                    Some("target path is unchanged")
                } else {
                    None
                }
            }
            Mode::RenameConfirm { target, input, .. } => {
                let value = input.value();
                let value = value.trim();
                if value.is_empty() {
                    Some("name cannot be empty")
                } else if value == target.name {
                    Some("name is unchanged")
                } else if value.contains('/') {
                    Some("name cannot contain '/'")
                } else {
                    None
                }
            }
            _ => return None,
        };
        if let Some(reason) = rejection {
            self.notice = Some(reason.to_string());
            return None;
        }

        let wants_prompt = match &self.mode {
            Mode::PromoteConfirm { target, .. } | Mode::RenameConfirm { target, .. } => {
                self.index.has_index(&target.path)
            }
            _ => false,
        };
        if wants_prompt {
            if let Mode::PromoteConfirm { index_prompt, .. }
            | Mode::RenameConfirm { index_prompt, .. } = &mut self.mode
            {
                *index_prompt = true;
            }
            return None;
        }
        self.finish_edit(false)
    }

    fn finish_edit(&mut self, update_index: bool) -> Option<Action> {
        let action = match &self.mode {
            Mode::ArchiveConfirm { target, input } => Action::Archive {
                entry: target.clone(),
                target: expand_tilde(input.value().trim()),
            },
            Mode::PromoteConfirm { target, input, .. } => Action::Promote {
                entry: target.clone(),
                target: expand_tilde(input.value().trim()),
                update_index,
            },
            Mode::RenameConfirm { target, input, .. } => Action::Rename {
                entry: target.clone(),
                new_name: input.value().trim().to_string(),
                update_index,
            },
            _ => return None,
        };
        Some(action)
    }
}

/// Whether `query` is a reserved quit word (trimmed, case-insensitive).
pub fn is_exit_keyword(query: &str) -> bool {
    let q = query.trim();
    EXIT_KEYWORDS.iter().any(|k| q.eq_ignore_ascii_case(k))
}

fn is_plain(key: &KeyEvent) -> bool {
    !key.modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

//! Keyboard shortcut constants for consistent documentation.

pub const SELECT: &str = "Enter";
pub const QUIT: &str = "Esc/Ctrl+C";
pub const NAV: &str = "↑↓/Ctrl+N/P";
pub const CLEAR_QUERY: &str = "Ctrl+U";
pub const DELETE_WORD: &str = "Ctrl+W";

// Actions
pub const DELETE: &str = "Ctrl+D";
pub const ARCHIVE: &str = "Ctrl+X";
pub const PROMOTE: &str = "Ctrl+T";
pub const RENAME: &str = "Ctrl+R";

// Line editing in confirm prompts
pub const LINE_START: &str = "Ctrl+A";
pub const LINE_END: &str = "Ctrl+E";
pub const KILL_TO_END: &str = "Ctrl+K";
pub const KILL_TO_START: &str = "Ctrl+U";
pub const BACK: &str = "Esc";

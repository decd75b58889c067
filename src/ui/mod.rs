pub mod components;
pub mod selector;
pub mod shortcuts;
pub mod tui;

//! Keyboard shortcut constants for consistent documentation.

pub const QUIT: &str = "Esc";
pub const FORCE_QUIT: &str = "Ctrl+C";
pub const SUBMIT: &str = "Enter";
pub const CLEAR_QUERY: &str = "Ctrl+U";
pub const THEME: &str = "F2";

// Results
pub const FOCUS_RESULTS: &str = "Tab/Down";
pub const FOCUS_QUERY: &str = "/";
pub const TOGGLE_EXPAND: &str = "Space";
pub const DETAIL_OPEN: &str = "Enter";

// Detail overlay
pub const DETAIL_CLOSE: &str = "Esc";
pub const OPEN_SOURCE: &str = "o";
pub const SCROLL: &str = "Up/Down";

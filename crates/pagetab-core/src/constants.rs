//! Application-wide constants
//!
//! Centralized location for persistence keys, defaults and the fixed
//! status strings shown to the user.

/// Title of a tab that has not loaded anything yet
pub const UNTITLED: &str = "Untitled";

/// Number of navigation entries kept per tab, and closed tabs kept for reopening
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Number of leading tabs reachable through numbered shortcuts (Alt+1..9)
pub const SHORTCUT_COUNT: usize = 9;

/// Label of the sentinel entry kept last in every bookmark list
pub const OPEN_ALL: &str = "Open All";

// Persistence layout
pub const PREFERENCES_FILE: &str = "preferences.json";
pub const QUICK_SEARCH_KEY: &str = "quickSearch";

/// One child namespace per bookmark group, in display order
pub const BOOKMARK_GROUPS: [&str; 3] = ["bookmarksA", "bookmarksB", "bookmarksC"];

/// Default search followed by `token template` pairs
pub const DEFAULT_QUICK_SEARCH: &str =
    "http://www.google.com/search?q= w https://en.wikipedia.org/w/index.php?search=";

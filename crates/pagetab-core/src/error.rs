//! Error types for the browsing core.
//!
//! Every variant of [`BrowserError`] is recoverable: its `Display` output is
//! the text placed on the status surface, and the session stays interactive.

use std::path::PathBuf;

/// A user-visible failure of a browser operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BrowserError {
    #[error("{0} is an incorrect search url. The url needs to be one or two strings separated by space.")]
    QuickSearchFormat(String),

    #[error("Tried to delete quick search that doesn't exist.")]
    QuickSearchNotFound,

    #[error("Need to add a base quick search with no prefix before adding a quick search with a prefix.")]
    QuickSearchNeedsBase,

    #[error("Previous update not finished. Dropped |{address}| for tab {tab}.")]
    UpdateInProgress { address: String, tab: usize },

    #[error("Exception |{cause}| for url |{address}|.")]
    Fetch { cause: String, address: String },

    #[error("Can't close last tab.")]
    LastTab,

    #[error("No closed tabs to open again.")]
    NothingToReopen,

    #[error("|{0}| is not an address that can be bookmarked.")]
    NotBookmarkable(String),

    #[error("No bookmark group {0}.")]
    UnknownBookmarkGroup(usize),

    #[error("No tab at position {0}.")]
    NoSuchTab(usize),
}

/// Failure of the preference backing store. Only raised when the store is
/// opened or flushed.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Failed to read preferences from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse preferences in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to save preferences to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode preferences: {0}")]
    Encode(#[from] serde_json::Error),
}

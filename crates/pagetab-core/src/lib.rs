pub mod address;
pub mod bookmarks;
pub mod bounded;
pub mod browser;
pub mod config;
pub mod constants;
pub mod document;
pub mod error;
pub mod fetch;
pub mod history;
pub mod prefs;
pub mod quick_search;
pub mod runner;
pub mod tab;

// Re-export the session surface at crate root for convenience
pub use browser::{Browser, LinkEvent};
pub use config::CoreConfig;
pub use error::{BrowserError, PersistenceError};
pub use fetch::{DocumentFetcher, FetchedPage, Fetcher};
pub use prefs::PreferencesStore;
pub use tab::{Tab, TabId};

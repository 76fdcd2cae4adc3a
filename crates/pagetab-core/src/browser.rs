//! The browsing session.
//!
//! [`Browser`] is the single owner of all interactive state: tabs, the
//! address field, the status line, quick searches, bookmarks and the
//! preference store. It is driven from one thread. Fetches run on tab
//! runners and come back through the completion channel, which the front end
//! drains into [`Browser::on_fetch_complete`].

use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::address;
use crate::bookmarks::{BookmarkAction, BookmarkChange, BookmarkStore};
use crate::config::CoreConfig;
use crate::constants::{DEFAULT_QUICK_SEARCH, QUICK_SEARCH_KEY};
use crate::error::{BrowserError, PersistenceError};
use crate::fetch::{FetchedPage, Fetcher};
use crate::history::NavigationHistory;
use crate::prefs::PreferencesStore;
use crate::quick_search::QuickSearchTable;
use crate::runner::{
    completion_channel, CompletionReceiver, ImmediateRunnerFactory, RunnerFactory,
    TaskCompletion, ThreadedRunnerFactory,
};
use crate::tab::{Tab, TabManager};

/// Events raised by the content view for a hyperlink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    Activate { address: String, new_tab: bool },
    HoverEnter(String),
    HoverExit,
}

pub struct Browser {
    tabs: TabManager,
    fetcher: Arc<dyn Fetcher>,
    quick_search: QuickSearchTable,
    bookmarks: BookmarkStore,
    prefs: PreferencesStore,
    address_field: String,
    status: String,
    /// Failure currently shown on the status line, if any
    status_error: Option<BrowserError>,
    completion_rx: Option<CompletionReceiver<FetchedPage>>,
}

impl Browser {
    /// Session whose fetches run on the tokio runtime behind `handle`.
    pub fn threaded(
        config: &CoreConfig,
        prefs: PreferencesStore,
        fetcher: Arc<dyn Fetcher>,
        handle: Handle,
    ) -> Self {
        let (tx, rx) = completion_channel();
        let runners = Arc::new(ThreadedRunnerFactory::new(handle, tx));
        Self::with_runners(config, prefs, fetcher, runners, rx)
    }

    /// Session whose fetches run synchronously inside each request. Results
    /// are still delivered through [`pump_completions`](Self::pump_completions).
    pub fn immediate(config: &CoreConfig, prefs: PreferencesStore, fetcher: Arc<dyn Fetcher>) -> Self {
        let (tx, rx) = completion_channel();
        let runners = Arc::new(ImmediateRunnerFactory::new(tx));
        Self::with_runners(config, prefs, fetcher, runners, rx)
    }

    /// Session with one empty tab, quick searches and bookmarks loaded from
    /// `prefs`.
    pub fn with_runners(
        config: &CoreConfig,
        prefs: PreferencesStore,
        fetcher: Arc<dyn Fetcher>,
        runners: Arc<dyn RunnerFactory<FetchedPage>>,
        completion_rx: CompletionReceiver<FetchedPage>,
    ) -> Self {
        let quick_search =
            QuickSearchTable::parse(prefs.get(QUICK_SEARCH_KEY).unwrap_or(DEFAULT_QUICK_SEARCH));
        let bookmarks = BookmarkStore::load(&prefs);
        let mut tabs = TabManager::new(runners, config.history_capacity, config.shortcut_count);
        tabs.open_tab();
        Self {
            tabs,
            fetcher,
            quick_search,
            bookmarks,
            prefs,
            address_field: String::new(),
            status: String::new(),
            status_error: None,
            completion_rx: Some(completion_rx),
        }
    }

    /// Hand the completion receiver to an event loop. After this,
    /// [`pump_completions`](Self::pump_completions) does nothing.
    pub fn take_completion_rx(&mut self) -> Option<CompletionReceiver<FetchedPage>> {
        self.completion_rx.take()
    }

    /// Apply every completion already delivered. Returns how many were
    /// processed, stale ones included.
    pub fn pump_completions(&mut self) -> usize {
        let mut ready = Vec::new();
        if let Some(rx) = self.completion_rx.as_mut() {
            while let Ok(completion) = rx.try_recv() {
                ready.push(completion);
            }
        }
        let count = ready.len();
        for completion in ready {
            self.on_fetch_complete(completion);
        }
        count
    }

    // ===== Accessors =====

    pub fn tabs(&self) -> &TabManager {
        &self.tabs
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.tabs.active_tab()
    }

    pub fn active_index(&self) -> usize {
        self.tabs.active_index()
    }

    pub fn address_field(&self) -> &str {
        &self.address_field
    }

    /// Edit the address field without navigating.
    pub fn set_address_field(&mut self, text: impl Into<String>) {
        self.address_field = text.into();
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn status_error(&self) -> Option<&BrowserError> {
        self.status_error.as_ref()
    }

    pub fn quick_search(&self) -> &QuickSearchTable {
        &self.quick_search
    }

    pub fn bookmarks(&self) -> &BookmarkStore {
        &self.bookmarks
    }

    pub fn preferences(&self) -> &PreferencesStore {
        &self.prefs
    }

    /// Consume the active tab's pending caret-reset request.
    pub fn take_caret_reset(&mut self) -> bool {
        self.tabs
            .active_tab_mut()
            .is_some_and(Tab::take_caret_reset)
    }

    fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.status_error = None;
    }

    /// Put a failure on the status line and hand it back to the caller.
    fn report<T>(&mut self, err: BrowserError) -> Result<T, BrowserError> {
        warn!("{}", err);
        self.status = err.to_string();
        self.status_error = Some(err.clone());
        Err(err)
    }

    // ===== Navigation =====

    /// Navigate the active tab to what the user typed. The field is replaced
    /// by the translated address; blank input does nothing.
    pub fn submit_address(&mut self, input: &str) -> Result<(), BrowserError> {
        let address = self.quick_search.translate(input);
        self.address_field = address.clone();
        if address.is_empty() {
            return Ok(());
        }
        self.navigate_active(address)
    }

    /// Submit whatever is in the address field.
    pub fn submit_field(&mut self) -> Result<(), BrowserError> {
        let input = self.address_field.clone();
        self.submit_address(&input)
    }

    fn navigate_active(&mut self, address: String) -> Result<(), BrowserError> {
        let index = self.tabs.active_index();
        self.ensure_idle(index, &address)?;
        if let Some(tab) = self.tabs.active_tab_mut() {
            tab.history_mut().navigate(address.clone());
        }
        self.fetch_into(index, address)
    }

    /// Re-fetch the field's address into the current history entry.
    pub fn reload(&mut self) -> Result<(), BrowserError> {
        let address = self.quick_search.translate(&self.address_field);
        self.address_field = address.clone();
        if address.is_empty() {
            return Ok(());
        }
        let index = self.tabs.active_index();
        self.ensure_idle(index, &address)?;
        if let Some(tab) = self.tabs.active_tab_mut() {
            tab.history_mut().set_current(address.clone());
        }
        self.fetch_into(index, address)
    }

    /// Step back in the active tab's history and load that entry. Silent at
    /// the oldest entry.
    pub fn back(&mut self) -> Result<(), BrowserError> {
        self.step(|history| history.cursor().checked_sub(1))
    }

    /// Step forward in the active tab's history and load that entry. Silent
    /// at the newest entry.
    pub fn forward(&mut self) -> Result<(), BrowserError> {
        self.step(|history| {
            let next = history.cursor() + 1;
            (next < history.len()).then_some(next)
        })
    }

    fn step(
        &mut self,
        target: impl Fn(&NavigationHistory) -> Option<usize>,
    ) -> Result<(), BrowserError> {
        let index = self.tabs.active_index();
        let Some(tab) = self.tabs.active_tab() else {
            return Ok(());
        };
        let Some(cursor) = target(tab.history()) else {
            return Ok(());
        };
        let address = tab.history().entries()[cursor].to_string();
        self.ensure_idle(index, &address)?;

        if let Some(tab) = self.tabs.active_tab_mut() {
            let history = tab.history_mut();
            if cursor < history.cursor() {
                history.back();
            } else {
                history.forward();
            }
        }
        self.address_field = address.clone();
        if address.is_empty() {
            // The blank entry a tab starts with has nothing to load.
            return Ok(());
        }
        self.fetch_into(index, address)
    }

    fn ensure_idle(&mut self, index: usize, address: &str) -> Result<(), BrowserError> {
        let busy = self.tabs.get(index).is_some_and(Tab::is_busy);
        if busy {
            return self.report(BrowserError::UpdateInProgress {
                address: address.to_string(),
                tab: index,
            });
        }
        Ok(())
    }

    fn fetch_into(&mut self, index: usize, address: String) -> Result<(), BrowserError> {
        let work = self.fetcher.fetch(&address);
        let Some(tab) = self.tabs.get_mut(index) else {
            return self.report(BrowserError::NoSuchTab(index));
        };
        if !tab.start_fetch(&address, work) {
            return self.report(BrowserError::UpdateInProgress { address, tab: index });
        }
        info!(tab = %tab.id(), index, address = %address, "navigating");
        Ok(())
    }

    /// Merge a delivered fetch result into its tab. Results of cancelled
    /// fetches, and of tabs that are no longer open, are dropped.
    pub fn on_fetch_complete(&mut self, completion: TaskCompletion<FetchedPage>) {
        let TaskCompletion { ticket, outcome } = completion;
        let Some(index) = self
            .tabs
            .tabs()
            .iter()
            .position(|t| t.id().0 == ticket.owner)
        else {
            debug!(?ticket, "completion for a tab that is not open, dropped");
            return;
        };
        let Some(tab) = self.tabs.get_mut(index) else {
            return;
        };
        let Some(address) = tab.finish_fetch(ticket) else {
            debug!(?ticket, "stale completion dropped");
            return;
        };

        match outcome {
            Ok(page) => {
                let status = format!(
                    "Url |{}| took {} seconds to load.",
                    address,
                    page.elapsed_display()
                );
                info!(tab = %tab.id(), title = %page.title, bytes = page.body.len(), "page loaded");
                tab.show_page(page);
                self.set_status(status);
            }
            Err(cause) => {
                let _ = self.report::<()>(BrowserError::Fetch { cause, address });
            }
        }
    }

    /// React to a hyperlink event from the content view.
    pub fn on_link(&mut self, event: LinkEvent) -> Result<(), BrowserError> {
        match event {
            LinkEvent::Activate { address, new_tab } => {
                if new_tab {
                    self.new_tab();
                }
                self.address_field = address.clone();
                self.navigate_active(address)
            }
            LinkEvent::HoverEnter(address) => {
                self.set_status(address);
                Ok(())
            }
            LinkEvent::HoverExit => {
                self.set_status(String::new());
                Ok(())
            }
        }
    }

    // ===== Tabs =====

    /// Keep the field's text as the outgoing tab's current address.
    fn capture_field(&mut self) {
        let field = self.address_field.clone();
        if let Some(tab) = self.tabs.active_tab_mut() {
            tab.history_mut().set_current(field);
        }
    }

    fn show_active_address(&mut self) {
        self.address_field = self
            .tabs
            .active_tab()
            .map(|tab| tab.address().to_string())
            .unwrap_or_default();
    }

    /// Open an empty tab and make it active. Returns its index.
    pub fn new_tab(&mut self) -> usize {
        self.capture_field();
        let index = self.tabs.open_tab();
        self.show_active_address();
        index
    }

    pub fn close_tab(&mut self) -> Result<(), BrowserError> {
        if self.tabs.len() <= 1 {
            return self.report(BrowserError::LastTab);
        }
        self.capture_field();
        self.tabs.close_active()?;
        self.show_active_address();
        let reopenable = self.tabs.closed_count();
        self.set_status(format!(
            "Closed tab. {reopenable} closed tab(s) can be reopened."
        ));
        Ok(())
    }

    pub fn reopen_last_closed(&mut self) -> Result<(), BrowserError> {
        if self.tabs.closed_count() == 0 {
            return self.report(BrowserError::NothingToReopen);
        }
        self.capture_field();
        self.tabs.reopen_last_closed()?;
        self.show_active_address();
        Ok(())
    }

    /// Switch tabs, keeping the edited address of the outgoing tab.
    pub fn change_active_tab(&mut self, index: usize) -> Result<(), BrowserError> {
        if index >= self.tabs.len() {
            return self.report(BrowserError::NoSuchTab(index));
        }
        if index == self.tabs.active_index() {
            return Ok(());
        }
        self.capture_field();
        self.tabs.switch_to(index)?;
        self.show_active_address();
        debug!(index, "active tab changed");
        Ok(())
    }

    /// Switch to the tab with 1-based shortcut `number`.
    pub fn select_shortcut(&mut self, number: usize) -> Result<(), BrowserError> {
        match self.tabs.tab_for_shortcut(number) {
            Some(index) => self.change_active_tab(index),
            None => Ok(()),
        }
    }

    pub fn next_tab(&mut self) -> Result<(), BrowserError> {
        let index = self.tabs.next_index();
        self.change_active_tab(index)
    }

    pub fn prev_tab(&mut self) -> Result<(), BrowserError> {
        let index = self.tabs.prev_index();
        self.change_active_tab(index)
    }

    // ===== Quick searches and bookmarks =====

    /// Edit the quick-search table from the address field. The new table is
    /// stored and shown on the status line.
    pub fn change_search(&mut self) -> Result<(), BrowserError> {
        let input = self.address_field.clone();
        match self.quick_search.change(&input) {
            Ok(serialized) => {
                self.prefs.put(QUICK_SEARCH_KEY, serialized.clone());
                info!(table = %serialized, "quick searches updated");
                self.set_status(serialized);
                Ok(())
            }
            Err(err) => self.report(err),
        }
    }

    /// Toggle the field's address in bookmark group `group`, titled after the
    /// active tab.
    pub fn add_or_remove_bookmark(&mut self, group: usize) -> Result<BookmarkChange, BrowserError> {
        let address = self.address_field.clone();
        if !address::looks_like_host(&address) {
            return self.report(BrowserError::NotBookmarkable(address));
        }
        let title = self
            .tabs
            .active_tab()
            .map(|tab| tab.title().to_string())
            .unwrap_or_default();
        match self
            .bookmarks
            .add_or_remove(group, &address, &title, &mut self.prefs)
        {
            Ok(change) => Ok(change),
            Err(err) => self.report(err),
        }
    }

    /// The user picked item `item` of bookmark group `group`.
    pub fn select_bookmark(&mut self, group: usize, item: usize) -> Result<(), BrowserError> {
        let action = match self.bookmarks.select(group, item) {
            Ok(action) => action,
            Err(err) => return self.report(err),
        };
        match action {
            None => Ok(()),
            Some(BookmarkAction::Open(address)) => {
                self.address_field = address.clone();
                self.navigate_active(address)
            }
            Some(BookmarkAction::OpenAll(addresses)) => {
                for address in addresses {
                    self.new_tab();
                    self.address_field = address.clone();
                    self.navigate_active(address)?;
                }
                Ok(())
            }
        }
    }

    // ===== Lifecycle =====

    /// Cancel outstanding fetches and write preferences.
    pub fn shutdown(&mut self) -> Result<(), PersistenceError> {
        for index in 0..self.tabs.len() {
            if let Some(tab) = self.tabs.get_mut(index) {
                tab.cancel_fetch();
            }
        }
        self.prefs.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::test_support::StaticFetcher;

    const X: &str = "http://x.com/";
    const Y: &str = "http://y.com/";

    fn fetcher() -> StaticFetcher {
        StaticFetcher::new()
            .with_page(X, "<html><head><title>X page</title></head><body>x body</body></html>")
            .with_page(Y, "<html><head><title>Y page</title></head><body>y body</body></html>")
            .with_page("http://a.com/", "<title>A</title>a")
            .with_page("http://b.com/", "<title>B</title>b")
            .with_page("http://c.com/", "<title>C</title>c")
            .with_page("http://d.com/", "<title>D</title>d")
            .with_failure("http://down.com/", "Connection refused")
    }

    fn browser_with(fetcher: StaticFetcher) -> Browser {
        Browser::immediate(
            &CoreConfig::new("unused"),
            PreferencesStore::in_memory(),
            Arc::new(fetcher),
        )
    }

    fn browser() -> Browser {
        browser_with(fetcher())
    }

    fn visit(browser: &mut Browser, address: &str) {
        browser.submit_address(address).unwrap();
        assert_eq!(browser.pump_completions(), 1);
    }

    fn history(browser: &Browser) -> (Vec<&str>, usize) {
        let tab = browser.active_tab().unwrap();
        (tab.history().entries(), tab.history().cursor())
    }

    #[test]
    fn test_starts_with_one_untitled_tab() {
        let browser = browser();
        assert_eq!(browser.tabs().len(), 1);
        assert_eq!(browser.active_tab().unwrap().title(), "Untitled");
        assert_eq!(browser.quick_search().serialize(), DEFAULT_QUICK_SEARCH);
    }

    #[test]
    fn test_submit_fetches_and_reports() {
        let mut browser = browser();
        visit(&mut browser, X);

        let tab = browser.active_tab().unwrap();
        assert_eq!(tab.title(), "X page");
        assert!(tab.content().contains("x body"));
        assert_eq!(browser.status(), "Url |http://x.com/| took 0.01 seconds to load.");
        assert!(browser.take_caret_reset());
        assert_eq!(history(&browser), (vec!["", X], 1));
    }

    #[test]
    fn test_submit_translates_field() {
        let fetcher = fetcher();
        let mut browser = browser_with(fetcher.clone());
        browser.submit_address("w rust").unwrap();
        assert_eq!(
            browser.address_field(),
            "https://en.wikipedia.org/w/index.php?search=rust"
        );
        assert_eq!(
            fetcher.requested(),
            vec!["https://en.wikipedia.org/w/index.php?search=rust"]
        );

        browser.pump_completions();
        browser.submit_address("   ").unwrap();
        assert_eq!(browser.address_field(), "");
        assert_eq!(fetcher.requested().len(), 1);
    }

    #[test]
    fn test_submit_while_busy_is_rejected() {
        let mut browser = browser();
        browser.submit_address(X).unwrap();
        let err = browser.submit_address(Y).unwrap_err();
        assert_eq!(
            err,
            BrowserError::UpdateInProgress {
                address: Y.to_string(),
                tab: 0
            }
        );
        assert_eq!(
            browser.status(),
            "Previous update not finished. Dropped |http://y.com/| for tab 0."
        );
        assert_eq!(history(&browser), (vec!["", X], 1));

        browser.pump_completions();
        assert_eq!(browser.active_tab().unwrap().title(), "X page");
    }

    #[test]
    fn test_back_forward_and_branch() {
        let mut browser = browser();
        for address in ["http://a.com/", "http://b.com/", "http://c.com/"] {
            visit(&mut browser, address);
        }
        browser.back().unwrap();
        browser.pump_completions();
        assert_eq!(browser.address_field(), "http://b.com/");
        assert_eq!(browser.active_tab().unwrap().title(), "B");

        visit(&mut browser, "http://d.com/");
        assert_eq!(
            history(&browser),
            (vec!["", "http://a.com/", "http://b.com/", "http://d.com/"], 3)
        );
        // Forward at the newest entry is silent.
        browser.forward().unwrap();
        assert_eq!(browser.pump_completions(), 0);
    }

    #[test]
    fn test_back_while_busy_keeps_cursor() {
        let mut browser = browser();
        visit(&mut browser, "http://a.com/");
        browser.submit_address("http://b.com/").unwrap();
        assert!(browser.back().is_err());
        assert_eq!(history(&browser).1, 2);
    }

    #[test]
    fn test_fetch_error_leaves_tab_unchanged() {
        let mut browser = browser();
        visit(&mut browser, X);
        visit(&mut browser, "http://down.com/");

        let tab = browser.active_tab().unwrap();
        assert_eq!(tab.title(), "X page");
        assert!(tab.content().contains("x body"));
        assert!(!tab.is_busy());
        assert_eq!(
            browser.status(),
            "Exception |Connection refused| for url |http://down.com/|."
        );
    }

    #[test]
    fn test_status_error_tracks_last_failure() {
        let mut browser = browser();
        visit(&mut browser, "http://down.com/");
        assert!(matches!(
            browser.status_error(),
            Some(BrowserError::Fetch { .. })
        ));

        visit(&mut browser, X);
        assert_eq!(browser.status_error(), None);

        assert!(browser.close_tab().is_err());
        assert_eq!(browser.status_error(), Some(&BrowserError::LastTab));
        browser.on_link(LinkEvent::HoverExit).unwrap();
        assert_eq!(browser.status_error(), None);
    }

    #[test]
    fn test_reload_overwrites_current_entry() {
        let mut browser = browser();
        visit(&mut browser, "http://a.com/");
        browser.set_address_field("b.com/");
        browser.reload().unwrap();
        browser.pump_completions();
        assert_eq!(history(&browser), (vec!["", "http://b.com/"], 1));
        assert_eq!(browser.active_tab().unwrap().title(), "B");
    }

    #[test]
    fn test_close_single_tab_sets_status() {
        let mut browser = browser();
        assert_eq!(browser.close_tab(), Err(BrowserError::LastTab));
        assert_eq!(browser.status(), "Can't close last tab.");
        assert_eq!(browser.tabs().len(), 1);
    }

    #[test]
    fn test_close_and_reopen_restore_field() {
        let mut browser = browser();
        visit(&mut browser, X);
        browser.new_tab();
        assert_eq!(browser.address_field(), "");
        visit(&mut browser, Y);

        browser.set_address_field("edited.com");
        browser.close_tab().unwrap();
        assert_eq!(browser.address_field(), X);
        assert_eq!(browser.status(), "Closed tab. 1 closed tab(s) can be reopened.");

        browser.reopen_last_closed().unwrap();
        assert_eq!(browser.active_index(), 1);
        assert_eq!(browser.address_field(), "edited.com");
        assert_eq!(browser.active_tab().unwrap().title(), "Y page");

        assert_eq!(
            browser.reopen_last_closed(),
            Err(BrowserError::NothingToReopen)
        );
        assert_eq!(browser.status(), "No closed tabs to open again.");
    }

    #[test]
    fn test_cancelled_fetch_never_touches_reopened_tab() {
        let mut browser = browser();
        browser.new_tab();
        browser.submit_address(X).unwrap();
        // The fetch finished but was not delivered before the close.
        browser.close_tab().unwrap();
        browser.reopen_last_closed().unwrap();
        assert_eq!(browser.pump_completions(), 1);

        let tab = browser.active_tab().unwrap();
        assert_eq!(tab.title(), "Untitled");
        assert_eq!(tab.content(), "");
        assert!(!tab.is_busy());
    }

    #[test]
    fn test_change_tab_keeps_edited_address() {
        let mut browser = browser();
        visit(&mut browser, X);
        browser.set_address_field("typed but not submitted");
        browser.new_tab();
        browser.change_active_tab(0).unwrap();
        assert_eq!(browser.address_field(), "typed but not submitted");
        assert_eq!(
            browser.change_active_tab(5),
            Err(BrowserError::NoSuchTab(5))
        );
    }

    #[test]
    fn test_tab_cycling_wraps() {
        let mut browser = browser();
        browser.new_tab();
        browser.new_tab();
        browser.next_tab().unwrap();
        assert_eq!(browser.active_index(), 0);
        browser.prev_tab().unwrap();
        assert_eq!(browser.active_index(), 2);
        browser.select_shortcut(2).unwrap();
        assert_eq!(browser.active_index(), 1);
    }

    #[test]
    fn test_link_events() {
        let mut browser = browser();
        browser.on_link(LinkEvent::HoverEnter(X.to_string())).unwrap();
        assert_eq!(browser.status(), X);
        browser.on_link(LinkEvent::HoverExit).unwrap();
        assert_eq!(browser.status(), "");

        browser
            .on_link(LinkEvent::Activate { address: X.to_string(), new_tab: false })
            .unwrap();
        browser.pump_completions();
        assert_eq!(browser.tabs().len(), 1);

        browser
            .on_link(LinkEvent::Activate { address: Y.to_string(), new_tab: true })
            .unwrap();
        browser.pump_completions();
        assert_eq!(browser.tabs().len(), 2);
        assert_eq!(browser.active_index(), 1);
        assert_eq!(browser.address_field(), Y);
        assert_eq!(browser.active_tab().unwrap().title(), "Y page");
    }

    #[test]
    fn test_change_search_persists() {
        let mut browser = browser();
        browser.set_address_field("a http://a.com/q=");
        browser.change_search().unwrap();
        let expected = format!("{DEFAULT_QUICK_SEARCH} a http://a.com/q=");
        assert_eq!(browser.status(), expected);
        assert_eq!(browser.preferences().get(QUICK_SEARCH_KEY), Some(expected.as_str()));

        browser.set_address_field("zz");
        assert_eq!(browser.change_search(), Err(BrowserError::QuickSearchNotFound));
        assert_eq!(
            browser.status(),
            "Tried to delete quick search that doesn't exist."
        );
    }

    #[test]
    fn test_bookmark_add_then_select_opens_once() {
        let fetcher = fetcher();
        let mut browser = browser_with(fetcher.clone());
        visit(&mut browser, X);

        assert_eq!(browser.add_or_remove_bookmark(0), Ok(BookmarkChange::Added));
        // Toggling opened nothing.
        assert_eq!(fetcher.requested().len(), 1);
        assert_eq!(
            browser.preferences().node("bookmarksA").unwrap().get(X),
            Some("X page")
        );

        browser.select_bookmark(0, 0).unwrap();
        browser.pump_completions();
        assert_eq!(fetcher.requested(), vec![X.to_string(), X.to_string()]);

        assert_eq!(browser.add_or_remove_bookmark(0), Ok(BookmarkChange::Removed));
        assert_eq!(fetcher.requested().len(), 2);
    }

    #[test]
    fn test_bookmark_needs_address() {
        let mut browser = browser();
        browser.set_address_field("not an address");
        assert_eq!(
            browser.add_or_remove_bookmark(0),
            Err(BrowserError::NotBookmarkable("not an address".to_string()))
        );
        assert!(browser.bookmarks().group(0).unwrap().is_empty());
    }

    #[test]
    fn test_open_all_opens_each_in_order() {
        let mut browser = browser();
        visit(&mut browser, X);
        browser.add_or_remove_bookmark(2).unwrap();
        visit(&mut browser, Y);
        browser.add_or_remove_bookmark(2).unwrap();

        browser.select_bookmark(2, 2).unwrap();
        browser.pump_completions();

        let titles: Vec<&str> = browser.tabs().tabs().iter().map(|t| t.title()).collect();
        assert_eq!(titles, vec!["Y page", "X page", "Y page"]);
        assert_eq!(browser.active_index(), 2);
        assert_eq!(browser.address_field(), Y);
    }

    #[test]
    fn test_bookmarks_and_searches_survive_restart() {
        let dir = tempfile::tempdir().unwrap();
        let config = CoreConfig::new(dir.path());

        let mut browser = Browser::immediate(
            &config,
            PreferencesStore::open(config.preferences_path()).unwrap(),
            Arc::new(fetcher()),
        );
        visit(&mut browser, X);
        browser.add_or_remove_bookmark(1).unwrap();
        browser.set_address_field("http://s.com/q=");
        browser.change_search().unwrap();
        browser.shutdown().unwrap();

        let restored = Browser::immediate(
            &config,
            PreferencesStore::open(config.preferences_path()).unwrap(),
            Arc::new(fetcher()),
        );
        assert_eq!(restored.bookmarks().group(1).unwrap().title_of(X), Some("X page"));
        assert_eq!(
            restored.quick_search().default_search(),
            Some("http://s.com/q=")
        );
    }
}

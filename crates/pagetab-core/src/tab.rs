//! Tabs and the tab manager.
//!
//! The manager owns every live tab, a bounded stack of recently closed tabs
//! and the active index. Numbered shortcuts are derived from position, so the
//! first [`CoreConfig::shortcut_count`](crate::CoreConfig) tabs are always
//! reachable by number.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::bounded::BoundedSeq;
use crate::constants::UNTITLED;
use crate::error::BrowserError;
use crate::fetch::FetchedPage;
use crate::history::NavigationHistory;
use crate::runner::{RunnerFactory, TaskFuture, TaskRunner, TaskTicket};

/// Stable identity of a tab, also the owner id of its runner's tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabId(pub u64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab-{}", self.0)
    }
}

pub struct Tab {
    id: TabId,
    title: String,
    history: NavigationHistory,
    runner: Box<dyn TaskRunner<FetchedPage>>,
    /// Last successfully loaded body
    content: String,
    /// Bumped whenever `content` is replaced
    revision: u64,
    /// Address of the outstanding fetch
    loading: Option<String>,
    caret_reset: bool,
}

impl Tab {
    fn new(id: TabId, history_capacity: usize, runner: Box<dyn TaskRunner<FetchedPage>>) -> Self {
        Self {
            id,
            title: UNTITLED.to_string(),
            history: NavigationHistory::new(history_capacity),
            runner,
            content: String::new(),
            revision: 0,
            loading: None,
            caret_reset: false,
        }
    }

    pub fn id(&self) -> TabId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn history(&self) -> &NavigationHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut NavigationHistory {
        &mut self.history
    }

    /// The address under the history cursor.
    pub fn address(&self) -> &str {
        self.history.current()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_busy(&self) -> bool {
        self.runner.is_busy()
    }

    pub fn loading(&self) -> Option<&str> {
        self.loading.as_deref()
    }

    /// Start loading `address`. Returns false, changing nothing, while a
    /// previous fetch is outstanding.
    pub fn start_fetch(&mut self, address: &str, work: TaskFuture<FetchedPage>) -> bool {
        if !self.runner.submit(work) {
            return false;
        }
        self.loading = Some(address.to_string());
        true
    }

    pub fn cancel_fetch(&mut self) {
        if let Some(address) = self.loading.take() {
            debug!(tab = %self.id, address, "fetch cancelled");
        }
        self.runner.cancel();
    }

    /// Release the runner slot for a delivered completion. Returns the
    /// address that was being loaded, or `None` for a stale completion.
    pub fn finish_fetch(&mut self, ticket: TaskTicket) -> Option<String> {
        if !self.runner.finish(ticket) {
            return None;
        }
        Some(self.loading.take().unwrap_or_default())
    }

    /// Replace title and content with a loaded page and ask the view to move
    /// the caret back to the top.
    pub fn show_page(&mut self, page: FetchedPage) {
        self.title = page.title;
        self.content = page.body;
        self.revision += 1;
        self.caret_reset = true;
    }

    /// Consume a pending caret-reset request.
    pub fn take_caret_reset(&mut self) -> bool {
        std::mem::take(&mut self.caret_reset)
    }
}

impl fmt::Debug for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tab")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("history", &self.history)
            .field("busy", &self.runner.is_busy())
            .field("loading", &self.loading)
            .field("revision", &self.revision)
            .finish()
    }
}

pub struct TabManager {
    tabs: Vec<Tab>,
    active: usize,
    /// Recently closed tabs, newest last
    closed: BoundedSeq<Tab>,
    next_id: u64,
    runners: Arc<dyn RunnerFactory<FetchedPage>>,
    history_capacity: usize,
    shortcut_count: usize,
}

impl TabManager {
    /// An empty manager. The closed-tab stack shares the history bound.
    pub fn new(
        runners: Arc<dyn RunnerFactory<FetchedPage>>,
        history_capacity: usize,
        shortcut_count: usize,
    ) -> Self {
        Self {
            tabs: Vec::new(),
            active: 0,
            closed: BoundedSeq::new(history_capacity),
            next_id: 0,
            runners,
            history_capacity,
            shortcut_count,
        }
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.tabs.get(self.active)
    }

    pub fn active_tab_mut(&mut self) -> Option<&mut Tab> {
        self.tabs.get_mut(self.active)
    }

    pub fn get(&self, index: usize) -> Option<&Tab> {
        self.tabs.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Tab> {
        self.tabs.get_mut(index)
    }

    pub fn position(&self, id: TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == id)
    }

    /// Number of closed tabs that can be reopened.
    pub fn closed_count(&self) -> usize {
        self.closed.len()
    }

    /// Append a fresh tab and make it active. Returns its index.
    pub fn open_tab(&mut self) -> usize {
        let id = TabId(self.next_id);
        self.next_id += 1;
        let runner = self.runners.create(id.0);
        self.tabs.push(Tab::new(id, self.history_capacity, runner));
        self.active = self.tabs.len() - 1;
        debug!(tab = %id, index = self.active, "tab opened");
        self.active
    }

    /// Close the active tab, cancelling its fetch, and keep it for reopening.
    /// The tab now at the same index becomes active, or the new last tab if
    /// the closed one was last.
    pub fn close_active(&mut self) -> Result<(), BrowserError> {
        if self.tabs.len() <= 1 {
            return Err(BrowserError::LastTab);
        }
        let index = self.active;
        let mut tab = self.tabs.remove(index);
        tab.cancel_fetch();
        info!(tab = %tab.id, index, "tab closed");

        for evicted in self.closed.push(tab) {
            debug!(tab = %evicted.id, "closed tab dropped from reopen stack");
        }
        self.active = index.min(self.tabs.len() - 1);
        Ok(())
    }

    /// Append the most recently closed tab and make it active.
    pub fn reopen_last_closed(&mut self) -> Result<usize, BrowserError> {
        let tab = self.closed.pop().ok_or(BrowserError::NothingToReopen)?;
        info!(tab = %tab.id, "tab reopened");
        self.tabs.push(tab);
        self.active = self.tabs.len() - 1;
        Ok(self.active)
    }

    pub fn switch_to(&mut self, index: usize) -> Result<(), BrowserError> {
        if index >= self.tabs.len() {
            return Err(BrowserError::NoSuchTab(index));
        }
        self.active = index;
        Ok(())
    }

    /// Index after the active one, wrapping.
    pub fn next_index(&self) -> usize {
        if self.tabs.is_empty() {
            return 0;
        }
        (self.active + 1) % self.tabs.len()
    }

    /// Index before the active one, wrapping.
    pub fn prev_index(&self) -> usize {
        if self.active == 0 {
            self.tabs.len().saturating_sub(1)
        } else {
            self.active - 1
        }
    }

    /// 1-based shortcut number for the tab at `index`, if it has one.
    pub fn shortcut_for(&self, index: usize) -> Option<usize> {
        (index < self.shortcut_count && index < self.tabs.len()).then_some(index + 1)
    }

    /// Tab index addressed by 1-based shortcut `number`.
    pub fn tab_for_shortcut(&self, number: usize) -> Option<usize> {
        let index = number.checked_sub(1)?;
        (index < self.shortcut_count && index < self.tabs.len()).then_some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{completion_channel, ImmediateRunnerFactory};
    use futures::FutureExt;
    use std::time::Duration;

    fn manager(capacity: usize) -> TabManager {
        let (tx, _rx) = completion_channel();
        TabManager::new(Arc::new(ImmediateRunnerFactory::new(tx)), capacity, 9)
    }

    fn page(title: &str) -> FetchedPage {
        FetchedPage {
            title: title.to_string(),
            body: format!("<p>{title}</p>"),
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn test_new_tab_defaults() {
        let mut tabs = manager(10);
        let index = tabs.open_tab();
        assert_eq!(index, 0);
        let tab = tabs.active_tab().unwrap();
        assert_eq!(tab.title(), "Untitled");
        assert_eq!(tab.history().entries(), vec![""]);
        assert_eq!(tab.content(), "");
        assert!(!tab.is_busy());
    }

    #[test]
    fn test_cannot_close_last_tab() {
        let mut tabs = manager(10);
        tabs.open_tab();
        assert_eq!(tabs.close_active(), Err(BrowserError::LastTab));
        assert_eq!(tabs.len(), 1);
        assert_eq!(tabs.closed_count(), 0);
    }

    #[test]
    fn test_close_selects_neighbour() {
        let mut tabs = manager(10);
        for _ in 0..4 {
            tabs.open_tab();
        }
        let ids: Vec<TabId> = tabs.tabs().iter().map(Tab::id).collect();

        tabs.switch_to(1).unwrap();
        tabs.close_active().unwrap();
        assert_eq!(tabs.active_index(), 1);
        assert_eq!(tabs.active_tab().unwrap().id(), ids[2]);

        tabs.switch_to(2).unwrap();
        tabs.close_active().unwrap();
        assert_eq!(tabs.active_index(), 1);
        assert_eq!(tabs.active_tab().unwrap().id(), ids[2]);
        assert_eq!(tabs.closed_count(), 2);
    }

    #[test]
    fn test_reopen_is_lifo_and_appends() {
        let mut tabs = manager(10);
        for _ in 0..3 {
            tabs.open_tab();
        }
        tabs.switch_to(0).unwrap();
        let first = tabs.active_tab().unwrap().id();
        tabs.close_active().unwrap();
        let second = tabs.active_tab().unwrap().id();
        tabs.close_active().unwrap();

        assert_eq!(tabs.reopen_last_closed(), Ok(1));
        assert_eq!(tabs.active_tab().unwrap().id(), second);
        assert_eq!(tabs.reopen_last_closed(), Ok(2));
        assert_eq!(tabs.active_tab().unwrap().id(), first);
        assert_eq!(tabs.reopen_last_closed(), Err(BrowserError::NothingToReopen));
    }

    #[test]
    fn test_closed_stack_is_bounded() {
        let mut tabs = manager(2);
        for _ in 0..4 {
            tabs.open_tab();
        }
        let ids: Vec<TabId> = tabs.tabs().iter().map(Tab::id).collect();
        tabs.switch_to(0).unwrap();
        for _ in 0..3 {
            tabs.close_active().unwrap();
        }
        assert_eq!(tabs.closed_count(), 2);
        assert_eq!(tabs.reopen_last_closed().map(|_| tabs.active_tab().unwrap().id()), Ok(ids[2]));
        assert_eq!(tabs.reopen_last_closed().map(|_| tabs.active_tab().unwrap().id()), Ok(ids[1]));
        assert_eq!(tabs.reopen_last_closed(), Err(BrowserError::NothingToReopen));
    }

    #[test]
    fn test_closing_cancels_fetch() {
        let mut tabs = manager(10);
        tabs.open_tab();
        tabs.open_tab();
        let tab = tabs.active_tab_mut().unwrap();
        assert!(tab.start_fetch("http://a.com", async { Ok(page("A")) }.boxed()));
        assert!(tab.is_busy());
        assert_eq!(tab.loading(), Some("http://a.com"));

        tabs.close_active().unwrap();
        tabs.reopen_last_closed().unwrap();
        let tab = tabs.active_tab().unwrap();
        assert!(!tab.is_busy());
        assert_eq!(tab.loading(), None);
    }

    #[test]
    fn test_show_page_requests_caret_reset() {
        let mut tabs = manager(10);
        tabs.open_tab();
        let tab = tabs.active_tab_mut().unwrap();
        tab.show_page(page("A"));
        assert_eq!(tab.title(), "A");
        assert_eq!(tab.revision(), 1);
        assert!(tab.take_caret_reset());
        assert!(!tab.take_caret_reset());
    }

    #[test]
    fn test_shortcuts_follow_position() {
        let mut tabs = manager(10);
        for _ in 0..11 {
            tabs.open_tab();
        }
        assert_eq!(tabs.shortcut_for(0), Some(1));
        assert_eq!(tabs.shortcut_for(8), Some(9));
        assert_eq!(tabs.shortcut_for(9), None);
        assert_eq!(tabs.tab_for_shortcut(0), None);
        assert_eq!(tabs.tab_for_shortcut(9), Some(8));

        tabs.switch_to(0).unwrap();
        tabs.close_active().unwrap();
        let tenth = tabs.get(8).unwrap().id();
        assert_eq!(tenth, TabId(9));
        assert_eq!(tabs.shortcut_for(8), Some(9));
    }

    #[test]
    fn test_cycling_wraps() {
        let mut tabs = manager(10);
        for _ in 0..3 {
            tabs.open_tab();
        }
        assert_eq!(tabs.next_index(), 0);
        tabs.switch_to(0).unwrap();
        assert_eq!(tabs.prev_index(), 2);
        assert_eq!(tabs.switch_to(3), Err(BrowserError::NoSuchTab(3)));
    }
}

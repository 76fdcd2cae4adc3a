//! Bookmark groups.
//!
//! Each group presents its entries followed by an "Open All" item. Picking an
//! entry opens it; picking "Open All" opens every entry in its own tab. The
//! presented list reports selection changes whether they come from the user
//! or from the list being rebuilt after an add/remove, so each group carries a
//! mutation flag and ignores selection changes while it is set.

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::constants::{BOOKMARK_GROUPS, OPEN_ALL};
use crate::error::BrowserError;
use crate::prefs::PreferencesStore;

/// What a selection asks the session to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookmarkAction {
    Open(String),
    OpenAll(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkChange {
    Added,
    Removed,
}

/// One row of a group's presented list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkItem<'a> {
    Entry { address: &'a str, title: &'a str },
    OpenAll,
}

impl<'a> BookmarkItem<'a> {
    /// Label borrowed from the owning group, so it outlives the item list.
    pub fn label(&self) -> &'a str {
        match *self {
            BookmarkItem::Entry { address, .. } => address,
            BookmarkItem::OpenAll => OPEN_ALL,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BookmarkGroup {
    key: String,
    /// address -> title, in insertion order
    entries: IndexMap<String, String>,
    selected: Option<usize>,
    mutating: bool,
}

impl BookmarkGroup {
    pub fn new(key: impl Into<String>) -> Self {
        Self::with_entries(key, IndexMap::new())
    }

    pub fn with_entries(key: impl Into<String>, entries: IndexMap<String, String>) -> Self {
        Self {
            key: key.into(),
            entries,
            selected: None,
            mutating: false,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, address: &str) -> bool {
        self.entries.contains_key(address)
    }

    pub fn title_of(&self, address: &str) -> Option<&str> {
        self.entries.get(address).map(String::as_str)
    }

    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in order, then the "Open All" item.
    pub fn items(&self) -> Vec<BookmarkItem<'_>> {
        self.entries
            .iter()
            .map(|(address, title)| BookmarkItem::Entry { address, title })
            .chain(std::iter::once(BookmarkItem::OpenAll))
            .collect()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_mutating(&self) -> bool {
        self.mutating
    }

    /// User picked the item at `index` of [`items`](Self::items).
    pub fn select(&mut self, index: usize) -> Option<BookmarkAction> {
        self.selection_changed(Some(index))
    }

    fn selection_changed(&mut self, index: Option<usize>) -> Option<BookmarkAction> {
        self.selected = index;
        if self.mutating {
            debug!(group = %self.key, ?index, "selection change during mutation ignored");
            return None;
        }
        let index = index?;
        if index == self.entries.len() {
            let all: Vec<String> = self.entries.keys().cloned().collect();
            info!(group = %self.key, count = all.len(), "opening all bookmarks");
            return Some(BookmarkAction::OpenAll(all));
        }
        let (address, _) = self.entries.get_index(index)?;
        Some(BookmarkAction::Open(address.clone()))
    }

    /// Remove `address` if present, otherwise append it with `title`.
    pub fn add_or_remove(&mut self, address: &str, title: &str) -> BookmarkChange {
        self.mutating = true;
        let change = if self.entries.shift_remove(address).is_some() {
            BookmarkChange::Removed
        } else {
            self.entries.insert(address.to_string(), title.to_string());
            BookmarkChange::Added
        };

        // Rebuilding the list moves the selection and notifies like a user pick.
        let last = self.entries.len();
        let reselected = Some(self.selected.map_or(0, |i| i.min(last)));
        let action = self.selection_changed(reselected);
        debug_assert!(action.is_none());

        self.mutating = false;
        info!(group = %self.key, address, ?change, "bookmark toggled");
        change
    }
}

/// All bookmark groups, loaded from and written through to preferences.
#[derive(Debug, Clone)]
pub struct BookmarkStore {
    groups: Vec<BookmarkGroup>,
}

impl BookmarkStore {
    /// One group per persisted child namespace, entries in stored order.
    pub fn load(prefs: &PreferencesStore) -> Self {
        let groups = BOOKMARK_GROUPS
            .iter()
            .map(|key| {
                let entries = prefs
                    .node(key)
                    .map(|node| node.values.clone())
                    .unwrap_or_default();
                BookmarkGroup::with_entries(*key, entries)
            })
            .collect();
        Self { groups }
    }

    pub fn groups(&self) -> &[BookmarkGroup] {
        &self.groups
    }

    pub fn group(&self, index: usize) -> Result<&BookmarkGroup, BrowserError> {
        self.groups
            .get(index)
            .ok_or(BrowserError::UnknownBookmarkGroup(index))
    }

    pub fn add_or_remove(
        &mut self,
        index: usize,
        address: &str,
        title: &str,
        prefs: &mut PreferencesStore,
    ) -> Result<BookmarkChange, BrowserError> {
        let group = self
            .groups
            .get_mut(index)
            .ok_or(BrowserError::UnknownBookmarkGroup(index))?;
        let change = group.add_or_remove(address, title);
        let node = prefs.node_mut(group.key());
        match change {
            BookmarkChange::Added => node.put(address, title),
            BookmarkChange::Removed => {
                node.remove(address);
            }
        }
        Ok(change)
    }

    pub fn select(
        &mut self,
        index: usize,
        item: usize,
    ) -> Result<Option<BookmarkAction>, BrowserError> {
        let group = self
            .groups
            .get_mut(index)
            .ok_or(BrowserError::UnknownBookmarkGroup(index))?;
        Ok(group.select(item))
    }
}

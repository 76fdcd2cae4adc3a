//! Per-tab navigation history.
//!
//! A bounded list of addresses with a cursor. The entry under the cursor is
//! the tab's current address; it may be rewritten in place (edited address,
//! reload) until a navigation branches off it.

use tracing::debug;

use crate::bounded::BoundedSeq;

#[derive(Debug, Clone)]
pub struct NavigationHistory {
    entries: BoundedSeq<String>,
    cursor: usize,
}

impl NavigationHistory {
    /// A history holding a single empty entry, cursor on it.
    pub fn new(capacity: usize) -> Self {
        let mut entries = BoundedSeq::new(capacity);
        entries.push(String::new());
        Self { entries, cursor: 0 }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    pub fn entries(&self) -> Vec<&str> {
        self.entries.iter().map(String::as_str).collect()
    }

    pub fn current(&self) -> &str {
        self.entries.get(self.cursor).map(String::as_str).unwrap_or("")
    }

    pub fn set_current(&mut self, address: impl Into<String>) {
        if let Some(entry) = self.entries.get_mut(self.cursor) {
            *entry = address.into();
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Branch to `address`: forward entries are discarded, the address is
    /// appended under the cursor, and the oldest entries are evicted if the
    /// bound is exceeded.
    pub fn navigate(&mut self, address: impl Into<String>) {
        self.entries.truncate(self.cursor + 1);
        let evicted = self.entries.push(address.into());
        self.cursor = self.entries.len() - 1;
        if !evicted.is_empty() {
            debug!(evicted = evicted.len(), "history bound reached, dropped oldest entries");
        }
    }

    /// Step back one entry. Returns the address now under the cursor, or
    /// `None` at the oldest entry.
    pub fn back(&mut self) -> Option<&str> {
        if !self.can_go_back() {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    /// Step forward one entry. Returns the address now under the cursor, or
    /// `None` at the newest entry.
    pub fn forward(&mut self) -> Option<&str> {
        if !self.can_go_forward() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }
}

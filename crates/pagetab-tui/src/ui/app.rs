use pagetab_core::document::{self, RenderedPage};
use pagetab_core::{Browser, BrowserError, LinkEvent, TabId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Keys drive the content view
    Normal,
    /// Keys edit the address field
    Editing,
}

/// Open bookmark group list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Picker {
    pub group: usize,
    pub index: usize,
}

pub struct App {
    pub browser: Browser,
    pub running: bool,
    pub input_mode: InputMode,
    pub picker: Option<Picker>,
    /// First visible content line
    pub scroll: u16,
    link_focus: Option<usize>,
    /// Tab currently on screen, to notice switches
    showing: Option<TabId>,
    /// Rendered form of the active tab's content, keyed by tab and revision
    page: Option<(TabId, u64, RenderedPage)>,
}

impl App {
    pub fn new(browser: Browser) -> Self {
        let mut app = Self {
            browser,
            running: true,
            input_mode: InputMode::Editing,
            picker: None,
            scroll: 0,
            link_focus: None,
            showing: None,
            page: None,
        };
        app.sync_view();
        app
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Run a browser operation and bring the view in line with the result.
    /// Failures are already on the status line, so they are not returned.
    pub fn apply<T>(&mut self, op: impl FnOnce(&mut Browser) -> Result<T, BrowserError>) -> Option<T> {
        let result = op(&mut self.browser).ok();
        self.sync_view();
        result
    }

    /// Reset scroll and link focus when a new page arrived or the active tab
    /// changed.
    pub fn sync_view(&mut self) {
        let active = self.browser.active_tab().map(|tab| tab.id());
        let caret_reset = self.browser.take_caret_reset();
        if caret_reset || active != self.showing {
            self.showing = active;
            self.scroll = 0;
            self.link_focus = None;
        }
    }

    /// The active tab's content as text with its links.
    pub fn page(&mut self) -> &RenderedPage {
        let key = self
            .browser
            .active_tab()
            .map(|tab| (tab.id(), tab.revision()));
        let stale = match (&self.page, key) {
            (Some((id, revision, _)), Some(key)) => (*id, *revision) != key,
            (None, Some(_)) => true,
            _ => false,
        };
        if stale {
            if let (Some(tab), Some((id, revision))) = (self.browser.active_tab(), key) {
                let rendered = document::render(tab.content(), tab.address());
                self.page = Some((id, revision, rendered));
            }
        }
        static EMPTY: RenderedPage = RenderedPage {
            text: String::new(),
            links: Vec::new(),
        };
        self.page.as_ref().map(|(_, _, page)| page).unwrap_or(&EMPTY)
    }

    pub fn link_focus(&self) -> Option<usize> {
        self.link_focus
    }

    /// Move the link focus by `delta`, wrapping, and report hover changes.
    pub fn move_link_focus(&mut self, delta: isize) {
        let count = self.page().links.len();
        if count == 0 {
            return;
        }
        let next = match self.link_focus {
            None if delta >= 0 => 0,
            None => count - 1,
            Some(current) => (current as isize + delta).rem_euclid(count as isize) as usize,
        };
        self.link_focus = Some(next);
        let address = self.page().links[next].address.clone();
        self.apply(|b| b.on_link(LinkEvent::HoverEnter(address)));
    }

    pub fn clear_link_focus(&mut self) {
        if self.link_focus.take().is_some() {
            self.apply(|b| b.on_link(LinkEvent::HoverExit));
        }
    }

    /// Follow the focused link, in a new tab when `new_tab` is set.
    pub fn activate_link(&mut self, new_tab: bool) {
        let Some(index) = self.link_focus else {
            return;
        };
        let Some(link) = self.page().links.get(index) else {
            return;
        };
        let address = link.address.clone();
        self.apply(|b| b.on_link(LinkEvent::Activate { address, new_tab }));
    }

    pub fn scroll_by(&mut self, delta: i32) {
        self.scroll = (self.scroll as i32 + delta).max(0) as u16;
    }

    // ===== Address field editing =====

    pub fn enter_char(&mut self, c: char) {
        let mut field = self.browser.address_field().to_string();
        field.push(c);
        self.browser.set_address_field(field);
    }

    pub fn delete_char(&mut self) {
        let mut field = self.browser.address_field().to_string();
        field.pop();
        self.browser.set_address_field(field);
    }

    pub fn paste(&mut self, text: &str) {
        let mut field = self.browser.address_field().to_string();
        field.extend(text.chars().filter(|c| !c.is_control()));
        self.browser.set_address_field(field);
    }

    // ===== Bookmark picker =====

    pub fn open_picker(&mut self, group: usize) {
        if self.browser.bookmarks().group(group).is_ok() {
            self.picker = Some(Picker { group, index: 0 });
        }
    }

    pub fn move_picker(&mut self, delta: isize) {
        let Some(picker) = self.picker else {
            return;
        };
        let Ok(group) = self.browser.bookmarks().group(picker.group) else {
            return;
        };
        let count = group.items().len() as isize;
        let index = (picker.index as isize + delta).rem_euclid(count) as usize;
        self.picker = Some(Picker { index, ..picker });
    }

    pub fn confirm_picker(&mut self) {
        if let Some(Picker { group, index }) = self.picker.take() {
            self.apply(|b| b.select_bookmark(group, index));
        }
    }
}

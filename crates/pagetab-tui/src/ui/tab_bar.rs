use pagetab_core::Browser;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::ui::theme;

/// Widest a single tab title may get before it is shortened
const MAX_TITLE_WIDTH: usize = 24;

/// Truncate string to fit within a display width, adding ellipsis when truncated.
pub(crate) fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }

    let target_width = max_width - 3;
    let mut result = String::new();
    let mut width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if width + char_width > target_width {
            break;
        }
        result.push(c);
        width += char_width;
    }
    result.push_str("...");
    result
}

/// One line listing every tab. Tabs within the shortcut range carry their
/// number; a tab with a fetch in flight is marked with `*`.
pub fn render_tab_bar(f: &mut Frame, browser: &Browser, area: Rect) {
    let tabs = browser.tabs();
    let mut spans = Vec::with_capacity(tabs.len() * 2);
    for (index, tab) in tabs.tabs().iter().enumerate() {
        let shortcut = tabs
            .shortcut_for(index)
            .map(|n| format!("{n}:"))
            .unwrap_or_default();
        let busy = if tab.is_busy() { "*" } else { "" };
        let label = format!(
            " {shortcut}{}{busy} ",
            truncate_to_width(tab.title(), MAX_TITLE_WIDTH)
        );
        let style = if index == tabs.active_index() {
            theme::tab_active()
        } else {
            theme::text_muted()
        };
        spans.push(Span::styled(label, style));
        spans.push(Span::styled("│", Style::default().fg(theme::BORDER_INACTIVE)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

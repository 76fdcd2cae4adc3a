use ratatui::{
    layout::{Constraint, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use pagetab_core::bookmarks::BookmarkItem;
use pagetab_core::BrowserError;

use crate::ui::tab_bar::{render_tab_bar, truncate_to_width};
use crate::ui::{theme, App, InputMode};

/// Share of the width given to the link list
const LINK_PANE_PERCENT: u16 = 30;

pub(crate) fn render(f: &mut Frame, app: &mut App) {
    let bg_block = Block::default().style(Style::default().bg(theme::BG_APP));
    f.render_widget(bg_block, f.area());

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .split(f.area());

    render_tab_bar(f, &app.browser, chunks[0]);
    render_address_bar(f, app, chunks[1]);
    render_content(f, app, chunks[2]);
    render_status_bar(f, app, chunks[3]);

    if app.picker.is_some() {
        render_bookmark_picker(f, app);
    }
}

fn render_address_bar(f: &mut Frame, app: &App, area: Rect) {
    let editing = app.input_mode == InputMode::Editing && app.picker.is_none();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::border(editing))
        .title(" Address ");
    let field = app.browser.address_field();
    let paragraph = Paragraph::new(field)
        .style(theme::text_primary().bg(theme::BG_INPUT))
        .block(block);
    f.render_widget(paragraph, area);

    if editing {
        let x = area.x + 1 + field.width() as u16;
        let max_x = area.x + area.width.saturating_sub(2);
        f.set_cursor_position(Position::new(x.min(max_x), area.y + 1));
    }
}

/// Split `line` so every occurrence of `marker` gets `highlight`.
fn highlight_marker(line: &str, marker: &str, highlight: Style) -> Line<'static> {
    if marker.is_empty() || !line.contains(marker) {
        return Line::from(line.to_string());
    }
    let mut spans = Vec::new();
    let mut rest = line;
    while let Some(pos) = rest.find(marker) {
        spans.push(Span::raw(rest[..pos].to_string()));
        spans.push(Span::styled(marker.to_string(), highlight));
        rest = &rest[pos + marker.len()..];
    }
    spans.push(Span::raw(rest.to_string()));
    Line::from(spans)
}

fn render_content(f: &mut Frame, app: &mut App, area: Rect) {
    let [text_area, links_area] = Layout::horizontal([
        Constraint::Percentage(100 - LINK_PANE_PERCENT),
        Constraint::Percentage(LINK_PANE_PERCENT),
    ])
    .areas(area);

    let title = app
        .browser
        .active_tab()
        .map(|tab| tab.title().to_string())
        .unwrap_or_default();
    let focused = app.link_focus();
    let scroll = app.scroll;
    let content_focus = app.input_mode == InputMode::Normal;
    let page = app.page();

    let marker = focused.map(|i| format!("[{}]", i + 1)).unwrap_or_default();
    let lines: Vec<Line> = page
        .text
        .lines()
        .map(|line| highlight_marker(line, &marker, theme::link_focused()))
        .collect();
    let content = Paragraph::new(lines)
        .style(theme::text_primary())
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme::border(content_focus))
                .title(format!(" {} ", truncate_to_width(&title, 60))),
        );
    f.render_widget(content, text_area);

    let width = links_area.width.saturating_sub(8) as usize;
    let items: Vec<ListItem> = page
        .links
        .iter()
        .enumerate()
        .map(|(i, link)| {
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(format!("{:>3} ", i + 1), theme::text_muted()),
                    Span::raw(truncate_to_width(&link.label, width)),
                ]),
                Line::from(Span::styled(
                    format!("    {}", truncate_to_width(&link.address, width)),
                    Style::default().fg(theme::TEXT_DIM),
                )),
            ])
        })
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme::border(content_focus))
                .title(" Links "),
        )
        .highlight_style(theme::link_focused());
    let mut state = ListState::default().with_selected(focused);
    f.render_stateful_widget(list, links_area, &mut state);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let status = app.browser.status();
    let style = status_style(app.browser.status_error());
    let hint = Span::styled(
        "  ^Q quit  ^L address  ^N new  ^W close  ^T reopen  F2-F4 bookmarks",
        Style::default().fg(theme::TEXT_DIM),
    );
    let hint_width = hint.width();
    let [status_area, hint_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(hint_width as u16),
    ])
    .areas(area);
    f.render_widget(Paragraph::new(Span::styled(status.to_string(), style)), status_area);
    f.render_widget(Paragraph::new(hint), hint_area);
}

fn status_style(error: Option<&BrowserError>) -> Style {
    match error {
        Some(BrowserError::Fetch { .. }) => Style::default().fg(theme::ACCENT_ERROR),
        Some(_) => Style::default().fg(theme::ACCENT_WARNING),
        None => theme::text_muted(),
    }
}

fn render_bookmark_picker(f: &mut Frame, app: &App) {
    let Some(picker) = app.picker else {
        return;
    };
    let Ok(group) = app.browser.bookmarks().group(picker.group) else {
        return;
    };

    let area = centered(f.area(), 60, 50);
    let items: Vec<ListItem> = group
        .items()
        .into_iter()
        .map(|item| match item {
            BookmarkItem::Entry { address, title } => ListItem::new(Line::from(vec![
                Span::raw(address.to_string()),
                Span::styled(format!("  {title}"), theme::text_muted()),
            ])),
            BookmarkItem::OpenAll => ListItem::new(Span::styled(
                item.label().to_string(),
                Style::default().add_modifier(Modifier::ITALIC),
            )),
        })
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme::ACCENT_PRIMARY))
                .title(format!(" {} ", group.key())),
        )
        .highlight_style(theme::link_focused())
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(picker.index));
    f.render_widget(Clear, area);
    f.render_stateful_widget(list, area, &mut state);
}

fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [_, middle, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(area);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(middle);
    center
}

// Centralized colors for the viewer chrome

use ratatui::style::{Color, Modifier, Style};

/// App background
pub const BG_APP: Color = Color::Rgb(0, 0, 0);

/// Active tab background
pub const BG_TAB_ACTIVE: Color = Color::Rgb(28, 28, 32);

/// Selected row / focused link background
pub const BG_SELECTED: Color = Color::Rgb(32, 32, 32);

/// Input field background
pub const BG_INPUT: Color = Color::Rgb(18, 18, 18);

pub const TEXT_PRIMARY: Color = Color::Rgb(220, 220, 220);
pub const TEXT_MUTED: Color = Color::Rgb(128, 128, 128);
pub const TEXT_DIM: Color = Color::Rgb(90, 90, 90);

/// Interactive elements, focus
pub const ACCENT_PRIMARY: Color = Color::Rgb(86, 156, 214);
pub const ACCENT_WARNING: Color = Color::Rgb(206, 145, 120);
pub const ACCENT_ERROR: Color = Color::Rgb(244, 112, 112);

pub const BORDER_ACTIVE: Color = Color::Rgb(100, 100, 100);
pub const BORDER_INACTIVE: Color = Color::Rgb(60, 60, 60);

pub fn text_primary() -> Style {
    Style::default().fg(TEXT_PRIMARY)
}

pub fn text_muted() -> Style {
    Style::default().fg(TEXT_MUTED)
}

pub fn border(focused: bool) -> Style {
    Style::default().fg(if focused { BORDER_ACTIVE } else { BORDER_INACTIVE })
}

pub fn tab_active() -> Style {
    Style::default()
        .fg(ACCENT_PRIMARY)
        .bg(BG_TAB_ACTIVE)
        .add_modifier(Modifier::BOLD)
}

pub fn link_focused() -> Style {
    Style::default()
        .fg(ACCENT_PRIMARY)
        .bg(BG_SELECTED)
        .add_modifier(Modifier::UNDERLINED)
}

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pagetab_core::Browser;

use crate::ui::{App, InputMode};

/// Bookmark groups, in order, reachable through add/remove and picker keys
const ADD_REMOVE_KEYS: [char; 3] = ['d', 'e', 'f'];
const PICKER_KEYS: [u8; 3] = [2, 3, 4];

pub(crate) fn handle_key(app: &mut App, key: KeyEvent) {
    if app.picker.is_some() {
        handle_picker_key(app, key);
        return;
    }
    if handle_global_key(app, key) {
        return;
    }
    match app.input_mode {
        InputMode::Editing => handle_editing_key(app, key),
        InputMode::Normal => handle_normal_key(app, key),
    }
}

/// Bindings that work regardless of focus. Returns whether the key was used.
fn handle_global_key(app: &mut App, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    if ctrl {
        match key.code {
            KeyCode::Char('q') => app.quit(),
            KeyCode::Left => {
                app.apply(Browser::back);
            }
            KeyCode::Right => {
                app.apply(Browser::forward);
            }
            KeyCode::Char('r') => {
                app.apply(Browser::reload);
            }
            KeyCode::Char('n') => {
                app.apply(|b| Ok(b.new_tab()));
                app.input_mode = InputMode::Editing;
            }
            KeyCode::Char('w') => {
                app.apply(Browser::close_tab);
            }
            KeyCode::Char('t') => {
                app.apply(Browser::reopen_last_closed);
            }
            KeyCode::Char('g') => {
                app.apply(Browser::change_search);
            }
            KeyCode::Char('l') => app.input_mode = InputMode::Editing,
            KeyCode::PageDown => {
                app.apply(Browser::next_tab);
            }
            KeyCode::PageUp => {
                app.apply(Browser::prev_tab);
            }
            KeyCode::Char(c) => match ADD_REMOVE_KEYS.iter().position(|k| *k == c) {
                Some(group) => {
                    app.apply(|b| b.add_or_remove_bookmark(group));
                }
                None => return false,
            },
            _ => return false,
        }
        return true;
    }

    if alt {
        if let KeyCode::Char(c @ '1'..='9') = key.code {
            let number = c as usize - '0' as usize;
            app.apply(|b| b.select_shortcut(number));
            return true;
        }
        if key.code == KeyCode::Enter && app.input_mode == InputMode::Normal {
            app.activate_link(true);
            return true;
        }
        return false;
    }

    if let KeyCode::F(n) = key.code {
        if let Some(group) = PICKER_KEYS.iter().position(|k| *k == n) {
            app.open_picker(group);
            return true;
        }
    }
    false
}

fn handle_editing_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            app.apply(Browser::submit_field);
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Backspace => app.delete_char(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => app.enter_char(c),
        _ => {}
    }
}

fn handle_normal_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Tab => app.move_link_focus(1),
        KeyCode::BackTab => app.move_link_focus(-1),
        KeyCode::Enter => app.activate_link(false),
        KeyCode::Esc => app.clear_link_focus(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_by(-1),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_by(1),
        KeyCode::PageUp => app.scroll_by(-20),
        KeyCode::PageDown | KeyCode::Char(' ') => app.scroll_by(20),
        KeyCode::Home => app.scroll = 0,
        KeyCode::Char('i') | KeyCode::Char('/') => app.input_mode = InputMode::Editing,
        _ => {}
    }
}

fn handle_picker_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.picker = None,
        KeyCode::Up | KeyCode::Char('k') => app.move_picker(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_picker(1),
        KeyCode::Enter => app.confirm_picker(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use pagetab_core::runner::TaskFuture;
    use pagetab_core::{CoreConfig, FetchedPage, Fetcher, PreferencesStore};
    use std::sync::Arc;
    use std::time::Duration;

    struct TitleFetcher;

    impl Fetcher for TitleFetcher {
        fn fetch(&self, address: &str) -> TaskFuture<FetchedPage> {
            let title = address.to_string();
            async move {
                Ok(FetchedPage {
                    title,
                    body: "<p>body</p>".to_string(),
                    elapsed: Duration::ZERO,
                })
            }
            .boxed()
        }
    }

    fn app() -> App {
        App::new(Browser::immediate(
            &CoreConfig::new("unused"),
            PreferencesStore::in_memory(),
            Arc::new(TitleFetcher),
        ))
    }

    fn press(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
        handle_key(app, KeyEvent::new(code, modifiers));
        app.browser.pump_completions();
        app.sync_view();
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c), KeyModifiers::NONE);
        }
    }

    #[test]
    fn test_type_and_submit_address() {
        let mut app = app();
        type_text(&mut app, "x.com");
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.browser.address_field(), "http://x.com");
        assert_eq!(app.browser.active_tab().unwrap().title(), "http://x.com");
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_tab_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'), KeyModifiers::CONTROL);
        press(&mut app, KeyCode::Char('n'), KeyModifiers::CONTROL);
        assert_eq!(app.browser.tabs().len(), 3);

        press(&mut app, KeyCode::Char('1'), KeyModifiers::ALT);
        assert_eq!(app.browser.active_index(), 0);
        press(&mut app, KeyCode::PageUp, KeyModifiers::CONTROL);
        assert_eq!(app.browser.active_index(), 2);

        press(&mut app, KeyCode::Char('w'), KeyModifiers::CONTROL);
        assert_eq!(app.browser.tabs().len(), 2);
        press(&mut app, KeyCode::Char('t'), KeyModifiers::CONTROL);
        assert_eq!(app.browser.tabs().len(), 3);
    }

    #[test]
    fn test_bookmark_keys_and_picker() {
        let mut app = app();
        type_text(&mut app, "http://x.com/");
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        press(&mut app, KeyCode::Char('e'), KeyModifiers::CONTROL);
        assert_eq!(app.browser.bookmarks().group(1).unwrap().len(), 1);

        press(&mut app, KeyCode::F(3), KeyModifiers::NONE);
        assert_eq!(app.picker.map(|p| p.group), Some(1));
        press(&mut app, KeyCode::Down, KeyModifiers::NONE);
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert!(app.picker.is_none());
        // "Open All" on one entry opens one more tab.
        assert_eq!(app.browser.tabs().len(), 2);
        assert_eq!(app.browser.active_tab().unwrap().title(), "http://x.com/");
    }
}

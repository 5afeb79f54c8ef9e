//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{App, AppState, Tab, PAGE_SCROLL_SIZE};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return false;
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return true;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return false;
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return false;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return false;
        }
        KeyCode::Tab => {
            switch_tab(app, app.current_tab.next());
            return false;
        }
        KeyCode::BackTab => {
            switch_tab(app, app.current_tab.prev());
            return false;
        }
        _ => {}
    }

    match app.current_tab {
        Tab::Quiz => handle_quiz_input(app, key),
        Tab::Breeds => handle_breeds_input(app, key),
    }
    false
}

fn switch_tab(app: &mut App, tab: Tab) {
    app.current_tab = tab;
    if tab == Tab::Breeds {
        app.ensure_breeds_loaded();
    }
}

fn handle_quiz_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c @ '1'..='4') => {
            let index = c as usize - '1' as usize;
            app.select_option(index);
        }
        KeyCode::Up | KeyCode::Char('k') => app.move_cursor(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_cursor(1),
        KeyCode::Enter => {
            if app.quiz.show_result {
                app.next_question();
            } else {
                app.select_highlighted();
            }
        }
        KeyCode::Char('n') => app.next_question(),
        KeyCode::Char('r') => {
            if app.quiz.game_finished {
                app.restart();
            } else {
                app.retry();
            }
        }
        _ => {}
    }
}

fn handle_breeds_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.breed_list.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.breed_list.select_next(),
        KeyCode::PageUp => app.breed_list.select_by(-PAGE_SCROLL_SIZE),
        KeyCode::PageDown => app.breed_list.select_by(PAGE_SCROLL_SIZE),
        KeyCode::Home => app.breed_list.selection = 0,
        KeyCode::End => app.breed_list.select_by(isize::MAX),
        KeyCode::Enter => app.load_selected_images(),
        KeyCode::Char('u') => app.load_breeds(true),
        _ => {}
    }
}

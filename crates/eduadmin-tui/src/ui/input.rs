//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use crossterm::event::{KeyCode, KeyEvent};

use eduadmin_core::store::TeacherFilter;

use crate::app::{App, AppState};
use crate::route::Route;

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    match app.state {
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            false
        }
        AppState::ConfirmingQuit => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                true
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
                false
            }
            _ => false,
        },
        AppState::SelectingTeacher => {
            handle_teacher_selector(app, key);
            false
        }
        AppState::Quitting => true,
        AppState::Normal => {
            handle_normal_input(app, key);
            false
        }
    }
}

fn handle_teacher_selector(app: &mut App, key: KeyEvent) {
    let count = app.teacher_options().len();
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            app.teacher_selection = app.teacher_selection.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if app.teacher_selection + 1 < count {
                app.teacher_selection += 1;
            }
        }
        KeyCode::Enter => {
            let filter = app
                .teacher_options()
                .into_iter()
                .nth(app.teacher_selection)
                .map(|(filter, _)| filter)
                .unwrap_or(TeacherFilter::All);
            app.select_teacher(filter);
        }
        KeyCode::Char('r') => app.load_teacher_names(true),
        KeyCode::Esc | KeyCode::Char('t') | KeyCode::Char('q') => {
            app.state = AppState::Normal;
        }
        _ => {}
    }
}

/// Number of selectable rows in the current view.
fn list_len(app: &App) -> usize {
    match app.route {
        Route::Tests { .. } => app.current_tests().len(),
        Route::Users { .. } => app.current_user_list().len(),
        Route::User { .. } => 0,
    }
}

fn handle_normal_input(app: &mut App, key: KeyEvent) {
    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return;
        }
        KeyCode::Char('1') => {
            app.navigate(Route::default());
            return;
        }
        KeyCode::Char('2') => {
            app.navigate(Route::Users { role: None });
            return;
        }
        KeyCode::Char('r') => {
            app.retry();
            return;
        }
        KeyCode::Esc | KeyCode::Backspace => {
            if !app.go_back() {
                app.toast_info("Nothing to go back to");
            }
            return;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.selection = app.selection.saturating_sub(1);
            return;
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if app.selection + 1 < list_len(app) {
                app.selection += 1;
            }
            return;
        }
        _ => {}
    }

    match app.route {
        Route::Tests { .. } => handle_tests_input(app, key),
        Route::Users { .. } => handle_users_input(app, key),
        Route::User { .. } => handle_user_input(app, key),
    }
}

fn handle_tests_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Right | KeyCode::Char('l') | KeyCode::PageDown => {
            app.next_page();
        }
        KeyCode::Left | KeyCode::Char('h') | KeyCode::PageUp => {
            app.prev_page();
        }
        KeyCode::Char('g') | KeyCode::Home => {
            app.go_to_page(1);
        }
        KeyCode::End => {
            if let Some(meta) = app.current_tests_metadata() {
                app.go_to_page(i64::from(meta.total_pages));
            }
        }
        KeyCode::Char('t') => app.open_teacher_selector(),
        _ => {}
    }
}

fn handle_users_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('f') => app.cycle_role_filter(),
        KeyCode::Enter => app.open_selected_user(),
        _ => {}
    }
}

fn handle_user_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char(' ') => app.toggle_user_active(),
        KeyCode::Enter => app.submit_user_update(),
        _ => {}
    }
}

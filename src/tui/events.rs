//! Key handling for the terminal browser

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::App;

/// What the event loop should do after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Handle a key event. `show_help` is the help overlay flag.
pub fn handle_event(app: &mut App, key: KeyEvent, show_help: &mut bool) -> Flow {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Flow::Quit;
    }

    if *show_help {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?')) {
            *show_help = false;
        }
        return Flow::Continue;
    }

    // Any key clears the last status message
    app.status = None;

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Flow::Quit,
        KeyCode::Char('?') => *show_help = true,

        KeyCode::Char('j') | KeyCode::Down => app.move_down(),
        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char('g') | KeyCode::Home => app.jump_to_top(),
        KeyCode::Char('G') | KeyCode::End => app.jump_to_bottom(),
        KeyCode::PageDown => app.page_down(),
        KeyCode::PageUp => app.page_up(),

        KeyCode::Enter | KeyCode::Char(' ') => app.activate_selected(),
        KeyCode::Char('l') | KeyCode::Right => app.expand_selected(),
        KeyCode::Char('h') | KeyCode::Left => app.collapse_selected(),
        KeyCode::Char('e') => app.expand_all(),
        KeyCode::Char('c') => app.collapse_all(),
        KeyCode::Char('r') => app.reload(),
        _ => {}
    }
    Flow::Continue
}

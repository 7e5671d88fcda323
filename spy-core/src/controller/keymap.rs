//! src/controller/keymap.rs
//! ============================================================================
//! # Keymap: mode-aware key → [`Action`] translation

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::controller::actions::Action;
use crate::model::ui_state::Mode;

/// Translate `key` for the current `mode`. Key releases map to nothing.
#[must_use]
pub fn map_key(key: KeyEvent, mode: Mode) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    // Ctrl-C quits from anywhere
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    match mode {
        Mode::Browsing => browsing(key),
        Mode::ActionMenuOpen => menu(key),
        Mode::ConfirmDelete => Some(confirm(key)),
        Mode::InputPromptOpen => prompt(key),
    }
}

fn browsing(key: KeyEvent) -> Option<Action> {
    let action: Action = match key.code {
        KeyCode::Up | KeyCode::Char('k') => Action::MoveSelectionUp,
        KeyCode::Down | KeyCode::Char('j') => Action::MoveSelectionDown,
        KeyCode::Right | KeyCode::Char('l') => Action::Expand,
        KeyCode::Left | KeyCode::Char('h') => Action::Collapse,
        KeyCode::Enter => Action::EnterSelected,
        KeyCode::Backspace => Action::GoBack,
        KeyCode::Char('a') => Action::ShowActions,
        KeyCode::Char('r') | KeyCode::F(5) => Action::Refresh,
        KeyCode::Char('.') => Action::ToggleShowHidden,
        KeyCode::Char('c') => Action::CancelBatch,
        KeyCode::Char('x') => Action::DismissBatch,
        KeyCode::Char('q') => Action::Quit,
        _ => return None,
    };
    Some(action)
}

fn menu(key: KeyEvent) -> Option<Action> {
    let action: Action = match key.code {
        KeyCode::Up | KeyCode::Char('k') => Action::MenuUp,
        KeyCode::Down | KeyCode::Char('j') => Action::MenuDown,
        KeyCode::Enter => Action::MenuActivate,
        KeyCode::Esc => Action::Escape,
        _ => return None,
    };
    Some(action)
}

fn confirm(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('y' | 'Y') => Action::ConfirmDelete(true),
        KeyCode::Esc => Action::Escape,
        _ => Action::ConfirmDelete(false),
    }
}

fn prompt(key: KeyEvent) -> Option<Action> {
    let action: Action = match key.code {
        KeyCode::Char(ch)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            Action::PromptInsert(ch)
        }
        KeyCode::Backspace => Action::PromptBackspace,
        KeyCode::Delete => Action::PromptDelete,
        KeyCode::Left => Action::PromptLeft,
        KeyCode::Right => Action::PromptRight,
        KeyCode::Home => Action::PromptHome,
        KeyCode::End => Action::PromptEnd,
        KeyCode::Enter => Action::PromptSubmit,
        KeyCode::Esc => Action::Escape,
        _ => return None,
    };
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn same_key_means_different_things_per_mode() {
        assert_eq!(
            map_key(key(KeyCode::Char('k')), Mode::Browsing),
            Some(Action::MoveSelectionUp)
        );
        assert_eq!(
            map_key(key(KeyCode::Char('k')), Mode::ActionMenuOpen),
            Some(Action::MenuUp)
        );
        assert_eq!(
            map_key(key(KeyCode::Char('k')), Mode::InputPromptOpen),
            Some(Action::PromptInsert('k'))
        );
        assert_eq!(
            map_key(key(KeyCode::Char('q')), Mode::InputPromptOpen),
            Some(Action::PromptInsert('q'))
        );
    }

    #[test]
    fn ctrl_c_always_quits() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        for mode in [
            Mode::Browsing,
            Mode::ActionMenuOpen,
            Mode::ConfirmDelete,
            Mode::InputPromptOpen,
        ] {
            assert_eq!(map_key(ctrl_c, mode), Some(Action::Quit));
        }
    }

    #[test]
    fn confirmation_accepts_only_y() {
        assert_eq!(
            map_key(key(KeyCode::Char('y')), Mode::ConfirmDelete),
            Some(Action::ConfirmDelete(true))
        );
        assert_eq!(
            map_key(key(KeyCode::Char('n')), Mode::ConfirmDelete),
            Some(Action::ConfirmDelete(false))
        );
        assert_eq!(
            map_key(key(KeyCode::Enter), Mode::ConfirmDelete),
            Some(Action::ConfirmDelete(false))
        );
    }

    #[test]
    fn unknown_browsing_keys_are_ignored() {
        assert_eq!(map_key(key(KeyCode::Char('z')), Mode::Browsing), None);
        assert_eq!(map_key(key(KeyCode::F(5)), Mode::Browsing), Some(Action::Refresh));
    }
}

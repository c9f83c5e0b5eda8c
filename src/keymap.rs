//! Fixed key → command table for the timer view.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::session::Command;

pub const KEY_BINDINGS: &[(KeyCode, Command, &str)] = &[
    (KeyCode::Char(' '), Command::StartOrPauseOrResume, "Space"),
    (KeyCode::Char('e'), Command::EndPhase, "E"),
    (KeyCode::Char('b'), Command::StartBreakNow, "B"),
    (KeyCode::Char('k'), Command::SkipBreak, "K"),
    (KeyCode::Char('s'), Command::OpenSettings, "S"),
    (KeyCode::Char('+'), Command::AdjustMinutes(1), "+"),
    (KeyCode::Char('-'), Command::AdjustMinutes(-1), "-"),
    (KeyCode::Char(']'), Command::AdjustSeconds(10), "]"),
    (KeyCode::Char('['), Command::AdjustSeconds(-10), "["),
    (KeyCode::Char('q'), Command::Quit, "Q"),
];

pub fn lookup(key: KeyEvent) -> Option<Command> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Command::Quit);
    }
    KEY_BINDINGS
        .iter()
        .find(|(code, _, _)| *code == key.code)
        .map(|(_, command, _)| *command)
}

/// Display name of the key bound to `command`.
pub fn key_for(command: Command) -> Option<&'static str> {
    KEY_BINDINGS.iter().find(|(_, c, _)| *c == command).map(|(_, _, name)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn documented_bindings() {
        assert_eq!(lookup(press(KeyCode::Char(' '))), Some(Command::StartOrPauseOrResume));
        assert_eq!(lookup(press(KeyCode::Char('e'))), Some(Command::EndPhase));
        assert_eq!(lookup(press(KeyCode::Char('b'))), Some(Command::StartBreakNow));
        assert_eq!(lookup(press(KeyCode::Char('k'))), Some(Command::SkipBreak));
        assert_eq!(lookup(press(KeyCode::Char('s'))), Some(Command::OpenSettings));
        assert_eq!(lookup(press(KeyCode::Char('+'))), Some(Command::AdjustMinutes(1)));
        assert_eq!(lookup(press(KeyCode::Char('-'))), Some(Command::AdjustMinutes(-1)));
        assert_eq!(lookup(press(KeyCode::Char(']'))), Some(Command::AdjustSeconds(10)));
        assert_eq!(lookup(press(KeyCode::Char('['))), Some(Command::AdjustSeconds(-10)));
    }

    #[test]
    fn quit_combos() {
        assert_eq!(lookup(press(KeyCode::Char('q'))), Some(Command::Quit));
        assert_eq!(
            lookup(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Command::Quit)
        );
        assert_eq!(lookup(press(KeyCode::Char('c'))), None);
    }

    #[test]
    fn unbound_keys_map_to_nothing() {
        assert_eq!(lookup(press(KeyCode::Char('z'))), None);
        assert_eq!(lookup(press(KeyCode::Tab)), None);
    }

    #[test]
    fn key_names() {
        assert_eq!(key_for(Command::SkipBreak), Some("K"));
        assert_eq!(key_for(Command::AdjustSeconds(-10)), Some("["));
    }
}
